use crate::subtree::Subtree;
use crate::test_grammars::{expr, parse};

fn depth(node: &Subtree) -> usize {
    1 + node
        .children
        .iter()
        .map(|c| depth(&c.node))
        .max()
        .unwrap_or(0)
}

fn numbers(count: usize) -> String {
    (0..count).map(|i| i.to_string()).collect::<Vec<_>>().join(" ")
}

#[test]
fn long_repetitions_are_shallow() {
    let source = numbers(256);
    let tree = parse(&expr(), &source);

    // A left-leaning chain would be over 256 levels deep.
    assert!(depth(tree.root()) < 24, "depth {}", depth(tree.root()));
    assert_eq!(tree.root_node().named_child_count(), 256);
}

#[test]
fn balancing_keeps_order_and_extras() {
    let source = "1 # a\n2 3 # b\n4 5";
    let tree = parse(&expr(), source);

    insta::assert_snapshot!(tree.to_sexp(), @"(program (number) (comment) (number) (number) (comment) (number) (number))");
    let texts: Vec<&str> = tree
        .root_node()
        .named_children()
        .map(|n| n.utf8_text(source.as_bytes()).unwrap())
        .collect();
    assert_eq!(texts, ["1", "# a", "2", "3", "# b", "4", "5"]);
}

#[test]
fn short_repetitions_are_left_alone() {
    let tree = parse(&expr(), "1 2");

    assert!(!tree.root().fragile);
    insta::assert_snapshot!(tree.to_sexp(), @"(program (number) (number))");
}
