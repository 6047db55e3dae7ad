use tessel_core::Point;

use crate::test_grammars::{expr, parse};
use crate::{Node, Tree};

const SOURCE: &str = "let x = 1 + 2;";

fn statement(tree: &Tree) -> Node<'_> {
    tree.root_node().named_child(0).unwrap()
}

#[test]
fn children_skip_hidden_nodes() {
    let tree = parse(&expr(), SOURCE);
    let statement = statement(&tree);

    let kinds: Vec<&str> = statement.children().map(|n| n.kind()).collect();
    assert_eq!(kinds, ["let", "identifier", "=", "binary_expression", ";"]);
    assert_eq!(statement.child_count(), 5);
    assert_eq!(statement.named_child_count(), 2);
    assert_eq!(statement.named_child(1).unwrap().kind(), "binary_expression");
    assert!(statement.child(5).is_none());
}

#[test]
fn fields_are_inherited_through_hidden_rules() {
    let tree = parse(&expr(), SOURCE);
    let statement = statement(&tree);

    let value = statement.child_by_field_name("value").unwrap();
    assert_eq!(value.kind(), "binary_expression");
    assert_eq!(value.utf8_text(SOURCE.as_bytes()).unwrap(), "1 + 2");
    assert_eq!(statement.field_name_for_child(1), Some("name"));
    assert_eq!(statement.field_name_for_child(2), None);
    assert!(statement.child_by_field_name("left").is_none());
    assert!(statement.child_by_field_name("nonexistent").is_none());

    let operators = value.children_by_field_name("operator");
    assert_eq!(operators.len(), 1);
    assert_eq!(operators[0].kind(), "+");
    assert!(!operators[0].is_named());
}

#[test]
fn parents_and_siblings() {
    let tree = parse(&expr(), SOURCE);
    let statement = statement(&tree);
    let name = statement.child_by_field_name("name").unwrap();

    assert_eq!(name.parent(), Some(statement));
    assert_eq!(statement.parent(), Some(tree.root_node()));
    assert_eq!(tree.root_node().parent(), None);
    assert_eq!(name.next_sibling().unwrap().kind(), "=");
    assert_eq!(name.prev_sibling().unwrap().kind(), "let");
    assert_eq!(name.next_named_sibling().unwrap().kind(), "binary_expression");
    assert_eq!(name.prev_named_sibling(), None);
    assert_eq!(statement.next_sibling(), None);
}

#[test]
fn children_by_byte() {
    let tree = parse(&expr(), SOURCE);
    let statement = statement(&tree);

    assert_eq!(statement.first_child_for_byte(5).unwrap().kind(), "=");
    assert_eq!(
        statement.first_named_child_for_byte(5).unwrap().kind(),
        "binary_expression"
    );
    assert_eq!(statement.first_child_for_byte(0).unwrap().kind(), "let");
    assert!(statement.first_child_for_byte(14).is_none());
}

#[test]
fn smallest_descendant_for_a_range() {
    let tree = parse(&expr(), SOURCE);
    let root = tree.root_node();

    let one = root.descendant_for_byte_range(8, 9).unwrap();
    assert_eq!(one.kind(), "number");
    assert_eq!(one.byte_range(), 8..9);

    let plus = root.descendant_for_byte_range(10, 10).unwrap();
    assert_eq!(plus.kind(), "+");
    let named = root.named_descendant_for_byte_range(10, 10).unwrap();
    assert_eq!(named.kind(), "binary_expression");

    let whole = root.descendant_for_byte_range(4, 12).unwrap();
    assert_eq!(whole.kind(), "let_expression");
    assert!(root.descendant_for_byte_range(3, 40).is_none());
}

#[test]
fn descendants_in_preorder() {
    let tree = parse(&expr(), SOURCE);

    let kinds: Vec<&str> = tree.root_node().descendants().map(|n| n.kind()).collect();
    insta::assert_snapshot!(kinds.join(" "), @"program let_expression let identifier = binary_expression number + number ;");

    let value = statement(&tree).child_by_field_name("value").unwrap();
    assert_eq!(value.descendants().count(), 4);
}

#[test]
fn positions_and_ranges() {
    let source = "1 +\n  2";
    let tree = parse(&expr(), source);
    let two = tree.root_node().descendant_for_byte_range(6, 7).unwrap();

    assert_eq!(two.start_position(), Point::new(1, 2));
    assert_eq!(two.end_position(), Point::new(1, 3));
    assert_eq!(tree.root_node().end_position(), Point::new(1, 3));
    assert_eq!(two.range().start_byte, 6);
    insta::assert_snapshot!(format!("{two:?}"), @"{Node number (1, 2) - (1, 3)}");
}

#[test]
fn node_flags() {
    let tree = parse(&expr(), "1 # c\n+ $");
    let root = tree.root_node();

    let comment = root.descendants().find(|n| n.kind() == "comment").unwrap();
    assert!(comment.is_extra());
    assert!(comment.is_named());
    let error = root.descendants().find(|n| n.is_error()).unwrap();
    assert!(error.has_error());
    assert!(root.has_error());
    assert!(!comment.has_error());
    assert!(!root.is_missing());
    assert!(root.is_visible());
    assert!(!root.has_changes());
}

#[test]
fn subtree_sexp() {
    let tree = parse(&expr(), SOURCE);
    let value = statement(&tree).child_by_field_name("value").unwrap();

    insta::assert_snapshot!(value.to_sexp(), @"(binary_expression left: (number) right: (number))");
    insta::assert_snapshot!(format!("{tree:?}"), @"{Tree (program (let_expression name: (identifier) value: (binary_expression left: (number) right: (number))))}");
}

#[test]
fn trees_cross_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Tree>();
    assert_send_sync::<crate::Language>();

    let tree = parse(&expr(), SOURCE);
    let copy = tree.clone();
    let sexp = std::thread::spawn(move || copy.to_sexp()).join().unwrap();
    assert_eq!(sexp, tree.to_sexp());
    let again = tree.clone();
    assert_eq!(statement(&tree).id(), statement(&again).id());
}
