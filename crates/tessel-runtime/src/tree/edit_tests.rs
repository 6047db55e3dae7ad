use tessel_core::{InputEdit, Point};

use crate::Parser;
use crate::test_grammars::{expr, leaf_spans, parse};

#[test]
fn edit_shifts_following_nodes() {
    let source = "1 + 2\n3";
    let mut tree = parse(&expr(), source);
    tree.edit(&InputEdit::replace(source, 0, 1, "100"));

    insta::assert_debug_snapshot!(leaf_spans(&tree), @r#"
    [
        "number [0, 3)",
        "_trivia [3, 4)",
        "+ [4, 5)",
        "_trivia [5, 6)",
        "number [6, 7)",
        "_trivia [7, 8)",
        "number [8, 9)",
    ]
    "#);
    let last = tree.root_node().named_child(1).unwrap();
    assert_eq!(last.start_position(), Point::new(1, 0));
    assert!(!last.has_changes());
}

#[test]
fn edit_leaves_the_original_untouched() {
    let source = "1 + 2";
    let original = parse(&expr(), source);
    let mut edited = original.clone();
    edited.edit(&InputEdit::replace(source, 2, 3, "-"));

    assert!(edited.root_node().has_changes());
    assert!(!original.root_node().has_changes());
    assert_eq!(original.root_node().byte_range(), 0..5);
}

#[test]
fn deletions_collapse_nodes() {
    let source = "1 + 22 + 3";
    let mut tree = parse(&expr(), source);
    tree.edit(&InputEdit::replace(source, 4, 6, ""));

    assert_eq!(tree.root_node().byte_range(), 0..8);
    let spans = leaf_spans(&tree);
    assert!(spans.contains(&"number [4, 4)".to_owned()), "{spans:?}");
}

#[test]
fn changed_ranges_cover_the_edit() {
    let source = "1+2";
    let mut parser = Parser::new();
    parser.set_language(&expr());
    let mut old = parser.parse(source, None).unwrap();

    let edit = InputEdit::replace(source, 2, 3, "23");
    old.edit(&edit);
    let new = parser.parse(&edit.apply(source, "23"), Some(&old)).unwrap();

    let ranges = new.changed_ranges(&old);
    assert_eq!(ranges.len(), 1);
    assert!(ranges[0].start_byte <= 2);
    assert_eq!(ranges[0].end_byte, 4);
}

#[test]
fn structural_changes_are_reported() {
    let source = "1 2";
    let mut parser = Parser::new();
    parser.set_language(&expr());
    let mut old = parser.parse(source, None).unwrap();

    let edit = InputEdit::replace(source, 1, 2, "+");
    old.edit(&edit);
    let new = parser.parse(&edit.apply(source, "+"), Some(&old)).unwrap();

    insta::assert_snapshot!(new.to_sexp(), @"(program (binary_expression left: (number) right: (number)))");
    let ranges = new.changed_ranges(&old);
    assert_eq!(ranges.len(), 1);
    assert_eq!(ranges[0].start_byte..ranges[0].end_byte, 0..3);
}

#[test]
fn identical_trees_have_no_changes() {
    let tree = parse(&expr(), "let a = 1;");

    assert!(tree.changed_ranges(&tree.clone()).is_empty());
}
