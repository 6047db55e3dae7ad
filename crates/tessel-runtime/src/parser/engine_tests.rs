use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use indoc::indoc;
use tessel_generate::ConflictPolicy;

use crate::test_grammars::{ambiguous, expr, leaf_spans, lines, outline, parse};
use crate::{ParseError, ParseOptions, Parser};

#[test]
fn precedence_and_fields() {
    let tree = parse(&expr(), "1+2*3");

    insta::assert_snapshot!(tree.to_sexp(), @"(program (binary_expression left: (number) right: (binary_expression left: (number) right: (number))))");
}

#[test]
fn left_associativity() {
    let tree = parse(&expr(), "1-2-3");

    insta::assert_snapshot!(outline(&tree), @r"
    program [0, 5)
      binary_expression [0, 5)
        left: binary_expression [0, 3)
          left: number [0, 1)
          operator: - [1, 2)
          right: number [2, 3)
        operator: - [3, 4)
        right: number [4, 5)
    ");
}

#[test]
fn keywords_and_nested_rules() {
    let tree = parse(&expr(), "let x = (1 + y);");

    insta::assert_snapshot!(tree.to_sexp(), @"(program (let_expression name: (identifier) value: (parenthesized_expression (binary_expression left: (number) right: (identifier)))))");
}

#[test]
fn extras_stay_in_place() {
    let source = indoc! {"
        1 # one
        2
        # two
        3
    "};
    let tree = parse(&expr(), source);

    insta::assert_snapshot!(tree.to_sexp(), @"(program (number) (comment) (number) (comment) (number))");
    assert_eq!(tree.root_node().byte_range(), 0..source.len());
}

#[test]
fn empty_input() {
    let tree = parse(&expr(), "");

    insta::assert_snapshot!(tree.to_sexp(), @"(program)");
    assert_eq!(tree.root_node().byte_range(), 0..0);
    assert!(!tree.root_node().has_error());
}

#[test]
fn leading_and_trailing_trivia_belong_to_the_root() {
    let tree = parse(&expr(), "  1  ");

    assert_eq!(tree.root_node().byte_range(), 0..5);
    assert_eq!(
        leaf_spans(&tree),
        ["_trivia [0, 2)", "number [2, 3)", "_trivia [3, 5)"]
    );
}

#[test]
fn external_tokens() {
    let tree = parse(&lines(), "ab cd\nef\n");

    insta::assert_snapshot!(tree.to_sexp(), @"(document (line (word) (word)) (line (word)))");
    assert!(!tree.root_node().has_error());
}

#[test]
fn forks_resolve_to_one_error_free_tree() {
    let language = ambiguous(ConflictPolicy::Fork);
    let first = parse(&language, "x+x+x+x");
    let second = parse(&language, "x+x+x+x");

    assert!(!first.root_node().has_error());
    assert_eq!(first.to_sexp(), second.to_sexp());
    assert_eq!(first.root_node().descendants().filter(|n| n.kind() == "x").count(), 4);
}

#[test]
fn prefer_shift_nests_to_the_right() {
    let tree = parse(&ambiguous(ConflictPolicy::PreferShift), "x+x+x");

    insta::assert_snapshot!(tree.to_sexp(), @"(e (e) (e (e) (e)))");
}

#[test]
fn a_single_version_still_parses() {
    let mut parser = Parser::new();
    parser.set_language(&ambiguous(ConflictPolicy::Fork));
    parser.set_options(ParseOptions::default().with_max_versions(1));

    let tree = parser.parse("x+x+x", None).unwrap();
    assert!(!tree.root_node().has_error());
    assert_eq!(tree.root_node().byte_range(), 0..5);
}

#[test]
fn parsing_needs_a_language() {
    let mut parser = Parser::new();

    assert_eq!(parser.parse("1", None).unwrap_err(), ParseError::NoLanguage);
}

#[test]
fn fuel_limits_the_parse() {
    let mut parser = Parser::new();
    parser.set_language(&expr());
    parser.set_options(ParseOptions::default().with_exec_fuel(Some(3)));

    assert_eq!(
        parser.parse("1 + 2 + 3", None).unwrap_err(),
        ParseError::ExecFuelExhausted
    );
}

#[test]
fn stack_depth_is_bounded() {
    let mut parser = Parser::new();
    parser.set_language(&expr());
    parser.set_options(ParseOptions::default().with_max_stack_depth(4));

    let err = parser.parse("((((((1))))))", None).unwrap_err();
    assert_eq!(err, ParseError::StackDepthExceeded { limit: 4 });
    insta::assert_snapshot!(err.to_string(), @"parse stack exceeded 4 entries");
}

#[test]
fn cancellation() {
    let flag = Arc::new(AtomicBool::new(true));
    let mut parser = Parser::new();
    parser.set_language(&expr());
    parser.set_options(ParseOptions::default().with_cancellation_flag(flag));

    assert_eq!(parser.parse("1", None).unwrap_err(), ParseError::Cancelled);
}

#[test]
fn parses_are_repeatable() {
    let language = expr();
    let source = "let a = 1 * (2 + b);\n3 / 4 - 5 # tail";

    let first = parse(&language, source);
    let second = parse(&language, source);
    assert_eq!(outline(&first), outline(&second));
    assert_eq!(leaf_spans(&first), leaf_spans(&second));
}

#[test]
fn leaves_reproduce_the_input() {
    let language = expr();
    let source = "let a = 1 * (2 + b);\n  3 / 4 - 5 # tail\n";
    let tree = parse(&language, source);

    let text: String = tree
        .leaves()
        .map(|leaf| leaf.utf8_text(source.as_bytes()).unwrap())
        .collect();
    assert_eq!(text, source);
}

#[test]
fn long_left_associative_chain() {
    let source = format!("{}1", "1+".repeat(100_000));
    let tree = parse(&expr(), &source);
    let root = tree.root_node();

    assert!(!root.has_error());
    assert_eq!(root.byte_range(), 0..source.len());
    assert_eq!(root.named_child(0).map(|n| n.kind()), Some("binary_expression"));
}

#[test]
fn deep_nesting_within_the_stack_limit() {
    let depth = 20_000;
    let source = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
    let tree = parse(&expr(), &source);

    assert!(!tree.root_node().has_error());
    assert_eq!(tree.root_node().byte_range(), 0..source.len());
}

#[test]
fn nesting_past_the_stack_limit_fails_the_parse() {
    let depth = 100_000;
    let source = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
    let mut parser = Parser::new();
    parser.set_language(&expr());

    assert_eq!(
        parser.parse(&source, None).unwrap_err(),
        ParseError::StackDepthExceeded { limit: 65_536 }
    );
}
