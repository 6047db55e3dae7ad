use indoc::indoc;

use super::parse;

const LIMIT: u32 = 256;

fn cst(source: &str) -> String {
    let parse = parse(source, LIMIT);
    assert!(
        parse.diagnostics().is_empty(),
        "unexpected diagnostics: {}",
        parse.diagnostics()
    );
    parse.dump_cst()
}

fn errors(source: &str) -> String {
    parse(source, LIMIT).diagnostics().to_string()
}

#[test]
fn fields_and_captures() {
    insta::assert_snapshot!(cst("(binary_expression left: (number) @lhs)"), @r#"
    Root
      Pattern
        Tree
          ParenOpen "("
          Id "binary_expression"
          Capture
            Field
              Id "left"
              Colon ":"
              Tree
                ParenOpen "("
                Id "number"
                ParenClose ")"
            At "@"
            Id "lhs"
          ParenClose ")"
    "#);
}

#[test]
fn groups_alternations_and_anchors() {
    insta::assert_snapshot!(cst(r#"((comment)+ . [(a) "b"] @x)"#), @r#"
    Root
      Pattern
        Group
          ParenOpen "("
          Quantifier
            Tree
              ParenOpen "("
              Id "comment"
              ParenClose ")"
            Plus "+"
          Anchor
            Dot "."
          Capture
            Alt
              BracketOpen "["
              Tree
                ParenOpen "("
                Id "a"
                ParenClose ")"
              Str
                DoubleQuote "\""
                StrVal "b"
                DoubleQuote "\""
              BracketClose "]"
            At "@"
            Id "x"
          ParenClose ")"
    "#);
}

#[test]
fn predicates_sit_inside_patterns() {
    insta::assert_snapshot!(cst(r#"((identifier) @id (#eq? @id "foo"))"#), @r##"
    Root
      Pattern
        Group
          ParenOpen "("
          Capture
            Tree
              ParenOpen "("
              Id "identifier"
              ParenClose ")"
            At "@"
            Id "id"
          Predicate
            ParenOpen "("
            PredicateName "#eq?"
            At "@"
            Id "id"
            Str
              DoubleQuote "\""
              StrVal "foo"
              DoubleQuote "\""
            ParenClose ")"
          ParenClose ")"
    "##);
}

#[test]
fn wildcards_negations_and_special_nodes() {
    insta::assert_snapshot!(cst("(call !arguments _ (_) (ERROR) (MISSING number))"), @r#"
    Root
      Pattern
        Tree
          ParenOpen "("
          Id "call"
          NegatedField
            Negation "!"
            Id "arguments"
          Wildcard
            Underscore "_"
          Tree
            ParenOpen "("
            Underscore "_"
            ParenClose ")"
          Tree
            ParenOpen "("
            KwError "ERROR"
            ParenClose ")"
          Tree
            ParenOpen "("
            KwMissing "MISSING"
            Id "number"
            ParenClose ")"
          ParenClose ")"
    "#);
}

#[test]
fn comments_separate_patterns() {
    let source = indoc! {r#"
    ; numbers
    (number) @n
    ; strings
    "+" @plus
    "#};
    let parse = parse(source, LIMIT);
    assert!(parse.diagnostics().is_empty());
    assert_eq!(parse.root().map(|r| r.patterns().count()), Some(2));
}

#[test]
fn unclosed_node() {
    insta::assert_snapshot!(errors("(a"), @"error at 0..2: missing closing `)`; expected `)` (related: node started here at 0..1)");
}

#[test]
fn unclosed_alternation() {
    insta::assert_snapshot!(errors("[(a) (b)"), @"error at 0..8: missing closing `]`; expected `]` (related: alternation started here at 0..1)");
}

#[test]
fn empty_node() {
    insta::assert_snapshot!(errors("()"), @"error at 1..2: empty `()` is not allowed (hint: use `(_)` to match any named node, or `_` for any node)");
}

#[test]
fn capture_without_name() {
    insta::assert_snapshot!(errors("(a) @"), @"error at 5..5: expected capture name");
}

#[test]
fn bare_identifier() {
    insta::assert_snapshot!(errors("foo"), @"error at 0..3: bare identifier is not a pattern (hint: node patterns need parentheses: `(identifier)`)");
}

#[test]
fn invalid_escape() {
    insta::assert_snapshot!(errors(r#"(a "\q")"#), @"error at 4..6: invalid escape sequence");
}

#[test]
fn top_level_predicate() {
    insta::assert_snapshot!(errors(r#"(#eq? @a "b")"#), @r#"error at 0..1: predicate is not attached to a pattern (hint: wrap the pattern and its predicate: `((node) @x (#eq? @x "text"))`)"#);
}

#[test]
fn recovers_at_stray_bracket() {
    let parse = parse("(a ] (b))", LIMIT);
    insta::assert_snapshot!(parse.diagnostics().to_string(), @r#"
    error at 3..4: unexpected token: expected closing `)`
    error at 8..9: unexpected token: try `(node)`, `[a b]`, `"literal"`, or `_`
    "#);
    assert_eq!(parse.root().map(|r| r.patterns().count()), Some(2));
}

#[test]
fn deep_nesting_stops_at_the_limit() {
    let parse = parse("((((a))))", 3);
    assert!(parse.recursion_exceeded());
}

#[test]
fn trailing_trivia_stays_in_root() {
    let source = "(a) ; done\n";
    let parse = parse(source, LIMIT);
    assert!(parse.diagnostics().is_empty());
    assert_eq!(parse.syntax().text().to_string(), source);
    assert_eq!(parse.root().map(|r| r.patterns().count()), Some(1));
}
