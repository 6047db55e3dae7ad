use indoc::indoc;
use tessel_runtime::{Parser, Tree};

use crate::{Query, QueryCursor, QueryError, QueryMatch};

fn parse(source: &str) -> Tree {
    let language = tessel_langs::expr().unwrap();
    let mut parser = Parser::new();
    parser.set_language(&language);
    parser.parse(source, None).unwrap()
}

fn query(source: &str) -> Query {
    Query::new(&tessel_langs::expr().unwrap(), source).unwrap()
}

/// One line per match: `pattern: name=text ...`.
fn render(query: &Query, matches: &[QueryMatch<'_>], source: &str) -> String {
    let names = query.capture_names();
    matches
        .iter()
        .map(|m| {
            let captures: Vec<String> = m
                .captures
                .iter()
                .map(|c| {
                    let text = c.node.utf8_text(source.as_bytes()).unwrap();
                    format!("{}={text}", names[c.index as usize])
                })
                .collect();
            format!("{}: {}", m.pattern_index, captures.join(" "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn run_with(cursor: &QueryCursor, query_source: &str, source: &str) -> String {
    let tree = parse(source);
    let query = query(query_source);
    let matches: Vec<_> = cursor
        .matches(&query, tree.root_node(), source.as_bytes())
        .collect::<Result<_, _>>()
        .unwrap();
    render(&query, &matches, source)
}

fn run(query_source: &str, source: &str) -> String {
    run_with(&QueryCursor::new(), query_source, source)
}

#[test]
fn field_capture() {
    let out = run("(binary_expression left: (number) @lhs)", "1 + 2 * 3");
    insta::assert_snapshot!(out, @r"
    0: lhs=1
    0: lhs=2
    ");
}

#[test]
fn literal_token() {
    let out = run(r#"(binary_expression operator: "*" @op)"#, "1 + 2 * 3");
    insta::assert_snapshot!(out, @"0: op=*");
}

#[test]
fn wildcard_children_skip_anonymous_nodes() {
    let out = run("(binary_expression (_) @a (_) @b)", "1 + 2 * 3");
    insta::assert_snapshot!(out, @r"
    0: a=1 b=2 * 3
    0: a=2 b=3
    ");
}

#[test]
fn unanchored_children_allow_gaps() {
    let out = run("((number) @a (number) @b)", "1 2 3");
    insta::assert_snapshot!(out, @r"
    0: a=1 b=2
    0: a=1 b=3
    0: a=2 b=3
    ");
}

#[test]
fn anchor_between_siblings() {
    let out = run("((number) @a . (number) @b)", "1 2 3");
    insta::assert_snapshot!(out, @r"
    0: a=1 b=2
    0: a=2 b=3
    ");
}

#[test]
fn anchor_at_first_and_last_child() {
    insta::assert_snapshot!(run("(program . (number) @n)", "1 2 3"), @"0: n=1");
    insta::assert_snapshot!(run("(program (number) @n .)", "1 2 3"), @"0: n=3");
}

#[test]
fn child_without_anchor_matches_each_position() {
    let out = run("(program (number) @n)", "1 2 3");
    insta::assert_snapshot!(out, @r"
    0: n=1
    0: n=2
    0: n=3
    ");
}

#[test]
fn star_is_greedy() {
    let out = run("(program (number)* @n)", "1 2 3");
    insta::assert_snapshot!(out, @"0: n=1 n=2 n=3");
}

#[test]
fn plus_requires_one() {
    insta::assert_snapshot!(run("(program (identifier)+ @ids)", "1 a b"), @"0: ids=a ids=b");
    insta::assert_snapshot!(run("(program (identifier)+ @ids)", "1 2"), @"");
}

#[test]
fn alternation() {
    let out = run("[(number) (identifier)] @leaf", "1 + x");
    insta::assert_snapshot!(out, @r"
    0: leaf=1
    0: leaf=x
    ");
}

#[test]
fn document_order_then_pattern_order() {
    let source = "x + 1";
    let out = run(
        indoc! {"
            (number) @num
            (identifier) @id
        "},
        source,
    );
    insta::assert_snapshot!(out, @r"
    1: id=x
    0: num=1
    ");
}

#[test]
fn same_node_matches_in_pattern_order() {
    let out = run(
        indoc! {"
            (number) @a
            (number) @b
        "},
        "7",
    );
    insta::assert_snapshot!(out, @r"
    0: a=7
    1: b=7
    ");
}

#[test]
fn negated_field() {
    assert_eq!(run("(binary_expression !left) @b", "1 + 2"), "");
    assert_eq!(run("(let_expression !value) @l", "let a = 1;"), "");
}

#[test]
fn eq_predicate() {
    let out = run(r#"((identifier) @id (#eq? @id "x"))"#, "x + y");
    insta::assert_snapshot!(out, @"0: id=x");

    let out = run(r#"((identifier) @id (#not-eq? @id "x"))"#, "x + y");
    insta::assert_snapshot!(out, @"0: id=y");
}

#[test]
fn eq_between_captures() {
    let out = run(
        "(binary_expression left: (identifier) @a right: (identifier) @b (#eq? @a @b))",
        "x + x - y",
    );
    insta::assert_snapshot!(out, @"0: a=x b=x");
}

#[test]
fn match_predicate() {
    let out = run(r#"((identifier) @id (#match? @id "^ab"))"#, "abc + xab");
    insta::assert_snapshot!(out, @"0: id=abc");

    let out = run(r#"((identifier) @id (#not-match? @id "^ab"))"#, "abc + xab");
    insta::assert_snapshot!(out, @"0: id=xab");
}

#[test]
fn any_of_predicate() {
    let out = run(r#"((identifier) @id (#any-of? @id "x" "z"))"#, "x + y * z");
    insta::assert_snapshot!(out, @r"
    0: id=x
    0: id=z
    ");

    let out = run(r#"((identifier) @id (#not-any-of? @id "x" "z"))"#, "x + y * z");
    insta::assert_snapshot!(out, @"0: id=y");
}

#[test]
fn quantified_capture_predicates() {
    let source = "a b c";
    insta::assert_snapshot!(
        run(r#"((program (identifier)+ @ids) (#eq? @ids "d"))"#, source),
        @""
    );
    insta::assert_snapshot!(
        run(r#"((program (identifier)+ @ids) (#any-eq? @ids "b"))"#, source),
        @"0: ids=a ids=b ids=c"
    );
}

#[test]
fn error_node() {
    insta::assert_snapshot!(run("(ERROR) @e", "1+*2"), @"0: e=+*");
}

#[test]
fn missing_never_matches() {
    assert_eq!(run("(MISSING) @m", "1 +"), "");
}

#[test]
fn byte_range_limits_start_nodes() {
    let cursor = QueryCursor::new().with_byte_range(4..5);
    insta::assert_snapshot!(run_with(&cursor, "(number) @n", "1 + 2 * 3"), @"0: n=2");
}

#[test]
fn max_start_depth() {
    let source = "1 + 2 * 3";
    let tree = parse(source);
    let query = query("(_) @x");
    let mut cursor = QueryCursor::new();
    cursor.set_max_start_depth(Some(1));
    let kinds: Vec<&str> = cursor
        .matches(&query, tree.root_node(), source.as_bytes())
        .map(|m| m.unwrap().captures[0].node.kind())
        .collect();
    assert_eq!(kinds, ["program", "binary_expression"]);
}

#[test]
fn exec_fuel_exhaustion_ends_iteration() {
    let source = "1 + 2 * 3";
    let tree = parse(source);
    let query = query("(number) @n");
    let cursor = QueryCursor::new().with_exec_fuel(2);
    let results: Vec<_> = cursor
        .matches(&query, tree.root_node(), source.as_bytes())
        .collect();
    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(results[1].is_ok());
    assert!(matches!(results[2], Err(QueryError::ExecFuelExhausted)));
}

#[test]
fn recursion_limit() {
    let source = "1 + 2 * 3";
    let tree = parse(source);
    let query = query("(program (binary_expression (binary_expression)))");
    let cursor = QueryCursor::new().with_recursion_limit(1);
    let first = cursor
        .matches(&query, tree.root_node(), source.as_bytes())
        .next();
    assert!(matches!(first, Some(Err(QueryError::RecursionLimitExceeded))));
}

#[test]
fn matches_are_repeatable() {
    let source = "let a = 1 + b; a * 2";
    let tree = parse(source);
    let query = query("[(identifier) (number)] @leaf");
    let cursor = QueryCursor::new();
    let first: Vec<_> = cursor
        .matches(&query, tree.root_node(), source.as_bytes())
        .collect::<Result<_, _>>()
        .unwrap();
    let second: Vec<_> = cursor
        .matches(&query, tree.root_node(), source.as_bytes())
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(first, second);
    insta::assert_snapshot!(render(&query, &first, source), @r"
    0: leaf=a
    0: leaf=1
    0: leaf=b
    0: leaf=a
    0: leaf=2
    ");
}

#[test]
fn other_language_yields_nothing() {
    let source = "x";
    let tree = parse(source);
    let renpy = tessel_langs::renpy().unwrap();
    let query = Query::new(&renpy, "(identifier) @id").unwrap();
    let count = QueryCursor::new()
        .matches(&query, tree.root_node(), source.as_bytes())
        .count();
    assert_eq!(count, 0);
}

#[test]
fn subtree_start() {
    let source = "1 + 2 * 3";
    let tree = parse(source);
    let query = query("(number) @n");
    let inner = tree
        .root_node()
        .named_child(0)
        .and_then(|outer| outer.child_by_field_name("right"))
        .unwrap();
    let matches: Vec<_> = QueryCursor::new()
        .matches(&query, inner, source.as_bytes())
        .collect::<Result<_, _>>()
        .unwrap();
    insta::assert_snapshot!(render(&query, &matches, source), @r"
    0: n=2
    0: n=3
    ");
}

fn numbers(count: usize) -> String {
    (0..count).map(|i| (i % 10).to_string()).collect::<Vec<_>>().join(" ")
}

#[test]
fn long_quantified_run_is_one_match() {
    let source = numbers(2000);
    let tree = parse(&source);
    let query = query("(program (number)+ @n)");
    let matches: Vec<_> = QueryCursor::new()
        .matches(&query, tree.root_node(), source.as_bytes())
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].captures.len(), 2000);
}

#[test]
fn quantifier_work_is_charged_to_fuel() {
    let source = numbers(200);
    let tree = parse(&source);
    let query = query("(program (number)+ @n)");
    let results: Vec<_> = QueryCursor::new()
        .with_exec_fuel(50)
        .matches(&query, tree.root_node(), source.as_bytes())
        .collect();
    assert_eq!(results.len(), 1);
    assert!(matches!(results[0], Err(QueryError::ExecFuelExhausted)));
}

#[test]
fn trailing_newline_and_comment_in_query_text() {
    let out = run("(number) @n\n; trailing comment\n", "1 + 2");
    insta::assert_snapshot!(out, @r"
    0: n=1
    0: n=2
    ");
}
