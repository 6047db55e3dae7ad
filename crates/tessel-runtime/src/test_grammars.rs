//! Small grammars shared by the unit tests.

use indoc::indoc;
use tessel_generate::{ConflictPolicy, TableOptions, generate_from_json};

use crate::{ExternalScanner, Language, Parser, ScanCursor, ScannerState, Tree};

pub const EXPR: &str = indoc! {r##"
    {
      "name": "expr",
      "word": "identifier",
      "extras": [
        { "type": "PATTERN", "value": "\\s" },
        { "type": "SYMBOL", "name": "comment" }
      ],
      "rules": {
        "program": { "type": "REPEAT", "content": { "type": "SYMBOL", "name": "_expression" } },
        "_expression": { "type": "CHOICE", "members": [
          { "type": "SYMBOL", "name": "number" },
          { "type": "SYMBOL", "name": "identifier" },
          { "type": "SYMBOL", "name": "let_expression" },
          { "type": "SYMBOL", "name": "parenthesized_expression" },
          { "type": "SYMBOL", "name": "binary_expression" }
        ] },
        "let_expression": { "type": "SEQ", "members": [
          { "type": "STRING", "value": "let" },
          { "type": "FIELD", "name": "name", "content": { "type": "SYMBOL", "name": "identifier" } },
          { "type": "STRING", "value": "=" },
          { "type": "FIELD", "name": "value", "content": { "type": "SYMBOL", "name": "_expression" } },
          { "type": "STRING", "value": ";" }
        ] },
        "parenthesized_expression": { "type": "SEQ", "members": [
          { "type": "STRING", "value": "(" },
          { "type": "SYMBOL", "name": "_expression" },
          { "type": "STRING", "value": ")" }
        ] },
        "binary_expression": { "type": "CHOICE", "members": [
          { "type": "PREC_LEFT", "value": 1, "content": { "type": "SEQ", "members": [
            { "type": "FIELD", "name": "left", "content": { "type": "SYMBOL", "name": "_expression" } },
            { "type": "FIELD", "name": "operator", "content": { "type": "CHOICE", "members": [
              { "type": "STRING", "value": "+" },
              { "type": "STRING", "value": "-" }
            ] } },
            { "type": "FIELD", "name": "right", "content": { "type": "SYMBOL", "name": "_expression" } }
          ] } },
          { "type": "PREC_LEFT", "value": 2, "content": { "type": "SEQ", "members": [
            { "type": "FIELD", "name": "left", "content": { "type": "SYMBOL", "name": "_expression" } },
            { "type": "FIELD", "name": "operator", "content": { "type": "CHOICE", "members": [
              { "type": "STRING", "value": "*" },
              { "type": "STRING", "value": "/" }
            ] } },
            { "type": "FIELD", "name": "right", "content": { "type": "SYMBOL", "name": "_expression" } }
          ] } }
        ] },
        "number": { "type": "PATTERN", "value": "[0-9]+" },
        "identifier": { "type": "PATTERN", "value": "[a-z_]+" },
        "comment": { "type": "PATTERN", "value": "#[^\\n]*" }
      }
    }
"##};

/// `e -> e '+' e | 'x'` with no precedence: every `+` chain is ambiguous.
pub const AMBIGUOUS: &str = indoc! {r#"
    {
      "name": "ambiguous",
      "rules": {
        "e": { "type": "CHOICE", "members": [
          { "type": "SEQ", "members": [
            { "type": "SYMBOL", "name": "e" },
            { "type": "STRING", "value": "+" },
            { "type": "SYMBOL", "name": "e" }
          ] },
          { "type": "STRING", "value": "x" }
        ] }
      }
    }
"#};

/// Lines of words terminated by an externally scanned newline.
pub const LINES: &str = indoc! {r#"
    {
      "name": "lines",
      "extras": [{ "type": "PATTERN", "value": " " }],
      "externals": [{ "type": "SYMBOL", "name": "_newline" }],
      "rules": {
        "document": { "type": "REPEAT", "content": { "type": "SYMBOL", "name": "line" } },
        "line": { "type": "SEQ", "members": [
          { "type": "REPEAT1", "content": { "type": "SYMBOL", "name": "word" } },
          { "type": "SYMBOL", "name": "_newline" }
        ] },
        "word": { "type": "PATTERN", "value": "[a-z]+" }
      }
    }
"#};

pub fn language(json: &str) -> Language {
    let table = generate_from_json(json, &TableOptions::default()).unwrap();
    Language::new(table).unwrap()
}

pub fn expr() -> Language {
    language(EXPR)
}

pub fn ambiguous(policy: ConflictPolicy) -> Language {
    let options = TableOptions::default().with_conflict_policy(policy);
    Language::new(generate_from_json(AMBIGUOUS, &options).unwrap()).unwrap()
}

/// Emits `_newline` for each `\n`, counting lines in the scanner state.
pub struct NewlineScanner;

impl ExternalScanner for NewlineScanner {
    fn scan(&self, cursor: &mut ScanCursor<'_>, valid: &[bool], state: &mut ScannerState) -> Option<usize> {
        if !valid[0] || cursor.peek() != Some(b'\n') {
            return None;
        }
        cursor.advance();
        cursor.mark_end();
        state.indents.push(state.indents.len() as u32);
        Some(0)
    }
}

pub fn lines() -> Language {
    let table = generate_from_json(LINES, &TableOptions::default()).unwrap();
    Language::with_scanner(table, NewlineScanner).unwrap()
}

pub fn parse(language: &Language, text: &str) -> Tree {
    let mut parser = Parser::new();
    parser.set_language(language);
    parser.parse(text, None).unwrap()
}

/// Every raw leaf as `kind [start, end)`, trivia included.
pub fn leaf_spans(tree: &Tree) -> Vec<String> {
    tree.leaves()
        .map(|leaf| format!("{} [{}, {})", leaf.kind(), leaf.start_byte(), leaf.end_byte()))
        .collect()
}

/// Nested `kind [start, end)` lines of the visible nodes, for snapshots.
pub fn outline(tree: &Tree) -> String {
    let mut out = String::new();
    let mut cursor = tree.walk();
    let mut descending = true;
    loop {
        if descending {
            let node = cursor.node();
            let field = cursor.field_name().map(|f| format!("{f}: ")).unwrap_or_default();
            out.push_str(&format!(
                "{}{field}{} [{}, {})\n",
                "  ".repeat(cursor.depth()),
                node.kind(),
                node.start_byte(),
                node.end_byte()
            ));
            if cursor.goto_first_child() {
                continue;
            }
        }
        if cursor.goto_next_sibling() {
            descending = true;
            continue;
        }
        if !cursor.goto_parent() {
            break;
        }
        descending = false;
    }
    out
}
