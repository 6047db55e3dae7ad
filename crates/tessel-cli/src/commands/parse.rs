use std::path::PathBuf;

use tessel_runtime::{Node, Parser, Tree, TreeCursor};

use super::lang_resolver::resolve_language;
use super::source::load_text;

pub struct ParseArgs {
    pub source_path: Option<PathBuf>,
    pub source_text: Option<String>,
    pub lang: Option<String>,
    pub grammar: Option<PathBuf>,
    pub spans: bool,
    pub raw: bool,
}

pub fn run(args: ParseArgs) {
    match parse(&args) {
        Ok(out) => print!("{out}"),
        Err(msg) => {
            eprintln!("error: {msg}");
            std::process::exit(1);
        }
    }
}

pub fn parse(args: &ParseArgs) -> Result<String, String> {
    let source = load_text(
        args.source_path.as_deref(),
        args.source_text.as_deref(),
        "source",
    )?;
    let language = resolve_language(
        args.lang.as_deref(),
        args.grammar.as_deref(),
        args.source_path.as_deref(),
    )?;

    let mut parser = Parser::new();
    parser.set_language(&language);
    let tree = parser.parse(&source, None).map_err(|e| e.to_string())?;
    Ok(dump_tree(&tree, &source, args.raw, args.spans))
}

pub fn dump_tree(tree: &Tree, source: &str, raw: bool, spans: bool) -> String {
    let mut cursor = tree.walk();
    format_node(&mut cursor, source, 0, raw, spans) + "\n"
}

fn format_node(
    cursor: &mut TreeCursor<'_>,
    source: &str,
    depth: usize,
    include_anonymous: bool,
    show_spans: bool,
) -> String {
    let node = cursor.node();
    let indent = "  ".repeat(depth);
    let field_prefix = cursor
        .field_name()
        .map(|f| format!("{f}: "))
        .unwrap_or_default();
    let span_suffix = if show_spans { span(&node) } else { String::new() };

    let mut children = Vec::new();
    if cursor.goto_first_child() {
        loop {
            let child = cursor.node();
            if include_anonymous || child.is_named() {
                children.push(format_node(
                    cursor,
                    source,
                    depth + 1,
                    include_anonymous,
                    show_spans,
                ));
            }
            if !cursor.goto_next_sibling() {
                break;
            }
        }
        cursor.goto_parent();
    }

    if children.is_empty() {
        let text = node
            .utf8_text(source.as_bytes())
            .unwrap_or("<invalid utf8>");
        let kind = node.kind();
        return if text == kind {
            format!("{indent}{field_prefix}(\"{}\"){span_suffix}", escape_string(kind))
        } else {
            format!(
                "{indent}{field_prefix}({kind} \"{}\"){span_suffix}",
                escape_string(text)
            )
        };
    }

    let mut out = format!("{indent}{field_prefix}({}{span_suffix}", node.kind());
    for child in children {
        out.push('\n');
        out.push_str(&child);
    }
    out.push(')');
    out
}

/// ` [row:col-row:col]`, zero-based.
fn span(node: &Node<'_>) -> String {
    let start = node.start_position();
    let end = node.end_position();
    format!(" [{}:{}-{}:{}]", start.row, start.column, end.row, end.column)
}

fn escape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            c if c.is_control() => result.push_str(&format!("\\u{{{:04x}}}", c as u32)),
            c => result.push(c),
        }
    }
    result
}
