use std::path::PathBuf;

use tessel_query::{Query, QueryCursor, QueryError, QueryMatch};
use tessel_runtime::Parser;

use super::lang_resolver::resolve_language;
use super::source::load_text;

pub struct QueryArgs {
    pub query_path: Option<PathBuf>,
    pub query_text: Option<String>,
    pub source_path: Option<PathBuf>,
    pub source_text: Option<String>,
    pub lang: Option<String>,
    pub grammar: Option<PathBuf>,
    pub color: bool,
}

pub fn run(args: QueryArgs) {
    match query(&args) {
        Ok(out) => print!("{out}"),
        Err(msg) => {
            eprint!("{msg}");
            std::process::exit(1);
        }
    }
}

/// Runs the query and renders one block per match. Errors come back
/// rendered, ending in a newline.
pub fn query(args: &QueryArgs) -> Result<String, String> {
    let fail = |msg: String| format!("error: {msg}\n");
    let query_source = load_text(args.query_path.as_deref(), args.query_text.as_deref(), "query")
        .map_err(fail)?;
    let source = load_text(
        args.source_path.as_deref(),
        args.source_text.as_deref(),
        "source",
    )
    .map_err(fail)?;
    let language = resolve_language(
        args.lang.as_deref(),
        args.grammar.as_deref(),
        args.source_path.as_deref(),
    )
    .map_err(fail)?;

    let query = Query::new(&language, &query_source).map_err(|e| match e {
        QueryError::PatternSyntax { diagnostics, .. } => {
            let path = args
                .query_path
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned());
            let mut printer = diagnostics.printer(&query_source).colored(args.color);
            if let Some(path) = &path {
                printer = printer.path(path);
            }
            printer.render()
        }
        other => fail(other.to_string()),
    })?;

    let mut parser = Parser::new();
    parser.set_language(&language);
    let tree = parser
        .parse(&source, None)
        .map_err(|e| fail(e.to_string()))?;

    let mut matches = Vec::new();
    for found in QueryCursor::new().matches(&query, tree.root_node(), source.as_bytes()) {
        matches.push(found.map_err(|e| fail(e.to_string()))?);
    }
    Ok(format_matches(&query, &matches, &source))
}

/// `pattern N` followed by one `@name kind [row:col-row:col] "text"` line per capture.
pub fn format_matches(query: &Query, matches: &[QueryMatch<'_>], source: &str) -> String {
    let names = query.capture_names();
    let mut out = String::new();
    for m in matches {
        out.push_str(&format!("pattern {}\n", m.pattern_index));
        for capture in &m.captures {
            let node = capture.node;
            let start = node.start_position();
            let end = node.end_position();
            let text = node.utf8_text(source.as_bytes()).unwrap_or("<invalid utf8>");
            out.push_str(&format!(
                "  @{} {} [{}:{}-{}:{}] {text:?}\n",
                names.get(capture.index as usize).copied().unwrap_or("?"),
                node.kind(),
                start.row,
                start.column,
                end.row,
                end.column,
            ));
        }
    }
    out
}
