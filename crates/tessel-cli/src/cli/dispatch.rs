//! Dispatch logic: extract params from ArgMatches and convert to command args.
//!
//! - `*Params` structs are populated from clap matches
//! - `Into<*Args>` impls bridge dispatch and command handlers
//! - `-q` with a single positional shifts it from query to source

use std::path::PathBuf;

use clap::ArgMatches;
use tessel_generate::ConflictPolicy;

use super::ColorChoice;
use crate::commands::generate::GenerateArgs;
use crate::commands::parse::ParseArgs;
use crate::commands::query::QueryArgs;

pub struct GenerateParams {
    pub grammar_json: PathBuf,
    pub output: Option<PathBuf>,
    pub conflicts: ConflictPolicy,
}

impl GenerateParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            grammar_json: m.get_one::<PathBuf>("grammar_json").cloned().unwrap_or_default(),
            output: m.get_one::<PathBuf>("output").cloned(),
            conflicts: parse_conflicts(m),
        }
    }
}

impl From<GenerateParams> for GenerateArgs {
    fn from(p: GenerateParams) -> Self {
        Self {
            grammar_json: p.grammar_json,
            output: p.output,
            conflicts: p.conflicts,
        }
    }
}

pub struct ParseParams {
    pub source_path: Option<PathBuf>,
    pub source_text: Option<String>,
    pub lang: Option<String>,
    pub grammar: Option<PathBuf>,
    pub spans: bool,
    pub raw: bool,
}

impl ParseParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            source_path: m.get_one::<PathBuf>("source_path").cloned(),
            source_text: m.get_one::<String>("source_text").cloned(),
            lang: m.get_one::<String>("lang").cloned(),
            grammar: m.get_one::<PathBuf>("grammar").cloned(),
            spans: m.get_flag("spans"),
            raw: m.get_flag("raw"),
        }
    }
}

impl From<ParseParams> for ParseArgs {
    fn from(p: ParseParams) -> Self {
        Self {
            source_path: p.source_path,
            source_text: p.source_text,
            lang: p.lang,
            grammar: p.grammar,
            spans: p.spans,
            raw: p.raw,
        }
    }
}

pub struct QueryParams {
    pub query_path: Option<PathBuf>,
    pub query_text: Option<String>,
    pub source_path: Option<PathBuf>,
    pub source_text: Option<String>,
    pub lang: Option<String>,
    pub grammar: Option<PathBuf>,
    pub color: ColorChoice,
}

impl QueryParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        let query_path = m.get_one::<PathBuf>("query_path").cloned();
        let query_text = m.get_one::<String>("query_text").cloned();
        let source_path = m.get_one::<PathBuf>("source_path").cloned();

        let (query_path, source_path) =
            shift_positional_to_source(query_text.is_some(), query_path, source_path);

        Self {
            query_path,
            query_text,
            source_path,
            source_text: m.get_one::<String>("source_text").cloned(),
            lang: m.get_one::<String>("lang").cloned(),
            grammar: m.get_one::<PathBuf>("grammar").cloned(),
            color: parse_color(m),
        }
    }
}

impl From<QueryParams> for QueryArgs {
    fn from(p: QueryParams) -> Self {
        Self {
            query_path: p.query_path,
            query_text: p.query_text,
            source_path: p.source_path,
            source_text: p.source_text,
            lang: p.lang,
            grammar: p.grammar,
            color: p.color.should_colorize(),
        }
    }
}

pub struct LangsParams;

impl LangsParams {
    pub fn from_matches(_m: &ArgMatches) -> Self {
        Self
    }
}

/// Parse the global --color flag into ColorChoice.
fn parse_color(m: &ArgMatches) -> ColorChoice {
    match m.try_get_one::<String>("color").ok().flatten().map(|s| s.as_str()) {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}

fn parse_conflicts(m: &ArgMatches) -> ConflictPolicy {
    match m.get_one::<String>("conflicts").map(|s| s.as_str()) {
        Some("prefer-shift") => ConflictPolicy::PreferShift,
        Some("error") => ConflictPolicy::Error,
        _ => ConflictPolicy::Fork,
    }
}

/// When -q is used with a single positional arg, shift it from query to source.
/// This enables: `tessel query -q '(number) @n' script.rpy`
fn shift_positional_to_source(
    has_query_text: bool,
    query_path: Option<PathBuf>,
    source_path: Option<PathBuf>,
) -> (Option<PathBuf>, Option<PathBuf>) {
    if has_query_text && query_path.is_some() && source_path.is_none() {
        (None, query_path)
    } else {
        (query_path, source_path)
    }
}
