//! Shared argument builders for CLI commands.
//!
//! Each function returns a `clap::Arg` that commands compose.

use std::path::PathBuf;

use clap::{Arg, ArgAction, value_parser};

/// Grammar description (positional).
pub fn grammar_json_arg() -> Arg {
    Arg::new("grammar_json")
        .value_name("GRAMMAR")
        .value_parser(value_parser!(PathBuf))
        .required(true)
        .help("Grammar description in JSON")
}

/// Where to write the artifact (-o/--output).
pub fn output_file_arg() -> Arg {
    Arg::new("output")
        .short('o')
        .long("output")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help("Write the Grammar Table artifact to file (default: <name>.tsl)")
}

/// Conflict policy (--conflicts).
pub fn conflicts_arg() -> Arg {
    Arg::new("conflicts")
        .long("conflicts")
        .value_name("POLICY")
        .default_value("fork")
        .value_parser(["fork", "prefer-shift", "error"])
        .help("What to do with LR conflicts")
}

/// Query file (positional).
pub fn query_path_arg() -> Arg {
    Arg::new("query_path")
        .value_name("QUERY")
        .value_parser(value_parser!(PathBuf))
        .help("Query file")
}

/// Inline query text (-q/--query).
pub fn query_text_arg() -> Arg {
    Arg::new("query_text")
        .short('q')
        .long("query")
        .value_name("TEXT")
        .help("Inline query text")
}

/// Source file to parse (positional).
pub fn source_path_arg() -> Arg {
    Arg::new("source_path")
        .value_name("SOURCE")
        .value_parser(value_parser!(PathBuf))
        .help("Source file to parse, `-` for stdin")
}

/// Inline source text (-s/--source).
pub fn source_text_arg() -> Arg {
    Arg::new("source_text")
        .short('s')
        .long("source")
        .value_name("TEXT")
        .help("Inline source text")
}

/// Language flag (-l/--lang).
pub fn lang_arg() -> Arg {
    Arg::new("lang")
        .short('l')
        .long("lang")
        .value_name("LANG")
        .help("Language (inferred from extension if not specified)")
}

/// Grammar Table artifact (--grammar).
pub fn grammar_artifact_arg() -> Arg {
    Arg::new("grammar")
        .long("grammar")
        .value_name("ARTIFACT")
        .value_parser(value_parser!(PathBuf))
        .conflicts_with("lang")
        .help("Load the language from a Grammar Table artifact")
}

/// Color output control (--color).
pub fn color_arg() -> Arg {
    Arg::new("color")
        .long("color")
        .value_name("WHEN")
        .default_value("auto")
        .value_parser(["auto", "always", "never"])
        .global(true)
        .help("Colorize output")
}

/// Include anonymous nodes (--raw).
pub fn raw_arg() -> Arg {
    Arg::new("raw")
        .long("raw")
        .action(ArgAction::SetTrue)
        .help("Include anonymous nodes (literals, punctuation)")
}

/// Show source positions (--spans).
pub fn spans_arg() -> Arg {
    Arg::new("spans")
        .long("spans")
        .action(ArgAction::SetTrue)
        .help("Show source positions")
}
