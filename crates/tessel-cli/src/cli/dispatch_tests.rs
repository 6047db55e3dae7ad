//! Tests for CLI dispatch logic.
//!
//! These tests verify argument parsing, positional shifting and params
//! extraction from ArgMatches.

use std::path::PathBuf;

use tessel_generate::ConflictPolicy;

use super::*;
use crate::cli::commands::{generate_command, langs_command, parse_command, query_command};

#[test]
fn generate_defaults() {
    let m = generate_command()
        .try_get_matches_from(["generate", "grammar.json"])
        .unwrap();
    let params = GenerateParams::from_matches(&m);
    assert_eq!(params.grammar_json, PathBuf::from("grammar.json"));
    assert_eq!(params.output, None);
    assert_eq!(params.conflicts, ConflictPolicy::Fork);
}

#[test]
fn generate_output_and_conflicts() {
    let m = generate_command()
        .try_get_matches_from([
            "generate",
            "grammar.json",
            "-o",
            "out.tsl",
            "--conflicts",
            "prefer-shift",
        ])
        .unwrap();
    let params = GenerateParams::from_matches(&m);
    assert_eq!(params.output, Some(PathBuf::from("out.tsl")));
    assert_eq!(params.conflicts, ConflictPolicy::PreferShift);

    let m = generate_command()
        .try_get_matches_from(["generate", "grammar.json", "--conflicts", "error"])
        .unwrap();
    assert_eq!(GenerateParams::from_matches(&m).conflicts, ConflictPolicy::Error);
}

#[test]
fn generate_rejects_bad_input() {
    assert!(generate_command().try_get_matches_from(["generate"]).is_err());
    assert!(
        generate_command()
            .try_get_matches_from(["generate", "g.json", "--conflicts", "maybe"])
            .is_err()
    );
}

#[test]
fn parse_flags() {
    let m = parse_command()
        .try_get_matches_from(["parse", "-s", "1 + 2", "-l", "expr", "--spans", "--raw"])
        .unwrap();
    let params = ParseParams::from_matches(&m);
    assert_eq!(params.source_text.as_deref(), Some("1 + 2"));
    assert_eq!(params.lang.as_deref(), Some("expr"));
    assert_eq!(params.source_path, None);
    assert!(params.spans);
    assert!(params.raw);
}

#[test]
fn parse_with_grammar_artifact() {
    let m = parse_command()
        .try_get_matches_from(["parse", "input.txt", "--grammar", "lang.tsl"])
        .unwrap();
    let params = ParseParams::from_matches(&m);
    assert_eq!(params.source_path, Some(PathBuf::from("input.txt")));
    assert_eq!(params.grammar, Some(PathBuf::from("lang.tsl")));
    assert!(!params.spans);
}

#[test]
fn grammar_conflicts_with_lang() {
    let result = parse_command().try_get_matches_from([
        "parse",
        "input.txt",
        "--grammar",
        "lang.tsl",
        "-l",
        "expr",
    ]);
    assert!(result.is_err());
}

#[test]
fn query_two_positionals() {
    let m = query_command()
        .try_get_matches_from(["query", "calls.scm", "script.rpy"])
        .unwrap();
    let params = QueryParams::from_matches(&m);
    assert_eq!(params.query_path, Some(PathBuf::from("calls.scm")));
    assert_eq!(params.source_path, Some(PathBuf::from("script.rpy")));
    assert_eq!(params.query_text, None);
}

#[test]
fn query_inline_shifts_positional_to_source() {
    let m = query_command()
        .try_get_matches_from(["query", "-q", "(number) @n", "script.rpy"])
        .unwrap();
    let params = QueryParams::from_matches(&m);
    assert_eq!(params.query_path, None);
    assert_eq!(params.query_text.as_deref(), Some("(number) @n"));
    assert_eq!(params.source_path, Some(PathBuf::from("script.rpy")));
}

#[test]
fn query_all_inline() {
    let m = query_command()
        .try_get_matches_from(["query", "-q", "(number) @n", "-s", "1", "-l", "expr"])
        .unwrap();
    let params = QueryParams::from_matches(&m);
    assert_eq!(params.query_path, None);
    assert_eq!(params.source_path, None);
    assert_eq!(params.source_text.as_deref(), Some("1"));
    assert_eq!(params.color, ColorChoice::Auto);
}

#[test]
fn color_is_global() {
    let m = build_cli()
        .try_get_matches_from(["tessel", "--color", "never", "query", "q.scm", "s.rpy"])
        .unwrap();
    let (name, sub) = m.subcommand().unwrap();
    assert_eq!(name, "query");
    assert_eq!(QueryParams::from_matches(sub).color, ColorChoice::Never);

    let m = build_cli()
        .try_get_matches_from(["tessel", "query", "q.scm", "s.rpy", "--color", "always"])
        .unwrap();
    let (_, sub) = m.subcommand().unwrap();
    assert_eq!(QueryParams::from_matches(sub).color, ColorChoice::Always);
}

#[test]
fn color_rejects_unknown_value() {
    let result = build_cli().try_get_matches_from(["tessel", "--color", "sometimes", "langs"]);
    assert!(result.is_err());
}

#[test]
fn langs_takes_no_arguments() {
    assert!(langs_command().try_get_matches_from(["langs"]).is_ok());
    assert!(langs_command().try_get_matches_from(["langs", "extra"]).is_err());
}

#[test]
fn subcommand_is_required() {
    assert!(build_cli().try_get_matches_from(["tessel"]).is_err());
}

#[test]
fn never_and_always_ignore_the_terminal() {
    assert!(ColorChoice::Always.should_colorize());
    assert!(!ColorChoice::Never.should_colorize());
}
