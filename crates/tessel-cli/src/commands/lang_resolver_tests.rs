use std::path::Path;

use super::lang_resolver::{resolve_language, suggest_language};

#[test]
fn explicit_lang_wins_over_extension() {
    let lang = resolve_language(Some("expr"), None, Some(Path::new("script.rpy"))).unwrap();
    assert_eq!(lang.name(), "expr");
}

#[test]
fn lang_from_extension() {
    let lang = resolve_language(None, None, Some(Path::new("game/script.rpy"))).unwrap();
    assert_eq!(lang.name(), "renpy");
}

#[test]
fn unknown_extension() {
    let err = resolve_language(None, None, Some(Path::new("main.rs"))).unwrap_err();
    assert_eq!(err, "cannot infer language from extension '.rs', use -l/--lang");
}

#[test]
fn stdin_needs_a_lang() {
    let err = resolve_language(None, None, Some(Path::new("-"))).unwrap_err();
    assert_eq!(
        err,
        "-l/--lang or --grammar is required when the source has no known extension"
    );
    assert!(resolve_language(None, None, None).is_err());
}

#[test]
fn unreadable_grammar_artifact() {
    let err = resolve_language(Some("expr"), Some(Path::new("/nonexistent/x.tsl")), None)
        .unwrap_err();
    assert!(err.starts_with("failed to load '/nonexistent/x.tsl'"), "{err}");
}

#[test]
fn suggestions() {
    assert_eq!(suggest_language("exp").as_deref(), Some("expr"));
    assert_eq!(suggest_language("RENPI").as_deref(), Some("renpy"));
    assert_eq!(suggest_language("haskell"), None);
}

#[test]
fn unknown_lang_without_suggestion() {
    let err = resolve_language(Some("haskell"), None, None).unwrap_err();
    insta::assert_snapshot!(err, @r"
    unknown language: 'haskell'

    Run 'tessel langs' for the full list.
    ");
}
