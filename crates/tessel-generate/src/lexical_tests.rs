use indoc::indoc;
use tessel_core::{Grammar, Precedence, Rule};
use regex_automata::dfa::{Automaton, sparse};
use regex_automata::{Anchored, Input};
use tessel_table::{TokenDef, TokenKind};

use crate::GenerateError;
use crate::lexical::{
    LexicalToken, PrecedenceLevels, check_pattern, compile_lexer, matches_entirely,
};

fn grammar() -> Grammar {
    Grammar::from_json(indoc! {r#"
        {
          "name": "lex",
          "rules": {
            "program": { "type": "SYMBOL", "name": "digits" },
            "digits": { "type": "PATTERN", "value": "[0-9]+" }
          },
          "precedences": [[
            { "type": "STRING", "value": "product" },
            { "type": "STRING", "value": "sum" }
          ]]
        }
    "#})
    .unwrap()
}

fn describe(rule: &Rule) -> Result<LexicalToken, GenerateError> {
    let grammar = grammar();
    LexicalToken::from_rule(&grammar, rule, &PrecedenceLevels::new(&grammar))
}

#[test]
fn literal_is_escaped() {
    let token = describe(&Rule::String("1+1".into())).unwrap();
    assert_eq!(token.pattern, regex_syntax::escape("1+1"));
    assert_eq!(token.kind, TokenKind::Literal);
    assert!(!token.immediate);
}

#[test]
fn pattern_flags() {
    let token = describe(&Rule::Pattern {
        value: "label".into(),
        flags: Some("i".into()),
    })
    .unwrap();
    assert_eq!(token.pattern, "(?i:label)");
    assert_eq!(token.kind, TokenKind::Pattern);
}

#[test]
fn wrappers_set_precedence_and_immediacy() {
    let rule = Rule::ImmediateToken(Box::new(Rule::Prec {
        value: Precedence::Integer(2),
        content: Box::new(Rule::String("x".into())),
    }));
    let token = describe(&rule).unwrap();
    assert_eq!(token.precedence, 2);
    assert!(token.immediate);
    assert_eq!(token.kind, TokenKind::Literal);
}

#[test]
fn lexical_rules_inline_into_tokens() {
    let rule = Rule::Token(Box::new(Rule::Seq(vec![
        Rule::String("v".into()),
        Rule::Symbol("digits".into()),
    ])));
    let token = describe(&rule).unwrap();
    assert_eq!(token.pattern, "(?:v)(?:(?:(?:[0-9]+)))");
    assert_eq!(token.kind, TokenKind::Pattern);
}

#[test]
fn structural_rules_are_rejected_inside_tokens() {
    let rule = Rule::Token(Box::new(Rule::Symbol("program".into())));
    let err = describe(&rule).unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"rule `program` cannot be used inside a token");
}

#[test]
fn named_precedences_rank_by_position() {
    let grammar = grammar();
    let levels = PrecedenceLevels::new(&grammar);
    assert_eq!(levels.resolve(&Precedence::Name("product".into())).unwrap(), 2);
    assert_eq!(levels.resolve(&Precedence::Name("sum".into())).unwrap(), 1);
    assert!(matches!(
        levels.resolve(&Precedence::Name("power".into())),
        Err(GenerateError::UnknownPrecedence(_))
    ));
}

#[test]
fn pattern_checks() {
    assert!(check_pattern("ok", "[a-z]+").is_ok());
    assert!(matches!(
        check_pattern("spaces", " *"),
        Err(GenerateError::EmptyToken(_))
    ));
    assert!(matches!(
        check_pattern("broken", "(a"),
        Err(GenerateError::InvalidToken { .. })
    ));
}

#[test]
fn word_matching() {
    assert!(matches_entirely("[a-zA-Z_][a-zA-Z0-9_]*", "label").unwrap());
    assert!(!matches_entirely("[a-zA-Z_][a-zA-Z0-9_]*", "$").unwrap());
    assert!(!matches_entirely("[a-z]+", "ab1").unwrap());
}

fn token(symbol: u16, pattern: &str) -> TokenDef {
    TokenDef {
        symbol,
        pattern: pattern.into(),
        kind: TokenKind::Pattern,
        precedence: 0,
        immediate: false,
        keyword: false,
    }
}

#[test]
fn compiled_lexer_is_anchored_and_keeps_token_order() {
    let tokens = [token(2, "[0-9]+"), token(3, "[a-z]+"), token(4, r"\+")];
    let bytes = compile_lexer(&tokens).unwrap();

    let (dfa, _) = sparse::DFA::from_bytes(&bytes).unwrap();
    assert_eq!(dfa.pattern_len(), 3);

    let input = Input::new("ab12").anchored(Anchored::Yes);
    let found = dfa.try_search_fwd(&input).unwrap().unwrap();
    assert_eq!((found.pattern().as_usize(), found.offset()), (1, 2));

    let input = Input::new("ab12").range(2..).anchored(Anchored::Yes);
    let found = dfa.try_search_fwd(&input).unwrap().unwrap();
    assert_eq!((found.pattern().as_usize(), found.offset()), (0, 4));

    let unanchored = Input::new("ab12").anchored(Anchored::No);
    assert!(dfa.try_search_fwd(&unanchored).is_err());
}

#[test]
fn compiled_lexer_rejects_unsupported_patterns() {
    let err = compile_lexer(&[token(2, r"\bfoo")]).unwrap_err();
    assert!(matches!(err, GenerateError::Lexer(_)));
}
