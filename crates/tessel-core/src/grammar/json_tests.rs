use indoc::indoc;

use super::*;

#[test]
fn rules_keep_declaration_order() {
    let grammar = Grammar::from_json(indoc! {r#"
        {
          "name": "toy",
          "rules": {
            "program": { "type": "SYMBOL", "name": "statement" },
            "statement": { "type": "SYMBOL", "name": "expression" },
            "expression": { "type": "STRING", "value": "x" }
          }
        }
    "#})
    .unwrap();

    let names: Vec<_> = grammar.rules.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, ["program", "statement", "expression"]);
    assert_eq!(grammar.start_rule(), Some("program"));
}

#[test]
fn nested_rule_types() {
    let grammar = Grammar::from_json(indoc! {r#"
        {
          "name": "toy",
          "rules": {
            "binary": {
              "type": "PREC_LEFT",
              "value": 1,
              "content": {
                "type": "SEQ",
                "members": [
                  { "type": "FIELD", "name": "left", "content": { "type": "SYMBOL", "name": "number" } },
                  { "type": "IMMEDIATE_TOKEN", "content": { "type": "STRING", "value": "+" } },
                  { "type": "CHOICE", "members": [ { "type": "BLANK" }, { "type": "REPEAT1", "content": { "type": "SYMBOL", "name": "number" } } ] }
                ]
              }
            },
            "number": { "type": "PATTERN", "value": "\\d+" }
          }
        }
    "#})
    .unwrap();

    let Some(Rule::PrecLeft { value, content }) = grammar.rule("binary") else {
        panic!("expected PREC_LEFT");
    };
    assert_eq!(*value, Precedence::Integer(1));
    let Rule::Seq(members) = content.as_ref() else {
        panic!("expected SEQ");
    };
    assert!(matches!(&members[0], Rule::Field { name, .. } if name == "left"));
    assert!(matches!(&members[1], Rule::ImmediateToken(_)));
    assert!(matches!(&members[2], Rule::Choice(alts) if alts.len() == 2));
    assert!(grammar.rule("number").unwrap().is_lexical());
    assert!(!grammar.rule("binary").unwrap().is_lexical());
}

#[test]
fn named_precedences_and_conflicts() {
    let grammar = Grammar::from_json(indoc! {r#"
        {
          "name": "toy",
          "rules": { "a": { "type": "PREC", "value": "sum", "content": { "type": "BLANK" } } },
          "precedences": [[ { "type": "STRING", "value": "product" }, { "type": "SYMBOL", "name": "a" } ]],
          "conflicts": [["a", "b"]],
          "inline": ["c"]
        }
    "#})
    .unwrap();

    assert_eq!(
        grammar.precedences[0],
        [
            PrecedenceEntry::Name("product".into()),
            PrecedenceEntry::Symbol("a".into())
        ]
    );
    assert!(grammar.declares_conflict("b", "a"));
    assert!(!grammar.declares_conflict("a", "c"));
    assert!(grammar.is_hidden("c"));
    assert!(grammar.is_hidden("_expression"));
    assert!(!grammar.is_hidden("a"));
}

#[test]
fn empty_rules_are_rejected() {
    let err = Grammar::from_json(r#"{ "name": "void", "rules": {} }"#).unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"grammar `void` has no rules");
}

#[test]
fn unknown_rule_type_is_rejected() {
    let err = Grammar::from_json(
        r#"{ "name": "t", "rules": { "a": { "type": "LOOKAHEAD", "content": { "type": "BLANK" } } } }"#,
    )
    .unwrap_err();
    assert!(matches!(err, GrammarError::Json(_)));
}
