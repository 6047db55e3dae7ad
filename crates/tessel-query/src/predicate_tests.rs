use crate::predicate::{Arg, Built, PredicateProblem, Quantified, TextPredicate, build};

fn capture_and_string(value: &str) -> Vec<Arg> {
    vec![Arg::Capture(0), Arg::String(value.to_owned())]
}

#[test]
fn quantified_forms() {
    let plain = Quantified { negated: false, any: false };
    let not = Quantified { negated: true, any: false };
    let any = Quantified { negated: false, any: true };
    let any_not = Quantified { negated: true, any: true };

    assert_eq!(Quantified::parse("eq?"), (plain, "eq?"));
    assert_eq!(Quantified::parse("not-eq?"), (not, "eq?"));
    assert_eq!(Quantified::parse("any-eq?"), (any, "eq?"));
    assert_eq!(Quantified::parse("any-not-match?"), (any_not, "match?"));
    assert_eq!(Quantified::parse("any-of?"), (plain, "any-of?"));
    assert_eq!(Quantified::parse("not-any-of?"), (not, "any-of?"));
}

#[test]
fn eq_with_string_or_capture() {
    assert!(matches!(
        build("eq?", capture_and_string("x")),
        Ok(Built::Text(TextPredicate::Eq { capture: 0, .. }))
    ));
    assert!(matches!(
        build("any-not-eq?", vec![Arg::Capture(0), Arg::Capture(1)]),
        Ok(Built::Text(TextPredicate::Eq { .. }))
    ));
}

#[test]
fn eq_arity() {
    let Err(problem) = build("eq?", vec![Arg::Capture(0)]) else {
        panic!("expected an arity problem");
    };
    assert_eq!(problem.to_string(), "expected a capture and a string or capture");

    let Err(problem) = build("not-eq?", vec![Arg::String("x".into()), Arg::Capture(0)]) else {
        panic!("expected an arity problem");
    };
    assert_eq!(problem, PredicateProblem::Arity("a capture and a string or capture"));
}

#[test]
fn match_needs_a_valid_regex() {
    assert!(matches!(
        build("match?", capture_and_string("^[a-z]+$")),
        Ok(Built::Text(TextPredicate::Match { .. }))
    ));

    let Err(problem) = build("match?", capture_and_string("(unclosed")) else {
        panic!("expected a regex problem");
    };
    assert!(matches!(problem, PredicateProblem::Regex(_)));
    assert!(problem.to_string().starts_with("invalid regex: "));
}

#[test]
fn any_of_takes_strings() {
    let args = vec![
        Arg::Capture(2),
        Arg::String("a".into()),
        Arg::String("b".into()),
    ];
    let Ok(Built::Text(TextPredicate::AnyOf { capture, values, negated })) = build("not-any-of?", args)
    else {
        panic!("expected any-of");
    };
    assert_eq!(capture, 2);
    assert_eq!(values, ["a", "b"]);
    assert!(negated);

    let args = vec![Arg::Capture(0), Arg::Capture(1)];
    assert_eq!(
        build("any-of?", args).err(),
        Some(PredicateProblem::Arity("a capture followed by strings"))
    );
}

#[test]
fn unknown_predicates_are_kept() {
    let args = vec![Arg::String("role".into()), Arg::Capture(3)];
    let Ok(Built::General(predicate)) = build("set!", args) else {
        panic!("expected a general predicate");
    };
    insta::assert_debug_snapshot!(predicate, @r#"
    QueryPredicate {
        operator: "set!",
        args: [
            String(
                "role",
            ),
            Capture(
                3,
            ),
        ],
    }
    "#);
}
