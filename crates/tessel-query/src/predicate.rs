//! Text predicates attached to patterns.
//!
//! `#eq?`, `#match?` and `#any-of?` (with their `not-` and `any-` forms) are
//! evaluated against the captured nodes' text after a structural match.
//! Anything else is kept as a [`QueryPredicate`] for the caller.

use std::borrow::Cow;

use regex_automata::Input;
use regex_automata::dfa::{Automaton, StartKind, dense};
use tessel_runtime::Node;

use crate::pattern::CaptureId;

/// A predicate the engine does not evaluate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPredicate {
    /// The name without `#`, e.g. `set!`.
    pub operator: String,
    pub args: Vec<QueryPredicateArg>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryPredicateArg {
    Capture(CaptureId),
    String(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Operand {
    String(String),
    Capture(CaptureId),
}

/// How a predicate combines the results for several captured nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Quantified {
    pub negated: bool,
    /// `any-` forms need one node to pass; the others need all of them.
    pub any: bool,
}

impl Quantified {
    pub(crate) fn parse(name: &str) -> (Self, &str) {
        match name {
            "any-of?" => return (Self { negated: false, any: false }, name),
            "not-any-of?" => return (Self { negated: true, any: false }, "any-of?"),
            _ => {}
        }
        let (any, rest) = match name.strip_prefix("any-") {
            Some(rest) => (true, rest),
            None => (false, name),
        };
        let (negated, base) = match rest.strip_prefix("not-") {
            Some(base) => (true, base),
            None => (false, rest),
        };
        (Self { negated, any }, base)
    }

    fn combine(self, mut results: impl Iterator<Item = bool>) -> bool {
        if self.any {
            results.any(|r| r != self.negated)
        } else {
            results.all(|r| r != self.negated)
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum TextPredicate {
    Eq {
        capture: CaptureId,
        operand: Operand,
        mode: Quantified,
    },
    Match {
        capture: CaptureId,
        regex: Box<dense::DFA<Vec<u32>>>,
        mode: Quantified,
    },
    AnyOf {
        capture: CaptureId,
        values: Vec<String>,
        negated: bool,
    },
}

/// A predicate argument after capture names are resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Arg {
    Capture(CaptureId),
    String(String),
}

/// Why a predicate could not be built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PredicateProblem {
    Arity(&'static str),
    Regex(String),
}

impl std::fmt::Display for PredicateProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PredicateProblem::Arity(expected) => write!(f, "expected {expected}"),
            PredicateProblem::Regex(message) => write!(f, "invalid regex: {message}"),
        }
    }
}

pub(crate) enum Built {
    Text(TextPredicate),
    General(QueryPredicate),
}

/// Builds the predicate `name` (without `#`) from resolved arguments.
pub(crate) fn build(name: &str, args: Vec<Arg>) -> Result<Built, PredicateProblem> {
    let (mode, base) = Quantified::parse(name);
    match base {
        "eq?" => {
            let [Arg::Capture(capture), second] = <[Arg; 2]>::try_from(args)
                .map_err(|_| PredicateProblem::Arity("a capture and a string or capture"))?
            else {
                return Err(PredicateProblem::Arity("a capture and a string or capture"));
            };
            let operand = match second {
                Arg::Capture(other) => Operand::Capture(other),
                Arg::String(value) => Operand::String(value),
            };
            Ok(Built::Text(TextPredicate::Eq {
                capture,
                operand,
                mode,
            }))
        }
        "match?" => {
            let [Arg::Capture(capture), Arg::String(pattern)] = <[Arg; 2]>::try_from(args)
                .map_err(|_| PredicateProblem::Arity("a capture and a regex string"))?
            else {
                return Err(PredicateProblem::Arity("a capture and a regex string"));
            };
            let regex = compile_regex(&pattern)?;
            Ok(Built::Text(TextPredicate::Match {
                capture,
                regex: Box::new(regex),
                mode,
            }))
        }
        "any-of?" => {
            let mut args = args.into_iter();
            let Some(Arg::Capture(capture)) = args.next() else {
                return Err(PredicateProblem::Arity("a capture followed by strings"));
            };
            let values = args
                .map(|arg| match arg {
                    Arg::String(value) => Ok(value),
                    Arg::Capture(_) => Err(PredicateProblem::Arity("a capture followed by strings")),
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Built::Text(TextPredicate::AnyOf {
                capture,
                values,
                negated: mode.negated,
            }))
        }
        _ => Ok(Built::General(QueryPredicate {
            operator: name.to_owned(),
            args: args
                .into_iter()
                .map(|arg| match arg {
                    Arg::Capture(id) => QueryPredicateArg::Capture(id),
                    Arg::String(value) => QueryPredicateArg::String(value),
                })
                .collect(),
        })),
    }
}

fn compile_regex(pattern: &str) -> Result<dense::DFA<Vec<u32>>, PredicateProblem> {
    dense::DFA::builder()
        .configure(dense::DFA::config().start_kind(StartKind::Unanchored))
        .build(pattern)
        .map_err(|e| PredicateProblem::Regex(e.to_string()))
}

/// Text of `node`, or empty when `source` does not cover it.
pub(crate) fn node_text<'s>(node: &Node<'_>, source: &'s [u8]) -> Cow<'s, str> {
    source
        .get(node.byte_range())
        .map_or(Cow::Borrowed(""), String::from_utf8_lossy)
}

impl TextPredicate {
    /// Evaluates the predicate given the nodes captured for each capture id.
    pub(crate) fn satisfied<'t>(
        &self,
        nodes: impl Fn(CaptureId) -> Vec<Node<'t>>,
        source: &[u8],
    ) -> bool {
        match self {
            TextPredicate::Eq {
                capture,
                operand,
                mode,
            } => {
                let left = nodes(*capture);
                match operand {
                    Operand::String(value) => mode.combine(
                        left.iter()
                            .map(|node| node_text(node, source) == value.as_str()),
                    ),
                    Operand::Capture(other) => {
                        let right = nodes(*other);
                        mode.combine(left.iter().flat_map(|a| {
                            let a = node_text(a, source);
                            right
                                .iter()
                                .map(move |b| node_text(b, source) == a)
                                .collect::<Vec<_>>()
                        }))
                    }
                }
            }
            TextPredicate::Match {
                capture,
                regex,
                mode,
            } => mode.combine(nodes(*capture).iter().map(|node| {
                let bytes = source.get(node.byte_range()).unwrap_or_default();
                matches!(regex.try_search_fwd(&Input::new(bytes)), Ok(Some(_)))
            })),
            TextPredicate::AnyOf {
                capture,
                values,
                negated,
            } => nodes(*capture).iter().all(|node| {
                let text = node_text(node, source);
                values.iter().any(|v| *v == text) != *negated
            }),
        }
    }
}
