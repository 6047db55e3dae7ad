//! Pattern queries over tessel syntax trees.
//!
//! # Example
//!
//! ```
//! use tessel_query::{Query, QueryCursor};
//! use tessel_runtime::Parser;
//!
//! let language = tessel_langs::expr().unwrap();
//! let mut parser = Parser::new();
//! parser.set_language(&language);
//! let source = "1 + 2";
//! let tree = parser.parse(source, None).unwrap();
//!
//! let query = Query::new(&language, "(binary_expression left: (number) @lhs)").unwrap();
//! let matches: Vec<_> = QueryCursor::new()
//!     .matches(&query, tree.root_node(), source.as_bytes())
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(matches.len(), 1);
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod diagnostics;
pub mod parser;

mod compile;
mod cursor;
mod pattern;
mod predicate;
mod query;

#[cfg(test)]
mod cursor_tests;
#[cfg(test)]
mod predicate_tests;

pub use cursor::{QueryCapture, QueryCursor, QueryMatch, QueryMatches};
pub use diagnostics::{Diagnostics, DiagnosticsPrinter, Severity};
pub use predicate::{QueryPredicate, QueryPredicateArg};
pub use query::Query;

/// Errors from building or running a query.
#[derive(Debug, Clone, thiserror::Error)]
pub enum QueryError {
    /// The query source does not parse. `offset` is the first problem.
    #[error("invalid query syntax at offset {offset}")]
    PatternSyntax {
        offset: usize,
        diagnostics: Diagnostics,
    },

    #[error("unknown node type `{name}` at offset {offset}")]
    NodeType { offset: usize, name: String },

    #[error("unknown field `{name}` at offset {offset}")]
    Field { offset: usize, name: String },

    /// A predicate names a capture its pattern does not define.
    #[error("unknown capture `@{name}` at offset {offset}")]
    Capture { offset: usize, name: String },

    #[error("invalid predicate at offset {offset}: {message}")]
    Predicate { offset: usize, message: String },

    /// Execution fuel exhausted (too many node tests).
    #[error("execution limit exceeded")]
    ExecFuelExhausted,

    /// Patterns or input nested too deeply.
    #[error("recursion limit exceeded")]
    RecursionLimitExceeded,
}

impl QueryError {
    /// Where in the query source the error points, if anywhere.
    pub fn offset(&self) -> Option<usize> {
        match self {
            QueryError::PatternSyntax { offset, .. }
            | QueryError::NodeType { offset, .. }
            | QueryError::Field { offset, .. }
            | QueryError::Capture { offset, .. }
            | QueryError::Predicate { offset, .. } => Some(*offset),
            QueryError::ExecFuelExhausted | QueryError::RecursionLimitExceeded => None,
        }
    }
}
