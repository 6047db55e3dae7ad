//! Grammar descriptions in the tree-sitter `grammar.json` format.
//!
//! Table generation consumes [`Grammar`] directly.

mod json;
mod types;

#[cfg(test)]
mod json_tests;

pub use json::GrammarError;
pub use types::{Grammar, Precedence, PrecedenceEntry, Rule};
