#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Grammar Table generation.
//!
//! Turns a [`Grammar`] into a [`GrammarTable`]: rules are flattened into
//! productions, an LALR(1) automaton is built, and shift/reduce decisions
//! are resolved by precedence and associativity. Conflicts that remain are
//! handled according to [`ConflictPolicy`].

mod build;
mod error;
mod flatten;
mod lexical;
mod lr;

#[cfg(test)]
mod lexical_tests;

pub use error::GenerateError;
pub use tessel_table::ConflictPolicy;

use tessel_core::Grammar;
use tessel_table::GrammarTable;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TableOptions {
    pub conflict_policy: ConflictPolicy,
    pub language_version: u16,
}

impl TableOptions {
    pub fn with_conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.conflict_policy = policy;
        self
    }

    pub fn with_language_version(mut self, version: u16) -> Self {
        self.language_version = version;
        self
    }
}

pub fn generate(grammar: &Grammar, options: &TableOptions) -> Result<GrammarTable, GenerateError> {
    let flat = flatten::flatten(grammar)?;
    let firsts = lr::FirstSets::new(&flat);
    let automaton = lr::Automaton::build(&flat, &firsts);
    build::build_table(grammar, flat, &firsts, &automaton, options)
}

/// Parses `grammar.json` text and generates its table.
pub fn generate_from_json(json: &str, options: &TableOptions) -> Result<GrammarTable, GenerateError> {
    let grammar = Grammar::from_json(json)?;
    generate(&grammar, options)
}
