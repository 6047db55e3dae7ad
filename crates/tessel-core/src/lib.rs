#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Shared data structures for tessel.
//!
//! - [`grammar`]: the grammar description model read from `grammar.json`,
//!   the input of table generation.
//! - [`Point`], [`Length`], [`InputEdit`]: text coordinates used by the
//!   lexer, the syntax tree and incremental reparsing.
//! - [`Interner`]: string interning for names compared in hot loops.

pub mod grammar;
mod interner;
mod position;

#[cfg(test)]
mod interner_tests;
#[cfg(test)]
mod position_tests;

pub use grammar::{Grammar, GrammarError, Precedence, PrecedenceEntry, Rule};
pub use interner::{Interner, Name};
pub use position::{InputEdit, Length, Point};
