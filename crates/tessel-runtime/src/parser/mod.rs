//! The incremental GLR parser.
//!
//! The parser follows the Grammar Table like an LR parser. Where the table
//! holds several actions it forks the parse into versions that share their
//! stacks. Versions that reach the same state at the same position are
//! merged; when every version has failed, error recovery wraps the
//! offending input in an `ERROR` node and parsing continues. Given the
//! previous tree (after [`Tree::edit`]), unchanged subtrees are reused
//! instead of being lexed and reduced again.

mod balance;
mod engine;
mod recovery;
mod reuse;
mod stack;

#[cfg(test)]
mod balance_tests;
#[cfg(test)]
mod engine_tests;

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use crate::{Language, Tree};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("no language set")]
    NoLanguage,
    #[error("parse execution limit exceeded")]
    ExecFuelExhausted,
    #[error("parse stack exceeded {limit} entries")]
    StackDepthExceeded { limit: usize },
    #[error("parse cancelled")]
    Cancelled,
}

/// Resource limits and recovery bounds of a [`Parser`].
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Upper bound on simultaneously active GLR versions.
    pub max_versions: usize,
    /// Tokens error recovery may skip while searching for a place to resume.
    pub recovery_lookahead: usize,
    /// Stack entries error recovery may pop beyond the unreduced ones.
    pub recovery_max_pops: usize,
    /// Parse steps allowed per call; `None` is unlimited.
    pub exec_fuel: Option<u64>,
    pub max_stack_depth: usize,
    /// Checked between steps; once set, the parse stops with
    /// [`ParseError::Cancelled`].
    pub cancellation_flag: Option<Arc<AtomicBool>>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_versions: 6,
            recovery_lookahead: 16,
            recovery_max_pops: 8,
            exec_fuel: None,
            max_stack_depth: 65_536,
            cancellation_flag: None,
        }
    }
}

impl ParseOptions {
    pub fn with_max_versions(mut self, max: usize) -> Self {
        self.max_versions = max.max(1);
        self
    }

    pub fn with_recovery_lookahead(mut self, tokens: usize) -> Self {
        self.recovery_lookahead = tokens.max(1);
        self
    }

    pub fn with_recovery_max_pops(mut self, pops: usize) -> Self {
        self.recovery_max_pops = pops;
        self
    }

    pub fn with_exec_fuel(mut self, fuel: Option<u64>) -> Self {
        self.exec_fuel = fuel;
        self
    }

    pub fn with_max_stack_depth(mut self, depth: usize) -> Self {
        self.max_stack_depth = depth;
        self
    }

    pub fn with_cancellation_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancellation_flag = Some(flag);
        self
    }
}

/// Parses text into [`Tree`]s. Single-threaded; create one per thread.
#[derive(Debug, Default)]
pub struct Parser {
    language: Option<Language>,
    options: ParseOptions,
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_language(&mut self, language: &Language) {
        self.language = Some(language.clone());
    }

    pub fn language(&self) -> Option<&Language> {
        self.language.as_ref()
    }

    pub fn set_options(&mut self, options: ParseOptions) {
        self.options = options;
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parses `text`. Syntax errors never fail the parse; they become
    /// `ERROR` nodes.
    ///
    /// `old_tree` is the previous tree of the same document with every
    /// change already applied through [`Tree::edit`]. Its unchanged parts
    /// are reused; the result is the same as a fresh parse.
    pub fn parse(&mut self, text: &str, old_tree: Option<&Tree>) -> Result<Tree, ParseError> {
        let language = self.language.as_ref().ok_or(ParseError::NoLanguage)?;
        let old = old_tree.filter(|t| t.language() == language);
        let root = engine::ParseRun::new(language, text, &self.options, old).run()?;
        Ok(Tree::new(root, language.clone()))
    }
}
