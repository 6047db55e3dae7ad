use tessel_core::Interner;
use tessel_runtime::Language;

use crate::compile::Compiler;
use crate::parser;
use crate::pattern::Pattern;
use crate::predicate::QueryPredicate;
use crate::QueryError;

/// Nesting allowed in query source.
const PARSE_RECURSION_LIMIT: u32 = 512;

/// A compiled query: patterns resolved against one language.
///
/// Immutable once built; share it freely between cursors and threads.
#[derive(Debug)]
pub struct Query {
    language: Language,
    pub(crate) patterns: Vec<Pattern>,
    capture_names: Interner,
}

impl Query {
    pub fn new(language: &Language, source: &str) -> Result<Self, QueryError> {
        let parse = parser::parse(source, PARSE_RECURSION_LIMIT);
        if parse.recursion_exceeded() {
            return Err(QueryError::RecursionLimitExceeded);
        }
        let diagnostics = parse.diagnostics();
        if diagnostics.has_errors() {
            let offset = diagnostics.iter().next().map_or(0, |d| d.offset());
            return Err(QueryError::PatternSyntax {
                offset,
                diagnostics: diagnostics.clone(),
            });
        }

        let mut capture_names = Interner::new();
        let mut patterns = Vec::new();
        if let Some(root) = parse.root() {
            let mut compiler = Compiler::new(language, &mut capture_names);
            for pattern in root.patterns() {
                patterns.push(compiler.pattern(&pattern)?);
            }
        }

        tracing::debug!(
            language = language.name(),
            patterns = patterns.len(),
            captures = capture_names.len(),
            "compiled query"
        );
        Ok(Self {
            language: language.clone(),
            patterns,
            capture_names,
        })
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Capture names indexed by [`crate::QueryCapture::index`].
    pub fn capture_names(&self) -> Vec<&str> {
        self.capture_names.iter().map(|(_, name)| name).collect()
    }

    pub fn capture_index_for_name(&self, name: &str) -> Option<u32> {
        self.capture_names.get(name).map(|n| n.index() as u32)
    }

    /// Where pattern `index` starts in the query source.
    pub fn start_byte_for_pattern(&self, index: usize) -> Option<usize> {
        self.patterns.get(index).map(|p| p.start_byte)
    }

    /// Predicates of pattern `index` left for the caller to interpret.
    pub fn general_predicates(&self, index: usize) -> &[QueryPredicate] {
        self.patterns
            .get(index)
            .map_or(&[], |p| p.general_predicates.as_slice())
    }
}
