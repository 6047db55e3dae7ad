//! A loaded language: its Grammar Table, compiled lexer and external
//! scanner.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tessel_table::{FieldId, GrammarLoadError, GrammarTable, SymbolId};

use crate::lexer::Lexer;
use crate::scanner::ExternalScanner;

#[derive(Debug, thiserror::Error)]
pub enum LanguageError {
    #[error(transparent)]
    Load(#[from] GrammarLoadError),
    #[error("invalid lexical grammar: {0}")]
    Lexer(String),
    #[error("language `{0}` declares external tokens but has no scanner")]
    MissingScanner(String),
}

/// Immutable, cheaply cloneable handle to a language.
///
/// Clones share the same tables; two handles are equal when they point to
/// the same loaded language.
#[derive(Clone)]
pub struct Language(Arc<LanguageData>);

struct LanguageData {
    table: GrammarTable,
    lexer: Lexer,
}

impl Language {
    /// Wraps a table without an external scanner.
    pub fn new(table: GrammarTable) -> Result<Self, LanguageError> {
        if !table.externals.is_empty() {
            return Err(LanguageError::MissingScanner(table.name.clone()));
        }
        Self::build(table, None)
    }

    pub fn with_scanner(
        table: GrammarTable,
        scanner: impl ExternalScanner + 'static,
    ) -> Result<Self, LanguageError> {
        Self::build(table, Some(Arc::new(scanner)))
    }

    /// Decodes an artifact and wraps it. The artifact must not need a scanner.
    pub fn from_artifact(bytes: &[u8]) -> Result<Self, LanguageError> {
        Self::new(GrammarTable::from_artifact(bytes)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LanguageError> {
        Self::new(GrammarTable::load(path)?)
    }

    fn build(
        table: GrammarTable,
        scanner: Option<Arc<dyn ExternalScanner>>,
    ) -> Result<Self, LanguageError> {
        let lexer = Lexer::new(&table, scanner)?;
        tracing::debug!(
            target: "tessel::language",
            language = %table.name,
            symbols = table.symbols.len(),
            states = table.states.len(),
            "loaded language"
        );
        Ok(Self(Arc::new(LanguageData { table, lexer })))
    }

    pub fn name(&self) -> &str {
        &self.0.table.name
    }

    pub fn version(&self) -> u16 {
        self.0.table.language_version
    }

    pub fn table(&self) -> &GrammarTable {
        &self.0.table
    }

    pub(crate) fn lexer(&self) -> &Lexer {
        &self.0.lexer
    }

    pub fn has_scanner(&self) -> bool {
        self.0.lexer.has_scanner()
    }

    pub fn node_kind_count(&self) -> usize {
        self.0.table.symbols.len()
    }

    pub fn node_kind_for_id(&self, id: SymbolId) -> Option<&str> {
        self.0.table.symbols.get(id as usize).map(|s| s.name.as_str())
    }

    pub fn node_kind_is_named(&self, id: SymbolId) -> bool {
        self.0.table.symbols.get(id as usize).is_some_and(|s| s.named)
    }

    pub fn node_kind_is_visible(&self, id: SymbolId) -> bool {
        self.0.table.symbols.get(id as usize).is_some_and(|s| s.visible)
    }

    /// Every symbol with this name and namedness. Aliases can give one kind
    /// several ids.
    pub fn ids_for_node_kind(&self, name: &str, named: bool) -> Vec<SymbolId> {
        self.0.table.symbols_named(name, named).collect()
    }

    pub fn id_for_node_kind(&self, name: &str, named: bool) -> Option<SymbolId> {
        self.0.table.symbols_named(name, named).next()
    }

    pub fn field_count(&self) -> usize {
        self.0.table.fields.len()
    }

    pub fn field_name_for_id(&self, id: FieldId) -> Option<&str> {
        self.0.table.field_name(id)
    }

    pub fn field_id_for_name(&self, name: &str) -> Option<FieldId> {
        self.0.table.field_id(name)
    }
}

impl PartialEq for Language {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Language {}

impl fmt::Debug for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Language")
            .field("name", &self.name())
            .field("version", &self.version())
            .field("lexer", &self.0.lexer)
            .finish()
    }
}
