//! Grammar Table types.

use serde::{Deserialize, Serialize};

use crate::TerminalSet;

pub type SymbolId = u16;
pub type StateId = u16;
pub type FieldId = u16;
pub type ProductionId = u32;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    /// Recognized by the built-in lexer.
    Terminal,
    /// Recognized by the language's external scanner.
    External,
    NonTerminal,
    /// Generated helper, e.g. a repetition. Never visible.
    Auxiliary,
    /// Only appears as the renamed kind of an aliased node.
    Alias,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub name: String,
    pub kind: SymbolKind,
    pub named: bool,
    pub visible: bool,
    /// Allowed anywhere between other symbols.
    pub extra: bool,
}

impl SymbolInfo {
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, SymbolKind::Terminal | SymbolKind::External)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub symbol: SymbolId,
    pub field: Option<FieldId>,
    pub alias: Option<SymbolId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Production {
    pub lhs: SymbolId,
    pub steps: Vec<Step>,
    pub dynamic_precedence: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Shift { state: StateId },
    /// Shift an extra token without changing state.
    ShiftExtra,
    Reduce { production: ProductionId },
    Accept,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseState {
    /// Actions per lookahead terminal, sorted by symbol. More than one action
    /// means an unresolved conflict; actions are ranked, preferred first.
    pub actions: Vec<(SymbolId, Vec<Action>)>,
    /// Successor state per non-terminal, sorted by symbol.
    pub gotos: Vec<(SymbolId, StateId)>,
    pub lex_mode: u16,
}

impl ParseState {
    pub fn actions(&self, terminal: SymbolId) -> &[Action] {
        match self.actions.binary_search_by_key(&terminal, |(s, _)| *s) {
            Ok(i) => &self.actions[i].1,
            Err(_) => &[],
        }
    }

    pub fn goto(&self, symbol: SymbolId) -> Option<StateId> {
        self.gotos
            .binary_search_by_key(&symbol, |(s, _)| *s)
            .ok()
            .map(|i| self.gotos[i].1)
    }
}

/// Terminals that may be lexed in a group of parse states.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LexMode {
    pub valid: TerminalSet,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    /// A literal string, escaped into [`TokenDef::pattern`].
    Literal,
    Pattern,
    /// Whitespace and other extras that are not grammar symbols.
    Separator,
}

/// Lexical definition of an internal terminal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDef {
    pub symbol: SymbolId,
    /// Regular expression in `regex-syntax` dialect.
    pub pattern: String,
    pub kind: TokenKind,
    /// Lexical precedence; breaks ties between equally long matches.
    pub precedence: i32,
    /// Must not be preceded by extras.
    pub immediate: bool,
    /// A literal that also matches the grammar's word token.
    pub keyword: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConflictPolicy {
    /// Keep every action and let the GLR engine fork.
    #[default]
    Fork,
    /// Resolve shift/reduce conflicts by shifting, reduce/reduce by the
    /// earliest production.
    PreferShift,
    /// Reject conflicts that the grammar does not declare.
    Error,
}

/// The compiled tables of one language.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarTable {
    pub name: String,
    pub language_version: u16,
    pub conflict_policy: ConflictPolicy,
    pub symbols: Vec<SymbolInfo>,
    /// Field names; a [`FieldId`] indexes this list.
    pub fields: Vec<String>,
    /// Production 0 is the augmented start production.
    pub productions: Vec<Production>,
    pub states: Vec<ParseState>,
    pub lex_modes: Vec<LexMode>,
    pub tokens: Vec<TokenDef>,
    /// Anchored multi-pattern lexer DFA over `tokens`, one pattern per token
    /// in order, serialized in `regex-automata`'s sparse little-endian form.
    pub lex_dfa: Vec<u8>,
    /// External token symbols in scanner index order.
    pub externals: Vec<SymbolId>,
    pub word: Option<SymbolId>,
    pub start_state: StateId,
}

impl GrammarTable {
    /// End-of-input terminal.
    pub const END: SymbolId = 0;
    /// Error recovery nodes.
    pub const ERROR: SymbolId = 1;

    pub fn symbol(&self, id: SymbolId) -> &SymbolInfo {
        &self.symbols[id as usize]
    }

    pub fn symbol_name(&self, id: SymbolId) -> &str {
        self.symbols
            .get(id as usize)
            .map_or("<unknown>", |s| s.name.as_str())
    }

    pub fn state(&self, id: StateId) -> &ParseState {
        &self.states[id as usize]
    }

    pub fn production(&self, id: ProductionId) -> &Production {
        &self.productions[id as usize]
    }

    pub fn field_name(&self, id: FieldId) -> Option<&str> {
        self.fields.get(id as usize).map(String::as_str)
    }

    pub fn field_id(&self, name: &str) -> Option<FieldId> {
        self.fields
            .iter()
            .position(|f| f == name)
            .map(|i| i as FieldId)
    }

    /// Symbols with the given name and namedness, in id order.
    pub fn symbols_named<'a>(
        &'a self,
        name: &'a str,
        named: bool,
    ) -> impl Iterator<Item = SymbolId> + 'a {
        self.symbols
            .iter()
            .enumerate()
            .filter(move |(_, s)| s.name == name && s.named == named)
            .map(|(i, _)| i as SymbolId)
    }

    /// Index of `symbol` in the external scanner's token list.
    pub fn external_index(&self, symbol: SymbolId) -> Option<usize> {
        self.externals.iter().position(|&s| s == symbol)
    }
}
