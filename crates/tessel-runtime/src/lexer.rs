//! Context-sensitive lexing.
//!
//! Every internal terminal of a language is compiled by the generator into
//! one anchored multi-pattern DFA, which travels in the Grammar Table. At each position the DFA runs once and reports every
//! pattern that matches, at every length; the parser's lex mode then
//! decides which of them count. Separators (whitespace extras) win whenever
//! they match. Among the remaining valid terminals the longest match wins,
//! then the higher lexical precedence, then literals over patterns, then
//! declaration order.

use std::sync::Arc;

use regex_automata::dfa::{Automaton, sparse};
use regex_automata::util::primitives::StateID;
use regex_automata::{Anchored, Input};
use tessel_table::{GrammarTable, SymbolId, TerminalSet, TokenKind};

use crate::LanguageError;
use crate::scanner::{ExternalScanner, ScanCursor, ScannerState};

/// A token produced by one call to [`Lexer::lex`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Token {
    pub symbol: SymbolId,
    pub start: usize,
    pub end: usize,
    /// One past the last byte inspected while lexing; `len + 1` when the
    /// end of input was consulted.
    pub examined_end: usize,
    /// Scanner state after the token, when the external scanner made it.
    pub scanner_after: Option<ScannerState>,
}

impl Token {
    /// Bytes inspected beyond the end of the token.
    pub fn lookahead(&self) -> usize {
        self.examined_end.saturating_sub(self.end)
    }
}

#[derive(Clone, Copy, Debug)]
struct LexDef {
    symbol: SymbolId,
    kind: TokenKind,
    precedence: i32,
    keyword: bool,
}

pub(crate) struct Lexer {
    dfa: sparse::DFA<Vec<u8>>,
    defs: Vec<LexDef>,
    /// Index into `defs` of the word token.
    word: Option<usize>,
    externals: Vec<SymbolId>,
    scanner: Option<Arc<dyn ExternalScanner>>,
}

impl std::fmt::Debug for Lexer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lexer")
            .field("tokens", &self.defs.len())
            .field("externals", &self.externals.len())
            .field("scanner", &self.scanner.is_some())
            .finish()
    }
}

impl Lexer {
    pub fn new(
        table: &GrammarTable,
        scanner: Option<Arc<dyn ExternalScanner>>,
    ) -> Result<Self, LanguageError> {
        let (dfa, _) = sparse::DFA::from_bytes(&table.lex_dfa)
            .map_err(|e| LanguageError::Lexer(e.to_string()))?;
        if dfa.pattern_len() != table.tokens.len() {
            return Err(LanguageError::Lexer(format!(
                "lexer has {} patterns for {} tokens",
                dfa.pattern_len(),
                table.tokens.len()
            )));
        }
        let defs: Vec<LexDef> = table
            .tokens
            .iter()
            .map(|t| LexDef {
                symbol: t.symbol,
                kind: t.kind,
                precedence: t.precedence,
                keyword: t.keyword,
            })
            .collect();
        let word = table
            .word
            .and_then(|w| defs.iter().position(|d| d.symbol == w));
        Ok(Self {
            dfa: dfa.to_owned(),
            defs,
            word,
            externals: table.externals.clone(),
            scanner,
        })
    }

    pub fn has_scanner(&self) -> bool {
        self.scanner.is_some()
    }

    /// Lexes one token at `start`.
    ///
    /// `valid` is the lex mode of the current parse state; `None` lexes in
    /// error mode, where every internal terminal is acceptable and the
    /// external scanner is not consulted. When no valid terminal matches,
    /// the lexer retries in error mode, and when nothing matches at all it
    /// returns an `ERROR` token covering the input up to the next position
    /// where something does.
    pub fn lex(
        &self,
        text: &str,
        start: usize,
        valid: Option<&TerminalSet>,
        state: &ScannerState,
    ) -> Token {
        let mut examined = start;

        if let (Some(valid), Some(scanner)) = (valid, &self.scanner) {
            let flags: Vec<bool> = self.externals.iter().map(|&s| valid.contains(s)).collect();
            if flags.iter().any(|&f| f) {
                let mut cursor = ScanCursor::new(text.as_bytes(), start);
                let mut next = state.clone();
                let found = scanner.scan(&mut cursor, &flags, &mut next);
                examined = examined.max(cursor.examined_end());
                if let Some(symbol) = found.and_then(|i| self.externals.get(i).copied()) {
                    return Token {
                        symbol,
                        start,
                        end: cursor.token_end().max(start),
                        examined_end: examined,
                        scanner_after: Some(next),
                    };
                }
            }
        }

        if start >= text.len() {
            return Token {
                symbol: GrammarTable::END,
                start,
                end: start,
                examined_end: examined.max(text.len() + 1),
                scanner_after: None,
            };
        }

        let matches = self.run(text.as_bytes(), start, &mut examined);
        let chosen = self
            .select(&matches, valid)
            .or_else(|| valid.and_then(|_| self.select(&matches, None)));
        if let Some((symbol, end)) = chosen {
            return Token {
                symbol,
                start,
                end,
                examined_end: examined,
                scanner_after: None,
            };
        }

        let end = self.next_lexable(text, start, &mut examined);
        Token {
            symbol: GrammarTable::ERROR,
            start,
            end,
            examined_end: examined,
            scanner_after: None,
        }
    }

    /// Runs the DFA anchored at `start`, returning every `(pattern, end)`
    /// pair with a non-empty match.
    fn run(&self, text: &[u8], start: usize, examined: &mut usize) -> Vec<(usize, usize)> {
        let mut found = Vec::new();
        let input = Input::new(text).range(start..).anchored(Anchored::Yes);
        let Ok(mut state) = self.dfa.start_state_forward(&input) else {
            return found;
        };
        for (at, &byte) in text.iter().enumerate().skip(start) {
            let previous = state;
            state = self.dfa.next_state(state, byte);
            if self.dfa.is_special_state(state) {
                if self.dfa.is_match_state(state) {
                    self.collect(state, at, start, &mut found);
                    if self.is_final(state) {
                        *examined = (*examined).max(at + 1);
                        return found;
                    }
                } else if self.dfa.is_dead_state(state) || self.dfa.is_quit_state(state) {
                    // A state that dies on every byte did not need to see this one.
                    if !self.is_final(previous) {
                        *examined = (*examined).max(at + 1);
                    }
                    return found;
                }
            }
            *examined = (*examined).max(at + 1);
        }
        state = self.dfa.next_eoi_state(state);
        *examined = (*examined).max(text.len() + 1);
        if self.dfa.is_match_state(state) {
            self.collect(state, text.len(), start, &mut found);
        }
        found
    }

    fn is_final(&self, state: StateID) -> bool {
        (0..=u8::MAX).all(|b| self.dfa.is_dead_state(self.dfa.next_state(state, b)))
            && !self.dfa.is_match_state(self.dfa.next_eoi_state(state))
    }

    fn collect(&self, state: StateID, end: usize, start: usize, found: &mut Vec<(usize, usize)>) {
        if end == start {
            return;
        }
        for i in 0..self.dfa.match_len(state) {
            found.push((self.dfa.match_pattern(state, i).as_usize(), end));
        }
    }

    fn select(
        &self,
        matches: &[(usize, usize)],
        valid: Option<&TerminalSet>,
    ) -> Option<(SymbolId, usize)> {
        let accepts = |def: &LexDef| valid.is_none_or(|v| v.contains(def.symbol));

        let separator = matches
            .iter()
            .filter(|(p, _)| {
                let def = &self.defs[*p];
                def.kind == TokenKind::Separator && accepts(def)
            })
            .max_by_key(|(p, end)| (*end, std::cmp::Reverse(*p)));
        if let Some(&(p, end)) = separator {
            return Some((self.defs[p].symbol, end));
        }

        let word_end = self.word.and_then(|w| {
            matches
                .iter()
                .filter(|(p, _)| *p == w)
                .map(|(_, end)| *end)
                .max()
        });
        matches
            .iter()
            .filter(|(p, end)| {
                let def = &self.defs[*p];
                def.kind != TokenKind::Separator
                    && accepts(def)
                    && (!def.keyword || word_end == Some(*end))
            })
            .max_by_key(|(p, end)| {
                let def = &self.defs[*p];
                (
                    *end,
                    def.precedence,
                    def.kind == TokenKind::Literal,
                    std::cmp::Reverse(*p),
                )
            })
            .map(|&(p, end)| (self.defs[p].symbol, end))
    }

    /// First character boundary after `start` where some terminal matches,
    /// or the end of input. Always at least one character past `start`.
    fn next_lexable(&self, text: &str, start: usize, examined: &mut usize) -> usize {
        let mut at = start + char_width(text, start);
        while at < text.len() {
            if !self.run(text.as_bytes(), at, examined).is_empty() {
                break;
            }
            at += char_width(text, at);
        }
        at.min(text.len())
    }
}

fn char_width(text: &str, at: usize) -> usize {
    text.get(at..)
        .and_then(|rest| rest.chars().next())
        .map_or(1, char::len_utf8)
}
