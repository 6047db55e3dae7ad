//! Token rules to regular expressions.

use regex_automata::dfa::{Automaton, StartKind, dense};
use regex_automata::{Input, MatchKind};
use tessel_core::{Grammar, Precedence, Rule};
use tessel_table::{TokenDef, TokenKind};

use crate::GenerateError;

/// A token rule reduced to its lexical description.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct LexicalToken {
    pub pattern: String,
    pub kind: TokenKind,
    pub precedence: i32,
    pub immediate: bool,
}

impl LexicalToken {
    /// Describes `rule`, which must satisfy [`Rule::is_lexical`] or be wrapped
    /// in a token.
    pub fn from_rule(
        grammar: &Grammar,
        rule: &Rule,
        precedences: &PrecedenceLevels,
    ) -> Result<Self, GenerateError> {
        let mut precedence = 0;
        let mut immediate = false;
        let mut inner = rule;
        loop {
            match inner {
                Rule::Token(content) => inner = content,
                Rule::ImmediateToken(content) => {
                    immediate = true;
                    inner = content;
                }
                Rule::Prec { value, content }
                | Rule::PrecLeft { value, content }
                | Rule::PrecRight { value, content } => {
                    precedence = precedences.resolve(value)?;
                    inner = content;
                }
                Rule::PrecDynamic { content, .. } => inner = content,
                _ => break,
            }
        }
        let kind = match inner {
            Rule::String(_) => TokenKind::Literal,
            _ => TokenKind::Pattern,
        };
        let mut pattern = String::new();
        render(grammar, inner, &mut pattern, &mut Vec::new())?;
        Ok(Self {
            pattern,
            kind,
            precedence,
            immediate,
        })
    }
}

fn render(
    grammar: &Grammar,
    rule: &Rule,
    out: &mut String,
    visiting: &mut Vec<String>,
) -> Result<(), GenerateError> {
    match rule {
        Rule::Blank => {}
        Rule::String(text) => out.push_str(&regex_syntax::escape(text)),
        Rule::Pattern { value, flags } => {
            let case_insensitive = flags.as_deref().is_some_and(|f| f.contains('i'));
            out.push_str(if case_insensitive { "(?i:" } else { "(?:" });
            out.push_str(value);
            out.push(')');
        }
        Rule::Seq(members) => {
            for member in members {
                out.push_str("(?:");
                render(grammar, member, out, visiting)?;
                out.push(')');
            }
        }
        Rule::Choice(members) => {
            out.push_str("(?:");
            for (i, member) in members.iter().enumerate() {
                if i > 0 {
                    out.push('|');
                }
                render(grammar, member, out, visiting)?;
            }
            out.push(')');
        }
        Rule::Repeat(content) | Rule::Repeat1(content) => {
            out.push_str("(?:");
            render(grammar, content, out, visiting)?;
            out.push_str(if matches!(rule, Rule::Repeat(_)) { ")*" } else { ")+" });
        }
        Rule::Symbol(name) => {
            let target = grammar
                .rule(name)
                .ok_or_else(|| GenerateError::UnknownSymbol(name.clone()))?;
            if !target.is_lexical() || visiting.contains(name) {
                return Err(GenerateError::NonLexicalInToken(name.clone()));
            }
            visiting.push(name.clone());
            out.push_str("(?:");
            render(grammar, target, out, visiting)?;
            out.push(')');
            visiting.pop();
        }
        Rule::Token(content)
        | Rule::ImmediateToken(content)
        | Rule::Field { content, .. }
        | Rule::Alias { content, .. }
        | Rule::Prec { content, .. }
        | Rule::PrecLeft { content, .. }
        | Rule::PrecRight { content, .. }
        | Rule::PrecDynamic { content, .. }
        | Rule::Reserved { content, .. } => render(grammar, content, out, visiting)?,
    }
    Ok(())
}

/// Checks that `pattern` parses and cannot match the empty string.
pub(crate) fn check_pattern(name: &str, pattern: &str) -> Result<(), GenerateError> {
    let hir = regex_syntax::parse(pattern).map_err(|e| GenerateError::InvalidToken {
        name: name.to_owned(),
        message: e.to_string(),
    })?;
    if hir.properties().minimum_len() == Some(0) {
        return Err(GenerateError::EmptyToken(name.to_owned()));
    }
    Ok(())
}

/// Whether `pattern` matches the whole of `text`.
pub(crate) fn matches_entirely(pattern: &str, text: &str) -> Result<bool, GenerateError> {
    let dfa = dense::DFA::new(&format!("^(?:{pattern})$")).map_err(|e| {
        GenerateError::InvalidToken {
            name: text.to_owned(),
            message: e.to_string(),
        }
    })?;
    let found = dfa
        .try_search_fwd(&Input::new(text))
        .map_err(|e| GenerateError::InvalidToken {
            name: text.to_owned(),
            message: e.to_string(),
        })?;
    Ok(found.is_some())
}

/// Compiles the token patterns, in order, into one anchored DFA that reports
/// every pattern matching at every length, and serializes it for the table.
pub(crate) fn compile_lexer(tokens: &[TokenDef]) -> Result<Vec<u8>, GenerateError> {
    let patterns: Vec<&str> = tokens.iter().map(|t| t.pattern.as_str()).collect();
    let dfa = dense::Builder::new()
        .configure(
            dense::DFA::config()
                .match_kind(MatchKind::All)
                .start_kind(StartKind::Anchored),
        )
        .build_many(&patterns)
        .map_err(|e| GenerateError::Lexer(e.to_string()))?;
    let sparse = dfa
        .to_sparse()
        .map_err(|e| GenerateError::Lexer(e.to_string()))?;
    Ok(sparse.to_bytes_little_endian())
}

/// Named precedences mapped to integers; earlier entries in a list rank higher.
#[derive(Debug, Default)]
pub(crate) struct PrecedenceLevels {
    named: Vec<(String, i32)>,
}

impl PrecedenceLevels {
    pub fn new(grammar: &Grammar) -> Self {
        let mut named = Vec::new();
        for list in &grammar.precedences {
            let count = list.len() as i32;
            for (i, entry) in list.iter().enumerate() {
                if let tessel_core::PrecedenceEntry::Name(name) = entry
                    && !named.iter().any(|(n, _)| n == name)
                {
                    named.push((name.clone(), count - i as i32));
                }
            }
        }
        Self { named }
    }

    pub fn resolve(&self, precedence: &Precedence) -> Result<i32, GenerateError> {
        match precedence {
            Precedence::Integer(value) => Ok(*value),
            Precedence::Name(name) => self
                .named
                .iter()
                .find_map(|(n, v)| (n == name).then_some(*v))
                .ok_or_else(|| GenerateError::UnknownPrecedence(name.clone())),
        }
    }
}
