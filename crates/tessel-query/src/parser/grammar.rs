//! Grammar productions for the query language.
//!
//! Every `parse_*` method is an extension of [`Parser`]. The syntax is the
//! S-expression pattern language of tree-sitter queries.

use rowan::{Checkpoint, TextRange, TextSize};

use super::core::Parser;
use super::cst::SyntaxKind;
use super::cst::token_sets::{ALT_RECOVERY, PATTERN_FIRST, QUANTIFIERS, ROOT_FIRST, TREE_RECOVERY};
use crate::diagnostics::DiagnosticKind;

impl Parser<'_> {
    pub fn parse_root(&mut self) {
        self.start_node(SyntaxKind::Root);

        while !self.should_stop() {
            let kind = self.peek();
            if ROOT_FIRST.contains(kind) {
                if kind == SyntaxKind::ParenOpen && self.peek_nth(1) == SyntaxKind::PredicateName {
                    self.error(DiagnosticKind::PredicateOutsidePattern);
                }
                self.start_node(SyntaxKind::Pattern);
                self.parse_expr();
                self.finish_node();
            } else if kind == SyntaxKind::At {
                self.error_and_bump(DiagnosticKind::CaptureWithoutTarget);
            } else if matches!(kind, SyntaxKind::Dot | SyntaxKind::Negation) {
                self.error_and_bump_msg(
                    DiagnosticKind::UnexpectedToken,
                    "anchors and negated fields belong inside a node",
                );
            } else {
                self.error_and_bump_msg(
                    DiagnosticKind::UnexpectedToken,
                    "try `(node)`, `[a b]`, `\"literal\"`, or `_`",
                );
            }
        }

        self.eat_trivia();
        self.finish_node();
    }

    fn parse_expr(&mut self) {
        self.parse_expr_inner(true);
    }

    /// Field values take no suffix, so `field: (x)*` reads as
    /// `(field: (x))*`.
    fn parse_expr_no_suffix(&mut self) {
        self.parse_expr_inner(false);
    }

    fn parse_expr_inner(&mut self, with_suffix: bool) {
        if !self.enter_recursion() {
            self.start_node(SyntaxKind::Error);
            while !self.eof() {
                self.bump();
            }
            self.finish_node();
            return;
        }

        let checkpoint = self.checkpoint();
        let mut takes_suffix = with_suffix;
        match self.peek() {
            SyntaxKind::ParenOpen => self.parse_paren(),
            SyntaxKind::BracketOpen => self.parse_alt(),
            SyntaxKind::Underscore => self.parse_token_node(SyntaxKind::Wildcard),
            SyntaxKind::DoubleQuote => self.parse_str(),
            SyntaxKind::Dot => {
                self.parse_token_node(SyntaxKind::Anchor);
                takes_suffix = false;
            }
            SyntaxKind::Negation => {
                self.parse_negated_field();
                takes_suffix = false;
            }
            SyntaxKind::Id => self.parse_field_or_bare(),
            SyntaxKind::KwError | SyntaxKind::KwMissing => {
                self.error_and_bump(DiagnosticKind::ErrorMissingOutsideParens);
            }
            _ => {
                self.error_and_bump_msg(DiagnosticKind::UnexpectedToken, "not a valid pattern");
            }
        }

        if takes_suffix {
            self.try_parse_quantifier(checkpoint);
            self.try_parse_captures(checkpoint);
        }

        self.exit_recursion();
    }

    /// `(kind ...)`, `(_ ...)`, `(ERROR ...)`, `(MISSING kind)`, a group
    /// `((a) (b))`, or a predicate `(#eq? @a "b")`.
    fn parse_paren(&mut self) {
        let checkpoint = self.checkpoint();
        self.push_delimiter();
        self.bump();

        match self.peek() {
            SyntaxKind::ParenClose => {
                self.start_node_at(checkpoint, SyntaxKind::Tree);
                self.error(DiagnosticKind::EmptyTree);
                self.pop_delimiter();
                self.bump();
                self.finish_node();
                return;
            }
            SyntaxKind::PredicateName => {
                self.start_node_at(checkpoint, SyntaxKind::Predicate);
                self.bump();
                self.parse_predicate_args();
            }
            SyntaxKind::ParenOpen
            | SyntaxKind::BracketOpen
            | SyntaxKind::DoubleQuote
            | SyntaxKind::Dot => {
                self.start_node_at(checkpoint, SyntaxKind::Group);
                self.parse_children();
            }
            SyntaxKind::Underscore | SyntaxKind::Id | SyntaxKind::KwError => {
                self.start_node_at(checkpoint, SyntaxKind::Tree);
                self.bump();
                self.parse_children();
            }
            SyntaxKind::KwMissing => {
                self.start_node_at(checkpoint, SyntaxKind::Tree);
                self.bump();
                match self.peek() {
                    SyntaxKind::Id => self.bump(),
                    SyntaxKind::DoubleQuote => self.parse_str(),
                    _ => {}
                }
            }
            _ => {
                self.start_node_at(checkpoint, SyntaxKind::Tree);
                self.error_msg(DiagnosticKind::ExpectedExpression, "a node kind after `(`");
                self.parse_children();
            }
        }

        self.pop_delimiter();
        self.expect(SyntaxKind::ParenClose, "closing `)`");
        self.finish_node();
    }

    /// Children up to the closing `)`.
    fn parse_children(&mut self) {
        loop {
            if self.eof() {
                self.report_unclosed(DiagnosticKind::UnclosedTree, "`)`", "node");
                break;
            }
            if self.should_stop() {
                break;
            }
            let kind = self.peek();
            if kind == SyntaxKind::ParenClose {
                break;
            }
            if PATTERN_FIRST.contains(kind) {
                self.parse_expr();
                continue;
            }
            if kind == SyntaxKind::At {
                self.error_and_bump(DiagnosticKind::CaptureWithoutTarget);
                continue;
            }
            if TREE_RECOVERY.contains(kind) {
                break;
            }
            self.error_and_bump_msg(
                DiagnosticKind::UnexpectedToken,
                "not valid inside a node, try `(child)` or close with `)`",
            );
        }
    }

    fn report_unclosed(&mut self, kind: DiagnosticKind, delimiter: &str, construct: &str) {
        if let Some(open) = self.delimiter_stack.last().copied() {
            self.error_unclosed_delimiter(
                kind,
                format!("expected {delimiter}"),
                format!("{construct} started here"),
                open.span,
            );
        }
    }

    /// `[a b c]`
    fn parse_alt(&mut self) {
        self.start_node(SyntaxKind::Alt);
        self.push_delimiter();
        self.bump();

        loop {
            if self.eof() {
                self.report_unclosed(DiagnosticKind::UnclosedAlternation, "`]`", "alternation");
                break;
            }
            if self.should_stop() {
                break;
            }
            let kind = self.peek();
            if kind == SyntaxKind::BracketClose {
                break;
            }
            if matches!(kind, SyntaxKind::Dot | SyntaxKind::Negation) {
                self.error_and_bump_msg(
                    DiagnosticKind::UnexpectedToken,
                    "anchors and negated fields are not alternatives",
                );
                continue;
            }
            if PATTERN_FIRST.contains(kind) {
                self.parse_expr();
                continue;
            }
            if ALT_RECOVERY.contains(kind) {
                break;
            }
            self.error_and_bump_msg(
                DiagnosticKind::UnexpectedToken,
                "not valid inside an alternation, try `(node)` or close with `]`",
            );
        }

        self.pop_delimiter();
        self.expect(SyntaxKind::BracketClose, "closing `]`");
        self.finish_node();
    }

    fn parse_token_node(&mut self, kind: SyntaxKind) {
        self.start_node(kind);
        self.bump();
        self.finish_node();
    }

    /// `"if"`, with escapes checked.
    fn parse_str(&mut self) {
        self.start_node(SyntaxKind::Str);
        self.bump();
        if self.peek() == SyntaxKind::StrVal {
            let span = self.current_span();
            let text = self.current_text();
            self.validate_escapes(text, span.start());
            self.bump();
        }
        self.expect(SyntaxKind::DoubleQuote, "closing `\"`");
        self.finish_node();
    }

    fn validate_escapes(&mut self, text: &str, start: TextSize) {
        let mut chars = text.char_indices();
        while let Some((i, c)) = chars.next() {
            if c != '\\' {
                continue;
            }
            let Some((_, escaped)) = chars.next() else {
                break;
            };
            if unescape_char(escaped).is_none() {
                let at = start + TextSize::from(i as u32);
                let len = TextSize::from((1 + escaped.len_utf8()) as u32);
                self.error_at(DiagnosticKind::InvalidEscape, TextRange::at(at, len));
            }
        }
    }

    /// `!field`
    fn parse_negated_field(&mut self) {
        self.start_node(SyntaxKind::NegatedField);
        self.bump();
        if self.peek() == SyntaxKind::Id {
            self.bump();
        } else {
            self.error_msg(DiagnosticKind::ExpectedFieldName, "e.g. `!value`");
        }
        self.finish_node();
    }

    fn parse_field_or_bare(&mut self) {
        if self.peek_nth(1) == SyntaxKind::Colon {
            self.parse_field();
        } else {
            self.error_and_bump(DiagnosticKind::BareIdentifier);
        }
    }

    /// `field: pattern`
    fn parse_field(&mut self) {
        self.start_node(SyntaxKind::Field);
        self.bump();
        self.bump();

        let kind = self.peek();
        if PATTERN_FIRST.contains(kind) && !matches!(kind, SyntaxKind::Dot | SyntaxKind::Negation) {
            self.parse_expr_no_suffix();
        } else {
            self.error_msg(DiagnosticKind::ExpectedExpression, "after `field:`");
        }

        self.finish_node();
    }

    /// Arguments of `(#name ...)`: captures, strings and identifiers.
    fn parse_predicate_args(&mut self) {
        loop {
            if self.eof() {
                self.report_unclosed(DiagnosticKind::UnclosedTree, "`)`", "predicate");
                break;
            }
            match self.peek() {
                SyntaxKind::ParenClose => break,
                SyntaxKind::At => {
                    self.bump();
                    if self.peek() == SyntaxKind::Id {
                        self.bump();
                    } else {
                        self.error(DiagnosticKind::ExpectedCaptureName);
                    }
                }
                SyntaxKind::DoubleQuote => self.parse_str(),
                SyntaxKind::Id => self.bump(),
                SyntaxKind::BracketClose => break,
                _ => self.error_and_bump_msg(
                    DiagnosticKind::InvalidPredicateArgument,
                    "expected `@capture`, a string, or an identifier",
                ),
            }
        }
    }

    fn try_parse_quantifier(&mut self, checkpoint: Checkpoint) {
        if self.at_set(QUANTIFIERS) {
            self.start_node_at(checkpoint, SyntaxKind::Quantifier);
            self.bump();
            self.finish_node();
        }
    }

    /// `@a @b`: each capture wraps everything before it.
    fn try_parse_captures(&mut self, checkpoint: Checkpoint) {
        while self.peek() == SyntaxKind::At {
            self.start_node_at(checkpoint, SyntaxKind::Capture);
            self.bump();
            if self.peek() == SyntaxKind::Id {
                self.bump();
            } else {
                self.error(DiagnosticKind::ExpectedCaptureName);
            }
            self.finish_node();
        }
    }
}

/// The character an escape sequence `\c` stands for.
pub(crate) fn unescape_char(c: char) -> Option<char> {
    match c {
        'n' => Some('\n'),
        't' => Some('\t'),
        'r' => Some('\r'),
        '0' => Some('\0'),
        '"' => Some('"'),
        '\\' => Some('\\'),
        _ => None,
    }
}
