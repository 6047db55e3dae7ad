//! Parser state and low-level operations.

use rowan::{Checkpoint, GreenNode, GreenNodeBuilder, TextRange, TextSize};

use super::cst::{SyntaxKind, TokenSet};
use super::lexer::{Token, token_text};
use crate::diagnostics::{DiagnosticKind, Diagnostics};

#[derive(Debug, Clone, Copy)]
pub(super) struct OpenDelimiter {
    pub span: TextRange,
}

/// Recursive-descent parser building a Rowan green tree.
///
/// Trivia is buffered and flushed into the tree when the next node or
/// token starts, so it ends up as leading trivia.
pub struct Parser<'src> {
    pub(super) source: &'src str,
    pub(super) tokens: Vec<Token>,
    pub(super) pos: usize,
    trivia_buffer: Vec<Token>,
    builder: GreenNodeBuilder<'static>,
    pub(super) diagnostics: Diagnostics,
    depth: u32,
    recursion_limit: u32,
    recursion_exceeded: bool,
    last_diagnostic_pos: Option<TextSize>,
    pub(super) delimiter_stack: Vec<OpenDelimiter>,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str, tokens: Vec<Token>) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
            trivia_buffer: Vec::with_capacity(4),
            builder: GreenNodeBuilder::new(),
            diagnostics: Diagnostics::new(),
            depth: 0,
            recursion_limit: u32::MAX,
            recursion_exceeded: false,
            last_diagnostic_pos: None,
            delimiter_stack: Vec::with_capacity(8),
        }
    }

    pub fn with_recursion_limit(mut self, limit: u32) -> Self {
        self.recursion_limit = limit;
        self
    }

    /// The finished tree, its diagnostics, and whether nesting went past
    /// the recursion limit.
    pub fn finish(mut self) -> (GreenNode, Diagnostics, bool) {
        self.drain_trivia();
        (self.builder.finish(), self.diagnostics, self.recursion_exceeded)
    }

    /// The next non-trivia token kind, or `Error` at the end.
    pub(super) fn peek(&mut self) -> SyntaxKind {
        self.skip_trivia_to_buffer();
        self.tokens.get(self.pos).map_or(SyntaxKind::Error, |t| t.kind)
    }

    /// Lookahead past trivia: `peek_nth(0)` is `peek()`.
    pub(super) fn peek_nth(&mut self, n: usize) -> SyntaxKind {
        self.skip_trivia_to_buffer();
        self.tokens[self.pos.min(self.tokens.len())..]
            .iter()
            .filter(|t| !t.kind.is_trivia())
            .nth(n)
            .map_or(SyntaxKind::Error, |t| t.kind)
    }

    pub(super) fn at_set(&mut self, set: TokenSet) -> bool {
        set.contains(self.peek())
    }

    pub(super) fn current_text(&mut self) -> &'src str {
        self.skip_trivia_to_buffer();
        self.tokens
            .get(self.pos)
            .map_or("", |t| token_text(self.source, t))
    }

    pub(super) fn current_span(&mut self) -> TextRange {
        self.skip_trivia_to_buffer();
        self.tokens
            .get(self.pos)
            .map_or_else(|| TextRange::empty(self.eof_offset()), |t| t.span)
    }

    fn eof_offset(&self) -> TextSize {
        TextSize::from(self.source.len() as u32)
    }

    pub(super) fn eof(&mut self) -> bool {
        self.skip_trivia_to_buffer();
        self.pos >= self.tokens.len()
    }

    pub(super) fn should_stop(&mut self) -> bool {
        self.recursion_exceeded || self.eof()
    }

    fn skip_trivia_to_buffer(&mut self) {
        while let Some(token) = self.tokens.get(self.pos)
            && token.kind.is_trivia()
        {
            self.trivia_buffer.push(*token);
            self.pos += 1;
        }
    }

    /// Moves pending trivia into the node that is currently open.
    pub(super) fn eat_trivia(&mut self) {
        self.skip_trivia_to_buffer();
        self.drain_trivia();
    }

    fn drain_trivia(&mut self) {
        for token in self.trivia_buffer.drain(..) {
            let text = token_text(self.source, &token);
            self.builder.token(token.kind.into(), text);
        }
    }

    pub(super) fn start_node(&mut self, kind: SyntaxKind) {
        self.drain_trivia();
        self.builder.start_node(kind.into());
    }

    pub(super) fn start_node_at(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) {
        self.builder.start_node_at(checkpoint, kind.into());
    }

    pub(super) fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    pub(super) fn checkpoint(&mut self) -> Checkpoint {
        self.skip_trivia_to_buffer();
        self.drain_trivia();
        self.builder.checkpoint()
    }

    /// Moves the current token into the tree. Does nothing at the end.
    pub(super) fn bump(&mut self) {
        self.skip_trivia_to_buffer();
        let Some(token) = self.tokens.get(self.pos).copied() else {
            return;
        };
        self.drain_trivia();
        self.builder
            .token(token.kind.into(), token_text(self.source, &token));
        self.pos += 1;
    }

    pub(super) fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.peek() == kind {
            self.bump();
            true
        } else {
            false
        }
    }

    /// On mismatch, reports `what` as expected but consumes nothing.
    pub(super) fn expect(&mut self, kind: SyntaxKind, what: &str) -> bool {
        if self.eat(kind) {
            return true;
        }
        self.error_msg(DiagnosticKind::UnexpectedToken, format!("expected {what}"));
        false
    }

    /// One diagnostic per position: the first explanation is the useful one.
    fn should_report(&mut self, pos: TextSize) -> bool {
        if self.last_diagnostic_pos == Some(pos) {
            return false;
        }
        self.last_diagnostic_pos = Some(pos);
        true
    }

    pub(super) fn error(&mut self, kind: DiagnosticKind) {
        let range = self.current_span();
        if self.should_report(range.start()) {
            self.diagnostics.report(kind, range).emit();
        }
    }

    pub(super) fn error_msg(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        let range = self.current_span();
        if self.should_report(range.start()) {
            self.diagnostics.report(kind, range).message(message).emit();
        }
    }

    pub(super) fn error_at(&mut self, kind: DiagnosticKind, range: TextRange) {
        if self.should_report(range.start()) {
            self.diagnostics.report(kind, range).emit();
        }
    }

    fn bump_as_error(&mut self) {
        if !self.eof() {
            self.start_node(SyntaxKind::Error);
            self.bump();
            self.finish_node();
        }
    }

    pub(super) fn error_and_bump(&mut self, kind: DiagnosticKind) {
        self.error(kind);
        self.bump_as_error();
    }

    pub(super) fn error_and_bump_msg(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        self.error_msg(kind, message);
        self.bump_as_error();
    }

    /// Returns `false` once nesting reaches the limit; parsing then stops.
    pub(super) fn enter_recursion(&mut self) -> bool {
        if self.depth >= self.recursion_limit {
            self.recursion_exceeded = true;
            return false;
        }
        self.depth += 1;
        true
    }

    pub(super) fn exit_recursion(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub(super) fn push_delimiter(&mut self) {
        let span = self.current_span();
        self.delimiter_stack.push(OpenDelimiter { span });
    }

    pub(super) fn pop_delimiter(&mut self) -> Option<OpenDelimiter> {
        self.delimiter_stack.pop()
    }

    pub(super) fn error_unclosed_delimiter(
        &mut self,
        kind: DiagnosticKind,
        message: impl Into<String>,
        related: impl Into<String>,
        open: TextRange,
    ) {
        let current = self.current_span();
        if !self.should_report(current.start()) {
            return;
        }
        self.diagnostics
            .report(kind, TextRange::new(open.start(), current.end()))
            .message(message)
            .related_to(related, open)
            .emit();
    }
}
