//! External scanners.
//!
//! Some tokens cannot be described by a regular expression, indentation
//! being the usual example. A language can ship an [`ExternalScanner`]
//! that the lexer consults before its own tables whenever one of the
//! language's external tokens is valid.

/// Persistent scanner state, threaded through the parse.
///
/// The state in effect before and after every token is recorded in the
/// tree, so a reparse only reuses a node when the scanner would start it
/// from the same state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ScannerState {
    /// Open indentation levels, innermost last. An empty stack means
    /// column zero.
    pub indents: Vec<u32>,
}

impl ScannerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Innermost indentation level.
    pub fn current_indent(&self) -> u32 {
        self.indents.last().copied().unwrap_or(0)
    }
}

/// Read access to the input for an [`ExternalScanner`].
///
/// Every byte the scanner looks at is recorded; editing one of them
/// invalidates the token on the next reparse.
#[derive(Debug)]
pub struct ScanCursor<'a> {
    text: &'a [u8],
    position: usize,
    token_end: usize,
    examined_end: usize,
}

impl<'a> ScanCursor<'a> {
    pub(crate) fn new(text: &'a [u8], start: usize) -> Self {
        Self {
            text,
            position: start,
            token_end: start,
            examined_end: start,
        }
    }

    /// The byte at the cursor, or `None` at end of input.
    pub fn peek(&mut self) -> Option<u8> {
        match self.text.get(self.position) {
            Some(&byte) => {
                self.examined_end = self.examined_end.max(self.position + 1);
                Some(byte)
            }
            None => {
                self.examined_end = self.text.len() + 1;
                None
            }
        }
    }

    /// Moves past the byte at the cursor and returns it.
    pub fn advance(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.position += 1;
        Some(byte)
    }

    /// Ends the token at the cursor. Without a call the token is empty.
    pub fn mark_end(&mut self) {
        self.token_end = self.position;
    }

    pub fn is_at_end(&mut self) -> bool {
        self.peek().is_none()
    }

    /// Absolute byte offset of the cursor.
    pub fn position(&self) -> usize {
        self.position
    }

    pub(crate) fn token_end(&self) -> usize {
        self.token_end
    }

    pub(crate) fn examined_end(&self) -> usize {
        self.examined_end
    }
}

/// A hand-written lexer for a language's external tokens.
pub trait ExternalScanner: Send + Sync {
    /// Tries to recognize one token at the cursor.
    ///
    /// `valid[i]` tells whether the `i`-th external token of the language
    /// is acceptable in the current parse state. Returns the index of the
    /// recognized token; its text ends at the last
    /// [`ScanCursor::mark_end`]. Changes to `state` are discarded when no
    /// token is returned.
    fn scan(
        &self,
        cursor: &mut ScanCursor<'_>,
        valid: &[bool],
        state: &mut ScannerState,
    ) -> Option<usize>;
}
