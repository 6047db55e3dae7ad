//! Indentation scanner for Ren'Py.
//!
//! Statements end at a line break and blocks are delimited by indentation,
//! so the three layout tokens are produced here from the whitespace that
//! follows a line. All of them are zero width; the line break itself is
//! ordinary whitespace to the lexer.
//!
//! The raw text of a string literal is scanned here too: inside quotes,
//! whitespace and `#` belong to the string rather than to the extras.

use tessel_runtime::{ExternalScanner, ScanCursor, ScannerState};

const NEWLINE: usize = 0;
const INDENT: usize = 1;
const DEDENT: usize = 2;
const DOUBLE_QUOTED_TEXT: usize = 3;
const SINGLE_QUOTED_TEXT: usize = 4;

const TAB_WIDTH: u32 = 8;

#[derive(Debug, Default, Clone, Copy)]
pub struct RenpyScanner;

/// What lies between the cursor and the next line with content.
#[derive(Debug, PartialEq, Eq)]
struct LineBreak {
    /// Column of the next content line. End of input counts as column zero.
    indent: u32,
}

impl RenpyScanner {
    /// Skips trailing blanks, empty lines and whole-line comments. `None`
    /// when the cursor is not at the end of a line.
    fn line_break(cursor: &mut ScanCursor<'_>) -> Option<LineBreak> {
        let mut found_eol = false;
        let mut indent = 0;
        loop {
            match cursor.peek() {
                None => return Some(LineBreak { indent: 0 }),
                Some(b'\n') => {
                    found_eol = true;
                    indent = 0;
                }
                Some(b' ') => indent += 1,
                Some(b'\t') => indent = (indent / TAB_WIDTH + 1) * TAB_WIDTH,
                Some(b'\r') => {}
                Some(b'#') if found_eol => {
                    while !matches!(cursor.peek(), None | Some(b'\n')) {
                        cursor.advance();
                    }
                    continue;
                }
                Some(_) => break,
            }
            cursor.advance();
        }
        found_eol.then_some(LineBreak { indent })
    }

    /// Consumes string text up to the closing `quote`, an escape or the end
    /// of the line. False when there is no text to consume.
    fn quoted_text(cursor: &mut ScanCursor<'_>, quote: u8) -> bool {
        let start = cursor.position();
        while let Some(byte) = cursor.peek() {
            if byte == quote || byte == b'\\' || byte == b'\n' {
                break;
            }
            cursor.advance();
        }
        cursor.mark_end();
        cursor.position() > start
    }
}

impl ExternalScanner for RenpyScanner {
    fn scan(
        &self,
        cursor: &mut ScanCursor<'_>,
        valid: &[bool],
        state: &mut ScannerState,
    ) -> Option<usize> {
        let is_valid = |i: usize| valid.get(i).copied().unwrap_or(false);
        for (token, quote) in [(DOUBLE_QUOTED_TEXT, b'"'), (SINGLE_QUOTED_TEXT, b'\'')] {
            if is_valid(token) {
                return Self::quoted_text(cursor, quote).then_some(token);
            }
        }

        let LineBreak { indent } = Self::line_break(cursor)?;
        let current = state.current_indent();

        if is_valid(INDENT) && indent > current {
            state.indents.push(indent);
            return Some(INDENT);
        }
        if is_valid(NEWLINE) {
            return Some(NEWLINE);
        }
        if is_valid(DEDENT) && indent < current {
            state.indents.pop();
            return Some(DEDENT);
        }
        None
    }
}
