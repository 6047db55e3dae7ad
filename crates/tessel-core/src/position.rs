//! Text coordinates.
//!
//! Positions are tracked both as byte offsets and as (row, column) points.
//! Columns count bytes, not characters.

use std::fmt;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// A zero-based (row, column) position.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Point {
    pub row: usize,
    pub column: usize,
}

impl Point {
    pub const ZERO: Point = Point { row: 0, column: 0 };

    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// A span of text measured in bytes and in rows/columns.
///
/// Used both for sizes and for absolute positions (a length from the start
/// of the input).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Length {
    pub bytes: usize,
    pub extent: Point,
}

impl Length {
    pub const ZERO: Length = Length {
        bytes: 0,
        extent: Point::ZERO,
    };

    pub fn of_text(text: &[u8]) -> Self {
        let mut extent = Point::ZERO;
        for &b in text {
            if b == b'\n' {
                extent.row += 1;
                extent.column = 0;
            } else {
                extent.column += 1;
            }
        }
        Self {
            bytes: text.len(),
            extent,
        }
    }

    /// Position of byte offset `offset` within `text`.
    pub fn at_offset(text: &[u8], offset: usize) -> Self {
        Self::of_text(&text[..offset.min(text.len())])
    }

    pub fn is_zero(&self) -> bool {
        self.bytes == 0
    }
}

impl Add for Length {
    type Output = Length;

    fn add(self, rhs: Length) -> Length {
        let extent = if rhs.extent.row > 0 {
            Point::new(self.extent.row + rhs.extent.row, rhs.extent.column)
        } else {
            Point::new(self.extent.row, self.extent.column + rhs.extent.column)
        };
        Length {
            bytes: self.bytes + rhs.bytes,
            extent,
        }
    }
}

/// `a - b` is the span from `b` to `a`; saturates when `b` lies after `a`.
impl Sub for Length {
    type Output = Length;

    fn sub(self, rhs: Length) -> Length {
        let extent = if self.extent.row > rhs.extent.row {
            Point::new(self.extent.row - rhs.extent.row, self.extent.column)
        } else if self.extent.row == rhs.extent.row {
            Point::new(0, self.extent.column.saturating_sub(rhs.extent.column))
        } else {
            Point::ZERO
        };
        Length {
            bytes: self.bytes.saturating_sub(rhs.bytes),
            extent,
        }
    }
}

/// A single contiguous text replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InputEdit {
    pub start_byte: usize,
    pub old_end_byte: usize,
    pub new_end_byte: usize,
    pub start_position: Point,
    pub old_end_position: Point,
    pub new_end_position: Point,
}

impl InputEdit {
    /// Describes replacing `old_text[start..old_end]` with `replacement`.
    pub fn replace(old_text: &str, start: usize, old_end: usize, replacement: &str) -> Self {
        let start_len = Length::at_offset(old_text.as_bytes(), start);
        let old_end_len = Length::at_offset(old_text.as_bytes(), old_end);
        let new_end_len = start_len + Length::of_text(replacement.as_bytes());
        Self {
            start_byte: start_len.bytes,
            old_end_byte: old_end_len.bytes,
            new_end_byte: new_end_len.bytes,
            start_position: start_len.extent,
            old_end_position: old_end_len.extent,
            new_end_position: new_end_len.extent,
        }
    }

    pub fn start(&self) -> Length {
        Length {
            bytes: self.start_byte,
            extent: self.start_position,
        }
    }

    pub fn old_end(&self) -> Length {
        Length {
            bytes: self.old_end_byte,
            extent: self.old_end_position,
        }
    }

    pub fn new_end(&self) -> Length {
        Length {
            bytes: self.new_end_byte,
            extent: self.new_end_position,
        }
    }

    /// Maps a position in the old text to the new text.
    ///
    /// Positions before the edit stay, positions inside the replaced range
    /// collapse onto the new end, positions after it shift. The mapping is
    /// monotone, so mapped sibling ranges stay ordered.
    pub fn map(&self, position: Length) -> Length {
        if position.bytes <= self.start_byte {
            position
        } else if position.bytes < self.old_end_byte {
            self.new_end()
        } else {
            self.new_end() + (position - self.old_end())
        }
    }

    /// Applies the edit to `text`, returning the new text.
    pub fn apply(&self, text: &str, replacement: &str) -> String {
        let mut out = String::with_capacity(text.len() + replacement.len());
        out.push_str(&text[..self.start_byte]);
        out.push_str(replacement);
        out.push_str(&text[self.old_end_byte..]);
        out
    }
}
