//! Positions.

use std::num::NonZeroUsize;

use serde::Deserialize;
use serde::Serialize;

/// A 1-based position within a source file.
///
/// Both `line_no` and `col_no` start at one; `byte_no` starts at zero and is
/// used internally by the tokenizer and the parser cache codec to slice
/// source text without re-walking lines.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Position {
    /// The line number, starting at one.
    line_no: NonZeroUsize,
    /// The column number, starting at one.
    col_no: NonZeroUsize,
    /// The byte offset into the source, starting at zero.
    byte_no: usize,
}

impl Position {
    /// Creates a new [`Position`].
    pub fn new(line_no: NonZeroUsize, col_no: NonZeroUsize, byte_no: usize) -> Self {
        Self {
            line_no,
            col_no,
            byte_no,
        }
    }

    /// Attempts to create a new [`Position`] from plain `usize` coordinates.
    ///
    /// # Panics
    ///
    /// Panics if `line_no` or `col_no` is zero; both are 1-based by
    /// definition (spec.md §3).
    pub fn try_new(line_no: usize, col_no: usize, byte_no: usize) -> Self {
        Self {
            line_no: NonZeroUsize::new(line_no).expect("line numbers are 1-based"),
            col_no: NonZeroUsize::new(col_no).expect("column numbers are 1-based"),
            byte_no,
        }
    }

    /// Gets the line number.
    pub fn line_no(&self) -> NonZeroUsize {
        self.line_no
    }

    /// Gets the column number.
    pub fn col_no(&self) -> NonZeroUsize {
        self.col_no
    }

    /// Gets the byte offset.
    pub fn byte_no(&self) -> usize {
        self.byte_no
    }

    /// Returns a copy of this position collapsed to a zero-width point at the
    /// same coordinates.
    ///
    /// Used by the IR builder to place the phantom zero literal in a unary
    /// minus expansion (spec.md §4.5, §8 scenario 4).
    pub fn collapsed(&self) -> Self {
        *self
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line_no, self.col_no)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn ordering_is_lexicographic() {
        let a = Position::try_new(1, 5, 4);
        let b = Position::try_new(2, 1, 6);
        assert!(a < b);
    }

    #[test]
    fn display_format() {
        assert_eq!(Position::try_new(3, 4, 10).to_string(), "3:4");
    }
}
