//! Editor coordinates
//!
//! The host widget addresses text with 1-based line numbers and 1-based
//! columns counted in UTF-16 code units, end-exclusive. The engine scans
//! `&str` byte offsets and converts at the edges.

use serde::{Deserialize, Serialize};

/// A cursor position in editor coordinates
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub line_number: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line_number: usize, column: usize) -> Self {
        Self {
            line_number,
            column,
        }
    }
}

/// A span in editor coordinates
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct Range {
    pub start_line_number: usize,
    pub start_column: usize,
    pub end_line_number: usize,
    pub end_column: usize,
}

impl Range {
    pub fn new(
        start_line_number: usize,
        start_column: usize,
        end_line_number: usize,
        end_column: usize,
    ) -> Self {
        Self {
            start_line_number,
            start_column,
            end_line_number,
            end_column,
        }
    }

    /// Span within a single line
    pub fn on_line(line_number: usize, start_column: usize, end_column: usize) -> Self {
        Self::new(line_number, start_column, line_number, end_column)
    }

    /// True if both ranges share at least one column, touching ends included
    pub fn touches(&self, other: &Range) -> bool {
        (self.start_line_number, self.start_column) <= (other.end_line_number, other.end_column)
            && (other.start_line_number, other.start_column)
                <= (self.end_line_number, self.end_column)
    }
}

/// Column of the byte offset `byte` within `line`
pub fn column_at(line: &str, byte: usize) -> usize {
    let byte = byte.min(line.len());
    line[..byte].encode_utf16().count() + 1
}

/// Byte offset of `column` within `line`.
///
/// Columns past the end clamp to the line length; a column that lands
/// inside a surrogate pair snaps back to the start of that character.
pub fn byte_at(line: &str, column: usize) -> usize {
    let target = column.saturating_sub(1);
    let mut units = 0;
    for (byte, ch) in line.char_indices() {
        let next = units + ch.len_utf16();
        if next > target {
            return byte;
        }
        units = next;
    }
    line.len()
}
