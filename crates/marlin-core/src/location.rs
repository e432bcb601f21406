//! Source location tracking for diagnostics.
//!
//! Provides [`SourceLocation`] to record where tokens, nodes and diagnostics
//! originate, and [`LineTracker`] to derive line/column pairs from a running
//! character offset.

use std::fmt;
use std::sync::Arc;

/// A position in a source file.
///
/// Lines and columns are both 1-indexed. The file path is shared so that
/// cloning a location (which every token and node does) stays cheap.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    /// Path of the file this location belongs to.
    pub file: Arc<str>,
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed, in characters).
    pub column: u32,
}

impl SourceLocation {
    /// Create a new location.
    #[inline]
    pub fn new(file: Arc<str>, line: u32, column: u32) -> Self {
        Self { file, line, column }
    }

    /// The file path as a string slice.
    #[inline]
    pub fn file(&self) -> &str {
        &self.file
    }
}

impl fmt::Debug for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Derives line/column positions from character offsets.
///
/// Positions are computed lazily: the tracker only scans the characters
/// between the last requested offset and the new one. Requests must be made
/// with non-decreasing offsets, which is how the tokenizer consumes input.
///
/// `\r` is ignored, `\n` starts a new line and resets the column counter to 0,
/// every other character advances the column counter by one.
#[derive(Debug, Clone)]
pub struct LineTracker<'src> {
    source: &'src str,
    offset: usize,
    line: u32,
    column: u32,
}

impl<'src> LineTracker<'src> {
    /// Create a tracker positioned at the start of `source`.
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            offset: 0,
            line: 1,
            column: 0,
        }
    }

    /// Returns the `(line, column)` of the character at byte offset `offset`.
    ///
    /// Offsets before the last requested one are clamped to it.
    pub fn position(&mut self, offset: usize) -> (u32, u32) {
        let target = offset.min(self.source.len());
        if target > self.offset {
            for ch in self.source[self.offset..target].chars() {
                match ch {
                    '\r' => {}
                    '\n' => {
                        self.line += 1;
                        self.column = 0;
                    }
                    _ => self.column += 1,
                }
            }
            self.offset = target;
        }
        (self.line, self.column + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_display() {
        let loc = SourceLocation::new(Arc::from("main.mn"), 3, 7);
        assert_eq!(loc.to_string(), "main.mn:3:7");
        assert_eq!(format!("{:?}", loc), "main.mn:3:7");
    }

    #[test]
    fn tracker_starts_at_one_one() {
        let mut tracker = LineTracker::new("abc");
        assert_eq!(tracker.position(0), (1, 1));
    }

    #[test]
    fn tracker_counts_columns() {
        let mut tracker = LineTracker::new("abc def");
        assert_eq!(tracker.position(4), (1, 5));
    }

    #[test]
    fn tracker_newline_resets_column() {
        let mut tracker = LineTracker::new("ab\ncd\nef");
        assert_eq!(tracker.position(3), (2, 1));
        assert_eq!(tracker.position(7), (3, 2));
    }

    #[test]
    fn tracker_ignores_carriage_return() {
        let mut tracker = LineTracker::new("ab\r\ncd");
        assert_eq!(tracker.position(5), (2, 2));
    }

    #[test]
    fn tracker_counts_characters_not_bytes() {
        let mut tracker = LineTracker::new("éé x");
        // 'é' is two bytes; "éé " is 5 bytes and 3 characters.
        assert_eq!(tracker.position(5), (1, 4));
    }

    #[test]
    fn tracker_clamps_backwards_requests() {
        let mut tracker = LineTracker::new("abcdef");
        assert_eq!(tracker.position(4), (1, 5));
        assert_eq!(tracker.position(2), (1, 5));
    }
}
