//! Line ranges of call sites.

use std::ops::Range;

/// Inclusive, 1-indexed line range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineRange {
    pub start: u32,
    pub end: u32,
}

impl LineRange {
    #[inline]
    pub fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    /// Range of a node whose first token sits on `start` and whose text
    /// contains `text`'s newlines.
    pub fn of_text(start: u32, text: &str) -> Self {
        let newlines = text.bytes().filter(|&b| b == b'\n').count() as u32;
        Self::new(start, start + newlines)
    }

    #[inline]
    pub fn contains(self, line: u32) -> bool {
        self.start <= line && line <= self.end
    }

    /// Number of line breaks spanned; 0 for a single-line range.
    #[inline]
    pub fn span(self) -> u32 {
        self.end - self.start
    }

    /// 0-indexed, half-open slice bounds for indexing a list of lines.
    #[inline]
    pub fn to_slice(self) -> Range<usize> {
        (self.start as usize - 1)..(self.end as usize)
    }
}
