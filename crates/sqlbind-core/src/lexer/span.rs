//! Byte ranges into the original SQL text.

use serde::Serialize;

/// A half-open byte range `start..end` in the statement being analyzed.
///
/// Spans stay absolute even for tokens produced while re-tokenizing the
/// inside of a parenthesized group, so they can always be used to slice
/// the text the caller handed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Zero-width span at `pos`.
    #[must_use]
    pub const fn point(pos: usize) -> Self {
        Self::new(pos, pos)
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Smallest span covering both `self` and `other`.
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        let start = if self.start < other.start {
            self.start
        } else {
            other.start
        };
        let end = if self.end > other.end {
            self.end
        } else {
            other.end
        };
        Self { start, end }
    }

    /// Returns the text covered by this span, if it lies inside `source`.
    #[must_use]
    pub fn slice<'s>(&self, source: &'s str) -> Option<&'s str> {
        source.get(self.start..self.end)
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_covers_both_ranges() {
        let merged = Span::new(7, 9).merge(Span::new(2, 4));
        assert_eq!(merged, Span::new(2, 9));
        assert_eq!(merged.len(), 7);
    }

    #[test]
    fn point_is_empty() {
        assert!(Span::point(3).is_empty());
        assert!(!Span::new(3, 4).is_empty());
    }

    #[test]
    fn slice_reads_source_text() {
        let sql = "select * from t";
        assert_eq!(Span::new(7, 8).slice(sql), Some("*"));
        assert_eq!(Span::new(10, 99).slice(sql), None);
    }
}
