//! Document accessor
//!
//! The translation core only needs four operations from a host document:
//! the full text, the text of a range, and conversions between absolute
//! offsets and line/character positions. [`SourceDocument`] implements them
//! over an owned string with a precomputed line index.
//!
//! Offsets and characters are UTF-8 byte offsets.

use std::cmp::Ordering;

/// Zero-based line/character position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub character: usize,
}

impl Position {
    pub fn new(line: usize, character: usize) -> Self {
        Position { line, character }
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.line, self.character).cmp(&(other.line, other.character))
    }
}

/// Half-open span between two positions, `start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    /// Build a range, swapping the ends if they are given in reverse
    pub fn new(start: Position, end: Position) -> Self {
        if start <= end {
            Range { start, end }
        } else {
            Range {
                start: end,
                end: start,
            }
        }
    }

    pub fn contains(&self, position: Position) -> bool {
        self.start <= position && position < self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// The operations the translation core needs from a host document
pub trait TextDocument {
    /// Full text of the document
    fn text(&self) -> &str;

    /// Text covered by `range`
    fn text_in(&self, range: Range) -> &str;

    /// Convert an absolute offset into a position, clamped to the document
    fn position_at(&self, offset: usize) -> Position;

    /// Convert a position into an absolute offset, clamped to the document
    fn offset_at(&self, position: Position) -> usize;
}

/// In-memory document with a line-start index
#[derive(Debug, Clone)]
pub struct SourceDocument {
    text: String,
    line_starts: Vec<usize>,
}

impl SourceDocument {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        SourceDocument { text, line_starts }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Text of `line` without its line break (`\r\n` or `\n`)
    pub fn line(&self, line: usize) -> Option<&str> {
        let start = *self.line_starts.get(line)?;
        let end = self.line_end(line);
        Some(&self.text[start..end])
    }

    /// Offset of the end of `line`'s content, before any line break
    fn line_end(&self, line: usize) -> usize {
        let next = self
            .line_starts
            .get(line + 1)
            .map_or(self.text.len(), |next| next - 1);
        let content = &self.text[self.line_starts[line]..next];
        next - usize::from(content.ends_with('\r'))
    }

    /// Move `offset` back onto a char boundary
    fn floor_boundary(&self, mut offset: usize) -> usize {
        offset = offset.min(self.text.len());
        while !self.text.is_char_boundary(offset) {
            offset -= 1;
        }
        offset
    }
}

impl TextDocument for SourceDocument {
    fn text(&self) -> &str {
        &self.text
    }

    fn text_in(&self, range: Range) -> &str {
        let start = self.offset_at(range.start);
        let end = self.offset_at(range.end).max(start);
        &self.text[start..end]
    }

    fn position_at(&self, offset: usize) -> Position {
        let offset = self.floor_boundary(offset);
        let line = self.line_starts.partition_point(|&start| start <= offset) - 1;
        Position::new(line, offset - self.line_starts[line])
    }

    fn offset_at(&self, position: Position) -> usize {
        let Some(&start) = self.line_starts.get(position.line) else {
            return self.text.len();
        };
        let end = self.line_end(position.line);
        self.floor_boundary((start + position.character).min(end))
    }
}
