//! Offset and line/column conversion over a source buffer.
//!
//! The [`LineLengthCache`] stores the character length of every line, newline
//! included, and answers offset -> (line, column) queries by walking those
//! lengths. [`SourceBuffer`] pairs a text with its cache and implements the
//! [`TextSurface`] capability adapters resolve positions against.

// Line and column numbers are stored as u32; snippets never approach 4 billion lines.
#![allow(clippy::cast_possible_truncation)]

use crate::types::{SourceSelection, TextPosition};

/// Per-line character lengths of a text.
///
/// Every line but the last counts its terminating `\n`. The last segment may
/// be empty (text ending in a newline, or empty text), so the cache always
/// holds at least one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineLengthCache {
    lengths: Vec<usize>,
}

impl LineLengthCache {
    /// Build the cache for `text`.
    #[must_use]
    pub fn new(text: &str) -> Self {
        let mut lengths = Vec::new();
        let mut current = 0;
        for ch in text.chars() {
            current += 1;
            if ch == '\n' {
                lengths.push(current);
                current = 0;
            }
        }
        lengths.push(current);
        Self { lengths }
    }

    /// Cached lengths, one per line.
    #[must_use]
    pub fn lengths(&self) -> &[usize] {
        &self.lengths
    }

    /// Number of lines in the text.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lengths.len()
    }

    /// Total length of the text in characters.
    #[must_use]
    pub fn total_len(&self) -> usize {
        self.lengths.iter().sum()
    }

    /// Convert an absolute character offset to a 1-indexed `(line, column)`.
    ///
    /// Returns the sentinel `(0, 0)` when the offset lies past the end of the
    /// text; callers must treat line 0 as "not found". The end-of-text offset
    /// itself is a valid position on the last line.
    #[must_use]
    pub fn line_col(&self, offset: usize) -> (u32, u32) {
        let last = self.lengths.len() - 1;
        let mut remaining = offset;
        for (index, &len) in self.lengths.iter().enumerate() {
            if remaining < len || (index == last && remaining == len) {
                return (index as u32 + 1, remaining as u32 + 1);
            }
            remaining -= len;
        }
        (0, 0)
    }

    /// Inverse of [`line_col`](Self::line_col): the absolute offset of a
    /// 1-indexed `(line, column)`, or `None` if it is not inside the text.
    #[must_use]
    pub fn offset_of(&self, line: u32, column: u32) -> Option<usize> {
        let index = (line as usize).checked_sub(1)?;
        let within = (column as usize).checked_sub(1)?;
        let len = *self.lengths.get(index)?;
        let is_last = index == self.lengths.len() - 1;
        if within < len || (is_last && within == len) {
            Some(self.lengths[..index].iter().sum::<usize>() + within)
        } else {
            None
        }
    }
}

/// The editor-side capability adapters resolve ranges against.
///
/// Positions use the [`TextPosition`] convention: 1-indexed lines and
/// 0-indexed character columns.
pub trait TextSurface {
    /// The full text currently shown.
    fn text(&self) -> &str;

    /// Position of an absolute character offset, or `None` past the end.
    fn position_at(&self, offset: usize) -> Option<TextPosition>;

    /// Absolute character offset of a position, or `None` if outside the text.
    fn offset_at(&self, position: TextPosition) -> Option<usize>;

    /// Text between the two ends of `selection`.
    ///
    /// Returns an empty string when either end is outside the text or the
    /// selection is reversed.
    fn value_in_range(&self, selection: &SourceSelection) -> String;
}

/// Source text plus its line-length cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceBuffer {
    text: String,
    lines: LineLengthCache,
}

impl SourceBuffer {
    /// Create a buffer for `text`.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let lines = LineLengthCache::new(&text);
        Self { text, lines }
    }

    /// Replace the text and rebuild the line cache.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.lines = LineLengthCache::new(&self.text);
    }

    /// The line-length cache for the current text.
    #[must_use]
    pub fn lines(&self) -> &LineLengthCache {
        &self.lines
    }

    /// Text between two character offsets.
    fn slice_chars(&self, start: usize, end: usize) -> String {
        self.text.chars().skip(start).take(end - start).collect()
    }
}

impl TextSurface for SourceBuffer {
    fn text(&self) -> &str {
        &self.text
    }

    fn position_at(&self, offset: usize) -> Option<TextPosition> {
        match self.lines.line_col(offset) {
            (0, _) => None,
            (line, column) => Some(TextPosition::new(line, column - 1)),
        }
    }

    fn offset_at(&self, position: TextPosition) -> Option<usize> {
        self.lines.offset_of(position.line, position.column + 1)
    }

    fn value_in_range(&self, selection: &SourceSelection) -> String {
        match (
            self.offset_at(selection.start_pos),
            self.offset_at(selection.end_pos),
        ) {
            (Some(start), Some(end)) if start <= end => self.slice_chars(start, end),
            _ => {
                tracing::trace!(
                    %selection,
                    "selection outside the buffer, resolving to empty text"
                );
                String::new()
            }
        }
    }
}
