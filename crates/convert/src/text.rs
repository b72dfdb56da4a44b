//! Character/byte offset bookkeeping.
//!
//! Rust strings are indexed by byte, BioC offsets count characters. Every
//! conversion between the two goes through `CharIndex`.

/// Byte position of every character boundary in a string.
#[derive(Debug, Clone)]
pub struct CharIndex {
    /// `boundaries[i]` is the byte offset of character `i`; the final entry
    /// is the byte length of the text.
    boundaries: Vec<usize>,
}

impl CharIndex {
    pub fn new(text: &str) -> Self {
        let mut boundaries: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        boundaries.push(text.len());
        Self { boundaries }
    }

    /// Number of characters in the indexed text.
    pub fn char_len(&self) -> usize {
        self.boundaries.len() - 1
    }

    /// Byte offset of a character offset, clamped to the end of the text.
    pub fn byte_of(&self, char_offset: usize) -> usize {
        self.boundaries[char_offset.min(self.char_len())]
    }

    /// Character offset of a byte offset.
    ///
    /// A byte offset inside a multi-byte character maps to that character.
    pub fn char_of(&self, byte_offset: usize) -> usize {
        match self.boundaries.binary_search(&byte_offset) {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        }
    }

    /// Slice `text` by character offsets; out-of-range offsets are clamped.
    pub fn slice<'a>(&self, text: &'a str, start: usize, end: usize) -> &'a str {
        let start = self.byte_of(start);
        let end = self.byte_of(end).max(start);
        &text[start..end]
    }
}
