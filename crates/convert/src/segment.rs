//! Sentence segmentation and tokenization.
//!
//! The pipeline only depends on the `SentenceSegmenter` trait; the default
//! `UnicodeSegmenter` follows the UAX #29 sentence and word boundaries.

use unicode_segmentation::UnicodeSegmentation;

use bioc_core::AppResult;

use crate::text::CharIndex;
use crate::types::{SentenceSpan, Token};

/// Splits text into sentences and sentences into tokens.
pub trait SentenceSegmenter: Send + Sync {
    /// Sentence spans with character offsets into `text`.
    fn segment(&self, text: &str) -> AppResult<Vec<SentenceSpan>>;

    /// Tokens with character offsets relative to `sentence`.
    fn tokenize(&self, sentence: &str) -> Vec<Token>;
}

/// Rule-based segmenter built on `unicode-segmentation`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeSegmenter;

impl UnicodeSegmenter {
    pub fn new() -> Self {
        Self
    }
}

impl SentenceSegmenter for UnicodeSegmenter {
    fn segment(&self, text: &str) -> AppResult<Vec<SentenceSpan>> {
        let index = CharIndex::new(text);
        let mut sentences = Vec::new();

        for (byte_start, raw) in text.split_sentence_bound_indices() {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }

            let leading = raw.len() - raw.trim_start().len();
            let start = byte_start + leading;
            let end = start + trimmed.len();

            sentences.push(SentenceSpan::new(
                trimmed,
                index.char_of(start),
                index.char_of(end),
            ));
        }

        Ok(sentences)
    }

    fn tokenize(&self, sentence: &str) -> Vec<Token> {
        let index = CharIndex::new(sentence);

        sentence
            .split_word_bound_indices()
            .filter(|(_, word)| !word.trim().is_empty())
            .map(|(byte_start, word)| Token {
                text: word.to_string(),
                start: index.char_of(byte_start),
                end: index.char_of(byte_start + word.len()),
                lemma: word.to_lowercase(),
                tag: coarse_tag(word).to_string(),
            })
            .collect()
    }
}

/// Coarse part-of-speech style tag for a token.
pub fn coarse_tag(word: &str) -> &'static str {
    let mut chars = word.chars();
    let Some(first) = chars.next() else {
        return "SYM";
    };

    if first.is_ascii_digit() && word.chars().all(|c| c.is_numeric() || c == '.' || c == ',') {
        return "NUM";
    }
    if word.chars().any(char::is_alphanumeric) {
        return "WORD";
    }
    if word.chars().all(is_punctuation) {
        "PUNCT"
    } else {
        "SYM"
    }
}

fn is_punctuation(c: char) -> bool {
    matches!(
        c,
        '.' | ',' | ';' | ':' | '!' | '?' | '\'' | '"' | '(' | ')' | '[' | ']' | '{' | '}' | '-'
            | '/' | '\u{2018}' | '\u{2019}' | '\u{201C}' | '\u{201D}' | '\u{2013}' | '\u{2014}'
            | '\u{2026}'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentences_with_offsets() {
        let text = "Hello world. How are you?";
        let sentences = UnicodeSegmenter::new().segment(text).unwrap();

        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0].text, "Hello world.");
        assert_eq!((sentences[0].abs_start, sentences[0].abs_end), (0, 12));
        assert_eq!(sentences[1].text, "How are you?");
        assert_eq!((sentences[1].abs_start, sentences[1].abs_end), (13, 25));
    }

    #[test]
    fn test_filler_is_not_a_sentence() {
        let text = "Title     Body text.";
        let sentences = UnicodeSegmenter::new().segment(text).unwrap();

        for s in &sentences {
            assert!(!s.text.trim().is_empty());
            assert_eq!(s.text, s.text.trim());
        }
        assert!(UnicodeSegmenter::new().segment("     ").unwrap().is_empty());
    }

    #[test]
    fn test_offsets_are_characters() {
        let text = "Größe zählt. Ja.";
        let sentences = UnicodeSegmenter::new().segment(text).unwrap();

        let last = sentences.last().unwrap();
        assert_eq!(last.text, "Ja.");
        assert_eq!((last.abs_start, last.abs_end), (13, 16));
    }

    #[test]
    fn test_tokenize() {
        let tokens = UnicodeSegmenter::new().tokenize("BRCA1 binds 2 proteins.");
        let words: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();

        assert_eq!(words, vec!["BRCA1", "binds", "2", "proteins", "."]);
        assert_eq!((tokens[1].start, tokens[1].end), (6, 11));
        assert_eq!(tokens[0].lemma, "brca1");
        assert_eq!(tokens[2].tag, "NUM");
        assert_eq!(tokens[4].tag, "PUNCT");
    }

    #[test]
    fn test_coarse_tags() {
        assert_eq!(coarse_tag("3.5"), "NUM");
        assert_eq!(coarse_tag("p53"), "WORD");
        assert_eq!(coarse_tag("("), "PUNCT");
        assert_eq!(coarse_tag("+"), "SYM");
        assert_eq!(coarse_tag(""), "SYM");
    }
}
