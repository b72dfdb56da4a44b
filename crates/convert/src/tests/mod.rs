//! Pipeline-level tests.

mod pipeline;

use bioc_core::AppResult;

use crate::segment::SentenceSegmenter;
use crate::types::{SentenceSpan, Token};

/// Splits after every '.', so sentence boundaries are predictable.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct PeriodSegmenter;

impl SentenceSegmenter for PeriodSegmenter {
    fn segment(&self, text: &str) -> AppResult<Vec<SentenceSpan>> {
        let chars: Vec<char> = text.chars().collect();
        let mut sentences = Vec::new();
        let mut start = 0usize;

        for (i, c) in chars.iter().enumerate() {
            if *c == '.' || i + 1 == chars.len() {
                push_trimmed(&chars, start, i + 1, &mut sentences);
                start = i + 1;
            }
        }
        Ok(sentences)
    }

    /// Whitespace tokens, with a trailing '.' split off.
    fn tokenize(&self, sentence: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut offset = 0usize;
        for word in sentence.split(' ') {
            let len = word.chars().count();
            match word.strip_suffix('.') {
                Some(stem) if !stem.is_empty() => {
                    tokens.push(token(stem, offset));
                    tokens.push(token(".", offset + len - 1));
                }
                _ if len > 0 => tokens.push(token(word, offset)),
                _ => {}
            }
            offset += len + 1;
        }
        tokens
    }
}

fn token(text: &str, start: usize) -> Token {
    Token {
        text: text.to_string(),
        start,
        end: start + text.chars().count(),
        lemma: text.to_lowercase(),
        tag: "WORD".to_string(),
    }
}

fn push_trimmed(chars: &[char], start: usize, end: usize, out: &mut Vec<SentenceSpan>) {
    let mut s = start;
    let mut e = end;
    while s < e && chars[s].is_whitespace() {
        s += 1;
    }
    while e > s && chars[e - 1].is_whitespace() {
        e -= 1;
    }
    if s < e {
        out.push(SentenceSpan::new(chars[s..e].iter().collect::<String>(), s, e));
    }
}

/// Marker that makes `PoisonSegmenter` fail.
pub(crate) const POISON: &str = "POISON";

/// `PeriodSegmenter` that refuses any text containing `POISON`.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct PoisonSegmenter;

impl SentenceSegmenter for PoisonSegmenter {
    fn segment(&self, text: &str) -> AppResult<Vec<SentenceSpan>> {
        if text.contains(POISON) {
            return Err(bioc_core::AppError::Other("segmenter rejected text".to_string()));
        }
        PeriodSegmenter.segment(text)
    }

    fn tokenize(&self, sentence: &str) -> Vec<Token> {
        PeriodSegmenter.tokenize(sentence)
    }
}
