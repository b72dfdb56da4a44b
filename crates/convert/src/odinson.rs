//! Odinson document rendering.
//!
//! Output follows the Odinson document JSON layout: an id, a list of
//! metadata fields, and sentences made of parallel token fields.

use serde::{Deserialize, Serialize};

use bioc_core::AppResult;

use crate::types::{ProjectedAnnotation, SectionedSentence, Token};

/// Entity tag for tokens outside every annotation.
pub const OUTSIDE: &str = "O";

/// An Odinson field, tagged with its JVM class name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "$type")]
pub enum Field {
    #[serde(rename = "ai.lum.odinson.TokensField")]
    Tokens { name: String, tokens: Vec<String> },

    #[serde(rename = "ai.lum.odinson.DateField")]
    Date { name: String, date: String },
}

impl Field {
    pub fn tokens(name: impl Into<String>, tokens: Vec<String>) -> Self {
        Field::Tokens {
            name: name.into(),
            tokens,
        }
    }

    pub fn date(name: impl Into<String>, date: impl Into<String>) -> Self {
        Field::Date {
            name: name.into(),
            date: date.into(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Field::Tokens { name, .. } | Field::Date { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OdinsonSentence {
    #[serde(rename = "numTokens")]
    pub num_tokens: usize,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OdinsonDocument {
    pub id: String,
    pub metadata: Vec<Field>,
    pub sentences: Vec<OdinsonSentence>,
}

/// IOB entity tags for `tokens` given sentence-relative annotations.
///
/// A token gets a tag only when it lies entirely inside an annotation:
/// `B-` when it starts where the annotation starts, `I-` otherwise. The
/// first matching annotation wins.
pub fn entity_tags(tokens: &[Token], annotations: &[ProjectedAnnotation]) -> Vec<String> {
    tokens
        .iter()
        .map(|token| {
            annotations
                .iter()
                .find(|a| token.start >= a.rel_begin && token.end <= a.rel_end)
                .map(|a| {
                    if token.start == a.rel_begin {
                        format!("B-{}", a.label)
                    } else {
                        format!("I-{}", a.label)
                    }
                })
                .unwrap_or_else(|| OUTSIDE.to_string())
        })
        .collect()
}

/// Build the Odinson sentence for one sectioned sentence.
pub fn sentence(sentence: &SectionedSentence) -> OdinsonSentence {
    let tokens = &sentence.tokens;
    let collect = |f: fn(&Token) -> String| tokens.iter().map(f).collect::<Vec<_>>();

    let words = collect(|t| t.text.clone());
    OdinsonSentence {
        num_tokens: tokens.len(),
        fields: vec![
            Field::tokens("raw", words.clone()),
            Field::tokens("word", words),
            Field::tokens("tag", collect(|t| t.tag.clone())),
            Field::tokens("lemma", collect(|t| t.lemma.clone())),
            Field::tokens("entity", entity_tags(tokens, &sentence.annotations)),
            Field::tokens("chunk", vec![OUTSIDE.to_string(); tokens.len()]),
        ],
    }
}

pub fn document(doc_id: &str, metadata: Vec<Field>, sentences: &[SectionedSentence]) -> OdinsonDocument {
    OdinsonDocument {
        id: doc_id.to_string(),
        metadata,
        sentences: sentences.iter().map(sentence).collect(),
    }
}

/// Serialize one Odinson document to JSON bytes.
pub fn render(
    doc_id: &str,
    metadata: Vec<Field>,
    sentences: &[SectionedSentence],
    pretty: bool,
) -> AppResult<Vec<u8>> {
    let doc = document(doc_id, metadata, sentences);
    let bytes = if pretty {
        serde_json::to_vec_pretty(&doc)?
    } else {
        serde_json::to_vec(&doc)?
    };
    Ok(bytes)
}
