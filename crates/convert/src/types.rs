//! Conversion type definitions.
//!
//! All offsets are counted in characters (Unicode scalar values), the unit
//! BioC uses for passage and annotation offsets.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Label given to passages and sentences without a section.
pub const UNLABELED: &str = "UNLABELED";

/// Label given to sections filtered out by the allow-list.
pub const OTHER: &str = "OTHER";

/// Label of the single group produced when sections are not split out.
pub const ALL_SECTIONS: &str = "ALL";

/// A character-span annotation as found in the source.
///
/// `begin < end` is expected but not guaranteed; degenerate spans are
/// carried through every stage without panicking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSpan {
    /// Start offset (inclusive)
    pub begin: usize,

    /// End offset (exclusive)
    pub end: usize,

    /// Entity type (e.g. "Disease", "Chemical")
    pub label: String,

    /// Annotated text as recorded in the source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_text: Option<String>,

    /// Annotation id from the source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl RawSpan {
    /// Create a span with only offsets and a label.
    pub fn new(begin: usize, end: usize, label: impl Into<String>) -> Self {
        Self {
            begin,
            end,
            label: label.into(),
            source_text: None,
            id: None,
        }
    }

    /// Whether the span covers no characters.
    pub fn is_degenerate(&self) -> bool {
        self.begin >= self.end
    }
}

/// A contiguous block of source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    pub text: String,

    /// Offset declared by the source; may be missing, overlap earlier
    /// passages, or leave a gap
    pub declared_offset: Option<usize>,

    /// Section type hint ("TITLE", "ABSTRACT", "METHODS", ...)
    pub section_hint: Option<String>,

    /// Annotations with document-absolute offsets
    #[serde(default)]
    pub annotations: Vec<RawSpan>,
}

impl Passage {
    pub fn new(text: impl Into<String>, declared_offset: Option<usize>) -> Self {
        Self {
            text: text.into(),
            declared_offset,
            section_hint: None,
            annotations: Vec::new(),
        }
    }

    pub fn with_section(mut self, hint: impl Into<String>) -> Self {
        self.section_hint = Some(hint.into());
        self
    }

    pub fn with_annotations(mut self, annotations: Vec<RawSpan>) -> Self {
        self.annotations = annotations;
        self
    }
}

/// Document-level metadata carried from the source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Document infons (key/value pairs)
    #[serde(default)]
    pub infons: BTreeMap<String, String>,

    /// Collection-level `<date>`, used when infons carry no date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_date: Option<String>,
}

impl DocumentMetadata {
    /// Identifier for the `doc_id` metadata field: PMID when known, otherwise `fallback`.
    pub fn output_id(&self, fallback: &str) -> String {
        ["article-id_pmid", "pmid"]
            .iter()
            .filter_map(|key| self.infons.get(*key))
            .find(|value| !value.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| fallback.to_string())
    }
}

/// A document as produced by the loader, before assembly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDocument {
    pub id: String,
    pub passages: Vec<Passage>,
    #[serde(default)]
    pub metadata: DocumentMetadata,
}

impl SourceDocument {
    pub fn annotation_count(&self) -> usize {
        self.passages.iter().map(|p| p.annotations.len()).sum()
    }
}

/// Where one passage landed in the assembled text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassagePlacement {
    /// Index of the passage in input order
    pub passage_index: usize,

    /// Section hint as given by the source
    pub section_hint: Option<String>,

    pub start: usize,
    pub end: usize,
    pub length: usize,
}

/// Contiguous run of same-labelled passages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRange {
    pub label: String,
    pub start: usize,
    pub end: usize,
    pub passage_indices: Vec<usize>,
}

impl SectionRange {
    /// Half-open containment test.
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One document in a single coordinate space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssembledDocument {
    pub id: String,
    pub text: String,

    /// Section ranges in non-decreasing start order
    pub sections: Vec<SectionRange>,

    /// Annotations with offsets into `text`
    pub annotations: Vec<RawSpan>,

    #[serde(default)]
    pub metadata: DocumentMetadata,
}

impl AssembledDocument {
    /// A document with a single unlabelled section covering the whole text.
    pub fn from_text(id: impl Into<String>, text: impl Into<String>, annotations: Vec<RawSpan>) -> Self {
        let text = text.into();
        let len = text.chars().count();
        let sections = if len > 0 {
            vec![SectionRange {
                label: UNLABELED.to_string(),
                start: 0,
                end: len,
                passage_indices: vec![0],
            }]
        } else {
            Vec::new()
        };

        Self {
            id: id.into(),
            text,
            sections,
            annotations,
            metadata: DocumentMetadata::default(),
        }
    }
}

/// Input accepted by the converter, resolved once into an `AssembledDocument`.
#[derive(Debug, Clone)]
pub enum DocumentSource {
    /// Passages straight from the loader
    Loaded(SourceDocument),

    /// Text and absolute annotations prepared by the caller
    Assembled(AssembledDocument),
}

impl From<SourceDocument> for DocumentSource {
    fn from(doc: SourceDocument) -> Self {
        DocumentSource::Loaded(doc)
    }
}

impl From<AssembledDocument> for DocumentSource {
    fn from(doc: AssembledDocument) -> Self {
        DocumentSource::Assembled(doc)
    }
}

/// A sentence with absolute offsets into the assembled text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceSpan {
    pub text: String,
    pub abs_start: usize,
    pub abs_end: usize,
}

impl SentenceSpan {
    pub fn new(text: impl Into<String>, abs_start: usize, abs_end: usize) -> Self {
        Self {
            text: text.into(),
            abs_start,
            abs_end,
        }
    }

    /// Length of the sentence text in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// An annotation relative to one sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectedAnnotation {
    pub rel_begin: usize,
    pub rel_end: usize,
    pub label: String,
}

/// A token produced by the segmenter; offsets relative to its sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub lemma: String,
    pub tag: String,
}

/// Terminal per-sentence record handed to the serializer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionedSentence {
    pub sentence: SentenceSpan,
    pub annotations: Vec<ProjectedAnnotation>,
    pub section_label: String,

    /// Pass-through token stream for output fields
    #[serde(default)]
    pub tokens: Vec<Token>,
}

/// Sentences that share one output document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionGroup {
    pub label: String,
    pub sentences: Vec<SectionedSentence>,
}

/// Result of converting one source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertedDocument {
    /// Value of the `doc_id` metadata field (PMID when available)
    pub doc_id: String,

    /// BioC document id; output files are named after it
    pub source_id: String,

    pub metadata: DocumentMetadata,

    /// Groups in first-appearance order
    pub groups: Vec<SectionGroup>,

    /// Whether groups are per section or a single combined group
    pub by_sections: bool,
}

impl ConvertedDocument {
    pub fn total_sentences(&self) -> usize {
        self.groups.iter().map(|g| g.sentences.len()).sum()
    }

    pub fn section_labels(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.label.as_str()).collect()
    }

    /// Label used in the output file name for `group`.
    pub fn file_label<'a>(&self, group: &'a SectionGroup) -> &'a str {
        if self.by_sections {
            &group.label
        } else {
            crate::naming::COMBINED
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_id_prefers_pmid() {
        let mut metadata = DocumentMetadata::default();
        assert_eq!(metadata.output_id("PMC123"), "PMC123");

        metadata.infons.insert("pmid".to_string(), "42".to_string());
        assert_eq!(metadata.output_id("PMC123"), "42");

        metadata
            .infons
            .insert("article-id_pmid".to_string(), "35215501".to_string());
        assert_eq!(metadata.output_id("PMC123"), "35215501");
    }

    #[test]
    fn test_output_id_ignores_blank_pmid() {
        let mut metadata = DocumentMetadata::default();
        metadata.infons.insert("article-id_pmid".to_string(), " ".to_string());
        assert_eq!(metadata.output_id("doc-1"), "doc-1");
    }

    #[test]
    fn test_from_text_single_section() {
        let doc = AssembledDocument::from_text("d", "Héllo world.", Vec::new());
        assert_eq!(doc.sections.len(), 1);
        assert_eq!(doc.sections[0].end, 12);
        assert_eq!(doc.sections[0].label, UNLABELED);

        let empty = AssembledDocument::from_text("e", "", Vec::new());
        assert!(empty.sections.is_empty());
    }

    #[test]
    fn test_section_range_contains() {
        let range = SectionRange {
            label: "TITLE".to_string(),
            start: 0,
            end: 10,
            passage_indices: vec![0],
        };
        assert!(range.contains(0));
        assert!(range.contains(9));
        assert!(!range.contains(10));
    }
}
