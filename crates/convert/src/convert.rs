//! Per-document conversion pipeline.
//!
//! assemble -> normalize spans -> segment -> project -> assign -> group.

use bioc_core::{AppResult, SectionFilterConfig};

use crate::assembly::assemble_passages;
use crate::assign::{assign_section, group_by_section};
use crate::metadata::{metadata_fields, publication_date};
use crate::naming::{output_file_name, output_stem, OUTPUT_EXTENSION};
use crate::odinson;
use crate::projection::project_annotations;
use crate::sections::merge_sections;
use crate::segment::SentenceSegmenter;
use crate::spans::normalize_spans;
use crate::text::CharIndex;
use crate::types::{
    AssembledDocument, ConvertedDocument, DocumentSource, RawSpan, SectionGroup, SectionRange,
    SectionedSentence, SentenceSpan, SourceDocument, ALL_SECTIONS,
};

/// Conversion settings, fixed for the lifetime of a `Converter`.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Allow-list applied to section labels; `None` keeps every label
    pub section_filter: Option<SectionFilterConfig>,

    /// One group per section instead of a single combined group
    pub by_sections: bool,

    /// Segment each section range on its own so no sentence crosses a
    /// section boundary
    pub segment_per_section: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            section_filter: None,
            by_sections: true,
            segment_per_section: true,
        }
    }
}

/// One rendered output file.
#[derive(Debug, Clone)]
pub struct RenderedFile {
    pub file_name: String,
    pub section: String,
    pub bytes: Vec<u8>,
}

/// Converts documents with a fixed segmenter and options.
pub struct Converter {
    segmenter: Box<dyn SentenceSegmenter>,
    options: ConvertOptions,
}

impl Converter {
    pub fn new(segmenter: impl SentenceSegmenter + 'static, options: ConvertOptions) -> Self {
        Self {
            segmenter: Box::new(segmenter),
            options,
        }
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Assemble passages into one text with merged section ranges.
    pub fn assemble(&self, doc: &SourceDocument) -> AssembledDocument {
        let assembly = assemble_passages(&doc.passages);
        let sections = merge_sections(&assembly.placements, self.options.section_filter.as_ref());

        let annotations: Vec<RawSpan> = doc
            .passages
            .iter()
            .flat_map(|p| p.annotations.iter().cloned())
            .collect();

        AssembledDocument {
            id: doc.id.clone(),
            text: assembly.text,
            sections,
            annotations,
            metadata: doc.metadata.clone(),
        }
    }

    /// Run the full pipeline on one document.
    pub fn convert(&self, source: impl Into<DocumentSource>) -> AppResult<ConvertedDocument> {
        let doc = match source.into() {
            DocumentSource::Loaded(doc) => self.assemble(&doc),
            DocumentSource::Assembled(doc) => doc,
        };

        let spans = normalize_spans(&doc.annotations);
        if spans.len() < doc.annotations.len() {
            tracing::warn!(
                "Dropped {} overlapping annotations in {}",
                doc.annotations.len() - spans.len(),
                doc.id
            );
        }

        let sentences = self.segment_document(&doc)?;

        let sectioned: Vec<SectionedSentence> = sentences
            .into_iter()
            .map(|sentence| {
                let annotations = project_annotations(&sentence, &spans);
                let section_label = assign_section(&sentence, &doc.sections);
                let tokens = self.segmenter.tokenize(&sentence.text);
                SectionedSentence {
                    sentence,
                    annotations,
                    section_label,
                    tokens,
                }
            })
            .collect();

        let groups = if self.options.by_sections {
            group_by_section(sectioned)
        } else if sectioned.is_empty() {
            Vec::new()
        } else {
            vec![SectionGroup {
                label: ALL_SECTIONS.to_string(),
                sentences: sectioned,
            }]
        };

        let converted = ConvertedDocument {
            doc_id: doc.metadata.output_id(&doc.id),
            source_id: doc.id,
            metadata: doc.metadata,
            groups,
            by_sections: self.options.by_sections,
        };

        tracing::debug!(
            doc_id = %converted.doc_id,
            sentences = converted.total_sentences(),
            groups = converted.groups.len(),
            "Converted document"
        );

        Ok(converted)
    }

    fn segment_document(&self, doc: &AssembledDocument) -> AppResult<Vec<SentenceSpan>> {
        if !self.options.segment_per_section || doc.sections.is_empty() {
            return self.segmenter.segment(&doc.text);
        }

        let index = CharIndex::new(&doc.text);
        let mut sentences = Vec::new();
        for (start, end) in segmentation_ranges(&doc.sections, index.char_len()) {
            let slice = index.slice(&doc.text, start, end);
            for sentence in self.segmenter.segment(slice)? {
                sentences.push(SentenceSpan::new(
                    sentence.text,
                    sentence.abs_start + start,
                    sentence.abs_end + start,
                ));
            }
        }
        Ok(sentences)
    }
}

/// Section ranges plus the uncovered stretches between them, in order.
fn segmentation_ranges(sections: &[SectionRange], len: usize) -> Vec<(usize, usize)> {
    let mut ranges = Vec::with_capacity(sections.len() * 2 + 1);
    let mut cursor = 0usize;

    for section in sections {
        let start = section.start.max(cursor).min(len);
        let end = section.end.min(len);
        if start > cursor {
            ranges.push((cursor, start));
        }
        if end > start {
            ranges.push((start, end));
            cursor = end;
        }
    }
    if cursor < len {
        ranges.push((cursor, len));
    }
    ranges
}

/// Render every group of a converted document to Odinson JSON.
///
/// Files are named after the BioC document id; the PMID (when known) goes
/// into the `doc_id` metadata field. Combined output carries no `section`
/// field.
pub fn render_groups(doc: &ConvertedDocument, pretty: bool) -> AppResult<Vec<RenderedFile>> {
    let date = publication_date(&doc.metadata);

    doc.groups
        .iter()
        .map(|group| {
            let label = doc.file_label(group);
            let stem = output_stem(&doc.source_id, label);
            let fields = metadata_fields(&doc.doc_id, date.as_deref(), group_section(doc, group));
            let bytes = odinson::render(&stem, fields, &group.sentences, pretty)?;
            Ok(RenderedFile {
                file_name: output_file_name(&doc.source_id, label),
                section: group.label.clone(),
                bytes,
            })
        })
        .collect()
}

/// Render one Odinson document per sentence.
///
/// Sentences are numbered from 1 within their group: `{stem}_{n}.json`.
pub fn render_sentences(doc: &ConvertedDocument, pretty: bool) -> AppResult<Vec<RenderedFile>> {
    let date = publication_date(&doc.metadata);
    let mut files = Vec::with_capacity(doc.total_sentences());

    for group in &doc.groups {
        let stem = output_stem(&doc.source_id, doc.file_label(group));
        for (idx, sentence) in group.sentences.iter().enumerate() {
            let sentence_stem = format!("{}_{}", stem, idx + 1);
            let fields = metadata_fields(&doc.doc_id, date.as_deref(), group_section(doc, group));
            let bytes = odinson::render(&sentence_stem, fields, std::slice::from_ref(sentence), pretty)?;
            files.push(RenderedFile {
                file_name: format!("{}.{}", sentence_stem, OUTPUT_EXTENSION),
                section: group.label.clone(),
                bytes,
            });
        }
    }

    Ok(files)
}

fn group_section<'a>(doc: &ConvertedDocument, group: &'a SectionGroup) -> Option<&'a str> {
    doc.by_sections.then_some(group.label.as_str())
}
