//! BioC XML collection loading.
//!
//! Parses a whole collection with `quick-xml` into `SourceDocument`s. Passage
//! text is kept verbatim (no trimming) since annotation offsets point into it.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

use bioc_core::{AppError, AppResult};

use crate::types::{DocumentMetadata, Passage, RawSpan, SourceDocument};

/// How many ids a `NotFound` error lists.
const LISTED_IDS: usize = 10;

/// Collection-level header fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollectionInfo {
    pub source: Option<String>,
    pub date: Option<String>,
    pub key: Option<String>,
}

/// Overview of a loaded collection.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionSummary {
    pub source: Option<String>,
    pub date: Option<String>,
    pub document_count: usize,
    pub document_ids: Vec<String>,
    pub total_passages: usize,
    pub total_annotations: usize,
}

/// Overview of one document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentInfo {
    pub id: String,
    pub output_id: String,
    pub passage_count: usize,
    pub annotation_count: usize,
    pub text_length: usize,
    pub section_hints: Vec<String>,
    pub infons: BTreeMap<String, String>,
}

/// A parsed BioC collection.
#[derive(Debug, Clone, Default)]
pub struct BiocCollection {
    pub info: CollectionInfo,
    documents: Vec<SourceDocument>,
}

impl BiocCollection {
    /// Read and parse a collection file.
    pub fn from_path(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(AppError::NotFound(format!(
                "BioC file not found: {}",
                path.display()
            )));
        }

        let xml = std::fs::read_to_string(path)?;
        let collection = Self::from_str(&xml)?;

        tracing::info!(
            "Loaded {} documents from {}",
            collection.len(),
            path.display()
        );
        Ok(collection)
    }

    /// Parse a collection from an XML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(xml: &str) -> AppResult<Self> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(false);

        let mut parser = CollectionParser::default();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let event = reader.read_event_into(&mut buf).map_err(|e| {
                AppError::Xml(format!("at byte {}: {}", reader.buffer_position(), e))
            })?;

            match event {
                Event::Start(e) => parser.open(&e)?,
                Event::Empty(e) => {
                    parser.open(&e)?;
                    parser.close()?;
                }
                Event::End(_) => parser.close()?,
                Event::Text(t) => parser.text.push_str(&t.unescape()?),
                Event::CData(c) => parser.text.push_str(&String::from_utf8_lossy(&c)),
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(parser.finish())
    }

    /// Load a single document from a collection file.
    pub fn load(path: impl AsRef<Path>, document_id: &str) -> AppResult<SourceDocument> {
        let collection = Self::from_path(path)?;
        collection.get(document_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn contains(&self, document_id: &str) -> bool {
        self.documents.iter().any(|d| d.id == document_id)
    }

    /// Document ids in collection order.
    pub fn document_ids(&self) -> Vec<String> {
        self.documents.iter().map(|d| d.id.clone()).collect()
    }

    pub fn documents(&self) -> &[SourceDocument] {
        &self.documents
    }

    /// Look up a document by its BioC id.
    pub fn get(&self, document_id: &str) -> AppResult<&SourceDocument> {
        self.documents
            .iter()
            .find(|d| d.id == document_id)
            .ok_or_else(|| {
                let available: Vec<&str> = self
                    .documents
                    .iter()
                    .take(LISTED_IDS)
                    .map(|d| d.id.as_str())
                    .collect();
                AppError::NotFound(format!(
                    "Document '{}' not in collection. Available (first {}): [{}]",
                    document_id,
                    LISTED_IDS,
                    available.join(", ")
                ))
            })
    }

    pub fn summary(&self) -> CollectionSummary {
        CollectionSummary {
            source: self.info.source.clone(),
            date: self.info.date.clone(),
            document_count: self.documents.len(),
            document_ids: self.document_ids(),
            total_passages: self.documents.iter().map(|d| d.passages.len()).sum(),
            total_annotations: self.documents.iter().map(|d| d.annotation_count()).sum(),
        }
    }

    pub fn document_info(&self, document_id: &str) -> AppResult<DocumentInfo> {
        let doc = self.get(document_id)?;

        let mut section_hints: Vec<String> = Vec::new();
        for hint in doc.passages.iter().filter_map(|p| p.section_hint.as_ref()) {
            if !section_hints.contains(hint) {
                section_hints.push(hint.clone());
            }
        }

        Ok(DocumentInfo {
            id: doc.id.clone(),
            output_id: doc.metadata.output_id(&doc.id),
            passage_count: doc.passages.len(),
            annotation_count: doc.annotation_count(),
            text_length: doc.passages.iter().map(|p| p.text.chars().count()).sum(),
            section_hints,
            infons: doc.metadata.infons.clone(),
        })
    }
}

#[derive(Debug, Default)]
struct AnnotationBuilder {
    id: Option<String>,
    infons: BTreeMap<String, String>,
    locations: Vec<(usize, usize)>,
    text: Option<String>,
}

impl AnnotationBuilder {
    fn label(&self) -> String {
        ["type", "identifier", "label"]
            .iter()
            .filter_map(|k| self.infons.get(*k))
            .find(|v| !v.is_empty())
            .cloned()
            .unwrap_or_else(|| "ENTITY".to_string())
    }

    fn into_spans(self) -> Vec<RawSpan> {
        let label = self.label();
        self.locations
            .iter()
            .filter_map(|&(offset, length)| {
                let Some(end) = offset.checked_add(length) else {
                    tracing::warn!(
                        annotation = ?self.id,
                        offset,
                        length,
                        "Skipping annotation location past the end of addressable text"
                    );
                    return None;
                };
                Some(RawSpan {
                    begin: offset,
                    end,
                    label: label.clone(),
                    source_text: self.text.clone(),
                    id: self.id.clone(),
                })
            })
            .collect()
    }
}

#[derive(Debug, Default)]
struct PassageBuilder {
    infons: BTreeMap<String, String>,
    offset: Option<usize>,
    text: Option<String>,
    annotations: Vec<RawSpan>,
}

impl PassageBuilder {
    fn build(self) -> Passage {
        let section_hint = ["section_type", "section", "type"]
            .iter()
            .filter_map(|k| self.infons.get(*k))
            .find(|v| !v.is_empty())
            .cloned();

        Passage {
            text: self.text.unwrap_or_default(),
            declared_offset: self.offset,
            section_hint,
            annotations: self.annotations,
        }
    }
}

#[derive(Debug, Default)]
struct DocumentBuilder {
    id: Option<String>,
    infons: BTreeMap<String, String>,
    passages: Vec<Passage>,
}

/// Event-driven state for one parse.
#[derive(Debug, Default)]
struct CollectionParser {
    stack: Vec<String>,
    text: String,
    infon_key: Option<String>,
    info: CollectionInfo,
    document: Option<DocumentBuilder>,
    passage: Option<PassageBuilder>,
    annotation: Option<AnnotationBuilder>,
    documents: Vec<SourceDocument>,
}

impl CollectionParser {
    fn parent(&self) -> Option<&str> {
        self.stack.last().map(String::as_str)
    }

    fn open(&mut self, e: &BytesStart<'_>) -> AppResult<()> {
        let name = local_name(e.name().as_ref());
        self.text.clear();

        match name.as_str() {
            "document" => self.document = Some(DocumentBuilder::default()),
            "passage" if self.document.is_some() => self.passage = Some(PassageBuilder::default()),
            "annotation" if self.parent() == Some("passage") => {
                self.annotation = Some(AnnotationBuilder {
                    id: attribute(e, "id")?,
                    ..AnnotationBuilder::default()
                });
            }
            "infon" => self.infon_key = attribute(e, "key")?,
            "location" if self.parent() == Some("annotation") => {
                if let Some(annotation) = self.annotation.as_mut() {
                    let offset = attribute(e, "offset")?.and_then(|v| v.trim().parse().ok());
                    let length = attribute(e, "length")?.and_then(|v| v.trim().parse().ok());
                    match (offset, length) {
                        (Some(offset), Some(length)) => annotation.locations.push((offset, length)),
                        _ => tracing::warn!(
                            annotation = ?annotation.id,
                            "Skipping annotation location without a valid offset/length"
                        ),
                    }
                }
            }
            _ => {}
        }

        self.stack.push(name);
        Ok(())
    }

    fn close(&mut self) -> AppResult<()> {
        let Some(name) = self.stack.pop() else {
            return Err(AppError::Xml("unbalanced closing tag".to_string()));
        };
        let text = std::mem::take(&mut self.text);
        let parent = self.parent().map(str::to_string);

        match (name.as_str(), parent.as_deref()) {
            ("source", Some("collection")) => self.info.source = Some(text.trim().to_string()),
            ("date", Some("collection")) => self.info.date = Some(text.trim().to_string()),
            ("key", Some("collection")) => self.info.key = Some(text.trim().to_string()),
            ("id", Some("document")) => {
                if let Some(doc) = self.document.as_mut() {
                    doc.id = Some(text.trim().to_string());
                }
            }
            ("infon", Some(owner)) => {
                let key = self.infon_key.take().unwrap_or_default();
                let value = text.trim().to_string();
                match owner {
                    "document" => {
                        if let Some(doc) = self.document.as_mut() {
                            doc.infons.insert(key, value);
                        }
                    }
                    "passage" => {
                        if let Some(passage) = self.passage.as_mut() {
                            passage.infons.insert(key, value);
                        }
                    }
                    "annotation" => {
                        if let Some(annotation) = self.annotation.as_mut() {
                            annotation.infons.insert(key, value);
                        }
                    }
                    _ => {}
                }
            }
            ("offset", Some("passage")) => {
                if let Some(passage) = self.passage.as_mut() {
                    passage.offset = text.trim().parse().ok();
                    if passage.offset.is_none() {
                        tracing::warn!("Unparsable passage offset '{}'", text.trim());
                    }
                }
            }
            ("text", Some("passage")) => {
                if let Some(passage) = self.passage.as_mut() {
                    passage.text = Some(text);
                }
            }
            ("text", Some("annotation")) => {
                if let Some(annotation) = self.annotation.as_mut() {
                    annotation.text = Some(text);
                }
            }
            ("annotation", Some("passage")) => {
                if let (Some(annotation), Some(passage)) = (self.annotation.take(), self.passage.as_mut()) {
                    passage.annotations.extend(annotation.into_spans());
                }
            }
            ("passage", Some("document")) => {
                if let (Some(passage), Some(doc)) = (self.passage.take(), self.document.as_mut()) {
                    doc.passages.push(passage.build());
                }
            }
            ("document", _) => {
                if let Some(doc) = self.document.take() {
                    self.finish_document(doc);
                }
            }
            _ => {}
        }

        Ok(())
    }

    fn finish_document(&mut self, doc: DocumentBuilder) {
        let id = doc.id.unwrap_or_else(|| format!("document-{}", self.documents.len()));
        if self.documents.iter().any(|d| d.id == id) {
            tracing::warn!("Duplicate document id '{}'; keeping the first occurrence", id);
            return;
        }

        tracing::debug!(
            "Parsed document {} with {} passages",
            id,
            doc.passages.len()
        );

        self.documents.push(SourceDocument {
            id,
            passages: doc.passages,
            metadata: DocumentMetadata {
                infons: doc.infons,
                collection_date: self.info.date.clone().filter(|d| !d.is_empty()),
            },
        });
    }

    fn finish(self) -> BiocCollection {
        BiocCollection {
            info: self.info,
            documents: self.documents,
        }
    }
}

fn local_name(qname: &[u8]) -> String {
    let local = match qname.iter().position(|&b| b == b':') {
        Some(i) => &qname[i + 1..],
        None => qname,
    };
    String::from_utf8_lossy(local).into_owned()
}

fn attribute(e: &BytesStart<'_>, key: &str) -> AppResult<Option<String>> {
    for attr in e.attributes().with_checks(false).flatten() {
        if local_name(attr.key.as_ref()) == key {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}
