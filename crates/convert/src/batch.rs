//! Resumable batch conversion.
//!
//! Converts every document of a collection into per-section Odinson files.
//! Finished documents are detected from the files already in the output
//! directory, so an interrupted run picks up where it stopped.

use serde::Serialize;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use bioc_core::{AppError, AppResult};

use crate::convert::{render_groups, Converter};
use crate::loader::BiocCollection;
use crate::naming::{sanitize_name, OUTPUT_EXTENSION};
use crate::progress::{DocumentStatus, ProgressReporter};
use crate::types::SourceDocument;

/// Name of the optional archive written next to the outputs.
pub const ARCHIVE_NAME: &str = "bioc_collection.zip";

/// Suffix of files still being written.
const TEMP_SUFFIX: &str = ".partial";

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub output_dir: PathBuf,

    /// Skip documents whose output already exists
    pub resume: bool,

    /// Bundle all outputs into `ARCHIVE_NAME` at the end
    pub archive: bool,

    pub pretty: bool,

    /// Restrict the run to these BioC document ids
    pub document_ids: Option<Vec<String>>,
}

impl BatchOptions {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            resume: true,
            archive: false,
            pretty: true,
            document_ids: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedDocument {
    pub id: String,
    pub reason: String,
}

/// Counts and outputs of one batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: Vec<FailedDocument>,
    pub saved_files: Vec<PathBuf>,
    pub archive: Option<PathBuf>,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.processed + self.skipped + self.failed.len()
    }
}

pub struct BatchDriver {
    converter: Converter,
    options: BatchOptions,
    progress: ProgressReporter,
}

impl BatchDriver {
    pub fn new(converter: Converter, options: BatchOptions) -> Self {
        Self {
            converter,
            options,
            progress: ProgressReporter::noop(),
        }
    }

    pub fn with_progress(mut self, progress: ProgressReporter) -> Self {
        self.progress = progress;
        self
    }

    /// Convert and persist every selected document of `collection`.
    ///
    /// Only setup failures (creating or scanning the output directory) are
    /// returned as errors; per-document failures end up in the summary.
    pub fn run(&self, collection: &BiocCollection) -> AppResult<BatchSummary> {
        let dir = &self.options.output_dir;
        fs::create_dir_all(dir)?;

        let known = collection.document_ids();
        for id in interrupted_document_ids(dir, &known)? {
            tracing::warn!("Document {} was interrupted while saving; discarding its outputs", id);
            remove_document_outputs(dir, &id, &known)?;
        }
        remove_stale_temp_files(dir)?;

        let mut summary = BatchSummary::default();
        let documents = self.select_documents(collection, &mut summary);
        let total = documents.len() as u64;

        let existing = if self.options.resume {
            let existing = existing_document_ids(dir, &known)?;
            self.progress.scan(existing.len() as u64, &dir.display().to_string());
            existing
        } else {
            HashSet::new()
        };

        tracing::info!(
            "Converting {} documents into {} ({} already done)",
            total,
            dir.display(),
            existing.len()
        );

        for (idx, doc) in documents.iter().enumerate() {
            let current = idx as u64 + 1;
            let span = tracing::info_span!("document", id = %doc.id);
            let _enter = span.enter();

            if existing.contains(&doc.id) {
                summary.skipped += 1;
                self.progress
                    .document(current, total, &doc.id, DocumentStatus::Skipped, "already converted");
                continue;
            }

            match self.process_document(doc) {
                Ok(files) => {
                    summary.processed += 1;
                    self.progress.document(
                        current,
                        total,
                        &doc.id,
                        DocumentStatus::Processed,
                        format!("{} files", files.len()),
                    );
                    summary.saved_files.extend(files);
                }
                Err(e) => {
                    tracing::warn!("Failed to convert {}: {}", doc.id, e);
                    self.progress
                        .document(current, total, &doc.id, DocumentStatus::Failed, e.to_string());
                    summary.failed.push(FailedDocument {
                        id: doc.id.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        if self.options.archive {
            match create_archive(dir) {
                Ok((path, files)) => {
                    self.progress.archive(files as u64, &path.display().to_string());
                    summary.archive = Some(path);
                }
                Err(e) => tracing::warn!("Archive not written: {}", e),
            }
        }

        tracing::info!(
            processed = summary.processed,
            skipped = summary.skipped,
            failed = summary.failed.len(),
            "Batch complete"
        );

        Ok(summary)
    }

    fn select_documents<'a>(
        &self,
        collection: &'a BiocCollection,
        summary: &mut BatchSummary,
    ) -> Vec<&'a SourceDocument> {
        let Some(ids) = &self.options.document_ids else {
            return collection.documents().iter().collect();
        };

        let mut selected = Vec::with_capacity(ids.len());
        for id in ids {
            match collection.get(id) {
                Ok(doc) => selected.push(doc),
                Err(e) => {
                    tracing::warn!("{}", e);
                    summary.failed.push(FailedDocument {
                        id: id.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }
        selected
    }

    /// Convert one document and persist all of its files.
    ///
    /// Files are written under temporary names and only renamed into place
    /// once every file of the document is on disk.
    fn process_document(&self, doc: &SourceDocument) -> AppResult<Vec<PathBuf>> {
        let converted = self
            .converter
            .convert(doc.clone())
            .map_err(|e| AppError::per_document(&doc.id, e))?;
        let rendered =
            render_groups(&converted, self.options.pretty).map_err(|e| AppError::per_document(&doc.id, e))?;

        let mut pending: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(rendered.len());
        for file in &rendered {
            let target = self.options.output_dir.join(&file.file_name);
            let temp = temp_path(&target);
            if let Err(e) = write_flushed(&temp, &file.bytes) {
                discard(&pending);
                let _ = fs::remove_file(&temp);
                return Err(AppError::per_document(&doc.id, e));
            }
            pending.push((temp, target));
        }

        // a document is published whole or not at all
        let mut saved: Vec<PathBuf> = Vec::with_capacity(pending.len());
        for (idx, (temp, target)) in pending.iter().enumerate() {
            if let Err(e) = fs::rename(temp, target) {
                for path in &saved {
                    let _ = fs::remove_file(path);
                }
                discard(&pending[idx..]);
                return Err(AppError::per_document(&doc.id, e));
            }
            saved.push(target.clone());
        }

        tracing::debug!("Saved {} files for {}", saved.len(), doc.id);
        Ok(saved)
    }
}

fn temp_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_os_string();
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}

fn write_flushed(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

fn discard(pending: &[(PathBuf, PathBuf)]) {
    for (temp, _) in pending {
        let _ = fs::remove_file(temp);
    }
}

fn remove_stale_temp_files(dir: &Path) -> AppResult<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_temp = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(TEMP_SUFFIX));
        if is_temp {
            tracing::debug!("Removing stale {}", path.display());
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}

/// Output file stems (`{id}_{section}`) found in `dir`.
fn output_stems(dir: &Path) -> AppResult<Vec<String>> {
    let mut stems = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(OUTPUT_EXTENSION) {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            stems.push(stem.to_string());
        }
    }
    Ok(stems)
}

/// Maps file stems back to the known document id that produced them.
///
/// File names are `{sanitize(id)}_{section}`; a stem belongs to the known id
/// with the longest sanitized form that prefixes it followed by `_`.
struct IdMatcher<'a> {
    candidates: Vec<(String, &'a String)>,
}

impl<'a> IdMatcher<'a> {
    fn new(known_ids: &'a [String]) -> Self {
        let mut candidates: Vec<(String, &'a String)> = known_ids
            .iter()
            .map(|id| (format!("{}_", sanitize_name(id)), id))
            .collect();
        candidates.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        Self { candidates }
    }

    fn owner(&self, stem: &str) -> Option<&'a String> {
        self.candidates
            .iter()
            .find(|(prefix, _)| stem.starts_with(prefix.as_str()))
            .map(|(_, id)| *id)
    }
}

/// Document ids from `known_ids` that already have output in `dir`.
///
/// A missing directory yields an empty set.
pub fn existing_document_ids(dir: &Path, known_ids: &[String]) -> AppResult<HashSet<String>> {
    let mut found = HashSet::new();
    if !dir.is_dir() {
        return Ok(found);
    }

    let matcher = IdMatcher::new(known_ids);
    for stem in output_stems(dir)? {
        if let Some(id) = matcher.owner(&stem) {
            found.insert(id.clone());
        }
    }

    Ok(found)
}

/// Document ids from `known_ids` that still own temp output files in `dir`.
///
/// Such a document was being saved when a previous run stopped, so any of
/// its outputs that were already renamed into place are incomplete.
pub fn interrupted_document_ids(dir: &Path, known_ids: &[String]) -> AppResult<HashSet<String>> {
    let mut found = HashSet::new();
    if !dir.is_dir() {
        return Ok(found);
    }

    let output_suffix = format!(".{}{}", OUTPUT_EXTENSION, TEMP_SUFFIX);
    let matcher = IdMatcher::new(known_ids);
    for entry in fs::read_dir(dir)? {
        let name = entry?.file_name();
        let Some(stem) = name.to_str().and_then(|n| n.strip_suffix(output_suffix.as_str())) else {
            continue;
        };
        if let Some(id) = matcher.owner(stem) {
            found.insert(id.clone());
        }
    }

    Ok(found)
}

/// Delete every published output file that belongs to `document_id`.
fn remove_document_outputs(dir: &Path, document_id: &str, known_ids: &[String]) -> AppResult<()> {
    let matcher = IdMatcher::new(known_ids);
    for stem in output_stems(dir)? {
        if matcher.owner(&stem).is_some_and(|id| id == document_id) {
            let path = dir.join(format!("{}.{}", stem, OUTPUT_EXTENSION));
            tracing::debug!("Removing incomplete {}", path.display());
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}

/// Zip every output file in `dir` into `ARCHIVE_NAME`.
///
/// Returns the archive path and the number of files it holds.
pub fn create_archive(dir: &Path) -> AppResult<(PathBuf, usize)> {
    let archive_path = dir.join(ARCHIVE_NAME);
    let temp = temp_path(&archive_path);

    let mut stems = output_stems(dir)?;
    stems.sort();

    let file = File::create(&temp)?;
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for stem in &stems {
        let name = format!("{}.{}", stem, OUTPUT_EXTENSION);
        let bytes = fs::read(dir.join(&name))?;
        zip.start_file(name.as_str(), options)
            .map_err(|e| AppError::Archive(e.to_string()))?;
        zip.write_all(&bytes)?;
    }

    zip.finish().map_err(|e| AppError::Archive(e.to_string()))?;
    fs::rename(&temp, &archive_path)?;

    tracing::info!("Archived {} files into {}", stems.len(), archive_path.display());
    Ok((archive_path, stems.len()))
}
