//! Batch command handler.
//!
//! Converts whole collections; a directory input converts every `.xml`
//! collection below it, each into its own subdirectory of the output.

use bioc_convert::naming::sanitize_name;
use bioc_convert::{
    BatchDriver, BatchOptions, BatchSummary, BiocCollection, Converter, ProgressEvent,
    ProgressReporter, UnicodeSegmenter,
};
use bioc_core::{config::AppConfig, AppError, AppResult};
use clap::Args;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

use super::{convert_options, print_json, resolve_by_sections, resolve_pretty};

/// Convert whole collections
#[derive(Args, Debug)]
pub struct BatchCommand {
    /// BioC XML collection file, or a directory of them
    pub input: PathBuf,

    /// Output directory
    #[arg(short, long)]
    pub output_dir: PathBuf,

    /// One output file per section
    #[arg(long, conflicts_with = "combined")]
    pub by_sections: bool,

    /// One output file per document
    #[arg(long)]
    pub combined: bool,

    /// Reconvert documents that already have output
    #[arg(long)]
    pub no_resume: bool,

    /// Zip the outputs when done
    #[arg(long)]
    pub archive: bool,

    /// Only convert these document ids
    #[arg(long, value_delimiter = ',')]
    pub ids: Vec<String>,

    /// Compact JSON
    #[arg(long)]
    pub compact: bool,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

impl BatchCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing batch command for {:?}", self.input);

        let inputs = collection_files(&self.input)?;
        let multiple = self.input.is_dir();

        let mut results = Vec::with_capacity(inputs.len());
        for path in &inputs {
            let output_dir = if multiple {
                let stem = path.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
                self.output_dir.join(sanitize_name(&stem))
            } else {
                self.output_dir.clone()
            };

            let summary = self.run_collection(config, path, output_dir)?;
            results.push((path.clone(), summary));
        }

        if self.json {
            let entries: Vec<serde_json::Value> = results
                .iter()
                .map(|(path, summary)| {
                    serde_json::json!({
                        "collection": path,
                        "summary": summary,
                    })
                })
                .collect();
            print_json(&serde_json::Value::Array(entries))?;
        } else {
            for (path, summary) in &results {
                print_summary(path, summary);
            }
        }

        Ok(())
    }

    fn run_collection(&self, config: &AppConfig, path: &Path, output_dir: PathBuf) -> AppResult<BatchSummary> {
        let by_sections = resolve_by_sections(self.by_sections, self.combined, config);
        let collection = BiocCollection::from_path(path)?;

        let converter = Converter::new(UnicodeSegmenter::new(), convert_options(config, by_sections)?);
        let options = BatchOptions {
            output_dir,
            resume: !self.no_resume && config.output.resume,
            archive: self.archive || config.output.archive,
            pretty: resolve_pretty(false, self.compact, config),
            document_ids: (!self.ids.is_empty()).then(|| self.ids.clone()),
        };

        let mut driver = BatchDriver::new(converter, options);
        if !self.json {
            driver = driver.with_progress(ProgressReporter::new(Arc::new(|event: ProgressEvent| {
                eprintln!("{}", event.format_simple());
            })));
        }

        driver.run(&collection)
    }
}

/// Collection files for a file or directory input.
fn collection_files(input: &Path) -> AppResult<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        return Err(AppError::NotFound(format!("Input does not exist: {:?}", input)));
    }

    let mut files: Vec<PathBuf> = WalkDir::new(input)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("xml"))
        })
        .collect();
    files.sort();

    tracing::info!("Found {} collection files under {:?}", files.len(), input);
    Ok(files)
}

fn print_summary(path: &Path, summary: &BatchSummary) {
    println!(
        "{}: {} processed, {} skipped, {} failed ({} files written)",
        path.display(),
        summary.processed,
        summary.skipped,
        summary.failed.len(),
        summary.saved_files.len()
    );
    for failed in &summary.failed {
        println!("  failed {}: {}", failed.id, failed.reason);
    }
    if let Some(archive) = &summary.archive {
        println!("  archive: {}", archive.display());
    }
}
