//! Convert command handler.
//!
//! Converts one document of a collection.

use bioc_convert::batch::create_archive;
use bioc_convert::{render_groups, render_sentences, BiocCollection, Converter, UnicodeSegmenter};
use bioc_core::{config::AppConfig, AppResult};
use clap::Args;
use std::path::{Path, PathBuf};

use super::{convert_options, print_json, resolve_by_sections, resolve_pretty};

/// Convert a single document
#[derive(Args, Debug)]
pub struct ConvertCommand {
    /// BioC XML collection file
    pub file: PathBuf,

    /// BioC document id
    #[arg(short, long)]
    pub document: String,

    /// Output file; with --by-sections, files are written next to it
    #[arg(short, long)]
    pub output: PathBuf,

    /// One output file per section
    #[arg(long, conflicts_with = "combined")]
    pub by_sections: bool,

    /// A single output file for the whole document
    #[arg(long)]
    pub combined: bool,

    /// One output file per sentence, written next to the output file
    #[arg(long)]
    pub per_sentence: bool,

    /// Zip the output directory's documents when done
    #[arg(long)]
    pub archive: bool,

    /// Pretty-print JSON
    #[arg(long, conflicts_with = "compact")]
    pub pretty: bool,

    /// Compact JSON
    #[arg(long)]
    pub compact: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

impl ConvertCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!(
            "Executing convert command for document '{}' in {:?}",
            self.document,
            self.file
        );

        let by_sections = resolve_by_sections(self.by_sections, self.combined, config);
        let pretty = resolve_pretty(self.pretty, self.compact, config);

        let doc = BiocCollection::load(&self.file, &self.document)?;
        let converter = Converter::new(UnicodeSegmenter::new(), convert_options(config, by_sections)?);
        let converted = converter.convert(doc)?;
        let rendered = if self.per_sentence {
            render_sentences(&converted, pretty)?
        } else {
            render_groups(&converted, pretty)?
        };

        let out_dir = output_dir(&self.output);
        std::fs::create_dir_all(&out_dir)?;

        let mut written = Vec::with_capacity(rendered.len());
        for file in &rendered {
            let path = if by_sections || self.per_sentence {
                out_dir.join(&file.file_name)
            } else {
                self.output.clone()
            };
            std::fs::write(&path, &file.bytes)?;
            tracing::debug!("Wrote {:?}", path);
            written.push(path);
        }

        let archive = if self.archive || config.output.archive {
            Some(create_archive(&out_dir)?.0)
        } else {
            None
        };

        if self.json {
            print_json(&serde_json::json!({
                "document": converted.source_id,
                "docId": converted.doc_id,
                "sentences": converted.total_sentences(),
                "sections": converted.section_labels(),
                "files": written,
                "archive": archive,
            }))?;
        } else {
            println!(
                "Converted {} ({} sentences) into {} file(s)",
                converted.doc_id,
                converted.total_sentences(),
                written.len()
            );
            for path in &written {
                println!("  {}", path.display());
            }
            if let Some(archive) = archive {
                println!("Archive: {}", archive.display());
            }
        }

        Ok(())
    }
}

fn output_dir(output: &Path) -> PathBuf {
    match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
