//! Inspect command handler.

use bioc_convert::BiocCollection;
use bioc_core::AppResult;
use clap::Args;
use std::path::PathBuf;

use super::print_json;

/// Show a collection or document overview
#[derive(Args, Debug)]
pub struct InspectCommand {
    /// BioC XML collection file
    pub file: PathBuf,

    /// Show one document instead of the collection
    #[arg(short, long)]
    pub document: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl InspectCommand {
    pub fn execute(&self) -> AppResult<()> {
        tracing::info!("Executing inspect command for {:?}", self.file);

        let collection = BiocCollection::from_path(&self.file)?;

        match &self.document {
            Some(id) => {
                let info = collection.document_info(id)?;
                if self.json {
                    print_json(&serde_json::to_value(&info)?)?;
                } else {
                    println!("Document: {} (output id {})", info.id, info.output_id);
                    println!("Passages: {}", info.passage_count);
                    println!("Annotations: {}", info.annotation_count);
                    println!("Text length: {} characters", info.text_length);
                    println!("Sections: {}", info.section_hints.join(", "));
                }
            }
            None => {
                let summary = collection.summary();
                if self.json {
                    print_json(&serde_json::to_value(&summary)?)?;
                } else {
                    println!(
                        "Collection: {} ({})",
                        summary.source.as_deref().unwrap_or("unknown source"),
                        summary.date.as_deref().unwrap_or("no date")
                    );
                    println!("Documents: {}", summary.document_count);
                    println!("Passages: {}", summary.total_passages);
                    println!("Annotations: {}", summary.total_annotations);
                    for id in summary.document_ids.iter().take(10) {
                        println!("  {}", id);
                    }
                    if summary.document_count > 10 {
                        println!("  ... and {} more", summary.document_count - 10);
                    }
                }
            }
        }

        Ok(())
    }
}
