//! BioC to Odinson conversion.
//!
//! Loads BioC XML collections, merges each document's passages into one
//! text, splits it into sentences tagged with their section and entity
//! annotations, and writes Odinson document JSON.

pub mod assembly;
pub mod assign;
pub mod batch;
pub mod convert;
pub mod loader;
pub mod metadata;
pub mod naming;
pub mod odinson;
pub mod progress;
pub mod projection;
pub mod sections;
pub mod segment;
pub mod spans;
pub mod text;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use batch::{BatchDriver, BatchOptions, BatchSummary, FailedDocument};
pub use convert::{render_groups, render_sentences, ConvertOptions, Converter, RenderedFile};
pub use loader::BiocCollection;
pub use progress::{DocumentStatus, ProgressEvent, ProgressReporter};
pub use segment::{SentenceSegmenter, UnicodeSegmenter};
pub use types::{
    AssembledDocument, ConvertedDocument, DocumentSource, Passage, RawSpan, SectionGroup,
    SectionRange, SectionedSentence, SentenceSpan, SourceDocument, Token,
};
