//! bioc2odin Core Library
//!
//! This crate provides the foundational utilities shared by the converter
//! and the command-line front end:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Configuration management (application settings, section filters)

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::{AppConfig, SectionFilterConfig};
pub use error::{AppError, AppResult};
