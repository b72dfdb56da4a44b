//! Command handlers for the bioc2odin CLI.

pub mod batch;
pub mod convert;
pub mod inspect;

pub use batch::BatchCommand;
pub use convert::ConvertCommand;
pub use inspect::InspectCommand;

use bioc_convert::ConvertOptions;
use bioc_core::{config::AppConfig, AppError, AppResult};

/// Resolve `--by-sections` / `--combined` against the configured default.
pub(crate) fn resolve_by_sections(by_sections: bool, combined: bool, config: &AppConfig) -> bool {
    if combined {
        false
    } else {
        by_sections || config.output.by_sections
    }
}

/// Resolve `--pretty` / `--compact` against the configured default.
pub(crate) fn resolve_pretty(pretty: bool, compact: bool, config: &AppConfig) -> bool {
    if compact {
        false
    } else {
        pretty || config.output.pretty
    }
}

pub(crate) fn convert_options(config: &AppConfig, by_sections: bool) -> AppResult<ConvertOptions> {
    Ok(ConvertOptions {
        section_filter: config.section_filter()?,
        by_sections,
        ..ConvertOptions::default()
    })
}

pub(crate) fn print_json(value: &serde_json::Value) -> AppResult<()> {
    let output = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::Serialization(format!("JSON serialization failed: {}", e)))?;
    println!("{}", output);
    Ok(())
}
