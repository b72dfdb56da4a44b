//! Configuration management for bioc2odin.
//!
//! Configuration is merged from several sources, lowest precedence first:
//! - Built-in defaults
//! - A YAML config file (`BIOC2ODIN_CONFIG`, or `.bioc2odin.yaml` in the
//!   current directory)
//! - Environment variables
//! - Command-line flags
//!
//! The section filter lives in its own small JSON/YAML file so it can be
//! shared between runs with different output settings.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Default config file looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = ".bioc2odin.yaml";

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Config file that was merged, if any
    pub config_file: Option<PathBuf>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Path to the section filter file
    pub section_config: Option<PathBuf>,

    /// Output behavior shared by the convert and batch commands
    pub output: OutputSettings,
}

/// Output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSettings {
    /// One output document per section instead of one per source document
    #[serde(default = "default_true")]
    pub by_sections: bool,

    /// Skip documents whose output files already exist
    #[serde(default = "default_true")]
    pub resume: bool,

    /// Bundle persisted files into a single archive at the end of a run
    #[serde(default)]
    pub archive: bool,

    /// Pretty-print JSON output
    #[serde(default = "default_true")]
    pub pretty: bool,
}

fn default_true() -> bool {
    true
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            by_sections: true,
            resume: true,
            archive: false,
            pretty: true,
        }
    }
}

/// Section filter configuration.
///
/// Labels not on `allowed_labels` are remapped to `OTHER` before sections are
/// merged. When `case_sensitive` is false the labels are stored upper-cased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionFilterConfig {
    #[serde(default, alias = "allowed_sections")]
    pub allowed_labels: Vec<String>,

    #[serde(default)]
    pub case_sensitive: bool,
}

impl SectionFilterConfig {
    /// Build a filter, normalizing labels for case-insensitive matching.
    pub fn new(allowed_labels: Vec<String>, case_sensitive: bool) -> Self {
        let allowed_labels = if case_sensitive {
            allowed_labels
        } else {
            allowed_labels.iter().map(|l| l.to_uppercase()).collect()
        };
        Self {
            allowed_labels,
            case_sensitive,
        }
    }

    /// Check whether a raw section label is on the allow-list.
    pub fn allows(&self, label: &str) -> bool {
        if self.case_sensitive {
            self.allowed_labels.iter().any(|l| l == label)
        } else {
            let upper = label.to_uppercase();
            self.allowed_labels.iter().any(|l| *l == upper)
        }
    }
}

/// Config file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    logging: Option<LoggingConfig>,
    sections: Option<SectionsConfig>,
    output: Option<OutputSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SectionsConfig {
    config: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            log_level: None,
            verbose: false,
            no_color: false,
            section_config: None,
            output: OutputSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the config file, environment variables and defaults.
    ///
    /// Environment variables:
    /// - `BIOC2ODIN_CONFIG`: Path to config file
    /// - `BIOC2ODIN_SECTION_CONFIG`: Path to section filter file
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        Self::load_with(None)
    }

    /// Like `load`, but an explicit config file wins over `BIOC2ODIN_CONFIG`.
    pub fn load_with(config_file: Option<&Path>) -> AppResult<Self> {
        let explicit = config_file
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os("BIOC2ODIN_CONFIG").map(PathBuf::from));
        let mut config = Self::load_from(explicit.as_deref())?;

        if let Ok(section_config) = std::env::var("BIOC2ODIN_SECTION_CONFIG") {
            config.section_config = Some(PathBuf::from(section_config));
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var_os("NO_COLOR").is_some() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Load defaults merged with a config file, without consulting the environment.
    ///
    /// An explicitly named file must exist; the default file is optional.
    pub fn load_from(config_file: Option<&Path>) -> AppResult<Self> {
        let config = Self::default();

        match config_file {
            Some(path) => {
                if !path.exists() {
                    return Err(AppError::NotFound(format!(
                        "Config file does not exist: {:?}",
                        path
                    )));
                }
                config.merge_yaml(path)
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    config.merge_yaml(&default_path)
                } else {
                    Ok(config)
                }
            }
        }
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::MalformedInput(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();
        result.config_file = Some(path.to_path_buf());

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(sections) = config_file.sections {
            if let Some(section_config) = sections.config {
                result.section_config = Some(section_config);
            }
        }

        if let Some(output) = config_file.output {
            result.output = output;
        }

        tracing::debug!("Merged config file {:?}", path);
        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over the config file and environment.
    pub fn with_overrides(
        mut self,
        section_config: Option<PathBuf>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(section_config) = section_config {
            self.section_config = Some(section_config);
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Load the configured section filter, if any.
    pub fn section_filter(&self) -> AppResult<Option<SectionFilterConfig>> {
        match &self.section_config {
            Some(path) => load_section_config(path),
            None => Ok(None),
        }
    }
}

/// Load a section filter file (JSON or YAML).
///
/// A missing file is not an error: a warning is logged and every section is
/// kept. A file with an invalid structure is `MalformedInput`.
pub fn load_section_config(path: &Path) -> AppResult<Option<SectionFilterConfig>> {
    if !path.exists() {
        tracing::warn!(
            "Section config file not found: {:?}. Processing all sections.",
            path
        );
        return Ok(None);
    }

    let contents = std::fs::read_to_string(path)?;
    let raw: SectionFilterConfig = serde_yaml::from_str(&contents).map_err(|e| {
        AppError::MalformedInput(format!("Invalid section config {:?}: {}", path, e))
    })?;

    let config = SectionFilterConfig::new(raw.allowed_labels, raw.case_sensitive);
    tracing::debug!(
        "Loaded section filter with {} allowed labels (case_sensitive={})",
        config.allowed_labels.len(),
        config.case_sensitive
    );
    Ok(Some(config))
}
