//! bioc2odin CLI
//!
//! Main entry point for the bioc2odin command-line tool.
//! Converts BioC XML collections into Odinson annotated documents.

mod commands;

use bioc_core::{config::AppConfig, logging, AppResult};
use clap::{Parser, Subcommand};
use commands::{BatchCommand, ConvertCommand, InspectCommand};
use std::path::PathBuf;

/// bioc2odin - BioC XML to Odinson document conversion
#[derive(Parser, Debug)]
#[command(name = "bioc2odin")]
#[command(about = "Convert BioC XML collections into Odinson documents", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, env = "BIOC2ODIN_CONFIG")]
    config: Option<PathBuf>,

    /// Section filter file (JSON or YAML)
    #[arg(long, global = true, env = "BIOC2ODIN_SECTION_CONFIG")]
    section_config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert a single document
    Convert(ConvertCommand),

    /// Convert whole collections, resuming interrupted runs
    Batch(BatchCommand),

    /// Show a collection or document overview
    Inspect(InspectCommand),
}

fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    let config = AppConfig::load_with(cli.config.as_deref())?.with_overrides(
        cli.section_config,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("bioc2odin starting");
    tracing::debug!("Config file: {:?}", config.config_file);
    tracing::debug!("Section config: {:?}", config.section_config);

    let command_name = match &cli.command {
        Commands::Convert(_) => "convert",
        Commands::Batch(_) => "batch",
        Commands::Inspect(_) => "inspect",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Convert(cmd) => cmd.execute(&config),
        Commands::Batch(cmd) => cmd.execute(&config),
        Commands::Inspect(cmd) => cmd.execute(),
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
