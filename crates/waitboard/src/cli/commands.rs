//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

/// Submit command arguments.
#[derive(Debug, Args)]
pub struct SubmitCommand {
    /// Current wait time in minutes
    #[arg(allow_negative_numbers = true)]
    pub minutes: i64,
}

/// Report command arguments.
#[derive(Debug, Args)]
pub struct ReportCommand {
    /// Override the trailing window length in hours
    #[arg(short = 'w', long)]
    pub window_hours: Option<u32>,

    /// Override the chart bucket width in hours
    #[arg(short, long)]
    pub bucket_hours: Option<u32>,

    /// Also print the raw observations in the window
    #[arg(short, long)]
    pub raw: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Clear command arguments.
#[derive(Debug, Args)]
pub struct ClearCommand {
    /// Confirm removal of every stored wait time
    #[arg(short, long)]
    pub yes: bool,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text with a bar chart
    #[default]
    Plain,
    /// JSON output
    Json,
}
