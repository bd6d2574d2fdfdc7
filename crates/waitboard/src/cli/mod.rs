//! Command-line interface for waitboard.
//!
//! This module provides the CLI structure for the `waitboard` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ClearCommand, ConfigCommand, OutputFormat, ReportCommand, StatusCommand, SubmitCommand,
};

use crate::config::Config;
use crate::logging::Verbosity;

/// waitboard - Report and review queue wait times
///
/// Submit the wait you are seeing now, then view hourly averages over the
/// last few hours.
#[derive(Debug, Parser)]
#[command(name = "waitboard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Path to the database file (overrides configuration)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub database: Option<PathBuf>,

    /// Increase verbosity (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Submit a current wait time
    Submit(SubmitCommand),

    /// Show average wait times over the trailing window
    Report(ReportCommand),

    /// Remove every stored wait time
    Clear(ClearCommand),

    /// Show database status
    Status(StatusCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }

    /// The configuration file this invocation refers to.
    ///
    /// `config validate --file` wins over the global `--config`, which wins
    /// over the default location.
    #[must_use]
    pub fn config_file(&self) -> PathBuf {
        let validate_file = match &self.command {
            Command::Config(ConfigCommand::Validate { file }) => file.clone(),
            _ => None,
        };
        validate_file
            .or_else(|| self.config.clone())
            .unwrap_or_else(Config::default_config_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "waitboard");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_submit() {
        let cli = Cli::try_parse_from(["waitboard", "submit", "25"]).unwrap();
        match cli.command {
            Command::Submit(cmd) => assert_eq!(cmd.minutes, 25),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_submit_negative_reaches_core() {
        let cli = Cli::try_parse_from(["waitboard", "submit", "-1"]).unwrap();
        match cli.command {
            Command::Submit(cmd) => assert_eq!(cmd.minutes, -1),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_submit_rejects_non_integer() {
        assert!(Cli::try_parse_from(["waitboard", "submit", "ten"]).is_err());
        assert!(Cli::try_parse_from(["waitboard", "submit", "2.5"]).is_err());
    }

    #[test]
    fn test_parse_report_defaults() {
        let cli = Cli::try_parse_from(["waitboard", "report"]).unwrap();
        match cli.command {
            Command::Report(cmd) => {
                assert!(cmd.window_hours.is_none());
                assert!(cmd.bucket_hours.is_none());
                assert!(!cmd.raw);
                assert_eq!(cmd.format, OutputFormat::Plain);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_report_options() {
        let cli = Cli::try_parse_from([
            "waitboard", "report", "-w", "12", "-b", "2", "--raw", "-f", "json",
        ])
        .unwrap();
        match cli.command {
            Command::Report(cmd) => {
                assert_eq!(cmd.window_hours, Some(12));
                assert_eq!(cmd.bucket_hours, Some(2));
                assert!(cmd.raw);
                assert_eq!(cmd.format, OutputFormat::Json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_clear_requires_flag_for_confirmation() {
        let cli = Cli::try_parse_from(["waitboard", "clear"]).unwrap();
        assert!(matches!(cli.command, Command::Clear(ClearCommand { yes: false })));

        let cli = Cli::try_parse_from(["waitboard", "clear", "--yes"]).unwrap();
        assert!(matches!(cli.command, Command::Clear(ClearCommand { yes: true })));
    }

    #[test]
    fn test_parse_with_config_and_database() {
        let cli = Cli::try_parse_from([
            "waitboard",
            "-c",
            "/custom/config.toml",
            "--database",
            "/tmp/w.db",
            "status",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
        assert_eq!(cli.database, Some(PathBuf::from("/tmp/w.db")));
    }

    #[test]
    fn test_verbosity_flags() {
        let cli = Cli::try_parse_from(["waitboard", "-vv", "status"]).unwrap();
        assert_eq!(cli.verbosity(), Verbosity::Trace);

        let cli = Cli::try_parse_from(["waitboard", "-q", "status"]).unwrap();
        assert_eq!(cli.verbosity(), Verbosity::Quiet);
    }

    #[test]
    fn test_config_file_prefers_validate_file() {
        let cli = Cli::try_parse_from([
            "waitboard",
            "-c",
            "/broken/config.toml",
            "config",
            "validate",
            "--file",
            "other.toml",
        ])
        .unwrap();
        assert_eq!(cli.config_file(), PathBuf::from("other.toml"));
    }

    #[test]
    fn test_config_file_falls_back_to_global_then_default() {
        let cli =
            Cli::try_parse_from(["waitboard", "-c", "/custom/config.toml", "config", "validate"])
                .unwrap();
        assert_eq!(cli.config_file(), PathBuf::from("/custom/config.toml"));

        let cli = Cli::try_parse_from(["waitboard", "config", "path"]).unwrap();
        assert_eq!(cli.config_file(), Config::default_config_path());
    }

    #[test]
    fn test_parse_config_show() {
        let cli = Cli::try_parse_from(["waitboard", "config", "show", "--json"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Show { json: true })
        ));
    }
}
