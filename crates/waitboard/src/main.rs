//! `waitboard` - CLI for wait-time reporting
//!
//! This binary is the presentation layer: it parses commands, calls the
//! storage gateway and aggregation engine, and prints the results.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::Path;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;

use waitboard::cli::{
    ClearCommand, Cli, Command, ConfigCommand, OutputFormat, ReportCommand, StatusCommand,
};
use waitboard::{init_logging, render, Config, Dashboard, Storage, Window};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    // Loaded per command so `config path` and `config validate` still work
    // when the default configuration is broken.
    let load_config = || Config::load_from(cli.config.clone()).context("loading configuration");
    let database_path = |config: &Config| {
        cli.database
            .clone()
            .unwrap_or_else(|| config.database_path())
    };

    match &cli.command {
        Command::Submit(cmd) => {
            let config = load_config()?;
            let dashboard = open_dashboard(&database_path(&config), config.window()?)?;
            let observation = dashboard
                .submit(cmd.minutes)
                .context("submitting wait time")?;
            println!("{}", render::submitted(&observation));
        }
        Command::Report(cmd) => {
            let config = load_config()?;
            handle_report(&config, &database_path(&config), cmd)?;
        }
        Command::Clear(cmd) => {
            let config = load_config()?;
            handle_clear(&config, &database_path(&config), cmd)?;
        }
        Command::Status(cmd) => {
            let config = load_config()?;
            handle_status(&database_path(&config), cmd)?;
        }
        Command::Config(ConfigCommand::Show { json }) => show_config(&load_config()?, *json)?,
        Command::Config(ConfigCommand::Path) => println!("{}", cli.config_file().display()),
        Command::Config(ConfigCommand::Validate { .. }) => validate_config(&cli.config_file())?,
    }

    Ok(())
}

fn open_dashboard(path: &Path, window: Window) -> anyhow::Result<Dashboard> {
    let storage = Storage::open(path)
        .with_context(|| format!("opening database {}", path.display()))?;
    Ok(Dashboard::new(storage, window))
}

fn handle_report(config: &Config, path: &Path, cmd: &ReportCommand) -> anyhow::Result<()> {
    let window = Window::new(
        cmd.window_hours.unwrap_or(config.report.window_hours),
        cmd.bucket_hours.unwrap_or(config.report.bucket_hours),
    )?;
    let dashboard = open_dashboard(path, window)?;

    let report = dashboard
        .report(Utc::now())
        .context("reading wait times")?;

    match cmd.format {
        OutputFormat::Plain => print!("{}", render::report(&report, cmd.raw)),
        OutputFormat::Json => {
            if cmd.raw {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", serde_json::to_string_pretty(&report.summary)?);
            }
        }
    }
    Ok(())
}

fn handle_clear(config: &Config, path: &Path, cmd: &ClearCommand) -> anyhow::Result<()> {
    if !cmd.yes {
        println!("This will permanently remove every stored wait time.");
        println!("Use --yes to confirm.");
        return Ok(());
    }

    let dashboard = open_dashboard(path, config.window()?)?;
    let removed = dashboard.clear().context("clearing wait times")?;
    println!("{}", render::cleared(removed));
    Ok(())
}

fn handle_status(path: &Path, cmd: &StatusCommand) -> anyhow::Result<()> {
    let storage = Storage::open(path)
        .with_context(|| format!("opening database {}", path.display()))?;
    let stats = storage.stats().context("reading database statistics")?;

    if cmd.json {
        let status = serde_json::json!({
            "database_path": storage.path(),
            "total_observations": stats.total_observations,
            "oldest_observation": stats.oldest_observation,
            "newest_observation": stats.newest_observation,
            "db_size_bytes": stats.db_size_bytes,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        let fmt_ts = |ts: Option<chrono::DateTime<Utc>>| {
            ts.map_or_else(
                || "-".to_string(),
                |t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            )
        };
        println!("waitboard status");
        println!("----------------");
        println!("Database:      {}", storage.path().display());
        println!("Observations:  {}", stats.total_observations);
        println!("Oldest:        {}", fmt_ts(stats.oldest_observation));
        println!("Newest:        {}", fmt_ts(stats.newest_observation));
        println!("Size:          {} bytes", stats.db_size_bytes);
    }
    Ok(())
}

fn show_config(config: &Config, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(config)?);
    } else {
        println!("Current Configuration");
        println!("=====================");
        println!();
        println!("[Storage]");
        println!("  Database path:      {}", config.database_path().display());
        println!();
        println!("[Report]");
        println!("  Window (hours):     {}", config.report.window_hours);
        println!("  Bucket (hours):     {}", config.report.bucket_hours);
    }
    Ok(())
}

fn validate_config(path: &Path) -> anyhow::Result<()> {
    println!("Validating configuration: {}", path.display());
    match Config::load_from(Some(path.to_path_buf())) {
        Ok(_) => println!("Configuration is valid."),
        Err(e) => anyhow::bail!("configuration error: {e}"),
    }
    Ok(())
}
