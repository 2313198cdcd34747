#![warn(clippy::pedantic)]

use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use human_panic::setup_panic;

use event_dates::commands::{self, OutputFormat};
use event_dates::config;
use event_dates::context::AppContext;
use event_dates::event::EventCategory;
use event_dates::normalize::parse_iso_local;

/// Normalize free-text event date phrases into canonical local timestamps
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(long, default_value = "~/.config/event-dates/config.toml")]
    config_path: PathBuf,

    /// Reference instant to resolve phrases against (e.g., 2025-06-01T12:00), defaults to now
    #[arg(long, value_parser = parse_reference)]
    now: Option<NaiveDateTime>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Normalize one or more date phrases
    Normalize {
        /// Date phrases to normalize
        #[arg(required = true)]
        phrases: Vec<String>,

        /// Event category, used for default times when enabled in the configuration
        #[arg(long)]
        category: Option<EventCategory>,

        /// Output format
        #[arg(long, default_value = "pretty")]
        format: OutputFormat,
    },

    /// Build an event record from extractor JSON
    Assemble {
        /// File to read the extracted event from, defaults to stdin
        #[arg(long)]
        input: Option<PathBuf>,

        /// Output format
        #[arg(long, default_value = "pretty")]
        format: OutputFormat,

        /// If set, prompts for a date when none of the phrases parse
        #[arg(long)]
        interactive: bool,

        /// If set, fails when the record is missing a title, date or location
        #[arg(long)]
        strict: bool,
    },
}

fn parse_reference(s: &str) -> Result<NaiveDateTime, String> {
    parse_iso_local(s).ok_or_else(|| format!("expected a local ISO-8601 datetime, got {s:?}"))
}

fn expand_homedir(path: &Path) -> anyhow::Result<PathBuf> {
    let path = path.to_string_lossy();
    if !path.starts_with('~') {
        return Ok(PathBuf::from(path.as_ref()));
    }
    Ok(path
        .replacen('~', &env::var("HOME").context("HOME is not set")?, 1)
        .into())
}

fn main() -> anyhow::Result<()> {
    setup_panic!();
    env_logger::init();

    log::debug!("Parsing command line arguments...");
    let args = Args::parse();
    log::trace!("Parsed command line arguments: {args:#?}");

    let config_path = expand_homedir(&args.config_path)?;
    let config = config::load(&config_path)?;

    let mut ctx = AppContext::new(config, args.now);

    match args.command {
        Command::Normalize {
            phrases,
            category,
            format,
        } => commands::normalize::run(&mut ctx, &phrases, category, format),
        Command::Assemble {
            input,
            format,
            interactive,
            strict,
        } => commands::assemble::run(&mut ctx, input.as_deref(), format, interactive, strict),
    }
}
