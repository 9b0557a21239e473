//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Parcel Tally - per-municipality offset summary for selected parcels
///
/// Loads a reporting page's parcel and baseline impact payloads, replays
/// parcel checkbox toggles through the aggregation engine and writes the
/// resulting municipality summary table.
///
/// Examples:
///   parcel-tally --parcels parcels.json --baseline impacts.json --toggle P1,P2
///   parcel-tally --parcels parcels.json --events toggles.json --format html
///   parcel-tally --parcels parcels.json --toggle P1 --toggle P1 --show-diffs
///   parcel-tally --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Parcel data JSON file
    ///
    /// Shape: {"<parcel id>": {"municipalities": {"<name>": <fraction>}, "<prefix>": <value>}}
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "PARCEL_TALLY_PARCELS",
        required_unless_present = "init_config"
    )]
    pub parcels: Option<PathBuf>,

    /// Baseline impact JSON file
    ///
    /// Shape: {"<name>": {"pop": <number>, "impacts": {"<category>_impact": <value>}}}
    #[arg(short, long, value_name = "FILE", env = "PARCEL_TALLY_BASELINE")]
    pub baseline: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .parcel-tally.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Parcel checkboxes to toggle, in order (comma-separated, repeatable)
    ///
    /// Each occurrence flips the parcel's checkbox: the first checks it,
    /// the next unchecks it.
    #[arg(short, long, value_name = "IDS", value_delimiter = ',')]
    pub toggle: Vec<String>,

    /// JSON file of toggle events: [{"parcel": "P1", "checked": true}, ...]
    ///
    /// Replayed before any --toggle.
    #[arg(long, value_name = "FILE")]
    pub events: Option<PathBuf>,

    /// Output file path for the summary
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json, html)
    ///
    /// Without --output, the configured output file takes this format's extension.
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Fade removed rows out over this many milliseconds
    ///
    /// Rows removed by the last toggle stay in the output marked as fading.
    #[arg(long, value_name = "MS")]
    pub fade: Option<u64>,

    /// Leave out the "Selected Total" row
    #[arg(long)]
    pub no_selected_total: bool,

    /// Print every diff produced by the engine
    #[arg(long)]
    pub show_diffs: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .parcel-tally.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the summary.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown table (default)
    #[default]
    Markdown,
    /// JSON document
    Json,
    /// HTML table
    Html,
}

impl OutputFormat {
    /// Conventional file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Json => "json",
            OutputFormat::Html => "html",
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        match self.parcels {
            None => return Err("--parcels is required".to_string()),
            Some(ref path) if !path.is_file() => {
                return Err(format!("Parcel data file does not exist: {}", path.display()));
            }
            Some(_) => {}
        }

        if let Some(ref path) = self.baseline {
            if !path.is_file() {
                return Err(format!(
                    "Baseline impact file does not exist: {}",
                    path.display()
                ));
            }
        }

        if let Some(ref path) = self.events {
            if !path.is_file() {
                return Err(format!("Events file does not exist: {}", path.display()));
            }
        }

        if self.toggle.iter().any(|id| id.trim().is_empty()) {
            return Err("Toggled parcel ids must not be empty".to_string());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }
}
