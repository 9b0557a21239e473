//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.parcel-tally.toml` files. The `[table]` section declares the summary
//! table columns, which is where category wiring comes from.

use crate::cli::OutputFormat;
use crate::models::{ColumnKind, ColumnSpec};
use crate::report::RemovalMode;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".parcel-tally.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Summary table layout.
    #[serde(default)]
    pub table: TableConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
        }
    }
}

fn default_output() -> String {
    "municipality_summary.md".to_string()
}

/// Summary table layout, in display order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    #[serde(default = "default_columns")]
    pub columns: Vec<ColumnSpec>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            columns: default_columns(),
        }
    }
}

fn default_columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::new("municipalities", ColumnKind::Municipality),
        ColumnSpec::new("pop", ColumnKind::Population),
        ColumnSpec::new("water_impact", ColumnKind::Impact).totaled(),
        ColumnSpec::new("water_offsets", ColumnKind::Offset).totaled(),
        ColumnSpec::new("water_net", ColumnKind::Net).totaled(),
    ]
}

/// How removed rows leave the rendered table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemovalKind {
    #[default]
    Immediate,
    Fade,
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Output format.
    #[serde(default)]
    pub format: OutputFormat,

    /// Row removal behaviour.
    #[serde(default)]
    pub removal: RemovalKind,

    /// Fade-out duration for removed rows.
    #[serde(default = "default_fade_millis")]
    pub fade_millis: u64,

    /// Append the "Selected Total" row.
    #[serde(default = "default_true")]
    pub selected_total: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            removal: RemovalKind::default(),
            fade_millis: default_fade_millis(),
            selected_total: true,
        }
    }
}

fn default_fade_millis() -> u64 {
    200
}

fn default_true() -> bool {
    true
}

impl ReportConfig {
    pub fn removal_mode(&self) -> RemovalMode {
        match self.removal {
            RemovalKind::Immediate => RemovalMode::Immediate,
            RemovalKind::Fade => RemovalMode::Fade {
                millis: self.fade_millis,
            },
        }
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Check the table layout before any wiring is resolved.
    pub fn validate(&self) -> Result<()> {
        let columns = &self.table.columns;
        let municipality_columns = columns
            .iter()
            .filter(|c| c.kind == ColumnKind::Municipality)
            .count();

        if municipality_columns != 1 {
            bail!(
                "Table must declare exactly one municipality column (found {})",
                municipality_columns
            );
        }
        if columns.iter().any(|c| c.name.trim().is_empty()) {
            bail!("Table columns must have a name");
        }

        Ok(())
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }

        if let Some(format) = args.format {
            self.report.format = format;
            if args.output.is_none() {
                self.general.output = Path::new(&self.general.output)
                    .with_extension(format.extension())
                    .display()
                    .to_string();
            }
        }

        if let Some(millis) = args.fade {
            self.report.removal = RemovalKind::Fade;
            self.report.fade_millis = millis;
        }

        if args.no_selected_total {
            self.report.selected_total = false;
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Log level from the merged verbosity settings; `quiet` wins.
    pub fn log_level(&self, quiet: bool) -> tracing::Level {
        if quiet {
            tracing::Level::ERROR
        } else if self.general.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
