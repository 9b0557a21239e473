//! Parcel Tally - municipality offset summary for selected parcels
//!
//! A CLI tool that replays parcel checkbox toggles from a reporting page
//! through the aggregation engine and writes the resulting summary table.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (unreadable payload, bad wiring, unknown parcel, etc.)

use anyhow::{Context, Result};
use chrono::Utc;
use parcel_tally::cli::{Args, OutputFormat};
use parcel_tally::config::{Config, DEFAULT_CONFIG_FILE};
use parcel_tally::engine::{AggregationEngine, CategoryWiring};
use parcel_tally::models::{BaselineImpacts, Diff, ToggleEvent};
use parcel_tally::payload;
use parcel_tally::report::{self, ReportMetadata, SummaryTable, TableReport};
use std::path::Path;
use tracing::{debug, error, info, Level};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Load configuration before logging so `[general] verbose` applies
    let (mut config, config_source) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    // Initialize logging
    init_logging(config.log_level(args.quiet));

    info!("Parcel Tally v{}", env!("CARGO_PKG_VERSION"));
    info!("Using {}", config_source);
    debug!("Arguments: {:?}", args);

    if let Err(e) = run_tally(args, config) {
        error!("Tally failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .parcel-tally.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Edit it to declare your table columns and report options.");
    Ok(())
}

/// Initialize logging at the given level.
fn init_logging(level: Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete tally workflow.
fn run_tally(args: Args, config: Config) -> Result<()> {
    config.validate()?;

    let wiring = CategoryWiring::resolve(&config.table.columns)
        .context("Invalid table column layout")?;
    info!("Resolved {} offset categories", wiring.len());

    // Step 1: Load the page payloads
    let parcels_path = args
        .parcels
        .as_deref()
        .context("--parcels is required")?;
    let parcels = payload::load_parcels(parcels_path)?;
    let baseline = match args.baseline {
        Some(ref path) => payload::load_baseline(path)?,
        None => BaselineImpacts::new(),
    };
    let events: Vec<ToggleEvent> = match args.events {
        Some(ref path) => payload::load_events(path)?,
        None => Vec::new(),
    };

    println!(
        "📥 Loaded {} parcels and baseline data for {} municipalities",
        parcels.len(),
        baseline.len()
    );

    // Step 2: Seed the engine and the table
    let (mut engine, initial) = AggregationEngine::initialize(wiring, parcels, baseline)?;
    let mut table = SummaryTable::new(config.table.columns.clone(), config.report.removal_mode());
    apply_diff(&mut table, &initial, args.show_diffs);

    // Step 3: Replay the events file, then the --toggle flips
    let events = payload::resolve_toggles(&events, &args.toggle, |id| engine.is_selected(id));

    for (index, event) in events.iter().enumerate() {
        // Fading rows finish leaving before the next interaction.
        table.flush_transitions();

        let diff = engine
            .toggle(&event.parcel, event.checked)
            .with_context(|| {
                format!(
                    "Toggle #{} ({} -> {}) rejected",
                    index + 1,
                    event.parcel,
                    if event.checked { "checked" } else { "unchecked" }
                )
            })?;
        debug!(
            "Toggled {} ({} entries in diff)",
            event.parcel,
            diff.len()
        );
        apply_diff(&mut table, &diff, args.show_diffs);
    }
    debug!("Engine totals: {:?}", engine.column_totals());

    // Step 4: Build and save the report
    let selected: Vec<String> = engine.selected_parcels().map(str::to_string).collect();
    let metadata = ReportMetadata {
        generated_at: Utc::now(),
        parcels_loaded: engine.parcel_count(),
        parcels_selected: selected.clone(),
        events_applied: events.len(),
        municipalities: table.live_rows().count(),
    };
    let summary = TableReport::from_table(&table, metadata, config.report.selected_total);

    let output = match config.report.format {
        OutputFormat::Markdown => report::generate_markdown_report(&summary),
        OutputFormat::Json => report::generate_json_report(&summary)?,
        OutputFormat::Html => report::generate_html_report(&summary),
    };

    let output_path = Path::new(&config.general.output);
    report::write_report(&output, output_path)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    // Print summary
    println!("\n📊 Tally Summary:");
    println!("   Toggles applied: {}", events.len());
    println!("   Parcels selected: {}", selected.len());
    println!("   Municipalities shown: {}", summary.rows.len());
    println!(
        "\n✅ Summary complete! Report saved to: {}",
        output_path.display()
    );

    Ok(())
}

fn apply_diff(table: &mut SummaryTable, diff: &Diff, show: bool) {
    if show {
        for entry in diff {
            println!("   {}", entry);
        }
    }

    let stats = table.apply(diff);
    debug!(
        "Table: {} inserted, {} patched, {} removed, {} skipped",
        stats.inserted, stats.patched, stats.removed, stats.skipped
    );
    table.reformat_scientific();
}

/// Load configuration from file or use defaults.
///
/// Runs before logging is initialized, so it reports where the configuration
/// came from instead of logging it.
fn load_config(args: &Args) -> Result<(Config, String)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, format!("config from {}", config_path.display())));
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok((config, format!("default config from {}", DEFAULT_CONFIG_FILE))),
        Ok(None) => Ok((Config::default(), "built-in default config".to_string())),
        Err(e) => {
            eprintln!("⚠️  Failed to load config: {:#}", e);
            Ok((Config::default(), "built-in default config".to_string()))
        }
    }
}
