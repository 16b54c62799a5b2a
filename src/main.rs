//! Roster Tool - worker skill roster CSV import/export
//!
//! This is the main entry point for the roster-tool binary.
//! It moves the worker skill roster between its JSON store and a flat,
//! spreadsheet-friendly CSV table, and validates tables before import.

mod cli;
mod config;
mod convert;
mod error;
mod logging;
mod preview;
mod schema;
mod store;
mod table;
mod types;
mod validate;

use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::{debug, info};

use crate::cli::{Cli, Commands, ConfigSubcommand};
use crate::config::ToolConfig;
use crate::convert::{ImportOutcome, MergePolicy};
use crate::error::{Error, Result};
use crate::schema::SchemaConfig;
use crate::store::RosterStore;
use crate::table::Table;
use crate::types::{RecordShape, Roster};

/// Invalid cells listed by `validate` before the remainder is summarized
const MAX_INVALID_SHOWN: usize = 10;

/// Missing/extra columns listed by `validate`
const MAX_COLUMNS_SHOWN: usize = 5;

fn main() {
    // Parse CLI arguments first (before logging, so we know verbosity)
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        debug!(error = %e.format_for_log(), "Command failed");
        eprint!("{}", e.format_for_terminal());
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<()> {
    // Config commands use minimal logging
    if let Commands::Config { subcommand } = &cli.command {
        logging::init_simple(tracing::Level::WARN)?;
        return handle_config_command(subcommand.clone(), cli.config.as_deref());
    }

    let config = ToolConfig::load(cli.config.as_deref())?;

    // The guards must be kept alive for the lifetime of the program
    let _log_guards = logging::init_logging(&config.logging, cli.verbose, cli.quiet)?;

    let schema = config.schema_config();
    debug!(
        skills = schema.skills().len(),
        modalities = schema.modalities().len(),
        "Schema resolved"
    );

    match cli.command {
        Commands::Export { output, roster } => {
            let store = RosterStore::new(config.roster_path(roster.as_deref()));
            run_export(&store, output, &schema)
        }
        Commands::Import { input, mode, roster } => {
            let store = RosterStore::new(config.roster_path(roster.as_deref()));
            run_import(&store, Path::new(&input), mode, &schema)
        }
        Commands::Validate { input } => run_validate(Path::new(&input), &schema),
        Commands::Preview { roster, limit } => {
            let store = RosterStore::new(config.roster_path(roster.as_deref()));
            run_preview(&store, limit, &schema)
        }
        Commands::Config { .. } => Err(Error::Internal(
            "config commands are handled before configuration loads".to_string(),
        )),
    }
}

/// Export the store to a CSV table
fn run_export(store: &RosterStore, output: Option<String>, schema: &SchemaConfig) -> Result<()> {
    let roster = store.load()?;
    let table = convert::export_table(&roster, schema)?;

    let output = output.map(PathBuf::from).unwrap_or_else(default_export_path);
    table.write(&output)?;

    info!(workers = roster.len(), path = %output.display(), "Roster exported");

    println!("Exported {} workers to: {}", roster.len(), output.display());
    println!(
        "Columns: {} (Worker + {} skill×modality combinations)",
        table.headers().len(),
        schema.combinations()
    );

    Ok(())
}

/// `worker_skill_roster_<YYYYmmdd_HHMMSS>.csv` in the working directory
fn default_export_path() -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    PathBuf::from(format!("worker_skill_roster_{}.csv", stamp))
}

/// Import a CSV table into the store
fn run_import(store: &RosterStore, input: &Path, mode: MergePolicy, schema: &SchemaConfig) -> Result<()> {
    let table = Table::read(input)?;

    let existing = if mode.needs_existing() {
        store.load()?
    } else {
        Roster::new()
    };

    let ImportOutcome {
        roster,
        stats,
        invalid_cells,
    } = convert::import_table(&table, mode, existing, schema)?;
    store.save(roster, schema)?;

    info!(
        mode = %mode,
        input = %input.display(),
        encoding = table.encoding().label(),
        added = stats.added,
        updated = stats.updated,
        skipped = stats.skipped,
        errors = stats.errors,
        "Roster imported"
    );

    println!("Import complete:");
    println!("  Added: {}", stats.added);
    println!("  Updated: {}", stats.updated);
    if stats.skipped > 0 {
        println!("  Skipped: {}", stats.skipped);
    }
    if stats.errors > 0 {
        println!("  Errors: {} (imported as 0)", stats.errors);
        for cell in invalid_cells.iter().take(MAX_INVALID_SHOWN) {
            println!("  Warning: {}.{}: '{}'", cell.worker, cell.column, cell.raw);
        }
        if invalid_cells.len() > MAX_INVALID_SHOWN {
            println!("  ... and {} more", invalid_cells.len() - MAX_INVALID_SHOWN);
        }
    }

    Ok(())
}

/// Validate a CSV table without touching the store
fn run_validate(input: &Path, schema: &SchemaConfig) -> Result<()> {
    let table = Table::read(input)?;
    let report = validate::validate_table(&table, schema)?;

    println!("File: {}", table.source().display());
    println!("Workers: {}", report.workers);
    println!("Expected columns: {}", report.expected);
    println!("Found columns: {}", report.found);

    if !report.missing.is_empty() {
        println!(
            "Missing columns ({}): {}",
            report.missing.len(),
            summarize_list(&report.missing, MAX_COLUMNS_SHOWN)
        );
    }
    if !report.extra.is_empty() {
        println!(
            "Extra columns ({}, ignored): {}",
            report.extra.len(),
            summarize_list(&report.extra, MAX_COLUMNS_SHOWN)
        );
    }

    if report.passed() {
        println!("Validation: PASSED");
        return Ok(());
    }

    println!("Invalid values ({}):", report.invalid.len());
    for cell in report.invalid.iter().take(MAX_INVALID_SHOWN) {
        println!("  {}.{}: '{}'", cell.worker, cell.column, cell.raw);
    }
    if report.invalid.len() > MAX_INVALID_SHOWN {
        println!("  ... and {} more", report.invalid.len() - MAX_INVALID_SHOWN);
    }
    println!("Validation: FAILED");

    Err(Error::ValidationFailed {
        invalid: report.invalid.len(),
    })
}

fn summarize_list(items: &[String], limit: usize) -> String {
    let shown = items.iter().take(limit).cloned().collect::<Vec<_>>().join(", ");
    if items.len() > limit {
        format!("{}, ...", shown)
    } else {
        shown
    }
}

/// Print a short summary of the first workers in the store
fn run_preview(store: &RosterStore, limit: usize, schema: &SchemaConfig) -> Result<()> {
    let roster = store.load()?;
    if roster.is_empty() {
        println!("Roster is empty or not found");
        return Ok(());
    }

    println!("Roster: {}", store.path().display());
    println!("Workers: {}", roster.len());
    println!("Skills: {}", schema.skills().join(", "));
    println!("Modalities: {}", schema.modalities().join(", "));
    println!("Total combinations: {} per worker", schema.combinations());

    for worker in preview::preview(&roster, schema, limit) {
        println!();
        match worker.shape {
            RecordShape::Hierarchical => println!("{}:", worker.name),
            RecordShape::Flat => println!("{}: (flat record)", worker.name),
        }
        for summary in worker.modalities {
            println!("  {}:", summary.modality);
            if !summary.active.is_empty() {
                println!("    active: {}", summary.active.join(", "));
            }
            if !summary.weighted.is_empty() {
                println!("    weighted: {}", summary.weighted.join(", "));
            }
        }
    }

    if roster.len() > limit {
        println!();
        println!("... and {} more workers", roster.len() - limit);
    }

    Ok(())
}

/// Handle config subcommands
fn handle_config_command(subcommand: ConfigSubcommand, config_path: Option<&str>) -> Result<()> {
    match subcommand {
        ConfigSubcommand::Show => {
            let cfg = ToolConfig::load(config_path)?;
            println!("{}", toml::to_string_pretty(&cfg)?);
            println!("# Resolved schema");
            println!("{}", toml::to_string_pretty(&cfg.schema_config())?);
        }
        ConfigSubcommand::Init { path, force } => {
            let created = config::init_config(path.as_deref(), force)?;
            println!("Configuration written to: {}", created.display());
        }
        ConfigSubcommand::Validate => {
            ToolConfig::load(config_path)?;
            println!("Configuration is valid.");
        }
    }

    Ok(())
}
