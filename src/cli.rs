//! CLI argument parsing using clap v4
//!
//! Defines the command-line interface for the roster tool.

use clap::{Parser, Subcommand};

use crate::convert::MergePolicy;

/// Roster Tool - worker skill roster CSV import/export
///
/// Moves the worker skill roster between its JSON store and a flat CSV
/// table that can be edited in a spreadsheet.
#[derive(Parser, Debug)]
#[command(name = "roster-tool")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, env = "ROSTER_CONFIG", global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export the roster to a CSV table
    Export {
        /// Output CSV file (default: worker_skill_roster_<timestamp>.csv)
        output: Option<String>,

        /// Roster JSON file to read
        #[arg(short, long)]
        roster: Option<String>,
    },

    /// Import a CSV table into the roster
    Import {
        /// CSV file to import
        input: String,

        /// How existing workers are treated
        #[arg(short, long, value_enum, default_value_t = MergePolicy::Replace)]
        mode: MergePolicy,

        /// Roster JSON file to update
        #[arg(short, long)]
        roster: Option<String>,
    },

    /// Check a CSV table without importing it
    Validate {
        /// CSV file to validate
        input: String,
    },

    /// Show active and weighted skills per worker
    Preview {
        /// Roster JSON file to read
        #[arg(short, long)]
        roster: Option<String>,

        /// Number of workers to show
        #[arg(short, long, default_value = "5")]
        limit: usize,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigSubcommand {
    /// Display the current configuration and resolved schema
    Show,

    /// Initialize a new configuration file
    Init {
        /// Path where to create the config file
        #[arg(short, long)]
        path: Option<String>,

        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Validate the configuration
    Validate,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_export_defaults() {
        let cli = Cli::parse_from(["roster-tool", "export"]);
        match cli.command {
            Commands::Export { output, roster } => {
                assert!(output.is_none());
                assert!(roster.is_none());
            }
            _ => panic!("Expected Export command"),
        }
    }

    #[test]
    fn test_export_with_output() {
        let cli = Cli::parse_from(["roster-tool", "export", "out.csv", "--roster", "r.json"]);
        match cli.command {
            Commands::Export { output, roster } => {
                assert_eq!(output, Some("out.csv".to_string()));
                assert_eq!(roster, Some("r.json".to_string()));
            }
            _ => panic!("Expected Export command"),
        }
    }

    #[test]
    fn test_import_default_mode() {
        let cli = Cli::parse_from(["roster-tool", "import", "in.csv"]);
        match cli.command {
            Commands::Import { input, mode, .. } => {
                assert_eq!(input, "in.csv");
                assert_eq!(mode, MergePolicy::Replace);
            }
            _ => panic!("Expected Import command"),
        }
    }

    #[test]
    fn test_import_modes() {
        for (arg, expected) in [
            ("merge", MergePolicy::Merge),
            ("add_only", MergePolicy::AddOnly),
            ("add-only", MergePolicy::AddOnly),
        ] {
            let cli = Cli::parse_from(["roster-tool", "import", "in.csv", "--mode", arg]);
            match cli.command {
                Commands::Import { mode, .. } => assert_eq!(mode, expected),
                _ => panic!("Expected Import command"),
            }
        }
    }

    #[test]
    fn test_import_rejects_unknown_mode() {
        let result = Cli::try_parse_from(["roster-tool", "import", "in.csv", "--mode", "upsert"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_preview_limit() {
        let cli = Cli::parse_from(["roster-tool", "preview", "--limit", "2"]);
        match cli.command {
            Commands::Preview { limit, .. } => assert_eq!(limit, 2),
            _ => panic!("Expected Preview command"),
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["roster-tool", "validate", "in.csv", "-vv", "--config", "c.toml"]);
        assert_eq!(cli.verbose, 2);
        assert!(!cli.quiet);
        assert_eq!(cli.config, Some("c.toml".to_string()));
    }

    #[test]
    fn test_config_init() {
        let cli = Cli::parse_from(["roster-tool", "config", "init", "--force"]);
        match cli.command {
            Commands::Config { subcommand: ConfigSubcommand::Init { path, force } } => {
                assert!(path.is_none());
                assert!(force);
            }
            _ => panic!("Expected Config Init command"),
        }
    }
}
