//! Configuration system for the roster tool
//!
//! Supports multiple configuration sources with the following precedence (highest to lowest):
//! 1. CLI arguments
//! 2. Environment variables (ROSTER_* prefix)
//! 3. Configuration file (TOML)
//! 4. Default values

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::schema::{self, SchemaConfig};

/// Main tool configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Roster store location
    pub roster: RosterSettings,

    /// Where skill and modality names come from
    pub schema: SchemaSettings,

    /// Logging configuration
    pub logging: LoggingSettings,
}

/// Roster store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterSettings {
    /// Path to the roster JSON file
    pub path: String,
}

/// Schema source settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaSettings {
    /// Scheduling application config (YAML) with `skills:` and `modalities:` sections
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Skill names, overriding the source when non-empty
    pub skills: Vec<String>,

    /// Modality names, overriding the source when non-empty
    pub modalities: Vec<String>,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level: trace, debug, info, warn, error
    pub level: String,

    /// Log file path (empty = no file logging)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Number of rotated log files to keep
    pub max_files: u32,

    /// Enable JSON formatted logging
    pub json_format: bool,
}

impl Default for RosterSettings {
    fn default() -> Self {
        Self {
            path: "worker_skill_roster.json".to_string(),
        }
    }
}

impl Default for SchemaSettings {
    fn default() -> Self {
        Self {
            source: Some("config.yaml".to_string()),
            skills: vec![],
            modalities: vec![],
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: None,
            max_files: 5,
            json_format: false,
        }
    }
}

impl ToolConfig {
    /// Load configuration from file with environment variable overrides
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut config = Self::default();

        // 1. Load from config file if it exists
        if let Some(path) = Self::find_config_file(config_path)? {
            debug!(path = %path.display(), "Loading configuration file");
            let content = fs::read_to_string(&path).map_err(|e| Error::IoRead {
                path: path.clone(),
                source: e,
            })?;
            config = toml::from_str(&content).map_err(|e| Error::ConfigParse {
                message: format!("{}: {}", path.display(), e.message()),
                source: Some(e),
            })?;
            info!(path = %path.display(), "Configuration loaded from file");
        }

        // 2. Apply environment variable overrides
        config.apply_env_overrides();

        // 3. Expand paths
        config.expand_paths();

        // 4. Validate
        config.validate()?;

        Ok(config)
    }

    /// Find the configuration file to use
    fn find_config_file(explicit_path: Option<&str>) -> Result<Option<PathBuf>> {
        // If explicit path provided, use it (error if not found)
        if let Some(path) = explicit_path {
            let path = PathBuf::from(expand_path(path));
            if path.exists() {
                return Ok(Some(path));
            }
            return Err(Error::ConfigNotFound { path });
        }

        let search_paths = [
            PathBuf::from("roster-tool.toml"),
            dirs::config_dir()
                .map(|p| p.join("roster-tool").join("config.toml"))
                .unwrap_or_default(),
            dirs::home_dir()
                .map(|p| p.join(".roster-tool").join("config.toml"))
                .unwrap_or_default(),
        ];

        for path in &search_paths {
            if !path.as_os_str().is_empty() && path.exists() {
                debug!(path = %path.display(), "Found configuration file");
                return Ok(Some(path.clone()));
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(None)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("ROSTER_FILE") {
            self.roster.path = val;
        }
        if let Ok(val) = std::env::var("ROSTER_SCHEMA_SOURCE") {
            self.schema.source = Some(val);
        }
        if let Ok(val) = std::env::var("ROSTER_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("ROSTER_LOG_FILE") {
            self.logging.file = Some(val);
        }
        if let Ok(val) = std::env::var("ROSTER_LOG_JSON") {
            self.logging.json_format = val.to_lowercase() == "true" || val == "1";
        }
    }

    /// Expand ~ and other path variables
    fn expand_paths(&mut self) {
        self.roster.path = expand_path(&self.roster.path);

        if let Some(ref source) = self.schema.source {
            self.schema.source = Some(expand_path(source));
        }
        if let Some(ref file) = self.logging.file {
            self.logging.file = Some(expand_path(file));
        }
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if self.roster.path.trim().is_empty() {
            return Err(Error::config_field_invalid(
                "roster.path",
                "Roster path cannot be empty",
            ));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(Error::config_field_invalid(
                "logging.level",
                format!(
                    "Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    valid_levels.join(", ")
                ),
            ));
        }

        if self.schema.skills.iter().chain(&self.schema.modalities).any(|n| n.trim().is_empty()) {
            return Err(Error::config_validation(
                "Skill and modality names cannot be empty",
            ));
        }

        Ok(())
    }

    /// Roster path, unless overridden on the command line
    pub fn roster_path(&self, cli_override: Option<&str>) -> PathBuf {
        cli_override
            .map(expand_path)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(&self.roster.path))
    }

    /// Resolve the immutable schema for this invocation
    pub fn schema_config(&self) -> SchemaConfig {
        schema::resolve(&self.schema)
    }
}

/// Expand ~ and environment variables in paths
fn expand_path(path: &str) -> String {
    shellexpand::full(path)
        .unwrap_or_else(|_| std::borrow::Cow::Borrowed(path))
        .into_owned()
}

/// Initialize a new configuration file
pub fn init_config(path: Option<&str>, force: bool) -> Result<PathBuf> {
    let config_path = path
        .map(|p| PathBuf::from(expand_path(p)))
        .unwrap_or_else(|| PathBuf::from("roster-tool.toml"));

    if config_path.exists() && !force {
        return Err(Error::config_validation(format!(
            "Configuration file already exists: {}. Use --force to overwrite.",
            config_path.display()
        )));
    }

    if let Some(parent) = config_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| Error::IoWrite {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
    }

    fs::write(&config_path, generate_default_config()).map_err(|e| Error::IoWrite {
        path: config_path.clone(),
        source: e,
    })?;

    Ok(config_path)
}

/// Generate default configuration content with comments
fn generate_default_config() -> String {
    r#"# Roster Tool Configuration

[roster]
# Roster JSON file (hierarchical worker -> modality -> skill -> value)
path = "worker_skill_roster.json"

[schema]
# Scheduling application config; the keys of its `skills:` and
# `modalities:` sections define the CSV columns, in file order
source = "config.yaml"

# Inline lists take precedence over the source when non-empty
skills = []
modalities = []

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log file path (comment out to disable file logging)
# file = "~/.roster-tool/logs/roster-tool.log"

# Number of rotated log files to keep
max_files = 5

# Enable JSON formatted logging
json_format = false
"#
    .to_string()
}
