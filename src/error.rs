//! Error types for the roster tool
//!
//! Provides structured error handling with:
//! - Numeric error codes for machine parsing
//! - User-friendly messages with suggestions
//! - Exit codes for CLI

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for roster operations
pub type Result<T> = std::result::Result<T, Error>;

/// Numeric error codes for machine parsing and documentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    // Configuration errors (1xx)
    ConfigNotFound = 100,
    ConfigParseError = 101,
    ConfigValidation = 102,

    // IO errors (2xx)
    IoRead = 200,
    IoWrite = 201,
    IoNotFound = 203,

    // Table errors (3xx)
    MissingWorkerColumn = 300,
    UnreadableEncoding = 301,
    TableParse = 302,
    InvalidValue = 303,
    ValidationFailed = 304,

    // Roster errors (4xx)
    EmptyRoster = 400,
    StoreFormat = 401,
    PersistenceFailure = 402,

    // Internal errors (9xx)
    InternalError = 900,
}

impl ErrorCode {
    /// Get the string code (e.g., "E100")
    pub fn as_str(&self) -> String {
        format!("E{}", *self as u16)
    }

    /// Get the exit code for CLI (maps to 1-125 range)
    pub fn exit_code(&self) -> i32 {
        match *self as u16 {
            100..=199 => 10, // Config errors
            200..=299 => 20, // IO errors
            300..=399 => 30, // Table errors
            400..=499 => 40, // Roster errors
            900..=999 => 90, // Internal errors
            _ => 1,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for the roster tool
#[derive(Error, Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Configuration parse error
    #[error("Failed to parse configuration: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<toml::de::Error>,
    },

    /// Configuration validation error
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String, field: Option<String> },

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),

    // ─────────────────────────────────────────────────────────────
    // IO Errors
    // ─────────────────────────────────────────────────────────────

    /// File read error
    #[error("Failed to read file: {path}")]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File write error
    #[error("Failed to write file: {path}")]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input file does not exist
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    // ─────────────────────────────────────────────────────────────
    // Table Errors
    // ─────────────────────────────────────────────────────────────

    /// The table has no `Worker` header
    #[error("CSV must have 'Worker' column: {path}")]
    MissingWorkerColumn { path: PathBuf },

    /// No supported text encoding could decode the file
    #[error("Could not read {path} with any supported encoding (tried {tried})")]
    UnreadableEncoding { path: PathBuf, tried: String },

    /// Malformed CSV content
    #[error("Failed to parse CSV {path}: {message}")]
    TableParse { path: PathBuf, message: String },

    /// A cell that is not a capability value
    #[error("Invalid value: '{raw}'")]
    InvalidValue { raw: String },

    /// Validation found invalid cells
    #[error("Validation failed: {invalid} invalid value(s)")]
    ValidationFailed { invalid: usize },

    // ─────────────────────────────────────────────────────────────
    // Roster Errors
    // ─────────────────────────────────────────────────────────────

    /// Nothing to export
    #[error("Roster is empty or not found")]
    EmptyRoster,

    /// Roster document does not have the expected structure
    #[error("Malformed roster {path}: {message}")]
    StoreFormat { path: PathBuf, message: String },

    /// Output could not be written; the previous file is untouched
    #[error("Failed to save {path}: {message}")]
    PersistenceFailure { path: PathBuf, message: String },

    // ─────────────────────────────────────────────────────────────
    // Internal Errors
    // ─────────────────────────────────────────────────────────────

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Get the numeric error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::ConfigNotFound { .. } => ErrorCode::ConfigNotFound,
            Error::ConfigParse { .. } => ErrorCode::ConfigParseError,
            Error::ConfigValidation { .. } => ErrorCode::ConfigValidation,
            Error::Toml(_) => ErrorCode::ConfigParseError,

            Error::IoRead { .. } => ErrorCode::IoRead,
            Error::IoWrite { .. } => ErrorCode::IoWrite,
            Error::FileNotFound { .. } => ErrorCode::IoNotFound,

            Error::MissingWorkerColumn { .. } => ErrorCode::MissingWorkerColumn,
            Error::UnreadableEncoding { .. } => ErrorCode::UnreadableEncoding,
            Error::TableParse { .. } => ErrorCode::TableParse,
            Error::InvalidValue { .. } => ErrorCode::InvalidValue,
            Error::ValidationFailed { .. } => ErrorCode::ValidationFailed,

            Error::EmptyRoster => ErrorCode::EmptyRoster,
            Error::StoreFormat { .. } => ErrorCode::StoreFormat,
            Error::PersistenceFailure { .. } => ErrorCode::PersistenceFailure,

            Error::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Get the exit code for CLI
    pub fn exit_code(&self) -> i32 {
        self.code().exit_code()
    }

    /// Get a user-friendly suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Error::ConfigNotFound { .. } => Some(
                "Run 'roster-tool config init' to create a default configuration file.",
            ),
            Error::ConfigParse { .. } => Some(
                "Check your configuration file syntax. Run 'roster-tool config validate' to see details.",
            ),
            Error::MissingWorkerColumn { .. } => Some(
                "The header must contain a 'Worker' column. Start from a file produced by 'roster-tool export'.",
            ),
            Error::UnreadableEncoding { .. } => Some(
                "Re-save the file from your spreadsheet as 'CSV UTF-8'.",
            ),
            Error::ValidationFailed { .. } => Some(
                "Allowed values are 1, 0, -1 and w (empty means 0).",
            ),
            Error::EmptyRoster => Some(
                "Check the roster path (--roster or [roster] path) or import a CSV first.",
            ),
            Error::PersistenceFailure { .. } => Some(
                "Check permissions and free space. The previous file was left unchanged.",
            ),
            _ => None,
        }
    }

    /// Format the error for terminal display with colors
    pub fn format_for_terminal(&self) -> String {
        let mut output = format!("\x1b[31mError [{}]\x1b[0m: {}\n", self.code().as_str(), self);

        if let Some(hint) = self.suggestion() {
            output.push_str(&format!("\n\x1b[33mHint\x1b[0m: {}\n", hint));
        }

        output
    }

    /// Format the error for logging (no colors)
    pub fn format_for_log(&self) -> String {
        format!("[{}] {}", self.code().as_str(), self)
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    /// Create a config validation error
    pub fn config_validation(message: impl Into<String>) -> Self {
        Error::ConfigValidation {
            message: message.into(),
            field: None,
        }
    }

    /// Create a config validation error with field name
    pub fn config_field_invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ConfigValidation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create an invalid value error from raw cell content
    pub fn invalid_value(raw: impl Into<String>) -> Self {
        Error::InvalidValue { raw: raw.into() }
    }

    /// Create a store format error
    pub fn store_format(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::StoreFormat {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a persistence failure error
    pub fn persistence(path: impl Into<PathBuf>, message: impl fmt::Display) -> Self {
        Error::PersistenceFailure {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_format() {
        assert_eq!(ErrorCode::ConfigNotFound.as_str(), "E100");
        assert_eq!(ErrorCode::MissingWorkerColumn.as_str(), "E300");
        assert_eq!(ErrorCode::EmptyRoster.as_str(), "E400");
        assert_eq!(ErrorCode::InternalError.as_str(), "E900");
    }

    #[test]
    fn test_error_exit_codes() {
        assert_eq!(ErrorCode::ConfigNotFound.exit_code(), 10);
        assert_eq!(ErrorCode::IoRead.exit_code(), 20);
        assert_eq!(ErrorCode::ValidationFailed.exit_code(), 30);
        assert_eq!(ErrorCode::PersistenceFailure.exit_code(), 40);
        assert_eq!(ErrorCode::InternalError.exit_code(), 90);
    }

    #[test]
    fn test_invalid_value_carries_raw_content() {
        let err = Error::invalid_value("maybe");
        assert_eq!(err.code(), ErrorCode::InvalidValue);
        assert!(err.to_string().contains("'maybe'"));
    }

    #[test]
    fn test_error_display_includes_path() {
        let err = Error::store_format("/data/roster.json", "expected an object");
        assert!(err.to_string().contains("/data/roster.json"));
        assert_eq!(err.code(), ErrorCode::StoreFormat);
    }

    #[test]
    fn test_error_suggestions() {
        let err = Error::MissingWorkerColumn {
            path: PathBuf::from("in.csv"),
        };
        assert!(err.suggestion().unwrap().contains("must contain a 'Worker' column"));

        let err = Error::persistence("roster.json", "disk full");
        assert!(err.suggestion().unwrap().contains("unchanged"));

        assert!(Error::Internal("x".into()).suggestion().is_none());
    }

    #[test]
    fn test_format_for_terminal() {
        let err = Error::ValidationFailed { invalid: 3 };
        let formatted = err.format_for_terminal();

        assert!(formatted.contains("E304"));
        assert!(formatted.contains("\x1b[31m"));
        assert!(formatted.contains("Hint"));
    }

    #[test]
    fn test_format_for_log() {
        let err = Error::ValidationFailed { invalid: 3 };
        let formatted = err.format_for_log();

        assert!(formatted.contains("[E304]"));
        assert!(!formatted.contains("\x1b["));
    }

    #[test]
    fn test_config_field_invalid() {
        let err = Error::config_field_invalid("logging.level", "bad level");
        match err {
            Error::ConfigValidation { field, .. } => {
                assert_eq!(field.as_deref(), Some("logging.level"));
            }
            _ => panic!("Expected ConfigValidation"),
        }
    }
}
