//! Read-only acceptance check of a CSV table before import.
//!
//! Missing and extra columns are warnings. Only a missing `Worker` column or
//! an undecodable cell in an expected column fails validation.

use std::collections::HashSet;

use tracing::debug;

use crate::error::Result;
use crate::schema::SchemaConfig;
use crate::table::{Table, WORKER_COLUMN};
use crate::types::capability;

/// A cell that does not decode to a capability value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidCell {
    pub worker: String,
    pub column: String,
    pub raw: String,
}

/// Outcome of [`validate_table`].
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Data rows in the file
    pub workers: usize,
    /// Distinct columns the schema expects
    pub expected: usize,
    /// Expected columns present in the file
    pub found: usize,
    /// Expected columns absent from the file, in schema order
    pub missing: Vec<String>,
    /// File columns the schema does not know, in file order
    pub extra: Vec<String>,
    /// Undecodable cells, column by column
    pub invalid: Vec<InvalidCell>,
}

impl ValidationReport {
    pub fn passed(&self) -> bool {
        self.invalid.is_empty()
    }
}

/// Check `table` against `schema` without modifying anything.
pub fn validate_table(table: &Table, schema: &SchemaConfig) -> Result<ValidationReport> {
    let worker_index = table.worker_index()?;

    let mut expected: Vec<String> = Vec::new();
    let mut seen = HashSet::new();
    for column in schema.columns() {
        let name = column.name();
        if seen.insert(name.clone()) {
            expected.push(name);
        }
    }

    let mut report = ValidationReport {
        workers: table.len(),
        expected: expected.len(),
        ..Default::default()
    };

    let mut present = Vec::new();
    for name in &expected {
        match table.column_index(name) {
            Some(index) => present.push((name, index)),
            None => report.missing.push(name.clone()),
        }
    }
    report.found = present.len();

    let mut extra_seen = HashSet::new();
    for header in table.headers() {
        if header != WORKER_COLUMN && !seen.contains(header) && extra_seen.insert(header) {
            report.extra.push(header.clone());
        }
    }

    for (column, index) in present {
        for row in table.rows() {
            let raw = Table::cell(row, index);
            if capability::decode_str(raw).is_err() {
                report.invalid.push(InvalidCell {
                    worker: Table::cell(row, worker_index).trim().to_string(),
                    column: column.clone(),
                    raw: raw.to_string(),
                });
            }
        }
    }

    debug!(
        workers = report.workers,
        expected = report.expected,
        found = report.found,
        missing = report.missing.len(),
        extra = report.extra.len(),
        invalid = report.invalid.len(),
        "Validation complete"
    );

    Ok(report)
}
