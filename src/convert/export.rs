//! Roster → table projection.

use tracing::debug;

use crate::error::{Error, Result};
use crate::schema::SchemaConfig;
use crate::table::{Table, WORKER_COLUMN};
use crate::types::{capability, Roster};

/// Build one row per worker, in roster order, with `Worker` first and the
/// schema's columns after it. Missing cells export as `0`.
pub fn export_table(roster: &Roster, schema: &SchemaConfig) -> Result<Table> {
    if roster.is_empty() {
        return Err(Error::EmptyRoster);
    }

    let columns = schema.columns();

    let mut headers = Vec::with_capacity(columns.len() + 1);
    headers.push(WORKER_COLUMN.to_string());
    headers.extend(columns.iter().map(|c| c.name()));

    let mut table = Table::new(headers);
    for (name, record) in roster.iter() {
        debug!(worker = %name, shape = ?record.shape(), "Exporting worker");

        let mut row = Vec::with_capacity(columns.len() + 1);
        row.push(name.clone());
        row.extend(columns.iter().map(|c| capability::encode(record.get(c)).to_string()));
        table.push_row(row);
    }

    Ok(table)
}
