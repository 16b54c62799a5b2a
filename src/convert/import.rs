//! Table → roster reconstruction under a merge policy.
//!
//! Merge policies decide which workers end up in the output, never how a
//! single worker's record is combined: every imported row fully replaces the
//! prior record for that worker.

use std::fmt;

use tracing::{debug, warn};

use crate::error::Result;
use crate::schema::SchemaConfig;
use crate::table::Table;
use crate::types::capability;
use crate::types::{Capability, ModalityMap, Roster, WorkerRecord};
use crate::validate::InvalidCell;

/// Which pre-existing workers survive an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum MergePolicy {
    /// Output is exactly the workers in the table.
    #[default]
    Replace,
    /// Existing workers are kept; workers in the table are overwritten.
    Merge,
    /// Existing workers are kept and never touched; only new workers are added.
    #[value(name = "add_only", alias = "add-only")]
    AddOnly,
}

impl MergePolicy {
    /// Whether the existing roster is read before importing.
    pub fn needs_existing(self) -> bool {
        !matches!(self, MergePolicy::Replace)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MergePolicy::Replace => "replace",
            MergePolicy::Merge => "merge",
            MergePolicy::AddOnly => "add_only",
        }
    }
}

impl fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Import counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportStats {
    /// Workers not present before
    pub added: usize,
    /// Workers present before and overwritten
    pub updated: usize,
    /// Rows left out: add_only collisions and blank names
    pub skipped: usize,
    /// Cells that failed to decode and were imported as 0
    pub errors: usize,
}

/// Result of reconstructing a roster from a table.
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub roster: Roster,
    pub stats: ImportStats,
    /// Every cell that was degraded to 0
    pub invalid_cells: Vec<InvalidCell>,
}

/// Rebuild a roster from `table`. `existing` is ignored under
/// [`MergePolicy::Replace`].
pub fn import_table(
    table: &Table,
    policy: MergePolicy,
    existing: Roster,
    schema: &SchemaConfig,
) -> Result<ImportOutcome> {
    let worker_index = table.worker_index()?;

    let existing = if policy.needs_existing() {
        existing
    } else {
        Roster::new()
    };

    // Resolve each schema column to its position in this table once.
    let layout: Vec<_> = schema
        .columns()
        .into_iter()
        .map(|column| {
            let index = table.column_index(&column.name());
            (column, index)
        })
        .collect();

    let mut output = existing.clone();
    let mut stats = ImportStats::default();
    let mut invalid_cells = Vec::new();

    for row in table.rows() {
        let name = Table::cell(row, worker_index).trim();
        if is_blank_name(name) {
            stats.skipped += 1;
            continue;
        }

        let known = existing.contains(name);
        if policy == MergePolicy::AddOnly && known {
            debug!(worker = %name, "Worker exists, skipping");
            stats.skipped += 1;
            continue;
        }

        let mut record = ModalityMap::new();
        for (column, index) in &layout {
            let value = match index {
                Some(i) => {
                    let raw = Table::cell(row, *i);
                    match capability::decode_str(raw) {
                        Ok(value) => value,
                        Err(e) => {
                            warn!(worker = %name, column = %column, error = %e, "Invalid cell imported as 0");
                            stats.errors += 1;
                            invalid_cells.push(InvalidCell {
                                worker: name.to_string(),
                                column: column.name(),
                                raw: raw.to_string(),
                            });
                            Capability::Passive
                        }
                    }
                }
                None => Capability::Passive,
            };
            record
                .entry(column.modality.clone())
                .or_default()
                .insert(column.skill.clone(), value);
        }

        output.insert(name, WorkerRecord::Hierarchical(record));

        match existing.get(name) {
            Some(prior) => {
                debug!(worker = %name, previous = ?prior.shape(), "Worker overwritten");
                stats.updated += 1;
            }
            None => stats.added += 1,
        }
    }

    debug!(
        policy = %policy,
        added = stats.added,
        updated = stats.updated,
        skipped = stats.skipped,
        errors = stats.errors,
        "Import reconstructed"
    );

    Ok(ImportOutcome {
        roster: output,
        stats,
        invalid_cells,
    })
}

/// Empty names and the textual null markers a spreadsheet round-trip leaves behind.
fn is_blank_name(name: &str) -> bool {
    name.is_empty() || name.eq_ignore_ascii_case("nan")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::schema::ColumnKey;
    use crate::store::{parse_roster, render_roster};
    use std::path::Path;

    fn schema() -> SchemaConfig {
        SchemaConfig::new(vec!["Notfall".into()], vec!["ct".into()])
    }

    fn table(csv: &str) -> Table {
        Table::parse(csv, Path::new("in.csv")).unwrap()
    }

    fn roster(json: &str) -> Roster {
        parse_roster(json, Path::new("roster.json")).unwrap()
    }

    #[test]
    fn test_replace_into_empty_store() {
        let outcome = import_table(
            &table("Worker,Notfall_ct\nB,w\n"),
            MergePolicy::Replace,
            Roster::new(),
            &schema(),
        )
        .unwrap();

        assert_eq!(outcome.stats.added, 1);
        assert_eq!(
            render_roster(outcome.roster, &schema()).unwrap(),
            serde_json::to_string_pretty(&serde_json::json!({"B": {"ct": {"Notfall": 2}}})).unwrap()
        );
    }

    #[test]
    fn test_replace_drops_absent_workers() {
        let prior = roster(r#"{"Old": {"ct": {"Notfall": 1}}}"#);
        let outcome = import_table(
            &table("Worker,Notfall_ct\nNew,1\n"),
            MergePolicy::Replace,
            prior,
            &schema(),
        )
        .unwrap();

        assert!(!outcome.roster.contains("Old"));
        assert!(outcome.roster.contains("New"));
    }

    #[test]
    fn test_merge_retains_absent_workers_and_overwrites_present() {
        let prior = roster(r#"{"Keep": {"ct": {"Notfall": -1}}, "Edit": {"ct": {"Notfall": 1}, "mr": {"Gyn": 1}}}"#);
        let kept = prior.get("Keep").cloned().unwrap();

        let outcome = import_table(
            &table("Worker,Notfall_ct\nEdit,0\nFresh,1\n"),
            MergePolicy::Merge,
            prior,
            &schema(),
        )
        .unwrap();

        assert_eq!(outcome.stats.updated, 1);
        assert_eq!(outcome.stats.added, 1);
        assert_eq!(outcome.roster.get("Keep"), Some(&kept));

        // Whole-record overwrite: the mr modality is gone.
        let edited = outcome.roster.get("Edit").unwrap();
        assert_eq!(edited.get(&ColumnKey::new("Notfall", "ct")), Capability::Passive);
        assert_eq!(edited.get(&ColumnKey::new("Gyn", "mr")), Capability::Passive);
        match edited {
            WorkerRecord::Hierarchical(map) => assert!(!map.contains_key("mr")),
            WorkerRecord::Flat(_) => panic!("Expected hierarchical record"),
        }
    }

    #[test]
    fn test_add_only_second_run_skips_everything() {
        let csv = table("Worker,Notfall_ct\nA,1\nB,w\n");

        let first = import_table(&csv, MergePolicy::AddOnly, Roster::new(), &schema()).unwrap();
        assert_eq!(first.stats.added, 2);

        let second = import_table(&csv, MergePolicy::AddOnly, first.roster.clone(), &schema()).unwrap();
        assert_eq!(second.stats.added, 0);
        assert_eq!(second.stats.updated, 0);
        assert_eq!(second.stats.skipped, 2);
        assert_eq!(second.roster, first.roster);
    }

    #[test]
    fn test_invalid_cells_are_recovered() {
        let schema = SchemaConfig::new(vec!["Notfall".into(), "Gyn".into()], vec!["ct".into()]);
        let outcome = import_table(
            &table("Worker,Notfall_ct,Gyn_ct\nA,maybe,1\n"),
            MergePolicy::Replace,
            Roster::new(),
            &schema,
        )
        .unwrap();

        assert_eq!(outcome.stats.errors, 1);
        assert_eq!(outcome.stats.added, 1);
        assert_eq!(outcome.invalid_cells[0].raw, "maybe");

        let record = outcome.roster.get("A").unwrap();
        assert_eq!(record.get(&ColumnKey::new("Notfall", "ct")), Capability::Passive);
        assert_eq!(record.get(&ColumnKey::new("Gyn", "ct")), Capability::Active);
    }

    #[test]
    fn test_missing_columns_default_to_passive() {
        let schema = SchemaConfig::new(vec!["Notfall".into(), "Gyn".into()], vec!["ct".into()]);
        let outcome = import_table(
            &table("Worker,Gyn_ct\nA,-1\n"),
            MergePolicy::Replace,
            Roster::new(),
            &schema,
        )
        .unwrap();

        let WorkerRecord::Hierarchical(map) = outcome.roster.get("A").unwrap() else {
            panic!("Expected hierarchical record");
        };
        assert_eq!(map["ct"]["Notfall"], Capability::Passive);
        assert_eq!(map["ct"]["Gyn"], Capability::Excluded);
    }

    #[test]
    fn test_blank_names_are_skipped() {
        let outcome = import_table(
            &table("Worker,Notfall_ct\n  ,1\nnan,1\nA,1\n"),
            MergePolicy::Replace,
            Roster::new(),
            &schema(),
        )
        .unwrap();

        assert_eq!(outcome.roster.len(), 1);
        assert_eq!(outcome.stats.skipped, 2);
        assert_eq!(outcome.stats.errors, 0);
    }

    #[test]
    fn test_missing_worker_column() {
        let err = import_table(
            &table("Name,Notfall_ct\nA,1\n"),
            MergePolicy::Merge,
            Roster::new(),
            &schema(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::MissingWorkerColumn { .. }));
    }

    #[test]
    fn test_policy_display() {
        assert_eq!(MergePolicy::AddOnly.to_string(), "add_only");
        assert!(!MergePolicy::Replace.needs_existing());
        assert!(MergePolicy::Merge.needs_existing());
    }
}
