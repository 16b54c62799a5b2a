//! Compact per-worker summary of active and weighted skills.

use crate::schema::{ColumnKey, SchemaConfig};
use crate::types::{Capability, RecordShape, Roster, WorkerRecord};

/// Active and weighted skills in one modality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalitySummary {
    pub modality: String,
    pub active: Vec<String>,
    pub weighted: Vec<String>,
}

/// Summary of one worker.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerPreview {
    pub name: String,
    pub shape: RecordShape,
    /// Only modalities with at least one active or weighted skill
    pub modalities: Vec<ModalitySummary>,
}

/// Summarize the first `limit` workers in roster order.
///
/// Hierarchical records list the skills they actually store for each schema
/// modality; flat records are read through the schema's columns.
pub fn preview(roster: &Roster, schema: &SchemaConfig, limit: usize) -> Vec<WorkerPreview> {
    roster
        .iter()
        .take(limit)
        .map(|(name, record)| WorkerPreview {
            name: name.clone(),
            shape: record.shape(),
            modalities: schema
                .modalities()
                .iter()
                .filter_map(|modality| summarize(record, modality, schema))
                .collect(),
        })
        .collect()
}

fn summarize(record: &WorkerRecord, modality: &str, schema: &SchemaConfig) -> Option<ModalitySummary> {
    let cells: Vec<(String, Capability)> = match record {
        WorkerRecord::Hierarchical(map) => map
            .get(modality)
            .map(|skills| skills.iter().map(|(s, v)| (s.clone(), *v)).collect())
            .unwrap_or_default(),
        WorkerRecord::Flat(_) => schema
            .skills()
            .iter()
            .map(|skill| (skill.clone(), record.get(&ColumnKey::new(skill, modality))))
            .collect(),
    };

    let pick = |wanted: Capability| -> Vec<String> {
        cells
            .iter()
            .filter(|(_, v)| *v == wanted)
            .map(|(s, _)| s.clone())
            .collect()
    };

    let active = pick(Capability::Active);
    let weighted = pick(Capability::Weighted);
    if active.is_empty() && weighted.is_empty() {
        return None;
    }

    Some(ModalitySummary {
        modality: modality.to_string(),
        active,
        weighted,
    })
}
