//! In-memory roster model.

use indexmap::IndexMap;

use super::capability::Capability;
use crate::schema::{ColumnKey, SchemaConfig};

/// Skill name → capability, for one modality.
pub type SkillMap = IndexMap<String, Capability>;

/// Modality → skills, the canonical record layout.
pub type ModalityMap = IndexMap<String, SkillMap>;

/// On-disk layout a record was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordShape {
    /// `{modality: {skill: value}}`
    Hierarchical,
    /// `{"{skill}_{modality}": value}` (legacy)
    Flat,
}

/// One worker's capabilities, tagged by the shape it was stored in.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerRecord {
    Hierarchical(ModalityMap),
    Flat(IndexMap<String, Capability>),
}

impl WorkerRecord {
    pub fn shape(&self) -> RecordShape {
        match self {
            WorkerRecord::Hierarchical(_) => RecordShape::Hierarchical,
            WorkerRecord::Flat(_) => RecordShape::Flat,
        }
    }

    /// Value for one column. Missing keys are Passive.
    pub fn get(&self, column: &ColumnKey) -> Capability {
        let found = match self {
            WorkerRecord::Hierarchical(modalities) => modalities
                .get(&column.modality)
                .and_then(|skills| skills.get(&column.skill)),
            WorkerRecord::Flat(cells) => cells.get(&column.name()),
        };
        found.copied().unwrap_or_default()
    }

    /// Convert to the canonical layout. Flat keys that match a schema column
    /// are placed by the schema; leftovers are split at their last `_`, and
    /// keys without one are dropped.
    pub fn into_hierarchical(self, schema: &SchemaConfig) -> ModalityMap {
        let mut cells = match self {
            WorkerRecord::Hierarchical(modalities) => return modalities,
            WorkerRecord::Flat(cells) => cells,
        };

        let mut modalities = ModalityMap::new();
        for column in schema.columns() {
            if let Some(value) = cells.shift_remove(&column.name()) {
                modalities
                    .entry(column.modality)
                    .or_default()
                    .insert(column.skill, value);
            }
        }
        for (key, value) in cells {
            match key.rsplit_once('_') {
                Some((skill, modality)) => {
                    modalities
                        .entry(modality.to_string())
                        .or_default()
                        .insert(skill.to_string(), value);
                }
                None => tracing::warn!(key = %key, "Dropping flat roster key without modality suffix"),
            }
        }
        modalities
    }
}

impl Default for WorkerRecord {
    fn default() -> Self {
        WorkerRecord::Hierarchical(ModalityMap::new())
    }
}

/// Worker name → record, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Roster {
    workers: IndexMap<String, WorkerRecord>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.workers.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&WorkerRecord> {
        self.workers.get(name)
    }

    /// Insert or replace a worker. A replaced worker keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, record: WorkerRecord) -> Option<WorkerRecord> {
        self.workers.insert(name.into(), record)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &WorkerRecord)> {
        self.workers.iter()
    }
}

impl IntoIterator for Roster {
    type Item = (String, WorkerRecord);
    type IntoIter = indexmap::map::IntoIter<String, WorkerRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.workers.into_iter()
    }
}

impl FromIterator<(String, WorkerRecord)> for Roster {
    fn from_iter<I: IntoIterator<Item = (String, WorkerRecord)>>(iter: I) -> Self {
        Self {
            workers: iter.into_iter().collect(),
        }
    }
}
