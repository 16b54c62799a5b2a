//! Skill × modality schema
//!
//! The column vocabulary of one invocation is derived from two ordered name
//! lists. Lists come from the tool configuration, the scheduling
//! application's YAML configuration, or the built-in defaults, in that order.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::SchemaSettings;

/// Built-in skill names
pub const DEFAULT_SKILLS: &[&str] = &[
    "Notfall", "Privat", "Gyn", "Päd", "MSK", "Abdomen", "Chest", "Cardvask", "Uro",
];

/// Built-in modality names
pub const DEFAULT_MODALITIES: &[&str] = &["ct", "mr", "xray", "mammo"];

/// A `(skill, modality)` pair, written `"{skill}_{modality}"` in CSV headers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnKey {
    pub skill: String,
    pub modality: String,
}

impl ColumnKey {
    pub fn new(skill: impl Into<String>, modality: impl Into<String>) -> Self {
        Self {
            skill: skill.into(),
            modality: modality.into(),
        }
    }

    /// Header text for this column.
    pub fn name(&self) -> String {
        format!("{}_{}", self.skill, self.modality)
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.skill, self.modality)
    }
}

/// Ordered column keys, modality-major and skill-minor. Names are used
/// verbatim; duplicates produce duplicate columns.
pub fn columns(skills: &[String], modalities: &[String]) -> Vec<ColumnKey> {
    modalities
        .iter()
        .flat_map(|modality| skills.iter().map(move |skill| ColumnKey::new(skill, modality)))
        .collect()
}

/// Immutable schema passed into every engine operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaConfig {
    skills: Vec<String>,
    modalities: Vec<String>,
}

impl SchemaConfig {
    pub fn new(skills: Vec<String>, modalities: Vec<String>) -> Self {
        Self { skills, modalities }
    }

    /// The built-in default lists.
    pub fn builtin() -> Self {
        Self::new(to_owned(DEFAULT_SKILLS), to_owned(DEFAULT_MODALITIES))
    }

    pub fn skills(&self) -> &[String] {
        &self.skills
    }

    pub fn modalities(&self) -> &[String] {
        &self.modalities
    }

    /// Resolved column vocabulary.
    pub fn columns(&self) -> Vec<ColumnKey> {
        columns(&self.skills, &self.modalities)
    }

    /// Number of skill × modality combinations per worker.
    pub fn combinations(&self) -> usize {
        self.skills.len() * self.modalities.len()
    }
}

/// Resolve the schema from settings. Each list falls back independently:
/// inline list, then the YAML source, then the built-in default.
pub fn resolve(settings: &SchemaSettings) -> SchemaConfig {
    let (source_skills, source_modalities) = match settings.source.as_deref() {
        Some(path) => load_source(Path::new(path)),
        None => (Vec::new(), Vec::new()),
    };

    let builtin = SchemaConfig::builtin();
    let skills = first_non_empty([settings.skills.clone(), source_skills])
        .unwrap_or(builtin.skills);
    let modalities = first_non_empty([settings.modalities.clone(), source_modalities])
        .unwrap_or(builtin.modalities);

    debug!(skills = ?skills, modalities = ?modalities, "Schema resolved");
    SchemaConfig::new(skills, modalities)
}

/// Read the `skills:` and `modalities:` mapping keys of a YAML application
/// config. Missing or malformed sources yield empty lists.
pub fn load_source(path: &Path) -> (Vec<String>, Vec<String>) {
    if !path.exists() {
        debug!(path = %path.display(), "Schema source not found, using defaults");
        return (Vec::new(), Vec::new());
    }

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read schema source, using defaults");
            return (Vec::new(), Vec::new());
        }
    };

    match parse_source(&content) {
        Ok(lists) => lists,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Malformed schema source, using defaults");
            (Vec::new(), Vec::new())
        }
    }
}

fn parse_source(content: &str) -> Result<(Vec<String>, Vec<String>), serde_yaml::Error> {
    let doc: serde_yaml::Value = serde_yaml::from_str(content)?;
    Ok((mapping_keys(&doc, "skills"), mapping_keys(&doc, "modalities")))
}

fn mapping_keys(doc: &serde_yaml::Value, section: &str) -> Vec<String> {
    doc.get(section)
        .and_then(|v| v.as_mapping())
        .map(|mapping| {
            mapping
                .keys()
                .filter_map(|k| match k {
                    serde_yaml::Value::String(s) => Some(s.clone()),
                    serde_yaml::Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

fn first_non_empty<const N: usize>(candidates: [Vec<String>; N]) -> Option<Vec<String>> {
    candidates.into_iter().find(|list| !list.is_empty())
}

fn to_owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}
