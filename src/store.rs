//! Roster store reading and writing
//!
//! The roster is a JSON document mapping worker names to records. Two record
//! layouts exist on disk and both are read; writes are always hierarchical.
//! Writes go through [`write_atomic`], so the file on disk is either the old
//! document or the new one.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::schema::SchemaConfig;
use crate::types::capability;
use crate::types::{Capability, ModalityMap, RawCell, Roster, SkillMap, WorkerRecord};

/// File-backed roster store.
#[derive(Debug, Clone)]
pub struct RosterStore {
    path: PathBuf,
}

impl RosterStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the whole roster. A missing file is an empty roster.
    pub fn load(&self) -> Result<Roster> {
        if !self.path.exists() {
            warn!(path = %self.path.display(), "Roster file not found");
            return Ok(Roster::new());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| Error::IoRead {
            path: self.path.clone(),
            source: e,
        })?;

        let roster = parse_roster(&content, &self.path)?;
        debug!(path = %self.path.display(), workers = roster.len(), "Roster loaded");
        Ok(roster)
    }

    /// Replace the stored roster with `roster`, in canonical layout.
    pub fn save(&self, roster: Roster, schema: &SchemaConfig) -> Result<()> {
        let workers = roster.len();
        let document = render_roster(roster, schema)?;
        write_atomic(&self.path, document.as_bytes())?;
        info!(path = %self.path.display(), workers, "Roster saved");
        Ok(())
    }
}

/// Parse a roster document.
pub fn parse_roster(content: &str, path: &Path) -> Result<Roster> {
    let document: Map<String, Value> = serde_json::from_str(content)
        .map_err(|e| Error::store_format(path, format!("invalid JSON object: {}", e)))?;

    let mut roster = Roster::new();
    for (name, value) in document {
        let Value::Object(entries) = value else {
            return Err(Error::store_format(
                path,
                format!("worker '{}' is not an object", name),
            ));
        };
        let record = parse_record(&name, entries, path)?;
        roster.insert(name, record);
    }
    Ok(roster)
}

/// A record is hierarchical iff its first value is an object.
fn parse_record(worker: &str, entries: Map<String, Value>, path: &Path) -> Result<WorkerRecord> {
    let hierarchical = matches!(entries.values().next(), Some(Value::Object(_)));

    if hierarchical {
        let mut modalities = ModalityMap::new();
        for (modality, skills) in entries {
            let Value::Object(skills) = skills else {
                return Err(Error::store_format(
                    path,
                    format!("worker '{}': modality '{}' is not an object", worker, modality),
                ));
            };
            let mut map = SkillMap::new();
            for (skill, value) in skills {
                let location = format!("{}.{}.{}", worker, modality, skill);
                map.insert(skill, parse_value(&value, &location, path)?);
            }
            modalities.insert(modality, map);
        }
        Ok(WorkerRecord::Hierarchical(modalities))
    } else {
        let mut cells = IndexMap::new();
        for (key, value) in entries {
            let location = format!("{}.{}", worker, key);
            cells.insert(key, parse_value(&value, &location, path)?);
        }
        Ok(WorkerRecord::Flat(cells))
    }
}

fn parse_value(value: &Value, location: &str, path: &Path) -> Result<Capability> {
    RawCell::from_json(value)
        .ok_or_else(|| Error::invalid_value(value.to_string()))
        .and_then(capability::decode)
        .map_err(|e| Error::store_format(path, format!("{}: {}", location, e)))
}

/// Serialize a roster as pretty JSON (2-space indent, non-ASCII literal).
pub fn render_roster(roster: Roster, schema: &SchemaConfig) -> Result<String> {
    let canonical: IndexMap<String, ModalityMap> = roster
        .into_iter()
        .map(|(name, record)| (name, record.into_hierarchical(schema)))
        .collect();

    serde_json::to_string_pretty(&canonical)
        .map_err(|e| Error::Internal(format!("Roster serialization failed: {}", e)))
}

/// Write `bytes` to a temporary file beside `path`, then rename it over
/// `path`. Any failure leaves `path` untouched.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(|e| Error::persistence(path, e))?;
    temp.write_all(bytes).map_err(|e| Error::persistence(path, e))?;
    if let Some(existing) = fs::metadata(path).ok().filter(|m| m.is_file()) {
        temp.as_file()
            .set_permissions(existing.permissions())
            .map_err(|e| Error::persistence(path, e))?;
    }
    temp.as_file()
        .sync_all()
        .map_err(|e| Error::persistence(path, e))?;
    temp.persist(path)
        .map_err(|e| Error::persistence(path, e.error))?;

    debug!(path = %path.display(), bytes = bytes.len(), "File written atomically");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::schema::ColumnKey;
    use tempfile::TempDir;

    fn schema() -> SchemaConfig {
        SchemaConfig::new(vec!["Notfall".into(), "Gyn".into()], vec!["ct".into(), "mr".into()])
    }

    #[test]
    fn test_parse_hierarchical_record() {
        let roster = parse_roster(r#"{"A": {"ct": {"Notfall": 1, "Gyn": "w"}}}"#, Path::new("r.json")).unwrap();
        let record = roster.get("A").unwrap();

        assert_eq!(record.shape(), crate::types::RecordShape::Hierarchical);
        assert_eq!(record.get(&ColumnKey::new("Notfall", "ct")), Capability::Active);
        assert_eq!(record.get(&ColumnKey::new("Gyn", "ct")), Capability::Weighted);
    }

    #[test]
    fn test_parse_flat_record() {
        let roster = parse_roster(r#"{"A": {"Notfall_ct": -1, "Gyn_mr": 2}}"#, Path::new("r.json")).unwrap();
        let record = roster.get("A").unwrap();

        assert_eq!(record.shape(), crate::types::RecordShape::Flat);
        assert_eq!(record.get(&ColumnKey::new("Notfall", "ct")), Capability::Excluded);
        assert_eq!(record.get(&ColumnKey::new("Gyn", "mr")), Capability::Weighted);
    }

    #[test]
    fn test_parse_preserves_worker_order() {
        let roster = parse_roster(r#"{"Zoe": {}, "Adam": {}, "Mia": {}}"#, Path::new("r.json")).unwrap();
        let names: Vec<&String> = roster.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Zoe", "Adam", "Mia"]);
    }

    #[test]
    fn test_parse_rejects_bad_values() {
        let err = parse_roster(r#"{"A": {"ct": {"Notfall": 7}}}"#, Path::new("r.json")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::StoreFormat);
        assert!(err.to_string().contains("A.ct.Notfall"));

        let err = parse_roster(r#"{"A": {"ct": {"Notfall": 1}, "mr": 1}}"#, Path::new("r.json")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::StoreFormat);

        let err = parse_roster(r#"["A"]"#, Path::new("r.json")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::StoreFormat);
    }

    #[test]
    fn test_render_is_hierarchical_and_keeps_unicode() {
        let roster = parse_roster(r#"{"Dr. Müller": {"Notfall_ct": 1}}"#, Path::new("r.json")).unwrap();
        let text = render_roster(roster, &schema()).unwrap();

        assert!(text.contains("Dr. Müller"));
        assert!(text.contains("\n  \"Dr. Müller\": {\n    \"ct\": {\n      \"Notfall\": 1"));
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let store = RosterStore::new("/nonexistent/roster.json");
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = RosterStore::new(dir.path().join("roster.json"));

        let roster = parse_roster(r#"{"B": {"mr": {"Gyn": -1}}, "A": {"ct": {"Notfall": 2}}}"#, Path::new("r.json")).unwrap();
        store.save(roster.clone(), &schema()).unwrap();

        assert_eq!(store.load().unwrap(), roster);
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("missing_dir").join("roster.json");

        let err = write_atomic(&target, b"{}").unwrap_err();
        assert_eq!(err.code(), ErrorCode::PersistenceFailure);
        assert!(!target.exists());
    }

    #[test]
    fn test_failed_rename_keeps_previous_contents() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("roster.json");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep.txt"), "prior").unwrap();

        let err = write_atomic(&target, b"{}").unwrap_err();
        assert_eq!(err.code(), ErrorCode::PersistenceFailure);
        assert!(target.is_dir());
        assert_eq!(fs::read_to_string(target.join("keep.txt")).unwrap(), "prior");

        // No temp file is left behind next to the target.
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_write_atomic_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let target = dir.path().join("roster.json");
        fs::write(&target, "old").unwrap();
        fs::set_permissions(&target, fs::Permissions::from_mode(0o640)).unwrap();

        write_atomic(&target, b"new").unwrap();
        let mode = fs::metadata(&target).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
    }

    #[test]
    fn test_write_atomic_replaces_contents() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("roster.json");
        fs::write(&target, "old").unwrap();

        write_atomic(&target, b"new").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "new");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
