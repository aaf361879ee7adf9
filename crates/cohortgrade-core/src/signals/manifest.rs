//! File-backed signal sources
//!
//! Two layouts are supported:
//! - a manifest: one JSON or YAML document listing every entity
//! - a directory holding one `<entity>.json|.yaml|.yml` file per entity

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::{EntitySignals, RawSignals, SignalExtractor};
use crate::error::{GradeError, Result};

/// Serialization of a signal document, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalFormat {
    Json,
    Yaml,
}

impl SignalFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "json" => Some(SignalFormat::Json),
            "yaml" | "yml" => Some(SignalFormat::Yaml),
            _ => None,
        }
    }

    fn parse<T: for<'de> Deserialize<'de>>(self, content: &str) -> Result<T> {
        match self {
            SignalFormat::Json => Ok(serde_json::from_str(content)?),
            SignalFormat::Yaml => Ok(serde_yaml::from_str(content)?),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ManifestDocument {
    #[serde(default)]
    entities: Vec<RawSignals>,
}

/// Every entity's signals from a single document, in document order
#[derive(Debug, Clone, Default)]
pub struct ManifestExtractor {
    order: Vec<String>,
    entities: HashMap<String, RawSignals>,
}

impl ManifestExtractor {
    pub fn open(path: &Path) -> Result<Self> {
        let format = SignalFormat::from_path(path).ok_or_else(|| {
            GradeError::invalid_value("signal manifest extension", path.display())
        })?;
        let content = std::fs::read_to_string(path)?;
        let manifest = Self::parse(&content, format)?;
        debug!(path = %path.display(), entities = manifest.order.len(), "manifest_loaded");
        Ok(manifest)
    }

    pub fn parse(content: &str, format: SignalFormat) -> Result<Self> {
        let document: ManifestDocument = format.parse(content)?;
        let mut manifest = Self::default();

        for (index, raw) in document.entities.into_iter().enumerate() {
            let id = match raw.id.as_deref().map(str::trim) {
                Some(id) if !id.is_empty() => id.to_string(),
                _ => {
                    return Err(GradeError::invalid_input(
                        "manifest",
                        format!("entity #{} has no id", index + 1),
                    ))
                }
            };
            if manifest.entities.contains_key(&id) {
                return Err(GradeError::invalid_input(
                    "manifest",
                    format!("duplicate entity id: {}", id),
                ));
            }
            manifest.order.push(id.clone());
            manifest.entities.insert(id, raw);
        }

        Ok(manifest)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl SignalExtractor for ManifestExtractor {
    fn extract(&self, entity_id: &str) -> Result<EntitySignals> {
        self.entities
            .get(entity_id)
            .cloned()
            .map(|raw| raw.into_signals(entity_id))
            .ok_or_else(|| GradeError::extraction(entity_id, "not listed in manifest"))
    }

    fn entity_ids(&self) -> Vec<String> {
        self.order.clone()
    }
}

/// One signal file per entity; the file stem is the entity id
#[derive(Debug, Clone)]
pub struct DirectoryExtractor {
    root: PathBuf,
    files: BTreeMap<String, PathBuf>,
}

impl DirectoryExtractor {
    pub fn open(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            return Err(GradeError::not_found("signal directory", root.display()));
        }

        let mut files: BTreeMap<String, PathBuf> = BTreeMap::new();
        for entry in WalkDir::new(root)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !entry.file_type().is_file() || SignalFormat::from_path(path).is_none() {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if let Some(existing) = files.get(stem) {
                warn!(
                    entity = stem,
                    kept = %existing.display(),
                    ignored = %path.display(),
                    "duplicate_signal_file"
                );
                continue;
            }
            files.insert(stem.to_string(), path.to_path_buf());
        }

        debug!(root = %root.display(), entities = files.len(), "signal_directory_scanned");
        Ok(Self {
            root: root.to_path_buf(),
            files,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, entity_id: &str) -> Option<&Path> {
        self.files.get(entity_id).map(PathBuf::as_path)
    }

    fn read(&self, entity_id: &str) -> Result<RawSignals> {
        let path = self
            .files
            .get(entity_id)
            .ok_or_else(|| GradeError::not_found("signal file", entity_id))?;
        let format = SignalFormat::from_path(path)
            .ok_or_else(|| GradeError::invalid_value("signal file extension", path.display()))?;
        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(RawSignals::default());
        }
        format.parse(&content)
    }
}

impl SignalExtractor for DirectoryExtractor {
    fn extract(&self, entity_id: &str) -> Result<EntitySignals> {
        let raw = self
            .read(entity_id)
            .map_err(|e| GradeError::extraction(entity_id, e))?;

        if let Some(declared) = raw.id.as_deref() {
            if declared != entity_id {
                return Err(GradeError::extraction(
                    entity_id,
                    format!("file declares id {}", declared),
                ));
            }
        }

        Ok(raw.into_signals(entity_id))
    }

    fn entity_ids(&self) -> Vec<String> {
        self.files.keys().cloned().collect()
    }
}

/// Open a manifest file or a per-entity signal directory
pub fn open_signal_source(path: &Path) -> Result<Box<dyn SignalExtractor>> {
    if path.is_dir() {
        Ok(Box::new(DirectoryExtractor::open(path)?))
    } else if path.is_file() {
        Ok(Box::new(ManifestExtractor::open(path)?))
    } else {
        Err(GradeError::not_found("signal source", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criterion::CriterionKey;
    use std::fs;
    use tempfile::tempdir;

    fn key(text: &str) -> CriterionKey {
        CriterionKey::normalize(text).unwrap()
    }

    #[test]
    fn test_manifest_yaml_preserves_order() {
        let yaml = r#"
entities:
  - id: zed
    criteria: [Unit Tests, Docker]
  - id: amy
    criteria: [README]
    dimensions:
      ci:
        present: true
        provider: github
"#;
        let manifest = ManifestExtractor::parse(yaml, SignalFormat::Yaml).unwrap();
        assert_eq!(manifest.entity_ids(), vec!["zed", "amy"]);

        let amy = manifest.extract("amy").unwrap();
        assert!(amy.contains(&key("readme")));
        assert!(amy.contains(&key("ci")));
        assert_eq!(
            amy.dimension(&key("ci")).unwrap().extra["provider"],
            serde_json::json!("github")
        );
    }

    #[test]
    fn test_manifest_rejects_duplicate_ids() {
        let json = r#"{"entities": [{"id": "a"}, {"id": "a"}]}"#;
        let err = ManifestExtractor::parse(json, SignalFormat::Json).unwrap_err();
        assert!(matches!(err, GradeError::InvalidInput { .. }));
    }

    #[test]
    fn test_manifest_rejects_missing_id() {
        let json = r#"{"entities": [{"criteria": ["x"]}]}"#;
        assert!(ManifestExtractor::parse(json, SignalFormat::Json).is_err());
    }

    #[test]
    fn test_manifest_unknown_entity_is_extraction_error() {
        let manifest =
            ManifestExtractor::parse(r#"{"entities": []}"#, SignalFormat::Json).unwrap();
        assert!(manifest.is_empty());
        assert!(matches!(
            manifest.extract("ghost").unwrap_err(),
            GradeError::Extraction { .. }
        ));
    }

    #[test]
    fn test_directory_sorted_by_stem_and_isolates_bad_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("carol.yaml"), "criteria: [docker]\n").unwrap();
        fs::write(dir.path().join("alice.json"), r#"{"criteria": ["tests"]}"#).unwrap();
        fs::write(dir.path().join("bob.json"), "{not json").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let source = DirectoryExtractor::open(dir.path()).unwrap();
        assert_eq!(source.entity_ids(), vec!["alice", "bob", "carol"]);

        assert!(source.extract("alice").unwrap().contains(&key("tests")));
        assert!(source.extract("carol").unwrap().contains(&key("docker")));
        let err = source.extract("bob").unwrap_err();
        assert!(matches!(err, GradeError::Extraction { ref entity, .. } if entity == "bob"));
    }

    #[test]
    fn test_directory_rejects_mismatched_id() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("alice.json"), r#"{"id": "bob", "criteria": []}"#).unwrap();

        let source = DirectoryExtractor::open(dir.path()).unwrap();
        assert!(source.extract("alice").is_err());
    }

    #[test]
    fn test_open_signal_source_dispatch() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("cohort.json");
        fs::write(&manifest, r#"{"entities": [{"id": "a", "criteria": ["x"]}]}"#).unwrap();
        let per_entity = dir.path().join("entities");
        fs::create_dir(&per_entity).unwrap();
        fs::write(per_entity.join("b.yml"), "criteria: [y]\n").unwrap();

        assert_eq!(open_signal_source(&manifest).unwrap().entity_ids(), vec!["a"]);
        assert_eq!(open_signal_source(&per_entity).unwrap().entity_ids(), vec!["b"]);
        assert!(matches!(
            open_signal_source(&dir.path().join("missing")).err(),
            Some(GradeError::NotFound { .. })
        ));
    }
}
