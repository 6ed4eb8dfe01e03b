//! Static, read-only search data: the keyword allow-list, the content
//! catalog and the location table. Loaded once at startup and shared by
//! reference with every search session.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::types::{ContentEntry, Location};

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse dataset: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("duplicate entry id: {0}")]
    DuplicateEntry(u64),

    #[error("duplicate location key: {0}")]
    DuplicateLocation(String),

    #[error("entry {entry} references unknown location: {location}")]
    UnknownLocation { entry: u64, location: String },
}

// =============================================================================
// Keyword allow-list
// =============================================================================

/// Closed set of permitted keywords, lowercased at definition time.
#[derive(Debug, Clone, Default)]
pub struct KeywordRegistry {
    ordered: Vec<String>,
    lookup: HashSet<String>,
}

impl KeywordRegistry {
    /// Build from raw keywords. Entries are trimmed and lowercased; blanks and
    /// repeats are dropped; first-seen order is kept for prompt rendering.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = Self::default();
        for keyword in keywords {
            let normalized = keyword.as_ref().trim().to_lowercase();
            if normalized.is_empty() {
                continue;
            }
            if registry.lookup.insert(normalized.clone()) {
                registry.ordered.push(normalized);
            }
        }
        registry
    }

    /// Case-insensitive membership.
    pub fn contains(&self, keyword: &str) -> bool {
        self.lookup.contains(&keyword.to_lowercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ordered.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Comma-separated list, as embedded in the interpret prompt.
    pub fn prompt_list(&self) -> String {
        self.ordered.join(", ")
    }
}

// =============================================================================
// Content catalog
// =============================================================================

/// Ordered, immutable sequence of content entries.
#[derive(Debug, Clone, Default)]
pub struct ContentCatalog {
    entries: Vec<ContentEntry>,
}

impl ContentCatalog {
    pub fn new(entries: Vec<ContentEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[ContentEntry] {
        &self.entries
    }

    pub fn get(&self, id: u64) -> Option<&ContentEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Locations
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct LocationTable {
    locations: Vec<Location>,
}

impl LocationTable {
    pub fn new(locations: Vec<Location>) -> Self {
        Self { locations }
    }

    pub fn get(&self, key: &str) -> Option<&Location> {
        self.locations.iter().find(|l| l.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Location> {
        self.locations.iter()
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

// =============================================================================
// Dataset file
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DatasetFile {
    keywords: Vec<String>,
    #[serde(default)]
    entries: Vec<ContentEntry>,
    #[serde(default)]
    locations: Vec<Location>,
}

/// Everything a search needs, shared read-only across sessions.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub registry: Arc<KeywordRegistry>,
    pub catalog: Arc<ContentCatalog>,
    pub locations: Arc<LocationTable>,
}

impl Dataset {
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let content = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let dataset = Self::from_toml_str(&content)?;

        info!(
            path = %path.display(),
            keywords = dataset.registry.len(),
            entries = dataset.catalog.len(),
            locations = dataset.locations.len(),
            "Dataset loaded"
        );
        Ok(dataset)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, DatasetError> {
        let file: DatasetFile = toml::from_str(content)?;

        let mut location_keys = HashSet::new();
        for location in &file.locations {
            if !location_keys.insert(location.key.as_str()) {
                return Err(DatasetError::DuplicateLocation(location.key.clone()));
            }
        }

        let registry = KeywordRegistry::new(&file.keywords);
        if registry.is_empty() {
            warn!("Dataset allow-list is empty; no search can match");
        }

        let mut ids = HashSet::new();
        for entry in &file.entries {
            if !ids.insert(entry.id) {
                return Err(DatasetError::DuplicateEntry(entry.id));
            }
            if let Some(location) = &entry.location {
                if !location_keys.contains(location.as_str()) {
                    return Err(DatasetError::UnknownLocation {
                        entry: entry.id,
                        location: location.clone(),
                    });
                }
            }
            for tag in entry.keywords.iter().filter(|t| !registry.contains(t)) {
                warn!(entry = entry.id, tag = %tag, "Tag is not on the allow-list and can never match");
            }
        }

        Ok(Self {
            registry: Arc::new(registry),
            catalog: Arc::new(ContentCatalog::new(file.entries)),
            locations: Arc::new(LocationTable::new(file.locations)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LocationType;
    use std::io::Write;

    const SAMPLE: &str = r#"
        keywords = ["Mountain", "river", " lake ", "river", ""]

        [[locations]]
        key = "Anchorage"
        name = "Anchorage"
        location_type = "city"
        center = { lat = 61.2181, lng = -149.9003 }
        zoom = 12

        [[entries]]
        id = 1
        title = "Ship Creek salmon run"
        location = "Anchorage"
        keywords = ["River", "fishing"]

        [[entries]]
        id = 2
        title = "Untagged note"
    "#;

    #[test]
    fn registry_lowercases_and_dedupes() {
        let registry = KeywordRegistry::new(["Mountain", "river", "RIVER", "  ", "Lake"]);
        assert_eq!(registry.iter().collect::<Vec<_>>(), ["mountain", "river", "lake"]);
        assert!(registry.contains("MOUNTAIN"));
        assert!(!registry.contains("desert"));
        assert_eq!(registry.prompt_list(), "mountain, river, lake");
    }

    #[test]
    fn parses_sample_dataset() {
        let dataset = Dataset::from_toml_str(SAMPLE).unwrap();

        assert_eq!(dataset.registry.len(), 3);
        assert_eq!(dataset.catalog.len(), 2);
        assert_eq!(dataset.catalog.get(1).unwrap().keywords, ["River", "fishing"]);
        assert!(dataset.catalog.get(2).unwrap().keywords.is_empty());

        let anchorage = dataset.locations.get("Anchorage").unwrap();
        assert_eq!(anchorage.location_type, LocationType::City);
        assert_eq!(anchorage.zoom, 12);
    }

    #[test]
    fn catalog_keeps_file_order() {
        let dataset = Dataset::from_toml_str(SAMPLE).unwrap();
        let ids: Vec<u64> = dataset.catalog.entries().iter().map(|e| e.id).collect();
        assert_eq!(ids, [1, 2]);
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = Dataset::from_toml_str(
            r#"
            keywords = ["river"]
            [[entries]]
            id = 1
            title = "a"
            [[entries]]
            id = 1
            title = "b"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, DatasetError::DuplicateEntry(1)));
    }

    #[test]
    fn rejects_unknown_location() {
        let err = Dataset::from_toml_str(
            r#"
            keywords = ["river"]
            [[entries]]
            id = 3
            title = "a"
            location = "Juneau"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, DatasetError::UnknownLocation { entry: 3, .. }));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Dataset::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, DatasetError::Io { .. }));
    }

    #[test]
    fn load_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let dataset = Dataset::load(file.path()).unwrap();
        assert_eq!(dataset.catalog.len(), 2);
    }
}
