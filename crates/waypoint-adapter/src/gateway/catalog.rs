//! Catalog files - JSON seed data for the simulated upstream
//!
//! ```json
//! [
//!   { "id": "site-001", "name": "Colosseum", "location": "Rome",
//!     "description": "Flavian amphitheatre", "images": ["img/colosseum.jpg"] }
//! ]
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use waypoint_domain::{Record, RecordId};

/// Errors raised while loading a catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("catalog entry {index} has an empty id")]
    EmptyId { index: usize },

    #[error("duplicate record id '{0}' in catalog")]
    DuplicateId(String),
}

/// Wire format of a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordDto {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

impl From<RecordDto> for Record {
    fn from(dto: RecordDto) -> Self {
        let mut record = Record::new(RecordId::new(dto.id), dto.name)
            .with_description(dto.description)
            .with_images(dto.images);
        if let Some(location) = dto.location {
            record = record.with_location(location);
        }
        record
    }
}

impl From<&Record> for RecordDto {
    fn from(record: &Record) -> Self {
        Self {
            id: record.id().as_str().to_string(),
            name: record.name().to_string(),
            description: record.description().to_string(),
            location: record.location().map(str::to_string),
            images: record.images().to_vec(),
        }
    }
}

/// Parse a JSON array of records
///
/// Ids must be non-empty and unique.
pub fn parse_catalog(json: &str) -> Result<Vec<Record>, CatalogError> {
    let entries: Vec<RecordDto> = serde_json::from_str(json)?;

    let mut seen = HashSet::new();
    for (index, entry) in entries.iter().enumerate() {
        if entry.id.trim().is_empty() {
            return Err(CatalogError::EmptyId { index });
        }
        if !seen.insert(entry.id.as_str()) {
            return Err(CatalogError::DuplicateId(entry.id.clone()));
        }
    }

    Ok(entries.into_iter().map(Record::from).collect())
}

/// Load a catalog file from disk
pub fn load_catalog(path: &Path) -> Result<Vec<Record>, CatalogError> {
    let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_catalog(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_catalog() {
        let json = r#"[
            { "id": "site-001", "name": "Colosseum", "location": "Rome",
              "images": ["img/a.jpg", "img/b.jpg"] },
            { "id": "site-002", "name": "Uffizi" }
        ]"#;

        let records = parse_catalog(json).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].location(), Some("Rome"));
        assert_eq!(records[0].images(), &["img/a.jpg", "img/b.jpg"]);
        assert_eq!(records[1].description(), "");
        assert_eq!(records[1].location(), None);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let json = r#"[{ "id": "a", "name": "A" }, { "id": "a", "name": "B" }]"#;
        assert!(matches!(
            parse_catalog(json),
            Err(CatalogError::DuplicateId(id)) if id == "a"
        ));
    }

    #[test]
    fn test_empty_id_rejected() {
        let json = r#"[{ "id": " ", "name": "Nameless" }]"#;
        assert!(matches!(
            parse_catalog(json),
            Err(CatalogError::EmptyId { index: 0 })
        ));
    }

    #[test]
    fn test_load_catalog_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{ "id": "x", "name": "X" }}]"#).unwrap();

        let records = load_catalog(file.path()).unwrap();
        assert_eq!(records[0].id().as_str(), "x");
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = load_catalog(Path::new("/nonexistent/catalog.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/catalog.json"));
    }

    #[test]
    fn test_dto_round_trip_keeps_images() {
        let record = Record::new(RecordId::new("r"), "R").with_images(["1.png", "2.png"]);
        let dto = RecordDto::from(&record);
        let json = serde_json::to_value(&dto).unwrap();

        assert_eq!(json["images"][1], "2.png");
        assert!(json.get("location").is_none());
    }
}
