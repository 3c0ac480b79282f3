//! Valid city/country reference data.
//!
//! The target API only accepts hotels located in a closed set of cities, so
//! hotel payloads draw their location from this dataset instead of free text.
//!
//! # Example file
//! ```json
//! [
//!   {"city": "Toronto", "country": "Canada"},
//!   {"city": "Miami", "country": "United States"}
//! ]
//! ```
//!
//! A missing or unreadable file never stops a run: [`CityDataset::load_or_builtin`]
//! logs the problem and falls back to a small built-in list.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// File name probed in the working directory when no path is configured.
pub const DEFAULT_CITIES_FILE: &str = "cities.json";

#[derive(Error, Debug)]
pub enum CitiesError {
    #[error("Failed to open file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse cities JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cities file has no entries")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CityEntry {
    pub city: String,
    pub country: String,
}

impl CityEntry {
    pub fn new(city: &str, country: &str) -> Self {
        Self {
            city: city.to_string(),
            country: country.to_string(),
        }
    }
}

/// Where the loaded entries came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    File(PathBuf),
    Builtin,
}

#[derive(Debug, Clone)]
pub struct CityDataset {
    entries: Vec<CityEntry>,
    source: DatasetSource,
}

impl CityDataset {
    /// Load a JSON array of `{city, country}` objects.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CitiesError> {
        let path_ref = path.as_ref();
        debug!(path = ?path_ref, "Loading cities file");

        let content = fs::read_to_string(path_ref)?;
        let mut dataset = Self::parse(&content)?;
        dataset.source = DatasetSource::File(path_ref.to_path_buf());

        info!(path = ?path_ref, cities = dataset.len(), "Cities dataset loaded");
        Ok(dataset)
    }

    /// Parse a JSON array of `{city, country}` objects.
    pub fn parse(content: &str) -> Result<Self, CitiesError> {
        let entries: Vec<CityEntry> = serde_json::from_str(content)?;
        let entries: Vec<CityEntry> = entries
            .into_iter()
            .filter(|e| !e.city.trim().is_empty() && !e.country.trim().is_empty())
            .collect();

        if entries.is_empty() {
            return Err(CitiesError::Empty);
        }

        Ok(Self {
            entries,
            source: DatasetSource::Builtin,
        })
    }

    /// The built-in fallback list.
    pub fn builtin() -> Self {
        Self {
            entries: vec![
                CityEntry::new("New York", "United States"),
                CityEntry::new("Toronto", "Canada"),
                CityEntry::new("Vancouver", "Canada"),
                CityEntry::new("Miami", "United States"),
                CityEntry::new("Chicago", "United States"),
                CityEntry::new("San Francisco", "United States"),
            ],
            source: DatasetSource::Builtin,
        }
    }

    /// Load from `path`, or from `./cities.json` if present, falling back to
    /// the built-in list on any failure.
    pub fn load_or_builtin(path: Option<&Path>) -> Self {
        let candidate = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default_path = PathBuf::from(DEFAULT_CITIES_FILE);
                if !default_path.exists() {
                    debug!("No cities file configured, using built-in list");
                    return Self::builtin();
                }
                default_path
            }
        };

        match Self::from_file(&candidate) {
            Ok(dataset) => dataset,
            Err(e) => {
                warn!(
                    path = ?candidate,
                    error = %e,
                    "Could not load cities dataset, falling back to built-in list"
                );
                Self::builtin()
            }
        }
    }

    /// Never empty.
    pub fn entries(&self) -> &[CityEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn source(&self) -> &DatasetSource {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_list() {
        let dataset = CityDataset::builtin();
        assert_eq!(dataset.len(), 6);
        assert_eq!(dataset.source(), &DatasetSource::Builtin);
        assert!(dataset
            .entries()
            .iter()
            .any(|e| e.city == "Toronto" && e.country == "Canada"));
    }

    #[test]
    fn test_parse() {
        let dataset = CityDataset::parse(
            r#"[{"city": "Paris", "country": "France"}, {"city": "Lyon", "country": "France"}]"#,
        )
        .unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.entries()[0], CityEntry::new("Paris", "France"));
    }

    #[test]
    fn test_parse_ignores_extra_fields() {
        let dataset = CityDataset::parse(
            r#"[{"city": "Oslo", "country": "Norway", "population": 700000}]"#,
        )
        .unwrap();
        assert_eq!(dataset.entries()[0].city, "Oslo");
    }

    #[test]
    fn test_empty_array_rejected() {
        assert!(matches!(CityDataset::parse("[]"), Err(CitiesError::Empty)));
    }

    #[test]
    fn test_blank_entries_dropped() {
        assert!(matches!(
            CityDataset::parse(r#"[{"city": " ", "country": "Nowhere"}]"#),
            Err(CitiesError::Empty)
        ));
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(matches!(
            CityDataset::parse("{not json"),
            Err(CitiesError::Json(_))
        ));
    }

    #[test]
    fn test_missing_file_falls_back() {
        let dataset =
            CityDataset::load_or_builtin(Some(Path::new("/definitely/not/here/cities.json")));
        assert_eq!(dataset.source(), &DatasetSource::Builtin);
        assert_eq!(dataset.len(), 6);
    }
}
