//! Integration tests for loading the cities dataset from disk.

use std::io::Write;
use tempfile::NamedTempFile;

use hotel_sim::cities::{CitiesError, CityDataset, CityEntry, DatasetSource};

fn cities_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_from_file() {
    let file = cities_file(
        r#"[
            {"city": "Montreal", "country": "Canada"},
            {"city": "Boston", "country": "United States"}
        ]"#,
    );

    let dataset = CityDataset::from_file(file.path()).unwrap();
    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.entries()[1], CityEntry::new("Boston", "United States"));
    assert_eq!(
        dataset.source(),
        &DatasetSource::File(file.path().to_path_buf())
    );
}

#[test]
fn test_load_or_builtin_prefers_readable_file() {
    let file = cities_file(r#"[{"city": "Calgary", "country": "Canada"}]"#);

    let dataset = CityDataset::load_or_builtin(Some(file.path()));
    assert_eq!(dataset.len(), 1);
    assert_eq!(dataset.entries()[0].city, "Calgary");
}

#[test]
fn test_malformed_file_falls_back_to_builtin() {
    let file = cities_file(r#"{"city": "Calgary"}"#);

    assert!(matches!(
        CityDataset::from_file(file.path()),
        Err(CitiesError::Json(_))
    ));
    let dataset = CityDataset::load_or_builtin(Some(file.path()));
    assert_eq!(dataset.source(), &DatasetSource::Builtin);
    assert!(!dataset.is_empty());
}

#[test]
fn test_empty_file_falls_back_to_builtin() {
    let file = cities_file("[]");
    let dataset = CityDataset::load_or_builtin(Some(file.path()));
    assert_eq!(dataset.source(), &DatasetSource::Builtin);
}
