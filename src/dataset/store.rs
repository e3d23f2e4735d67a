//! JSON persistence for datasets.

use std::fs;
use std::io::Write;
use std::path::Path;

use tracing::{debug, info};

use super::record::{DatasetDocument, SpecimenRecord};
use super::Dataset;
use crate::error::DatasetError;

/// Loads a dataset document, renumbering specimen ids to their positions.
pub fn load(path: impl AsRef<Path>) -> Result<Dataset, DatasetError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let document: DatasetDocument =
        serde_json::from_str(&content).map_err(|source| DatasetError::MalformedDocument {
            path: path.to_path_buf(),
            source,
        })?;

    let dataset = Dataset::from_document(document);
    info!(
        "Loaded {} specimens ({} packages, {} labels) from {}",
        dataset.len(),
        dataset.package_catalog().len(),
        dataset.label_catalog().len(),
        path.display()
    );
    Ok(dataset)
}

/// Saves a dataset with unrendered text and bindings; sampled values are dropped.
///
/// The document is written to a sibling temporary file and renamed over
/// `path`, so an interrupted save leaves the previous file intact.
pub fn save(path: impl AsRef<Path>, dataset: &Dataset) -> Result<(), DatasetError> {
    let path = path.as_ref();
    let io_err = |source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    };

    let document = DatasetDocument {
        packages: dataset.package_catalog().to_vec(),
        labels: dataset.label_catalog().to_vec(),
        data: dataset.iter().map(SpecimenRecord::from).collect(),
    };
    let json = serde_json::to_string_pretty(&document)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(json.as_bytes()).map_err(io_err)?;
    tmp.write_all(b"\n").map_err(io_err)?;
    tmp.flush().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;

    debug!("Saved {} specimens to {}", dataset.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::specimen::{Specimen, TestCase};
    use crate::template::RandomBinding;
    use tempfile::tempdir;

    #[test]
    fn test_load_reindexes() {
        let dir = tempdir().expect("failed to create temp dir");
        let path = dir.path().join("data.json");
        fs::write(
            &path,
            r#"{"packages": ["math"], "labels": [], "data": [
                {"question_id": 40, "intent": "a", "package": [], "tests cases": [], "labels": [], "code": ""},
                {"question_id": 7, "intent": "b", "package": [], "tests cases": [], "labels": [], "code": ""}
            ]}"#,
        )
        .expect("failed to write");

        let dataset = load(&path).expect("should load");
        let ids: Vec<usize> = dataset.iter().map(|s| s.id()).collect();
        assert_eq!(ids, vec![0, 1]);
        assert_eq!(dataset.package_catalog(), ["math"]);
    }

    #[test]
    fn test_load_malformed_json() {
        let dir = tempdir().expect("failed to create temp dir");
        let path = dir.path().join("broken.json");
        fs::write(&path, "{\"data\": [").expect("failed to write");

        let result = load(&path);
        assert!(matches!(result, Err(DatasetError::MalformedDocument { .. })));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().expect("failed to create temp dir");
        let result = load(dir.path().join("absent.json"));
        assert!(matches!(result, Err(DatasetError::Io { .. })));
    }

    #[test]
    fn test_save_does_not_persist_samples() {
        let dir = tempdir().expect("failed to create temp dir");
        let path = dir.path().join("out.json");

        let mut specimen = Specimen::new(0, "Return {{ n }}", "def foo():\n    return {{ n }}")
            .with_tests(vec![TestCase::new("[]", "__result__ == {{ n }}")])
            .with_bindings(vec![RandomBinding::new("n", "@RNAT")]);
        specimen
            .resample(&mut crate::generator::ValueSampler::new(1))
            .expect("should sample");

        let mut dataset = Dataset::default();
        dataset.push(specimen);
        save(&path, &dataset).expect("should save");

        let raw = fs::read_to_string(&path).expect("failed to read");
        assert!(raw.contains("{{ n }}"));
        let doc: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
        let keys: Vec<&str> = doc["data"][0]
            .as_object()
            .expect("object")
            .keys()
            .map(String::as_str)
            .collect();
        assert!(!keys.contains(&"sampled"));
        assert_eq!(doc["data"][0]["templates"], serde_json::json!([["n", "@RNAT"]]));
    }
}
