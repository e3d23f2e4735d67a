//! Specimen collections and their JSON persistence.
//!
//! A [`Dataset`] owns its specimens plus two flat catalogs: every known package
//! name and every known label. Specimens reference catalog entries by name
//! only; the catalogs exist to offer choices when editing.
//!
//! # Example
//!
//! ```ignore
//! use specimen_forge::dataset::{self, Dataset};
//!
//! let mut data = dataset::load("exercises.json")?;
//! let id = data.create_empty();
//! data.get_mut(id)?.set_intent("Sum a list");
//! dataset::save("exercises.json", &data)?;
//! ```

pub mod record;
pub mod store;

pub use record::{DatasetDocument, SpecimenRecord};
pub use store::{load, save};

use tracing::debug;

use crate::error::DatasetError;
use crate::specimen::Specimen;

/// In-memory dataset: specimens in positional order plus catalogs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    specimens: Vec<Specimen>,
    packages: Vec<String>,
    labels: Vec<String>,
}

impl Dataset {
    pub fn new(specimens: Vec<Specimen>, packages: Vec<String>, labels: Vec<String>) -> Self {
        Self {
            specimens,
            packages,
            labels,
        }
    }

    /// Builds a dataset from a parsed document, renumbering ids to positions.
    pub fn from_document(document: DatasetDocument) -> Self {
        let specimens = document
            .data
            .into_iter()
            .enumerate()
            .map(|(position, record)| record.into_specimen(position))
            .collect();
        Self::new(specimens, document.packages, document.labels)
    }

    pub fn len(&self) -> usize {
        self.specimens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specimens.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Specimen> {
        self.specimens.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Specimen> {
        self.specimens.iter_mut()
    }

    /// Looks up a specimen by id.
    pub fn get(&self, id: usize) -> Result<&Specimen, DatasetError> {
        self.specimens
            .iter()
            .find(|s| s.id() == id)
            .ok_or(DatasetError::SpecimenNotFound(id))
    }

    pub fn get_mut(&mut self, id: usize) -> Result<&mut Specimen, DatasetError> {
        self.specimens
            .iter_mut()
            .find(|s| s.id() == id)
            .ok_or(DatasetError::SpecimenNotFound(id))
    }

    /// Id a newly appended specimen receives: one past the largest id.
    pub fn next_id(&self) -> usize {
        self.specimens
            .iter()
            .map(Specimen::id)
            .max()
            .map_or(0, |max| max + 1)
    }

    /// Appends a specimen as-is.
    pub fn push(&mut self, specimen: Specimen) {
        self.specimens.push(specimen);
    }

    /// Appends a blank specimen and returns its id.
    pub fn create_empty(&mut self) -> usize {
        let id = self.next_id();
        self.specimens.push(Specimen::empty(id));
        debug!(id, "created empty specimen");
        id
    }

    /// Appends a deep copy of specimen `id` under a fresh id and returns it.
    pub fn clone_specimen(&mut self, id: usize) -> Result<usize, DatasetError> {
        let mut copy = self.get(id)?.clone();
        let new_id = self.next_id();
        copy.set_id(new_id);
        self.specimens.push(copy);
        debug!(source = id, id = new_id, "cloned specimen");
        Ok(new_id)
    }

    /// All known package names.
    pub fn package_catalog(&self) -> &[String] {
        &self.packages
    }

    /// All known labels.
    pub fn label_catalog(&self) -> &[String] {
        &self.labels
    }

    /// Adds names missing from the package catalog, keeping existing order.
    pub fn register_packages<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) -> usize {
        register(&mut self.packages, names)
    }

    /// Adds names missing from the label catalog, keeping existing order.
    pub fn register_labels<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) -> usize {
        register(&mut self.labels, names)
    }
}

fn register<'a>(catalog: &mut Vec<String>, names: impl IntoIterator<Item = &'a str>) -> usize {
    let mut added = 0;
    for name in names.into_iter().map(str::trim).filter(|n| !n.is_empty()) {
        if !catalog.iter().any(|existing| existing == name) {
            catalog.push(name.to_string());
            added += 1;
        }
    }
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::specimen::TestCase;

    fn sample_dataset() -> Dataset {
        let specimens = vec![
            Specimen::new(0, "first", "def foo():\n    return 1")
                .with_tests(vec![TestCase::new("[]", "__result__ == 1")]),
            Specimen::new(1, "second", "def foo(a):\n    return a"),
        ];
        Dataset::new(specimens, vec!["math".to_string()], vec!["basics".to_string()])
    }

    #[test]
    fn test_create_empty_on_empty_dataset() {
        let mut dataset = Dataset::default();
        assert_eq!(dataset.create_empty(), 0);
        assert_eq!(dataset.create_empty(), 1);
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn test_create_empty_uses_max_id() {
        let mut dataset = sample_dataset();
        let id = dataset.create_empty();
        assert_eq!(id, 2);
        assert_eq!(dataset.get(2).expect("should exist").intent(), "");
    }

    #[test]
    fn test_clone_specimen() {
        let mut dataset = sample_dataset();
        let id = dataset.clone_specimen(0).expect("should clone");
        assert_eq!(id, 2);

        dataset
            .get_mut(id)
            .expect("should exist")
            .set_intent("changed");
        assert_eq!(dataset.get(0).expect("should exist").intent(), "first");
        assert_eq!(
            dataset.get(id).expect("should exist").tests(),
            dataset.get(0).expect("should exist").tests()
        );
    }

    #[test]
    fn test_clone_missing_specimen() {
        let mut dataset = sample_dataset();
        let result = dataset.clone_specimen(9);
        assert!(matches!(result, Err(DatasetError::SpecimenNotFound(9))));
    }

    #[test]
    fn test_register_catalog_entries() {
        let mut dataset = sample_dataset();
        let added = dataset.register_packages(["numpy", "math", " ", "re"]);
        assert_eq!(added, 2);
        assert_eq!(dataset.package_catalog(), ["math", "numpy", "re"]);

        assert_eq!(dataset.register_labels(["basics"]), 0);
        assert_eq!(dataset.register_labels(["recursion"]), 1);
        assert_eq!(dataset.label_catalog(), ["basics", "recursion"]);
    }

    #[test]
    fn test_from_document_reindexes() {
        let mut document = DatasetDocument::default();
        for id in [5, 3, 99] {
            document.data.push(SpecimenRecord {
                question_id: id,
                intent: format!("specimen {id}"),
                packages: Vec::new(),
                tests: Vec::new(),
                labels: Vec::new(),
                code: String::new(),
                templates: Vec::new(),
            });
        }
        let dataset = Dataset::from_document(document);
        let ids: Vec<usize> = dataset.iter().map(Specimen::id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(dataset.get(2).expect("should exist").intent(), "specimen 99");
    }
}
