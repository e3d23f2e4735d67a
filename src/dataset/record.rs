//! On-disk JSON shape of a dataset document.

use serde::{Deserialize, Serialize};

use crate::specimen::{Specimen, TestCase};
use crate::template::RandomBinding;

/// Top-level document: catalogs first, then the specimen list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetDocument {
    #[serde(default)]
    pub packages: Vec<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    pub data: Vec<SpecimenRecord>,
}

/// One specimen as stored, with unrendered text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecimenRecord {
    pub question_id: i64,
    pub intent: String,
    #[serde(rename = "package", default)]
    pub packages: Vec<String>,
    #[serde(rename = "tests cases", default)]
    pub tests: Vec<(String, String)>,
    #[serde(default)]
    pub labels: Vec<String>,
    pub code: String,
    #[serde(default)]
    pub templates: Vec<(String, String)>,
}

impl From<&Specimen> for SpecimenRecord {
    fn from(specimen: &Specimen) -> Self {
        Self {
            question_id: specimen.id() as i64,
            intent: specimen.intent().to_string(),
            packages: specimen.packages().to_vec(),
            tests: specimen
                .tests()
                .iter()
                .map(|t| (t.args.clone(), t.assertion.clone()))
                .collect(),
            labels: specimen.labels().to_vec(),
            code: specimen.code().to_string(),
            templates: specimen
                .bindings()
                .iter()
                .map(|b| (b.name().to_string(), b.generator().to_string()))
                .collect(),
        }
    }
}

impl SpecimenRecord {
    /// Builds a specimen placed at `position`; the stored id is discarded.
    pub fn into_specimen(self, position: usize) -> Specimen {
        Specimen::new(position, self.intent, self.code)
            .with_tests(
                self.tests
                    .into_iter()
                    .map(|(args, assertion)| TestCase::new(args, assertion))
                    .collect(),
            )
            .with_packages(self.packages)
            .with_labels(self.labels)
            .with_bindings(
                self.templates
                    .into_iter()
                    .map(|(name, generator)| RandomBinding::new(name, generator))
                    .collect(),
            )
    }
}
