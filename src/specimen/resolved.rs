use serde::Serialize;

use super::TestCase;

/// A specimen with every placeholder substituted for one verification pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSpecimen {
    pub id: usize,
    pub intent: String,
    pub code: String,
    pub tests: Vec<TestCase>,
    pub packages: Vec<String>,
}
