//! Exercise specimens: templated intent, code, and tests plus metadata.
//!
//! A [`Specimen`] holds unrendered text. Resolution happens in two explicit
//! steps: [`Specimen::resample`] draws fresh values for the random bindings,
//! then [`Specimen::resolve`] renders everything against those values and the
//! alias table, producing a [`ResolvedSpecimen`].

mod resolved;

pub use resolved::ResolvedSpecimen;

use serde::Serialize;
use tracing::debug;

use crate::error::TemplateError;
use crate::generator::ValueSampler;
use crate::template::{self, AliasTable, RandomBinding, SampledValues, TemplateNamespace};

/// Argument expression used for assertions entered without one.
pub const EMPTY_ARGS: &str = "[ ]";

/// One `(argument-expression, assertion-expression)` pair.
///
/// The argument expression evaluates to a sequence that is splatted into the
/// entry point; the assertion reads the call result from `__result__`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestCase {
    pub args: String,
    pub assertion: String,
}

impl TestCase {
    pub fn new(args: impl Into<String>, assertion: impl Into<String>) -> Self {
        Self {
            args: args.into(),
            assertion: assertion.into(),
        }
    }
}

/// Pairs an argument column with an assertion column row by row.
///
/// Missing or blank argument lines become [`EMPTY_ARGS`]; argument lines with
/// no matching assertion are dropped, as are rows whose assertion is blank.
pub fn pair_columns<A, B>(args: &[A], assertions: &[B]) -> Vec<TestCase>
where
    A: AsRef<str>,
    B: AsRef<str>,
{
    assertions
        .iter()
        .enumerate()
        .filter(|(_, assertion)| !assertion.as_ref().trim().is_empty())
        .map(|(i, assertion)| {
            let args = args
                .get(i)
                .map(|a| a.as_ref())
                .filter(|a| !a.trim().is_empty())
                .unwrap_or(EMPTY_ARGS);
            TestCase::new(args, assertion.as_ref())
        })
        .collect()
}

/// A single exercise entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Specimen {
    id: usize,
    intent: String,
    code: String,
    tests: Vec<TestCase>,
    packages: Vec<String>,
    labels: Vec<String>,
    bindings: Vec<RandomBinding>,
    sampled: SampledValues,
}

impl Specimen {
    /// Creates a specimen with no tests, packages, labels, or bindings.
    pub fn new(id: usize, intent: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            id,
            intent: intent.into(),
            code: code.into(),
            tests: Vec::new(),
            packages: Vec::new(),
            labels: Vec::new(),
            bindings: Vec::new(),
            sampled: SampledValues::new(),
        }
    }

    /// Creates a blank specimen.
    pub fn empty(id: usize) -> Self {
        Self::new(id, "", "")
    }

    pub fn with_tests(mut self, tests: Vec<TestCase>) -> Self {
        self.tests = tests;
        self
    }

    pub fn with_packages(mut self, packages: Vec<String>) -> Self {
        self.packages = packages;
        self
    }

    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_bindings(mut self, bindings: Vec<RandomBinding>) -> Self {
        self.bindings = bindings;
        self
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn set_id(&mut self, id: usize) {
        self.id = id;
    }

    /// Unrendered intent text.
    pub fn intent(&self) -> &str {
        &self.intent
    }

    pub fn set_intent(&mut self, intent: impl Into<String>) {
        self.intent = intent.into();
    }

    /// Unrendered function code.
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn set_code(&mut self, code: impl Into<String>) {
        self.code = code.into();
    }

    /// Unrendered test pairs.
    pub fn tests(&self) -> &[TestCase] {
        &self.tests
    }

    pub fn set_tests(&mut self, tests: Vec<TestCase>) {
        self.tests = tests;
    }

    /// Replaces the tests from separate argument and assertion columns.
    pub fn set_tests_from_columns<A, B>(&mut self, args: &[A], assertions: &[B])
    where
        A: AsRef<str>,
        B: AsRef<str>,
    {
        self.tests = pair_columns(args, assertions);
    }

    pub fn packages(&self) -> &[String] {
        &self.packages
    }

    pub fn set_packages(&mut self, packages: Vec<String>) {
        self.packages = packages;
    }

    /// Merges package names into the specimen's packages as a sorted set.
    pub fn add_packages<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        merge_sorted_set(&mut self.packages, names);
    }

    pub fn clear_packages(&mut self) {
        self.packages.clear();
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn set_labels(&mut self, labels: Vec<String>) {
        self.labels = labels;
    }

    /// Merges labels into the specimen's labels as a sorted set.
    pub fn add_labels<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        merge_sorted_set(&mut self.labels, names);
    }

    pub fn clear_labels(&mut self) {
        self.labels.clear();
    }

    pub fn bindings(&self) -> &[RandomBinding] {
        &self.bindings
    }

    pub fn set_bindings(&mut self, bindings: Vec<RandomBinding>) {
        self.bindings = bindings;
    }

    /// Values sampled by the most recent [`Specimen::resample`].
    pub fn sampled(&self) -> &SampledValues {
        &self.sampled
    }

    /// Draws fresh values for every random binding, replacing the previous sample.
    pub fn resample(&mut self, sampler: &mut ValueSampler) -> Result<&SampledValues, TemplateError> {
        self.sampled = template::sample(&self.bindings, sampler)?;
        Ok(&self.sampled)
    }

    /// Namespace built from the aliases and the current sample.
    pub fn namespace(&self, aliases: &AliasTable) -> TemplateNamespace {
        TemplateNamespace::merge(aliases, &self.sampled)
    }

    /// Renders intent, code, and tests with one shared namespace.
    pub fn resolve(&self, aliases: &AliasTable) -> Result<ResolvedSpecimen, TemplateError> {
        let ns = self.namespace(aliases);
        let intent = template::render(&self.intent, &ns)?;
        let code = template::render(&self.code, &ns)?;
        let tests = self
            .tests
            .iter()
            .map(|t| {
                Ok(TestCase::new(
                    template::render(&t.args, &ns)?,
                    template::render(&t.assertion, &ns)?,
                ))
            })
            .collect::<Result<Vec<_>, TemplateError>>()?;

        debug!(id = self.id, tests = tests.len(), "resolved specimen");
        Ok(ResolvedSpecimen {
            id: self.id,
            intent,
            code,
            tests,
            packages: self.packages.clone(),
        })
    }
}

fn merge_sorted_set<I, S>(target: &mut Vec<String>, names: I)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    target.extend(
        names
            .into_iter()
            .map(Into::into)
            .map(|s: String| s.trim().to_string())
            .filter(|s| !s.is_empty()),
    );
    target.sort();
    target.dedup();
}
