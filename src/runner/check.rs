//! Verification passes: resample, resolve, synthesize, execute, classify.

use serde::Serialize;
use tracing::{info, warn};

use super::verifier::{VerificationReport, Verifier};
use crate::dataset::Dataset;
use crate::generator::ValueSampler;
use crate::harness::HarnessSynthesizer;
use crate::specimen::Specimen;
use crate::template::AliasTable;

/// How a verification pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    /// Every assertion held.
    Passed,
    /// The harness ran but some assertions were false.
    AssertionsFailed,
    /// A binding was malformed or a placeholder was undefined.
    TemplateFault,
    /// The harness raised, timed out, or could not be run.
    ExecutionFault,
}

impl CheckStatus {
    pub fn is_passed(&self) -> bool {
        matches!(self, CheckStatus::Passed)
    }
}

/// Everything the editor needs to display after a pass.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub specimen_id: usize,
    pub status: CheckStatus,
    pub passed: usize,
    pub total: usize,
    /// Seed of the sampler used for the reported pass.
    pub seed: u64,
    /// Rendered intent, or the raw intent when rendering failed.
    pub intent: String,
    /// Resolved harness, or the unresolved one after a template fault.
    pub script: String,
    pub diagnostic: String,
    /// Number of passes run before this result was reported.
    pub passes: usize,
}

/// Well-formed / malformed partition of a whole-dataset check.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DatasetCheckSummary {
    pub wellformed: Vec<usize>,
    pub malformed: Vec<usize>,
    pub results: Vec<CheckResult>,
}

impl DatasetCheckSummary {
    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn all_passed(&self) -> bool {
        self.malformed.is_empty()
    }
}

/// Runs verification passes with a fixed alias table, entry point, and verifier.
#[derive(Debug, Clone)]
pub struct SpecimenChecker {
    aliases: AliasTable,
    synthesizer: HarnessSynthesizer,
    verifier: Verifier,
    seed: Option<u64>,
}

impl SpecimenChecker {
    pub fn new(aliases: AliasTable, synthesizer: HarnessSynthesizer, verifier: Verifier) -> Self {
        Self {
            aliases,
            synthesizer,
            verifier,
            seed: None,
        }
    }

    /// Fixes the base seed so passes are reproducible. Pass `n` uses `seed + n`.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    pub fn synthesizer(&self) -> &HarnessSynthesizer {
        &self.synthesizer
    }

    fn sampler(&self, pass: usize) -> ValueSampler {
        match self.seed {
            Some(seed) => ValueSampler::new(seed.wrapping_add(pass as u64)),
            None => ValueSampler::from_entropy(),
        }
    }

    /// Runs one verification pass with a fresh sample.
    pub async fn check(&self, specimen: &mut Specimen) -> CheckResult {
        self.run_pass(specimen, 0).await
    }

    /// Runs up to `passes` independent passes, stopping at the first that does
    /// not pass. Reports that pass, or the last one when all succeed.
    pub async fn check_repeatedly(&self, specimen: &mut Specimen, passes: usize) -> CheckResult {
        let passes = passes.max(1);
        let mut result = self.run_pass(specimen, 0).await;
        let mut ran = 1;
        while ran < passes && result.status.is_passed() {
            result = self.run_pass(specimen, ran).await;
            ran += 1;
        }
        result.passes = ran;
        result
    }

    /// Checks every specimen in the dataset.
    pub async fn check_dataset(&self, dataset: &mut Dataset, passes: usize) -> DatasetCheckSummary {
        let mut summary = DatasetCheckSummary::default();
        for specimen in dataset.iter_mut() {
            let result = self.check_repeatedly(specimen, passes).await;
            if result.status.is_passed() {
                summary.wellformed.push(result.specimen_id);
            } else {
                warn!(
                    "Specimen {} is malformed: {}",
                    result.specimen_id, result.diagnostic
                );
                summary.malformed.push(result.specimen_id);
            }
            summary.results.push(result);
        }
        info!(
            "Checked {} specimens: {} well-formed, {} malformed",
            summary.total(),
            summary.wellformed.len(),
            summary.malformed.len()
        );
        summary
    }

    async fn run_pass(&self, specimen: &mut Specimen, pass: usize) -> CheckResult {
        let mut sampler = self.sampler(pass);
        let seed = sampler.seed();
        let id = specimen.id();

        let sampled = specimen.resample(&mut sampler).map(|_| ());
        let resolved = match sampled.and_then(|()| specimen.resolve(&self.aliases)) {
            Ok(resolved) => resolved,
            Err(e) => {
                return fault(
                    id,
                    seed,
                    CheckStatus::TemplateFault,
                    specimen.intent().to_string(),
                    self.unresolved_script(specimen),
                    format!("Undefined template: {}", e),
                );
            }
        };

        let script = match self.synthesizer.synthesize(&resolved) {
            Ok(script) => script,
            Err(e) => {
                return fault(
                    id,
                    seed,
                    CheckStatus::ExecutionFault,
                    resolved.intent,
                    self.unresolved_script(specimen),
                    format!("Code does not evaluate: {}", e),
                );
            }
        };

        match self.verifier.verify(&script).await {
            Ok(report) => classify_report(id, seed, resolved.intent, script, &report),
            Err(e) => fault(
                id,
                seed,
                CheckStatus::ExecutionFault,
                resolved.intent,
                script,
                e.to_string(),
            ),
        }
    }

    fn unresolved_script(&self, specimen: &Specimen) -> String {
        self.synthesizer
            .synthesize_unresolved(specimen)
            .unwrap_or_else(|_| specimen.code().to_string())
    }
}

fn fault(
    specimen_id: usize,
    seed: u64,
    status: CheckStatus,
    intent: String,
    script: String,
    diagnostic: String,
) -> CheckResult {
    CheckResult {
        specimen_id,
        status,
        passed: 0,
        total: 0,
        seed,
        intent,
        script,
        diagnostic,
        passes: 1,
    }
}

fn classify_report(
    specimen_id: usize,
    seed: u64,
    intent: String,
    script: String,
    report: &VerificationReport,
) -> CheckResult {
    let (status, diagnostic) = if report.all_passed() {
        (CheckStatus::Passed, "Item is correct".to_string())
    } else {
        (
            CheckStatus::AssertionsFailed,
            format!(
                "Tests failed: {} successes out of {} attempts",
                report.passed(),
                report.total()
            ),
        )
    };
    CheckResult {
        specimen_id,
        status,
        passed: report.passed(),
        total: report.total(),
        seed,
        intent,
        script,
        diagnostic,
        passes: 1,
    }
}
