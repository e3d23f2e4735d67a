//! Harness execution in an interpreter subprocess.
//!
//! The script is written to a temporary file together with a short reporting
//! epilogue that prints the outcome list as JSON on a marker-prefixed line.
//! The subprocess is killed if it outlives the configured timeout.

use std::io::Write;
use std::process::Stdio;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::config::VerifierConfig;
use crate::error::VerifyError;
use crate::harness::OUTCOMES_NAME;

/// Prefix of the stdout line carrying the outcome report.
const REPORT_MARKER: &str = "__SPECIMEN_FORGE_OUTCOMES__";

/// Outcomes of one harness run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationReport {
    /// Truthiness of each assertion, in test order.
    pub outcomes: Vec<bool>,
    /// Wall-clock time of the subprocess.
    #[serde(with = "duration_millis")]
    pub duration: Duration,
}

impl VerificationReport {
    pub fn new(outcomes: Vec<bool>) -> Self {
        Self {
            outcomes,
            duration: Duration::ZERO,
        }
    }

    /// Number of assertions that held.
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| **o).count()
    }

    /// Number of assertions evaluated.
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn all_passed(&self) -> bool {
        self.passed() == self.total()
    }

    pub fn summary(&self) -> String {
        format!("{}/{} assertions passed", self.passed(), self.total())
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

/// Runs synthesized harness scripts and reads back their outcomes.
#[derive(Debug, Clone)]
pub struct Verifier {
    config: VerifierConfig,
}

impl Verifier {
    pub fn new(config: VerifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Executes `script` and returns the outcome of every assertion.
    ///
    /// Any exception raised by the script (syntax error, runtime error in the
    /// candidate function, failing assertion expression) surfaces as
    /// [`VerifyError::Execution`] with the interpreter's last stderr line.
    pub async fn verify(&self, script: &str) -> Result<VerificationReport, VerifyError> {
        let mut file = tempfile::Builder::new()
            .prefix("specimen-harness-")
            .suffix(".py")
            .tempfile()?;
        file.write_all(script.as_bytes())?;
        file.write_all(reporting_epilogue().as_bytes())?;
        file.flush()?;

        debug!(
            interpreter = %self.config.interpreter,
            path = %file.path().display(),
            "running harness"
        );

        let start = Instant::now();
        let child = Command::new(&self.config.interpreter)
            .args(&self.config.interpreter_args)
            .arg(file.path())
            .env("PYTHONDONTWRITEBYTECODE", "1")
            .env("PYTHONIOENCODING", "utf-8")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| VerifyError::Spawn {
                interpreter: self.config.interpreter.clone(),
                source,
            })?;

        let output = match tokio::time::timeout(self.config.timeout(), child.wait_with_output())
            .await
        {
            Ok(result) => result?,
            Err(_) => {
                warn!(
                    "Harness exceeded {}s timeout, killing interpreter",
                    self.config.timeout_secs
                );
                return Err(VerifyError::Timeout {
                    seconds: self.config.timeout_secs,
                });
            }
        };
        let duration = start.elapsed();

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            let message = last_error_line(&stderr).unwrap_or_else(|| match output.status.code() {
                Some(code) => format!("interpreter exited with code {}", code),
                None => "interpreter terminated by signal".to_string(),
            });
            debug!(stderr = %stderr, "harness failed");
            return Err(VerifyError::Execution {
                message,
                stderr: stderr.into_owned(),
            });
        }

        let report_line = stdout
            .lines()
            .rev()
            .find_map(|line| line.strip_prefix(REPORT_MARKER))
            .ok_or_else(|| VerifyError::MissingReport {
                stdout: stdout.to_string(),
            })?;
        let outcomes: Vec<bool> = serde_json::from_str(report_line.trim())?;

        let report = VerificationReport { outcomes, duration };
        info!("Harness finished in {:?}: {}", duration, report.summary());
        Ok(report)
    }
}

fn reporting_epilogue() -> String {
    format!(
        "\nimport json as __report_json__\nprint({marker:?} + __report_json__.dumps([bool(__o__) for __o__ in {outcomes}]), flush=True)\n",
        marker = REPORT_MARKER,
        outcomes = OUTCOMES_NAME,
    )
}

fn last_error_line(stderr: &str) -> Option<String> {
    stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts() {
        let report = VerificationReport::new(vec![true, false, true]);
        assert_eq!(report.passed(), 2);
        assert_eq!(report.total(), 3);
        assert!(!report.all_passed());
        assert_eq!(report.summary(), "2/3 assertions passed");
    }

    #[test]
    fn test_empty_report_passes() {
        let report = VerificationReport::new(vec![]);
        assert!(report.all_passed());
    }

    #[test]
    fn test_epilogue_mentions_accumulator() {
        let epilogue = reporting_epilogue();
        assert!(epilogue.contains("__outcomes__"));
        assert!(epilogue.contains("\"__SPECIMEN_FORGE_OUTCOMES__\""));
    }

    #[test]
    fn test_last_error_line() {
        let stderr = "Traceback (most recent call last):\n  File \"x.py\", line 3\nZeroDivisionError: division by zero\n\n";
        assert_eq!(
            last_error_line(stderr).as_deref(),
            Some("ZeroDivisionError: division by zero")
        );
        assert_eq!(last_error_line("  \n"), None);
    }

    #[tokio::test]
    async fn test_missing_interpreter() {
        let verifier = Verifier::new(
            VerifierConfig::new().with_interpreter("definitely-not-an-interpreter-4821"),
        );
        let err = verifier
            .verify("__outcomes__ = []\n")
            .await
            .expect_err("spawn should fail");
        assert!(matches!(err, VerifyError::Spawn { .. }));
    }
}
