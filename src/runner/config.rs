//! Configuration for harness execution.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default interpreter used to run harness scripts.
pub const DEFAULT_INTERPRETER: &str = "python3";

/// Default wall-clock limit for one harness run.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Settings for running a harness in an interpreter subprocess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// Interpreter executable, looked up on `PATH` if not absolute.
    pub interpreter: String,
    /// Extra arguments placed before the script path.
    pub interpreter_args: Vec<String>,
    /// Maximum execution time in seconds.
    pub timeout_secs: u64,
}

impl VerifierConfig {
    /// Creates a configuration with defaults.
    pub fn new() -> Self {
        Self {
            interpreter: DEFAULT_INTERPRETER.to_string(),
            interpreter_args: Vec::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Sets the interpreter executable.
    pub fn with_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = interpreter.into();
        self
    }

    /// Adds an interpreter argument.
    pub fn with_interpreter_arg(mut self, arg: impl Into<String>) -> Self {
        self.interpreter_args.push(arg.into());
        self
    }

    /// Sets the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs().max(1);
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self::new()
    }
}
