//! Runtime configuration.
//!
//! Settings are layered: built-in defaults, then an optional YAML file, then
//! `SPECIMEN_FORGE_*` environment variables. The result is validated before
//! use.
//!
//! ```yaml
//! entry_point: solve
//! seed: 42
//! verifier:
//!   interpreter: python3.12
//!   timeout_secs: 5
//! aliases:
//!   var1: x
//!   lst1: L
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::harness::{HarnessSynthesizer, DEFAULT_ENTRY_POINT};
use crate::runner::{SpecimenChecker, Verifier, VerifierConfig};
use crate::template::binding::is_identifier;
use crate::template::AliasTable;

pub const ENV_PYTHON: &str = "SPECIMEN_FORGE_PYTHON";
pub const ENV_TIMEOUT_SECS: &str = "SPECIMEN_FORGE_TIMEOUT_SECS";
pub const ENV_ENTRY_POINT: &str = "SPECIMEN_FORGE_ENTRY_POINT";
pub const ENV_SEED: &str = "SPECIMEN_FORGE_SEED";

/// Top-level configuration for the editor and verifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForgeConfig {
    /// Interpreter and timeout for harness runs.
    pub verifier: VerifierConfig,
    /// Name of the candidate function each test calls.
    pub entry_point: String,
    /// Base seed for reproducible sampling. Fresh entropy when unset.
    pub seed: Option<u64>,
    /// Fixed placeholder names available to every specimen.
    pub aliases: AliasTable,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            verifier: VerifierConfig::default(),
            entry_point: DEFAULT_ENTRY_POINT.to_string(),
            seed: None,
            aliases: AliasTable::default(),
        }
    }
}

impl ForgeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads defaults, the optional file, and environment overrides, then validates.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_with(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a YAML file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Applies overrides read through `lookup`.
    ///
    /// # Environment Variables
    ///
    /// - `SPECIMEN_FORGE_PYTHON`: interpreter executable (default: python3)
    /// - `SPECIMEN_FORGE_TIMEOUT_SECS`: harness timeout in seconds (default: 10)
    /// - `SPECIMEN_FORGE_ENTRY_POINT`: candidate function name (default: foo)
    /// - `SPECIMEN_FORGE_SEED`: base sampling seed (default: unset)
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup(ENV_PYTHON) {
            self.verifier.interpreter = val;
        }

        if let Some(val) = lookup(ENV_TIMEOUT_SECS) {
            self.verifier.timeout_secs = parse_env_value(&val, ENV_TIMEOUT_SECS)?;
        }

        if let Some(val) = lookup(ENV_ENTRY_POINT) {
            self.entry_point = val;
        }

        if let Some(val) = lookup(ENV_SEED) {
            self.seed = Some(parse_env_value(&val, ENV_SEED)?);
        }

        Ok(())
    }

    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationFailed` if any values are invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.verifier.interpreter.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "verifier.interpreter cannot be empty".to_string(),
            ));
        }

        if self.verifier.timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "verifier.timeout_secs must be greater than 0".to_string(),
            ));
        }

        if !is_identifier(&self.entry_point) {
            return Err(ConfigError::ValidationFailed(format!(
                "entry_point '{}' is not a valid identifier",
                self.entry_point
            )));
        }

        if let Some((name, _)) = self.aliases.iter().find(|(_, value)| !is_identifier(value)) {
            return Err(ConfigError::ValidationFailed(format!(
                "alias '{}' must map to an identifier",
                name
            )));
        }

        Ok(())
    }

    /// Builder method to set the interpreter.
    pub fn with_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.verifier.interpreter = interpreter.into();
        self
    }

    /// Builder method to set the harness timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.verifier.timeout_secs = timeout.as_secs();
        self
    }

    /// Builder method to set the entry point.
    pub fn with_entry_point(mut self, entry_point: impl Into<String>) -> Self {
        self.entry_point = entry_point.into();
        self
    }

    /// Builder method to fix the sampling seed.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Builds a checker wired with these settings.
    pub fn checker(&self) -> SpecimenChecker {
        SpecimenChecker::new(
            self.aliases.clone(),
            HarnessSynthesizer::new(self.entry_point.clone()),
            Verifier::new(self.verifier.clone()),
        )
        .with_seed(self.seed)
    }
}

/// Parse an environment variable value into a type.
fn parse_env_value<T: std::str::FromStr>(value: &str, key: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("could not parse '{}'", value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ForgeConfig::default();
        assert_eq!(config.entry_point, "foo");
        assert_eq!(config.seed, None);
        assert_eq!(config.verifier.interpreter, "python3");
        assert_eq!(config.aliases.get("lst2"), Some("M"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ForgeConfig::default();
        config
            .apply_env_with(lookup(&[
                (ENV_PYTHON, "/opt/python/bin/python3"),
                (ENV_TIMEOUT_SECS, "3"),
                (ENV_ENTRY_POINT, "solve"),
                (ENV_SEED, "42"),
            ]))
            .expect("should apply");

        assert_eq!(config.verifier.interpreter, "/opt/python/bin/python3");
        assert_eq!(config.verifier.timeout_secs, 3);
        assert_eq!(config.entry_point, "solve");
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn test_env_invalid_value() {
        let mut config = ForgeConfig::default();
        let err = config
            .apply_env_with(lookup(&[(ENV_SEED, "many")]))
            .expect_err("should fail");
        assert!(err.to_string().contains(ENV_SEED));
    }

    #[test]
    fn test_validation_invalid_entry_point() {
        let result = ForgeConfig::default().with_entry_point("1foo").validate();
        assert!(result.unwrap_err().to_string().contains("entry_point"));
    }

    #[test]
    fn test_validation_invalid_timeout() {
        let result = ForgeConfig::default()
            .with_timeout(Duration::from_secs(0))
            .validate();
        assert!(result.unwrap_err().to_string().contains("timeout_secs"));
    }

    #[test]
    fn test_validation_empty_interpreter() {
        let result = ForgeConfig::default().with_interpreter(" ").validate();
        assert!(result.unwrap_err().to_string().contains("interpreter"));
    }

    #[test]
    fn test_from_file_partial() {
        let dir = tempdir().expect("failed to create temp dir");
        let path = dir.path().join("forge.yaml");
        fs::write(
            &path,
            "entry_point: solve\nverifier:\n  timeout_secs: 4\naliases:\n  var1: alpha\n",
        )
        .expect("failed to write");

        let config = ForgeConfig::from_file(&path).expect("should load");
        assert_eq!(config.entry_point, "solve");
        assert_eq!(config.verifier.timeout_secs, 4);
        assert_eq!(config.verifier.interpreter, "python3");
        assert_eq!(config.aliases.get("var1"), Some("alpha"));
        assert_eq!(config.aliases.len(), 1);
    }

    #[test]
    fn test_from_file_malformed() {
        let dir = tempdir().expect("failed to create temp dir");
        let path = dir.path().join("forge.yaml");
        fs::write(&path, "verifier: [not, a, map]\n").expect("failed to write");

        let result = ForgeConfig::from_file(&path);
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }
}
