//! specimen-forge: editor and verifier for templated programming-exercise datasets.
//!
//! A specimen pairs a natural-language intent with a candidate function and
//! argument/assertion tests. Any of that text may reference placeholders that
//! are either fixed aliases or freshly sampled random values; one verification
//! pass samples once and uses the same values everywhere.

// Core modules
pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod generator;
pub mod harness;
pub mod runner;
pub mod specimen;
pub mod template;

// Re-export commonly used types
pub use config::ForgeConfig;
pub use dataset::Dataset;
pub use error::{ConfigError, DatasetError, GeneratorError, TemplateError, VerifyError};
pub use runner::{CheckResult, CheckStatus, SpecimenChecker};
pub use specimen::Specimen;
