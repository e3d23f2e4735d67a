//! Error types for specimen-forge operations.
//!
//! Defines error types for every subsystem:
//! - Random value generation
//! - Template binding parsing and rendering
//! - Harness execution and verification
//! - Dataset document load/save
//! - Runtime configuration

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while producing random template values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GeneratorError {
    #[error("Unknown generator: {0}")]
    UnknownGenerator(String),

    #[error("Generator '{0}' requires a length parameter")]
    MissingParameter(String),

    #[error("Invalid parameter '{param}' for generator '{generator}'")]
    InvalidParameter { generator: String, param: String },
}

/// Errors that can occur while parsing bindings or rendering templates.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Malformed binding '{expression}': {reason}")]
    MalformedBinding { expression: String, reason: String },

    #[error("Undefined placeholder '{name}' in: {expression}")]
    UndefinedPlaceholder { name: String, expression: String },

    #[error("Template syntax error in '{expression}': {message}")]
    Syntax { expression: String, message: String },

    #[error("Failed to sample binding '{binding}': {source}")]
    Sampling {
        binding: String,
        #[source]
        source: GeneratorError,
    },
}

/// Errors that can occur while executing a synthesized harness.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("Failed to launch interpreter '{interpreter}': {source}")]
    Spawn {
        interpreter: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Code does not evaluate: {message}")]
    Execution { message: String, stderr: String },

    #[error("Harness execution timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("Harness produced no outcome report")]
    MissingReport { stdout: String },

    #[error("Malformed outcome report: {0}")]
    MalformedReport(#[from] serde_json::Error),

    #[error("Harness synthesis failed: {0}")]
    Synthesis(#[from] tera::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur during dataset operations.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Specimen {0} not found in dataset")]
    SpecimenNotFound(usize),

    #[error("Malformed dataset document '{path}': {source}")]
    MalformedDocument {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to access dataset '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Failed to parse configuration file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
