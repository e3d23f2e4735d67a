//! Specimen verification.
//!
//! A verification pass resamples a specimen's random bindings, resolves its
//! templated text, synthesizes a harness, and runs the harness in an
//! interpreter subprocess.
//!
//! ```text
//! Specimen → resample → resolve → HarnessSynthesizer → Verifier → CheckResult
//! ```
//!
//! # Example
//!
//! ```ignore
//! use specimen_forge::runner::{SpecimenChecker, Verifier, VerifierConfig};
//!
//! let checker = SpecimenChecker::new(aliases, synthesizer, Verifier::new(VerifierConfig::new()));
//! let result = checker.check_repeatedly(&mut specimen, 5).await;
//! println!("{}", result.diagnostic);
//! ```

pub mod check;
pub mod config;
pub mod verifier;

pub use check::{CheckResult, CheckStatus, DatasetCheckSummary, SpecimenChecker};
pub use config::VerifierConfig;
pub use verifier::{VerificationReport, Verifier};
