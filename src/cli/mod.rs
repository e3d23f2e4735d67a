//! Command-line interface for specimen-forge.
//!
//! Provides commands for listing, editing, and verifying dataset specimens.

mod commands;

pub use commands::{parse_cli, run_with_cli, Cli};
