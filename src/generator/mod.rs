//! Random value generation for template bindings.
//!
//! Generators are referenced from bindings with a sentinel-prefixed name and an
//! optional length parameter:
//!
//! - `@RNAT` - integer in `[0, 100]`
//! - `@RINT` - integer in `[-100, 100]`
//! - `@RFLOAT` - float in `[-50, 50)`
//! - `@RSTRING_8` - string of 8 ASCII letters
//! - `@RINTLIST_5` - list of 5 integers in `[-100, 100]`
//!
//! # Example
//!
//! ```ignore
//! use specimen_forge::generator::{GeneratorExpr, ValueSampler};
//!
//! let expr: GeneratorExpr = "@RINTLIST_3".parse()?;
//! let mut sampler = ValueSampler::new(42);
//! let value = sampler.generate(&expr)?;
//! assert_eq!(value.as_array().map(|v| v.len()), Some(3));
//! ```

pub mod sampler;

pub use sampler::ValueSampler;

use std::fmt;
use std::str::FromStr;

use crate::error::GeneratorError;

/// Result type alias for generator operations.
pub type Result<T> = std::result::Result<T, GeneratorError>;

/// Character that introduces a generator reference inside a binding.
pub const GENERATOR_SENTINEL: char = '@';

/// Separator between a generator name and its length parameter.
const PARAM_SEPARATOR: char = '_';

/// The fixed family of value distributions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeneratorKind {
    /// Natural number in `[0, 100]`.
    Nat,
    /// Signed integer in `[-100, 100]`.
    Int,
    /// Real number in `[-50, 50)`.
    Float,
    /// String of ASCII letters; requires a length.
    String,
    /// List of signed integers; requires a length.
    IntList,
}

impl GeneratorKind {
    /// Looks up a generator by name, ignoring case.
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "rnat" => Ok(Self::Nat),
            "rint" => Ok(Self::Int),
            "rfloat" => Ok(Self::Float),
            "rstring" => Ok(Self::String),
            "rintlist" => Ok(Self::IntList),
            _ => Err(GeneratorError::UnknownGenerator(name.to_string())),
        }
    }

    /// Canonical upper-case name as written in bindings.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Nat => "RNAT",
            Self::Int => "RINT",
            Self::Float => "RFLOAT",
            Self::String => "RSTRING",
            Self::IntList => "RINTLIST",
        }
    }

    /// Whether the generator takes a length parameter.
    pub fn is_parameterized(&self) -> bool {
        matches!(self, Self::String | Self::IntList)
    }
}

impl fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A parsed generator reference such as `@RSTRING_4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorExpr {
    pub kind: GeneratorKind,
    pub param: Option<usize>,
}

impl GeneratorExpr {
    pub fn new(kind: GeneratorKind, param: Option<usize>) -> Self {
        Self { kind, param }
    }

    /// Returns the length parameter, failing for parameterized generators
    /// that were declared without one.
    pub fn length(&self) -> Result<usize> {
        self.param
            .ok_or_else(|| GeneratorError::MissingParameter(self.kind.name().to_string()))
    }
}

impl FromStr for GeneratorExpr {
    type Err = GeneratorError;

    /// Parses `@NAME` or `@NAME_param`. The sentinel is optional here; binding
    /// parsing enforces its presence.
    fn from_str(expr: &str) -> Result<Self> {
        let body = expr.trim();
        let body = body.strip_prefix(GENERATOR_SENTINEL).unwrap_or(body);

        let (name, param) = match body.split_once(PARAM_SEPARATOR) {
            Some((name, param)) => (name, Some(param)),
            None => (body, None),
        };

        let kind = GeneratorKind::from_name(name)?;
        let param = match param {
            Some(raw) => Some(raw.trim().parse::<usize>().map_err(|_| {
                GeneratorError::InvalidParameter {
                    generator: kind.name().to_string(),
                    param: raw.to_string(),
                }
            })?),
            None => None,
        };

        if kind.is_parameterized() && param.is_none() {
            return Err(GeneratorError::MissingParameter(kind.name().to_string()));
        }

        Ok(Self { kind, param })
    }
}

impl fmt::Display for GeneratorExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.param {
            Some(param) => write!(f, "{}{}{}{}", GENERATOR_SENTINEL, self.kind, PARAM_SEPARATOR, param),
            None => write!(f, "{}{}", GENERATOR_SENTINEL, self.kind),
        }
    }
}
