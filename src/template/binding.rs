//! Random binding declarations and per-pass sampling.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::TemplateError;
use crate::generator::{GeneratorExpr, ValueSampler, GENERATOR_SENTINEL};
use crate::template::SampledValues;

/// A `(template-name, generator-expression)` pair such as `("L", "@RINTLIST_5")`.
///
/// The generator expression is kept verbatim so that saving a dataset
/// reproduces exactly what was loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomBinding {
    name: String,
    generator: String,
}

impl RandomBinding {
    pub fn new(name: impl Into<String>, generator: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            generator: generator.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw generator expression, e.g. `@RSTRING_4`.
    pub fn generator(&self) -> &str {
        &self.generator
    }

    /// Parses the generator expression, requiring the `@` sentinel.
    pub fn generator_expr(&self) -> Result<GeneratorExpr, TemplateError> {
        let raw = self.generator.trim();
        if !raw.starts_with(GENERATOR_SENTINEL) {
            return Err(TemplateError::MalformedBinding {
                expression: self.to_string(),
                reason: format!("generator must start with '{}'", GENERATOR_SENTINEL),
            });
        }
        raw.parse().map_err(|source| TemplateError::Sampling {
            binding: self.to_string(),
            source,
        })
    }
}

impl fmt::Display for RandomBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.name, self.generator)
    }
}

impl FromStr for RandomBinding {
    type Err = TemplateError;

    fn from_str(expr: &str) -> Result<Self, Self::Err> {
        parse_binding(expr)
    }
}

/// Parses a declaration of the form `name = @GENERATOR` or `name = @GENERATOR_param`.
pub fn parse_binding(expr: &str) -> Result<RandomBinding, TemplateError> {
    let malformed = |reason: &str| TemplateError::MalformedBinding {
        expression: expr.to_string(),
        reason: reason.to_string(),
    };

    let (name, generator) = expr
        .split_once('=')
        .ok_or_else(|| malformed("expected 'name = @GENERATOR'"))?;

    let name = name.trim();
    let generator = generator.trim();

    if !is_identifier(name) {
        return Err(malformed("template name must be an identifier"));
    }
    if !generator.starts_with(GENERATOR_SENTINEL) {
        return Err(malformed("no generator reference"));
    }

    Ok(RandomBinding::new(name, generator))
}

/// Whether `name` is usable as a Python identifier (ASCII subset).
pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Draws one value per binding. Later bindings with the same name replace
/// earlier ones.
pub fn sample(
    bindings: &[RandomBinding],
    sampler: &mut ValueSampler,
) -> Result<SampledValues, TemplateError> {
    let mut values = SampledValues::new();
    for binding in bindings {
        let expr = binding.generator_expr()?;
        let value = sampler
            .generate(&expr)
            .map_err(|source| TemplateError::Sampling {
                binding: binding.to_string(),
                source,
            })?;
        values.insert(binding.name(), value);
    }
    debug!(count = values.len(), seed = sampler.seed(), "sampled template bindings");
    Ok(values)
}
