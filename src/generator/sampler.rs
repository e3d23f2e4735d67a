//! Seeded value sampling for template generators.
//!
//! Uses a ChaCha8 RNG so that a fixed seed reproduces the same values, while
//! [`ValueSampler::from_entropy`] gives a fresh stream for each verification pass.

use crate::generator::{GeneratorExpr, GeneratorKind, Result};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde_json::Value;
use tracing::trace;

const NAT_RANGE: (i64, i64) = (0, 100);
const INT_RANGE: (i64, i64) = (-100, 100);
const FLOAT_SPAN: f64 = 100.0;

const ASCII_LETTERS: &[u8; 52] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Random value sampler backed by ChaCha8.
///
/// # Example
///
/// ```ignore
/// let mut sampler = ValueSampler::new(7);
/// let n = sampler.generate(&"@RNAT".parse()?)?;
/// assert!((0..=100).contains(&n.as_i64().unwrap()));
/// ```
pub struct ValueSampler {
    seed: u64,
    rng: ChaCha8Rng,
}

impl ValueSampler {
    /// Creates a sampler with a fixed seed.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Creates a sampler from a freshly drawn seed.
    pub fn from_entropy() -> Self {
        Self::new(rand::random::<u64>())
    }

    /// Seed this sampler was created with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Draws one value for the given generator expression.
    pub fn generate(&mut self, expr: &GeneratorExpr) -> Result<Value> {
        let value = match expr.kind {
            GeneratorKind::Nat => Value::from(self.sample_int(NAT_RANGE)),
            GeneratorKind::Int => Value::from(self.sample_int(INT_RANGE)),
            GeneratorKind::Float => self.sample_float(),
            GeneratorKind::String => Value::String(self.sample_string(expr.length()?)),
            GeneratorKind::IntList => {
                let len = expr.length()?;
                Value::Array(
                    (0..len)
                        .map(|_| Value::from(self.sample_int(INT_RANGE)))
                        .collect(),
                )
            }
        };
        trace!(generator = %expr, value = %value, "generated template value");
        Ok(value)
    }

    fn sample_int(&mut self, (min, max): (i64, i64)) -> i64 {
        self.rng.random_range(min..=max)
    }

    fn sample_float(&mut self) -> Value {
        let value = (self.rng.random::<f64>() - 0.5) * FLOAT_SPAN;
        Value::Number(
            serde_json::Number::from_f64(value).unwrap_or_else(|| serde_json::Number::from(0)),
        )
    }

    fn sample_string(&mut self, len: usize) -> String {
        (0..len)
            .map(|_| {
                let idx = self.rng.random_range(0..ASCII_LETTERS.len());
                ASCII_LETTERS[idx] as char
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(raw: &str) -> GeneratorExpr {
        raw.parse().expect("generator expression should parse")
    }

    #[test]
    fn test_sampler_deterministic() {
        let mut sampler1 = ValueSampler::new(42);
        let mut sampler2 = ValueSampler::new(42);

        for raw in ["@RNAT", "@RINT", "@RFLOAT", "@RSTRING_6", "@RINTLIST_4"] {
            let a = sampler1.generate(&expr(raw)).expect("sampling should succeed");
            let b = sampler2.generate(&expr(raw)).expect("sampling should succeed");
            assert_eq!(a, b, "generator {} diverged", raw);
        }
    }

    #[test]
    fn test_nat_bounds() {
        let mut sampler = ValueSampler::new(1);
        for _ in 0..1000 {
            let n = sampler
                .generate(&expr("@RNAT"))
                .expect("sampling should succeed")
                .as_i64()
                .expect("should be an integer");
            assert!((0..=100).contains(&n));
        }
    }

    #[test]
    fn test_int_bounds() {
        let mut sampler = ValueSampler::new(2);
        for _ in 0..1000 {
            let n = sampler
                .generate(&expr("@RINT"))
                .expect("sampling should succeed")
                .as_i64()
                .expect("should be an integer");
            assert!((-100..=100).contains(&n));
        }
    }

    #[test]
    fn test_float_bounds() {
        let mut sampler = ValueSampler::new(3);
        for _ in 0..1000 {
            let x = sampler
                .generate(&expr("@RFLOAT"))
                .expect("sampling should succeed")
                .as_f64()
                .expect("should be a float");
            assert!((-50.0..50.0).contains(&x));
        }
    }

    #[test]
    fn test_string_length_and_alphabet() {
        let mut sampler = ValueSampler::new(4);
        let value = sampler
            .generate(&expr("@RSTRING_32"))
            .expect("sampling should succeed");
        let s = value.as_str().expect("should be a string");
        assert_eq!(s.len(), 32);
        assert!(s.chars().all(|c| c.is_ascii_alphabetic()));
    }

    #[test]
    fn test_empty_string_and_list() {
        let mut sampler = ValueSampler::new(5);
        let s = sampler
            .generate(&expr("@RSTRING_0"))
            .expect("sampling should succeed");
        assert_eq!(s, Value::String(String::new()));

        let list = sampler
            .generate(&expr("@RINTLIST_0"))
            .expect("sampling should succeed");
        assert_eq!(list, Value::Array(Vec::new()));
    }

    #[test]
    fn test_int_list_elements_in_range() {
        let mut sampler = ValueSampler::new(6);
        let list = sampler
            .generate(&expr("@RINTLIST_50"))
            .expect("sampling should succeed");
        let items = list.as_array().expect("should be an array");
        assert_eq!(items.len(), 50);
        assert!(items
            .iter()
            .filter_map(Value::as_i64)
            .all(|n| (-100..=100).contains(&n)));
    }

    #[test]
    fn test_parameterized_without_length_fails() {
        let mut sampler = ValueSampler::new(7);
        let bare = GeneratorExpr::new(GeneratorKind::IntList, None);
        assert!(sampler.generate(&bare).is_err());
    }
}
