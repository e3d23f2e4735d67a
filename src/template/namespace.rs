//! Alias table, sampled values, and the merged lookup namespace.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tera::Context;

/// Fixed cosmetic aliases available to every specimen, e.g. `var1 -> x`.
///
/// Authors write `{{ var1 }}` in the intent and code so that renaming the
/// variable only means editing the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AliasTable(BTreeMap<String, String>);

impl AliasTable {
    pub fn get(&self, alias: &str) -> Option<&str> {
        self.0.get(alias).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Default for AliasTable {
    fn default() -> Self {
        let table = [
            ("var1", "x"),
            ("var2", "y"),
            ("var3", "z"),
            ("lst1", "L"),
            ("lst2", "M"),
            ("lst3", "N"),
            ("mat1", "A"),
            ("mat2", "B"),
            ("mat3", "C"),
            ("dict1", "d1"),
            ("dict2", "d2"),
            ("dict3", "d3"),
        ];
        Self(
            table
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

/// Values drawn for one verification pass. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SampledValues(BTreeMap<String, Value>);

impl SampledValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Lookup namespace for rendering: aliases overlaid with sampled values.
#[derive(Debug, Clone)]
pub struct TemplateNamespace {
    context: Context,
    names: BTreeSet<String>,
}

impl TemplateNamespace {
    /// Merges the alias table with the sampled values. Sampled values win when
    /// both define the same name.
    pub fn merge(aliases: &AliasTable, sampled: &SampledValues) -> Self {
        let mut context = Context::new();
        let mut names = BTreeSet::new();

        for (alias, value) in aliases.iter() {
            context.insert(alias, value);
            names.insert(alias.to_string());
        }
        for (name, value) in sampled.iter() {
            context.insert(name, &python_literal(value));
            names.insert(name.to_string());
        }

        Self { context, names }
    }

    /// Whether a top-level name resolves in this namespace.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub(crate) fn context(&self) -> &Context {
        &self.context
    }
}

/// Integral floats become their Python `repr` text (`12.0`), which Tera
/// would otherwise print as `12`.
fn python_literal(value: &Value) -> Value {
    match value.as_f64() {
        Some(f) if value.is_f64() && f.is_finite() && f.fract() == 0.0 => {
            Value::String(format!("{:?}", f))
        }
        _ => value.clone(),
    }
}
