//! Test harness synthesis.
//!
//! Turns a resolved specimen into a standalone Python module:
//!
//! ```text
//! import <package>            # one per declared package
//! <function code>             # verbatim
//!
//! __outcomes__ = []
//! __result__ = foo(*<args>)   # one pair per test case
//! __outcomes__.append(<assertion>)
//! ```
//!
//! Imports and the function live at module top level, so every test line sees
//! them without any scope tricks. Synthesis is purely textual; see
//! [`crate::runner`] for execution.

use serde::Serialize;
use tera::{Context, Tera};
use tracing::debug;

use crate::error::VerifyError;
use crate::specimen::{ResolvedSpecimen, Specimen, TestCase};

/// Entry-point function name used when none is configured.
pub const DEFAULT_ENTRY_POINT: &str = "foo";

/// Name the harness binds each call result to.
pub const RESULT_NAME: &str = "__result__";

/// Name of the list accumulating assertion outcomes.
pub const OUTCOMES_NAME: &str = "__outcomes__";

const HARNESS_TEMPLATE: &str = concat!(
    "{% for pkg in imports %}import {{ pkg }}\n{% endfor %}",
    "{{ func }}\n",
    "\n",
    "{{ outcomes }} = []\n",
    "{% for t in tests %}",
    "{{ result }} = {{ entry }}(*{{ t.args }})\n",
    "{{ outcomes }}.append({{ t.assertion }})\n",
    "{% endfor %}",
);

#[derive(Serialize)]
struct HarnessInput<'a> {
    imports: &'a [String],
    func: &'a str,
    tests: &'a [TestCase],
    entry: &'a str,
    result: &'static str,
    outcomes: &'static str,
}

/// Builds harness scripts for a fixed entry-point function name.
#[derive(Debug, Clone)]
pub struct HarnessSynthesizer {
    entry_point: String,
}

impl HarnessSynthesizer {
    pub fn new(entry_point: impl Into<String>) -> Self {
        Self {
            entry_point: entry_point.into(),
        }
    }

    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    /// Synthesizes the script for one verification pass.
    pub fn synthesize(&self, resolved: &ResolvedSpecimen) -> Result<String, VerifyError> {
        self.build(&resolved.packages, &resolved.code, &resolved.tests)
    }

    /// Synthesizes the script from unrendered text, for display when resolution fails.
    pub fn synthesize_unresolved(&self, specimen: &Specimen) -> Result<String, VerifyError> {
        self.build(specimen.packages(), specimen.code(), specimen.tests())
    }

    fn build(
        &self,
        imports: &[String],
        func: &str,
        tests: &[TestCase],
    ) -> Result<String, VerifyError> {
        let input = HarnessInput {
            imports,
            func,
            tests,
            entry: &self.entry_point,
            result: RESULT_NAME,
            outcomes: OUTCOMES_NAME,
        };
        let context = Context::from_serialize(&input)?;
        let script = Tera::one_off(HARNESS_TEMPLATE, &context, false)?;
        debug!(
            imports = imports.len(),
            tests = tests.len(),
            bytes = script.len(),
            "synthesized harness"
        );
        Ok(script)
    }
}

impl Default for HarnessSynthesizer {
    fn default() -> Self {
        Self::new(DEFAULT_ENTRY_POINT)
    }
}

/// Prefixes each line with its 1-based number for display.
pub fn numbered(script: &str) -> String {
    script
        .lines()
        .enumerate()
        .map(|(idx, line)| format!("{:<2}: {}", idx + 1, line))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(packages: &[&str], tests: Vec<TestCase>) -> ResolvedSpecimen {
        ResolvedSpecimen {
            id: 0,
            intent: String::new(),
            code: "def foo(a, b):\n    return a + b".to_string(),
            tests,
            packages: packages.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn test_synthesize_shape() {
        let spec = resolved(
            &["math", "re"],
            vec![
                TestCase::new("[2, 3]", "__result__ == 5"),
                TestCase::new("[0, 0]", "__result__ == 0"),
            ],
        );
        let script = HarnessSynthesizer::default()
            .synthesize(&spec)
            .expect("should synthesize");

        let expected = "import math\n\
                        import re\n\
                        def foo(a, b):\n    return a + b\n\
                        \n\
                        __outcomes__ = []\n\
                        __result__ = foo(*[2, 3])\n\
                        __outcomes__.append(__result__ == 5)\n\
                        __result__ = foo(*[0, 0])\n\
                        __outcomes__.append(__result__ == 0)\n";
        assert_eq!(script, expected);
    }

    #[test]
    fn test_synthesize_without_imports_or_tests() {
        let spec = resolved(&[], vec![]);
        let script = HarnessSynthesizer::default()
            .synthesize(&spec)
            .expect("should synthesize");
        assert_eq!(script, "def foo(a, b):\n    return a + b\n\n__outcomes__ = []\n");
    }

    #[test]
    fn test_custom_entry_point() {
        let spec = resolved(&[], vec![TestCase::new("[1, 2]", "__result__ == 3")]);
        let script = HarnessSynthesizer::new("solve")
            .synthesize(&spec)
            .expect("should synthesize");
        assert!(script.contains("__result__ = solve(*[1, 2])"));
    }

    #[test]
    fn test_code_braces_are_not_interpreted() {
        let mut spec = resolved(&[], vec![]);
        spec.code = "def foo():\n    return {'a': {{1: 2}.get(1)}}".to_string();
        let script = HarnessSynthesizer::default()
            .synthesize(&spec)
            .expect("should synthesize");
        assert!(script.starts_with("def foo():\n    return {'a': {{1: 2}.get(1)}}\n"));
    }

    #[test]
    fn test_unresolved_keeps_placeholders() {
        let specimen = Specimen::new(0, "", "def foo():\n    return {{ n }}")
            .with_tests(vec![TestCase::new("[]", "__result__ == {{ n }}")]);
        let script = HarnessSynthesizer::default()
            .synthesize_unresolved(&specimen)
            .expect("should synthesize");
        assert!(script.contains("return {{ n }}"));
        assert!(script.contains("__outcomes__.append(__result__ == {{ n }})"));
    }

    #[test]
    fn test_numbered() {
        assert_eq!(numbered("a\nb"), "1 : a\n2 : b");
    }
}
