//! Strict placeholder rendering.
//!
//! Every name a template reads, in `{{ }}` blocks as well as in `if`, `elif`,
//! `for` and `set` expressions, must exist in the namespace. Names bound by the
//! template itself (loop variables, `set` targets) are exempt, as are
//! expressions guarded by `default` or tested with `is defined`.

use std::error::Error as _;
use std::sync::OnceLock;

use regex::Regex;
use tera::ast::{Expr, ExprVal, FunctionCall, Node};
use tera::Tera;

use crate::error::TemplateError;
use crate::template::TemplateNamespace;

const TEMPLATE_NAME: &str = "__specimen_text__";

fn undefined_variable_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"Variable `([^`]+)` not found in context").expect("valid regex constant")
    })
}

/// Substitutes every `{{ placeholder }}` in `text` from `namespace`.
///
/// Fails with [`TemplateError::UndefinedPlaceholder`] when `text` references a
/// name the namespace does not define; no partial output is produced.
pub fn render(text: &str, namespace: &TemplateNamespace) -> Result<String, TemplateError> {
    let mut tera = Tera::default();
    tera.autoescape_on(vec![]);
    tera.add_raw_template(TEMPLATE_NAME, text)
        .map_err(|e| classify(text, &e))?;

    let template = tera
        .get_template(TEMPLATE_NAME)
        .map_err(|e| classify(text, &e))?;
    let missing = referenced_names(&template.ast)
        .into_iter()
        .find(|name| !namespace.contains(name));
    if let Some(name) = missing {
        return Err(TemplateError::UndefinedPlaceholder {
            name,
            expression: text.to_string(),
        });
    }

    tera.render(TEMPLATE_NAME, namespace.context())
        .map_err(|e| classify(text, &e))
}

/// Top-level names read by `nodes` that the template does not bind itself,
/// in order of appearance.
fn referenced_names(nodes: &[Node]) -> Vec<String> {
    let mut found = Vec::new();
    let mut bound = vec!["__tera_context".to_string()];
    collect_nodes(nodes, &mut bound, &mut found);
    found
}

fn collect_nodes(nodes: &[Node], bound: &mut Vec<String>, found: &mut Vec<String>) {
    for node in nodes {
        match node {
            Node::VariableBlock(_, expr) => collect_expr(expr, bound, found),
            Node::Set(_, set) => {
                collect_expr(&set.value, bound, found);
                bound.push(set.key.clone());
            }
            Node::FilterSection(_, section, _) => {
                collect_call(&section.filter, bound, found);
                collect_nodes(&section.body, bound, found);
            }
            Node::Block(_, block, _) => collect_nodes(&block.body, bound, found),
            Node::Forloop(_, forloop, _) => {
                collect_expr(&forloop.container, bound, found);
                let mut inner = bound.clone();
                inner.push(forloop.value.clone());
                inner.extend(forloop.key.clone());
                inner.push("loop".to_string());
                collect_nodes(&forloop.body, &mut inner, found);
                if let Some(empty_body) = &forloop.empty_body {
                    collect_nodes(empty_body, &mut bound.clone(), found);
                }
            }
            Node::If(branches, _) => {
                for (_, condition, body) in &branches.conditions {
                    collect_expr(condition, bound, found);
                    collect_nodes(body, bound, found);
                }
                if let Some((_, body)) = &branches.otherwise {
                    collect_nodes(body, bound, found);
                }
            }
            _ => {}
        }
    }
}

fn collect_expr(expr: &Expr, bound: &[String], found: &mut Vec<String>) {
    for filter in &expr.filters {
        collect_call(filter, bound, found);
    }
    if expr.has_default_filter() {
        return;
    }

    match &expr.val {
        ExprVal::Ident(ident) => note(ident, bound, found),
        ExprVal::Math(math) => {
            collect_expr(&math.lhs, bound, found);
            collect_expr(&math.rhs, bound, found);
        }
        ExprVal::Logic(logic) => {
            collect_expr(&logic.lhs, bound, found);
            collect_expr(&logic.rhs, bound, found);
        }
        ExprVal::Test(test) => {
            if !matches!(test.name.as_str(), "defined" | "undefined") {
                note(&test.ident, bound, found);
            }
            for arg in &test.args {
                collect_expr(arg, bound, found);
            }
        }
        ExprVal::MacroCall(call) => {
            for arg in call.args.values() {
                collect_expr(arg, bound, found);
            }
        }
        ExprVal::FunctionCall(call) => collect_call(call, bound, found),
        ExprVal::Array(items) => {
            for item in items {
                collect_expr(item, bound, found);
            }
        }
        ExprVal::StringConcat(concat) => {
            for value in &concat.values {
                if let ExprVal::Ident(ident) = value {
                    note(ident, bound, found);
                }
            }
        }
        ExprVal::In(contains) => {
            collect_expr(&contains.lhs, bound, found);
            collect_expr(&contains.rhs, bound, found);
        }
        _ => {}
    }
}

fn collect_call(call: &FunctionCall, bound: &[String], found: &mut Vec<String>) {
    for arg in call.args.values() {
        collect_expr(arg, bound, found);
    }
}

/// Records the root of a dotted or indexed identifier (`xs.0`, `d[k]` -> `xs`, `d`).
fn note(ident: &str, bound: &[String], found: &mut Vec<String>) {
    let root = ident
        .split(|c: char| c == '.' || c == '[')
        .next()
        .unwrap_or(ident)
        .trim();
    if root.is_empty() || bound.iter().any(|b| b == root) || found.iter().any(|f| f == root) {
        return;
    }
    found.push(root.to_string());
}

/// Maps a Tera failure to the undefined/syntax split, walking the source chain
/// since Tera nests the interesting message under a generic one.
fn classify(text: &str, err: &tera::Error) -> TemplateError {
    let mut messages = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        messages.push(cause.to_string());
        source = cause.source();
    }

    for message in &messages {
        if let Some(caps) = undefined_variable_pattern().captures(message) {
            let name = caps[1].split('.').next().unwrap_or(&caps[1]).to_string();
            return TemplateError::UndefinedPlaceholder {
                name,
                expression: text.to_string(),
            };
        }
    }

    TemplateError::Syntax {
        expression: text.to_string(),
        message: messages.join(": "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{AliasTable, SampledValues};
    use serde_json::Value;

    fn namespace(sampled: &[(&str, Value)]) -> TemplateNamespace {
        let mut values = SampledValues::new();
        for (name, value) in sampled {
            values.insert(*name, value.clone());
        }
        TemplateNamespace::merge(&AliasTable::default(), &values)
    }

    #[test]
    fn test_plain_text_is_identity() {
        let ns = namespace(&[]);
        let text = "def foo(a, b):\n    return {'k': [a, b]}\n";
        assert_eq!(render(text, &ns).expect("should render"), text);
    }

    #[test]
    fn test_render_aliases() {
        let ns = namespace(&[]);
        let out = render("def foo({{ var1 }}, {{lst1}}):", &ns).expect("should render");
        assert_eq!(out, "def foo(x, L):");
    }

    #[test]
    fn test_render_sampled_list() {
        let ns = namespace(&[("L", serde_json::json!([1, -2, 3]))]);
        let out = render("__result__ == sorted({{ L }})", &ns).expect("should render");
        assert_eq!(out, "__result__ == sorted([1, -2, 3])");
    }

    #[test]
    fn test_render_sampled_string() {
        let ns = namespace(&[("s", Value::String("abC".to_string()))]);
        let out = render("foo('{{ s }}')", &ns).expect("should render");
        assert_eq!(out, "foo('abC')");
    }

    #[test]
    fn test_undefined_placeholder() {
        let ns = namespace(&[]);
        let err = render("return {{ missing }} + 1", &ns).expect_err("should fail");
        match err {
            TemplateError::UndefinedPlaceholder { name, expression } => {
                assert_eq!(name, "missing");
                assert_eq!(expression, "return {{ missing }} + 1");
            }
            other => panic!("expected undefined placeholder, got {other:?}"),
        }
    }

    #[test]
    fn test_syntax_error() {
        let ns = namespace(&[]);
        let err = render("return {{ x ", &ns).expect_err("should fail");
        assert!(matches!(err, TemplateError::Syntax { .. }));
    }

    #[test]
    fn test_same_namespace_is_deterministic() {
        let ns = namespace(&[("n", Value::from(42))]);
        let a = render("{{ n }} * 2", &ns).expect("should render");
        let b = render("{{ n }} * 2", &ns).expect("should render");
        assert_eq!(a, b);
        assert_eq!(a, "42 * 2");
    }

    #[test]
    fn test_undefined_name_in_condition() {
        let ns = namespace(&[]);
        let err = render("{% if missing %}a{% else %}b{% endif %}", &ns).expect_err("should fail");
        assert!(
            matches!(err, TemplateError::UndefinedPlaceholder { ref name, .. } if name == "missing"),
            "got {err:?}"
        );

        let err = render("{% if var1 %}a{% elif other > 1 %}b{% endif %}", &ns)
            .expect_err("should fail");
        assert!(matches!(err, TemplateError::UndefinedPlaceholder { ref name, .. } if name == "other"));
    }

    #[test]
    fn test_undefined_name_in_loop_and_set() {
        let ns = namespace(&[]);
        let err = render("{% for v in items %}{{ v }}{% endfor %}", &ns).expect_err("should fail");
        assert!(matches!(err, TemplateError::UndefinedPlaceholder { ref name, .. } if name == "items"));

        let err = render("{% set total = base + 1 %}{{ total }}", &ns).expect_err("should fail");
        assert!(matches!(err, TemplateError::UndefinedPlaceholder { ref name, .. } if name == "base"));
    }

    #[test]
    fn test_template_bound_names_are_allowed() {
        let ns = namespace(&[("xs", serde_json::json!([1, 2]))]);
        let out = render(
            "{% set sep = ', ' %}{% for v in xs %}{{ v }}{% if not loop.last %}{{ sep }}{% endif %}{% endfor %}",
            &ns,
        )
        .expect("should render");
        assert_eq!(out, "1, 2");

        let out = render("{% if xs is defined and other is undefined %}ok{% endif %}", &ns)
            .expect("should render");
        assert_eq!(out, "ok");
    }

    #[test]
    fn test_fresh_samples_differ_at_placeholders() {
        use crate::generator::ValueSampler;
        use crate::template::{parse_binding, sample};

        let bindings = vec![parse_binding("xs = @RINTLIST_8").expect("valid binding")];
        let outputs: std::collections::BTreeSet<String> = (0..6)
            .map(|seed| {
                let sampled = sample(&bindings, &mut ValueSampler::new(seed)).expect("should sample");
                let ns = TemplateNamespace::merge(&AliasTable::default(), &sampled);
                render("sorted({{ xs }})", &ns).expect("should render")
            })
            .collect();

        assert!(outputs.len() > 1, "every seed rendered the same text: {outputs:?}");
        assert!(outputs.iter().all(|o| o.starts_with("sorted([") && !o.contains("{{")));
    }

    #[test]
    fn test_integral_float_keeps_decimal_point() {
        let ns = namespace(&[("f", serde_json::json!(12.0))]);
        assert_eq!(render("{{ f }}", &ns).expect("should render"), "12.0");

        let ns = namespace(&[("f", serde_json::json!(-3.25))]);
        assert_eq!(render("{{ f }}", &ns).expect("should render"), "-3.25");
    }
}
