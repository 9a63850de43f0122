//! Application selector -> route expression.
//!
//! Clauses, each present only when its list is non-empty, joined with `and`:
//! 1) namespaces           or of glob matches on the namespace
//! 2) excludeNamespaces    negated or of glob matches on the namespace
//! 3) containers.include   or of glob matches on the container
//! 4) containers.exclude   negated or of glob matches on the container
//! 5) matchLabels          equality per label, keys sorted
//! 6) matchExpressions     In: or of equalities, NotIn: its negation
//!
//! No clause means no filter: the input takes every application record.

use crate::compiler::expr::{self, K8S_CONTAINER_NAME, K8S_NAMESPACE_NAME};
use crate::spec::input::{Application, Input, LabelSelector, Selector, SelectorOperator};

/// Result of compiling one selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub expression: String,
    /// `false` when nothing needs filtering; `expression` is then always true.
    pub active: bool,
}

pub fn compile(app: &Application) -> Filter {
    let mut clauses = Vec::new();

    if !app.namespaces.is_empty() {
        clauses.push(any_glob(K8S_NAMESPACE_NAME, &app.namespaces));
    }
    if !app.exclude_namespaces.is_empty() {
        clauses.push(none_glob(K8S_NAMESPACE_NAME, &app.exclude_namespaces));
    }
    if !app.containers.include.is_empty() {
        clauses.push(any_glob(K8S_CONTAINER_NAME, &app.containers.include));
    }
    if !app.containers.exclude.is_empty() {
        clauses.push(none_glob(K8S_CONTAINER_NAME, &app.containers.exclude));
    }
    if let Some(labels) = labels(&app.labels) {
        clauses.push(labels);
    }

    if clauses.is_empty() {
        Filter {
            expression: expr::ALWAYS_TRUE.to_string(),
            active: false,
        }
    } else {
        Filter {
            expression: expr::and(clauses),
            active: true,
        }
    }
}

/// Route expression for a pipeline-referenced input, if it needs a route.
///
/// Inputs with a rate-limit policy but no filter still get an always-true
/// route so the throttle has a branch to read from.
pub fn route_expression(input: &Input) -> Option<String> {
    let Selector::Application(app) = &input.selector else {
        return None;
    };
    let filter = compile(app);
    if filter.active {
        Some(filter.expression)
    } else if input.rate_limit.is_some() {
        Some(expr::ALWAYS_TRUE.to_string())
    } else {
        None
    }
}

fn any_glob(field: &str, patterns: &[String]) -> String {
    expr::or(patterns.iter().map(|p| expr::glob(field, p)))
}

fn none_glob(field: &str, patterns: &[String]) -> String {
    expr::neg(&expr::paren(&any_glob(field, patterns)))
}

fn labels(selector: &LabelSelector) -> Option<String> {
    if selector.is_empty() {
        return None;
    }

    // BTreeMap iteration is already sorted by key.
    let mut terms: Vec<String> = selector
        .match_labels
        .iter()
        .map(|(k, v)| expr::eq(&expr::label_field(k), v))
        .collect();

    for req in &selector.match_expressions {
        let mut values: Vec<&str> = req.values.iter().map(String::as_str).collect();
        values.sort_unstable();
        values.dedup();
        let field = expr::label_field(&req.key);
        let any = expr::or(values.iter().map(|v| expr::eq(&field, v)));
        terms.push(match req.operator {
            SelectorOperator::In => any,
            SelectorOperator::NotIn => expr::neg(&expr::paren(&any)),
        });
    }

    Some(expr::and(terms))
}
