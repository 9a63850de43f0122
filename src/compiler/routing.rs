//! User-defined application routes and source throttles.

use crate::compiler::element::Element;
use crate::compiler::ids;
use crate::compiler::selector;
use crate::spec::Forwarder;
use crate::spec::input::{Input, LogType};
use std::collections::BTreeMap;
use tracing::debug;

/// Route expression per pipeline-referenced application input, keyed by input name.
pub fn route_map(forwarder: &Forwarder) -> BTreeMap<String, String> {
    let inputs = forwarder.input_map();
    let mut routes = BTreeMap::new();
    for pipeline in &forwarder.pipelines {
        for input_ref in &pipeline.input_refs {
            let Some(input) = inputs.get(input_ref.as_str()) else {
                continue;
            };
            if let Some(expression) = selector::route_expression(input) {
                routes.insert(input.name.clone(), expression);
            }
        }
    }
    routes
}

/// `route_application_logs` followed by one throttle per enforceable input policy.
pub fn user_routes(forwarder: &Forwarder, routes: &BTreeMap<String, String>) -> Vec<Element> {
    if routes.is_empty() {
        return Vec::new();
    }

    let mut elements = vec![Element::route(
        ids::ROUTE_APPLICATION_LOGS,
        [LogType::Application.as_str()],
        routes.clone(),
    )];

    let inputs = forwarder.input_map();
    for name in routes.keys() {
        let Some(input) = inputs.get(name.as_str()) else {
            continue;
        };
        if let Some(throttle) = source_throttle(input) {
            elements.push(throttle);
        }
    }

    debug!(routes = routes.len(), elements = elements.len(), "built user routes");
    elements
}

/// Whether `input` ends up behind a source throttle.
pub fn is_throttled(input: &Input) -> bool {
    input.rate_limit.as_ref().is_some_and(|l| l.is_enforceable())
}

fn source_throttle(input: &Input) -> Option<Element> {
    let limit = input.rate_limit.as_ref()?;
    let threshold = match u64::try_from(limit.threshold) {
        Ok(t) if t > 0 => t,
        _ => {
            debug!(input = %input.name, threshold = limit.threshold, "dropping non-positive source throttle");
            return None;
        }
    };
    Some(Element::throttle(
        ids::source_throttle(&input.name),
        [ids::branch(ids::ROUTE_APPLICATION_LOGS, &input.name)],
        threshold,
        limit.key_field.clone(),
    ))
}
