//! Pipeline stage: one remap per pipeline, named after it.
//!
//! Outputs read from pipeline names, so each pipeline is materialized as a
//! component that merges its resolved inputs and stamps its labels.

use crate::compiler::element::Element;
use crate::compiler::expr;
use crate::compiler::ids;
use crate::compiler::routing;
use crate::spec::input::{Input, LogType, Selector};
use crate::spec::{Forwarder, Pipeline};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

const PASS_THROUGH: &str = ".";

pub fn stage(forwarder: &Forwarder, routes: &BTreeMap<String, String>) -> Vec<Element> {
    let inputs = forwarder.input_map();
    forwarder
        .pipelines
        .iter()
        .map(|pipeline| {
            let upstream: BTreeSet<String> = pipeline
                .input_refs
                .iter()
                .filter_map(|r| resolve(r, &inputs, routes))
                .collect();
            debug!(pipeline = %pipeline.name, inputs = ?upstream, "materialized pipeline");
            Element::remap(
                pipeline.name.as_str(),
                upstream,
                format!("Pipeline {}", expr::quote(&pipeline.name)),
                labels_vrl(pipeline),
            )
        })
        .collect()
}

/// Component a pipeline reads for one of its input references.
fn resolve(input_ref: &str, inputs: &BTreeMap<&str, &Input>, routes: &BTreeMap<String, String>) -> Option<String> {
    if let Some(t) = LogType::from_reserved(input_ref) {
        return Some(t.as_str().to_string());
    }
    let Some(input) = inputs.get(input_ref) else {
        debug!(input = input_ref, "skipping unknown input reference");
        return None;
    };
    let upstream = match &input.selector {
        Selector::Application(_) if routing::is_throttled(input) => ids::source_throttle(&input.name),
        Selector::Application(_) if routes.contains_key(&input.name) => {
            ids::branch(ids::ROUTE_APPLICATION_LOGS, &input.name)
        }
        Selector::Application(_) => LogType::Application.as_str().to_string(),
        Selector::Infrastructure => LogType::Infrastructure.as_str().to_string(),
        Selector::Audit => LogType::Audit.as_str().to_string(),
        Selector::Receiver(_) => ids::receiver_input(&input.name),
    };
    Some(upstream)
}

fn labels_vrl(pipeline: &Pipeline) -> String {
    if pipeline.labels.is_empty() {
        return PASS_THROUGH.to_string();
    }
    let fields: Vec<String> = pipeline
        .labels
        .iter()
        .map(|(k, v)| format!("{}: {}", expr::quote(k), expr::quote(v)))
        .collect();
    format!(".openshift.labels = {{{}}}", fields.join(", "))
}
