//! Raw source names and component IDs.
//!
//! Every ID the compiler emits is built here from a fixed name or from a
//! user-supplied name plus a fixed prefix/suffix. User names cannot contain
//! `.`, so route branches never collide with anything else.

use crate::spec::input::{Receiver, Selector};
use crate::spec::{Forwarder, Input, Output};
use std::collections::BTreeSet;

pub const SOURCE_CONTAINER_LOGS: &str = "container_logs";
pub const SOURCE_JOURNAL_LOGS: &str = "journal_logs";
pub const SOURCE_HOST_AUDIT_LOGS: &str = "host_audit_logs";
pub const SOURCE_K8S_AUDIT_LOGS: &str = "k8s_audit_logs";
pub const SOURCE_OPENSHIFT_AUDIT_LOGS: &str = "openshift_audit_logs";
pub const SOURCE_OVN_AUDIT_LOGS: &str = "ovn_audit_logs";
pub const SOURCE_INTERNAL_METRICS: &str = "internal_metrics";

pub const AUDIT_SOURCES: [&str; 4] = [
    SOURCE_HOST_AUDIT_LOGS,
    SOURCE_K8S_AUDIT_LOGS,
    SOURCE_OPENSHIFT_AUDIT_LOGS,
    SOURCE_OVN_AUDIT_LOGS,
];

pub const ROUTE_CONTAINER_LOGS: &str = "route_container_logs";
pub const ROUTE_APPLICATION_LOGS: &str = "route_application_logs";
pub const BRANCH_APP: &str = "app";
pub const BRANCH_INFRA: &str = "infra";

pub const ADD_NODENAME_TO_METRIC: &str = "add_nodename_to_metric";
pub const PROMETHEUS_OUTPUT: &str = "prometheus_output";

const SOURCE_THROTTLE_PREFIX: &str = "source_throttle_";
const SINK_THROTTLE_PREFIX: &str = "sink_throttle_";
const OUTPUT_PREFIX: &str = "output_";
const OUTPUT_NORMALIZE_PREFIX: &str = "normalize_output_";
const RECEIVER_INPUT_SUFFIX: &str = "_input";
const HTTP_RECEIVER_SUFFIX: &str = "_normalized";
const SYSLOG_RECEIVER_SUFFIX: &str = "_raw_syslog";

const FIXED_IDS: [&str; 14] = [
    "application",
    "infrastructure",
    "audit",
    ROUTE_CONTAINER_LOGS,
    ROUTE_APPLICATION_LOGS,
    ADD_NODENAME_TO_METRIC,
    PROMETHEUS_OUTPUT,
    SOURCE_CONTAINER_LOGS,
    SOURCE_JOURNAL_LOGS,
    SOURCE_HOST_AUDIT_LOGS,
    SOURCE_K8S_AUDIT_LOGS,
    SOURCE_OPENSHIFT_AUDIT_LOGS,
    SOURCE_OVN_AUDIT_LOGS,
    SOURCE_INTERNAL_METRICS,
];

/// `<route>.<branch>`
pub fn branch(route: &str, branch: &str) -> String {
    format!("{}.{}", route, branch)
}

pub fn source_throttle(input: &str) -> String {
    format!("{}{}", SOURCE_THROTTLE_PREFIX, input)
}

pub fn sink_throttle(output: &str) -> String {
    format!("{}{}", SINK_THROTTLE_PREFIX, output)
}

/// Sink of an output.
pub fn output_sink(output: &str) -> String {
    format!("{}{}", OUTPUT_PREFIX, output)
}

/// Remap a destination builder places in front of its sink.
pub fn output_normalizer(output: &str) -> String {
    format!("{}{}", OUTPUT_NORMALIZE_PREFIX, output)
}

/// Remap tagging a receiver's records.
pub fn receiver_input(input: &str) -> String {
    format!("{}{}", input, RECEIVER_INPUT_SUFFIX)
}

/// Stream an HTTP receiver delivers after decoding.
pub fn http_receiver_source(input: &str) -> String {
    format!("{}{}", input, HTTP_RECEIVER_SUFFIX)
}

/// Stream a syslog receiver delivers unparsed.
pub fn syslog_receiver_source(input: &str) -> String {
    format!("{}{}", input, SYSLOG_RECEIVER_SUFFIX)
}

const GENERATED_PREFIXES: [&str; 4] = [
    SOURCE_THROTTLE_PREFIX,
    SINK_THROTTLE_PREFIX,
    OUTPUT_PREFIX,
    OUTPUT_NORMALIZE_PREFIX,
];

const GENERATED_SUFFIXES: [&str; 3] = [
    RECEIVER_INPUT_SUFFIX,
    HTTP_RECEIVER_SUFFIX,
    SYSLOG_RECEIVER_SUFFIX,
];

/// Whether IDs derived from an input with this name could shadow an output's IDs.
pub fn has_generated_prefix(name: &str) -> bool {
    GENERATED_PREFIXES.iter().any(|p| name.starts_with(p))
}

/// Whether a pipeline with this name would collide with a generated ID.
pub fn is_reserved(name: &str) -> bool {
    FIXED_IDS.contains(&name)
        || has_generated_prefix(name)
        || GENERATED_SUFFIXES.iter().any(|s| name.ends_with(s))
}

/// Component IDs and source names the compiler always uses.
pub fn fixed_ids() -> impl Iterator<Item = &'static str> {
    FIXED_IDS.into_iter()
}

/// Every name an input can put into the graph, raw receiver streams included.
pub fn input_ids(input: &Input) -> Vec<String> {
    match &input.selector {
        Selector::Application(_) => vec![source_throttle(&input.name)],
        Selector::Receiver(Receiver::Http { .. }) => vec![
            receiver_input(&input.name),
            http_receiver_source(&input.name),
        ],
        Selector::Receiver(Receiver::Syslog { .. }) => vec![
            receiver_input(&input.name),
            syslog_receiver_source(&input.name),
        ],
        Selector::Infrastructure | Selector::Audit => Vec::new(),
    }
}

/// Every component ID an output can put into the graph, whatever its family.
pub fn output_ids(output: &Output) -> Vec<String> {
    vec![
        output_sink(&output.name),
        sink_throttle(&output.name),
        output_normalizer(&output.name),
    ]
}

/// Names the collector provides as sources for this forwarder.
pub fn raw_sources(forwarder: &Forwarder) -> BTreeSet<String> {
    let mut sources: BTreeSet<String> = [
        SOURCE_CONTAINER_LOGS,
        SOURCE_JOURNAL_LOGS,
        SOURCE_INTERNAL_METRICS,
    ]
    .into_iter()
    .chain(AUDIT_SOURCES)
    .map(str::to_string)
    .collect();

    for input in &forwarder.inputs {
        match input.selector {
            Selector::Receiver(Receiver::Http { .. }) => {
                sources.insert(http_receiver_source(&input.name));
            }
            Selector::Receiver(Receiver::Syslog { .. }) => {
                sources.insert(syslog_receiver_source(&input.name));
            }
            _ => {}
        }
    }
    sources
}
