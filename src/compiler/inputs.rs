//! Stream classifier: raw sources -> canonical log types.
//!
//! container_logs ──route_container_logs──┬─ app ────────────────► application
//!                                        └─ infra ─┐
//! journal_logs ────────────────────────────────────┴────────────► infrastructure
//! host/k8s/openshift/ovn audit logs ────────────────────────────► audit
//!
//! Receivers get their own tagging remap, `<name>_input`.

use crate::compiler::element::Element;
use crate::compiler::expr::{self, K8S_NAMESPACE_NAME};
use crate::compiler::ids;
use crate::spec::Forwarder;
use crate::spec::input::{LogType, Receiver, Selector};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

const NS_KUBE: &str = "kube";
const NS_OPENSHIFT: &str = "openshift";
const NS_DEFAULT: &str = "default";

/// Moves the event timestamp to `@timestamp` unless one is already set.
const FIX_TIMESTAMP: &str = r#"ts = del(.timestamp); if !exists(."@timestamp") {."@timestamp" = ts}"#;
const FIX_HOSTNAME: &str = ".hostname = del(.host)";

/// Container logs from infrastructure namespaces.
pub fn infra_namespaces() -> String {
    expr::or([
        expr::starts_with(K8S_NAMESPACE_NAME, &format!("{}-", NS_KUBE)),
        expr::starts_with(K8S_NAMESPACE_NAME, &format!("{}-", NS_OPENSHIFT)),
        expr::eq(K8S_NAMESPACE_NAME, NS_DEFAULT),
        expr::eq(K8S_NAMESPACE_NAME, NS_OPENSHIFT),
        expr::eq(K8S_NAMESPACE_NAME, NS_KUBE),
    ])
}

/// Container logs from everywhere else.
pub fn app_namespaces() -> String {
    expr::neg(&expr::paren(&infra_namespaces()))
}

fn set_log_type(log_type: LogType) -> String {
    format!(".log_type = {}", expr::quote(log_type.as_str()))
}

fn desc(log_type: LogType) -> String {
    format!("Set log_type to {}", expr::quote(log_type.as_str()))
}

fn audit_vrl() -> String {
    [set_log_type(LogType::Audit).as_str(), FIX_HOSTNAME, FIX_TIMESTAMP].join("\n")
}

/// Canonical types that some pipeline reads, directly or through a user input.
///
/// Receivers do not pull in a canonical type; they have their own streams.
pub fn gather_log_types(forwarder: &Forwarder) -> BTreeSet<LogType> {
    let inputs = forwarder.input_map();
    let mut types = BTreeSet::new();
    for pipeline in &forwarder.pipelines {
        for input_ref in &pipeline.input_refs {
            if let Some(t) = LogType::from_reserved(input_ref) {
                types.insert(t);
            } else if let Some(t) = inputs.get(input_ref.as_str()).and_then(|i| i.log_type()) {
                types.insert(t);
            }
        }
    }
    types
}

/// Route and tagging remaps for the canonical types in `types`.
pub fn classify(types: &BTreeSet<LogType>) -> Vec<Element> {
    let mut elements = Vec::new();
    let app = types.contains(&LogType::Application);
    let infra = types.contains(&LogType::Infrastructure);

    if app || infra {
        let mut routes = BTreeMap::new();
        if app {
            routes.insert(ids::BRANCH_APP.to_string(), app_namespaces());
        }
        if infra {
            routes.insert(ids::BRANCH_INFRA.to_string(), infra_namespaces());
        }
        elements.push(Element::route(
            ids::ROUTE_CONTAINER_LOGS,
            [ids::SOURCE_CONTAINER_LOGS],
            routes,
        ));
    }

    if app {
        elements.push(Element::remap(
            LogType::Application.as_str(),
            [ids::branch(ids::ROUTE_CONTAINER_LOGS, ids::BRANCH_APP)],
            desc(LogType::Application),
            set_log_type(LogType::Application),
        ));
    }
    if infra {
        elements.push(Element::remap(
            LogType::Infrastructure.as_str(),
            [
                ids::branch(ids::ROUTE_CONTAINER_LOGS, ids::BRANCH_INFRA),
                ids::SOURCE_JOURNAL_LOGS.to_string(),
            ],
            desc(LogType::Infrastructure),
            set_log_type(LogType::Infrastructure),
        ));
    }
    if types.contains(&LogType::Audit) {
        elements.push(Element::remap(
            LogType::Audit.as_str(),
            ids::AUDIT_SOURCES,
            desc(LogType::Audit),
            audit_vrl(),
        ));
    }

    debug!(?types, elements = elements.len(), "classified raw sources");
    elements
}

/// One tagging remap per declared receiver, in declaration order.
pub fn receivers(forwarder: &Forwarder) -> Vec<Element> {
    forwarder
        .inputs
        .iter()
        .filter_map(|input| {
            let Selector::Receiver(receiver) = &input.selector else {
                return None;
            };
            let element = match receiver {
                Receiver::Http { .. } => Element::remap(
                    ids::receiver_input(&input.name),
                    [ids::http_receiver_source(&input.name)],
                    desc(LogType::Audit),
                    audit_vrl(),
                ),
                Receiver::Syslog { .. } => Element::remap(
                    ids::receiver_input(&input.name),
                    [ids::syslog_receiver_source(&input.name)],
                    desc(LogType::Infrastructure),
                    set_log_type(LogType::Infrastructure),
                ),
            };
            debug!(input = %input.name, "tagging receiver");
            Some(element)
        })
        .collect()
}
