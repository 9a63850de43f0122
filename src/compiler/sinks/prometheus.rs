//! Collector self-metrics: node tagging remap and prometheus exporter.

use crate::compiler::element::Element;
use crate::compiler::ids;
use crate::compiler::options::Options;
use crate::compiler::sinks::{SinkConfig, Tls};
use serde::Serialize;

pub const LISTEN_PORT: u16 = 24231;
const METRICS_TLS_DIR: &str = "/etc/collector/metrics";
const ADD_NODENAME_VRL: &str = r#".tags.hostname = get_env_var!("VECTOR_SELF_NODE_NAME")"#;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrometheusSink {
    pub address: String,
    pub default_namespace: String,
    pub tls: Tls,
}

/// `add_nodename_to_metric` followed by `prometheus_output`.
pub fn metrics(options: &Options) -> Vec<Element> {
    let profile = options.tls_profile.as_ref();
    let tls = Tls {
        enabled: Some(true),
        min_tls_version: profile.and_then(|p| p.min_tls_version.clone()),
        ciphersuites: profile.and_then(|p| p.cipher_suites()),
        crt_file: Some(format!("{}/tls.crt", METRICS_TLS_DIR)),
        key_file: Some(format!("{}/tls.key", METRICS_TLS_DIR)),
        ..Default::default()
    };

    vec![
        Element::remap(
            ids::ADD_NODENAME_TO_METRIC,
            [ids::SOURCE_INTERNAL_METRICS],
            "Add node name to metrics",
            ADD_NODENAME_VRL,
        ),
        Element::sink(
            ids::PROMETHEUS_OUTPUT,
            [ids::ADD_NODENAME_TO_METRIC],
            SinkConfig::PrometheusExporter(PrometheusSink {
                address: format!("{}:{}", options.listen_all(), LISTEN_PORT),
                default_namespace: "collector".to_string(),
                tls,
            }),
        ),
    ]
}
