//! kafka sink.
//!
//! Topic comes from the settings block, else the URL path, else a default.
//! Bootstrap servers are the URL's host plus any extra brokers.

use crate::compiler::element::Element;
use crate::compiler::ids;
use crate::compiler::sinks::{Encoding, SinkConfig, SinkContext, Tls, host_port};
use crate::spec::output::Kafka;
use crate::spec::secret::{KEY_PASSWORD, KEY_SASL_ENABLE, KEY_SASL_MECHANISMS, KEY_USERNAME};
use serde::Serialize;
use std::collections::BTreeSet;
use url::Url;

const DEFAULT_TOPIC: &str = "topic";
const DEFAULT_PORT: u16 = 9092;
const DEFAULT_SASL_MECHANISM: &str = "PLAIN";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KafkaSink {
    pub bootstrap_servers: String,
    pub topic: String,
    pub encoding: Encoding,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sasl: Option<Sasl>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls: Option<Tls>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sasl {
    pub enabled: bool,
    pub mechanism: String,
    pub username: String,
    pub password: String,
}

pub fn build(ctx: &SinkContext<'_>, settings: &Kafka) -> Vec<Element> {
    let url = ctx.url();

    // first occurrence wins, declaration order kept
    let mut seen = BTreeSet::new();
    let servers: Vec<String> = url
        .as_ref()
        .and_then(|u| host_port(u, DEFAULT_PORT))
        .into_iter()
        .chain(settings.brokers.iter().map(|b| broker_address(b)))
        .filter(|s| seen.insert(s.clone()))
        .collect();

    let topic = settings
        .topic
        .clone()
        .or_else(|| url.as_ref().and_then(topic_from_path))
        .unwrap_or_else(|| DEFAULT_TOPIC.to_string());

    let sink = KafkaSink {
        bootstrap_servers: servers.join(","),
        topic,
        encoding: Encoding::json().with_rfc3339(),
        sasl: sasl(ctx),
        tls: ctx.explicit_tls(),
    };

    vec![Element::sink(
        ids::output_sink(&ctx.output.name),
        ctx.inputs.iter().cloned(),
        SinkConfig::Kafka(sink),
    )]
}

fn topic_from_path(url: &Url) -> Option<String> {
    let path = url.path().trim_matches('/');
    if path.is_empty() { None } else { Some(path.to_string()) }
}

/// Brokers may be given as URLs or bare `host:port`.
fn broker_address(broker: &str) -> String {
    Url::parse(broker)
        .ok()
        .and_then(|u| host_port(&u, DEFAULT_PORT))
        .unwrap_or_else(|| broker.to_string())
}

fn sasl(ctx: &SinkContext<'_>) -> Option<Sasl> {
    let secret = ctx.secret?;
    if secret.get(KEY_SASL_ENABLE) != Some("true") {
        return None;
    }
    Some(Sasl {
        enabled: true,
        mechanism: secret
            .get(KEY_SASL_MECHANISMS)
            .unwrap_or(DEFAULT_SASL_MECHANISM)
            .to_string(),
        username: secret.get(KEY_USERNAME).unwrap_or_default().to_string(),
        password: secret.get(KEY_PASSWORD).unwrap_or_default().to_string(),
    })
}
