//! splunk_hec_logs sink.

use crate::compiler::element::Element;
use crate::compiler::ids;
use crate::compiler::sinks::{Encoding, SinkConfig, SinkContext, Tls};
use crate::spec::output::Splunk;
use crate::spec::secret::KEY_SPLUNK_HEC_TOKEN;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SplunkSink {
    pub endpoint: String,
    /// HEC token; empty when the secret does not carry one.
    pub default_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    pub timestamp_key: String,
    pub encoding: Encoding,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls: Option<Tls>,
}

pub fn build(ctx: &SinkContext<'_>, settings: &Splunk) -> Vec<Element> {
    let sink = SplunkSink {
        endpoint: ctx.output.url.clone(),
        default_token: ctx.secret_value(KEY_SPLUNK_HEC_TOKEN).unwrap_or_default(),
        index: settings.index.clone(),
        timestamp_key: "@timestamp".to_string(),
        encoding: Encoding::json(),
        tls: ctx.tls(),
    };

    vec![Element::sink(
        ids::output_sink(&ctx.output.name),
        ctx.inputs.iter().cloned(),
        SinkConfig::SplunkHecLogs(sink),
    )]
}
