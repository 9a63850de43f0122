//! http sink.

use crate::compiler::element::Element;
use crate::compiler::ids;
use crate::compiler::sinks::{Auth, Encoding, SinkConfig, SinkContext, Tls};
use crate::spec::output::Http;
use serde::Serialize;
use std::collections::BTreeMap;

const DEFAULT_METHOD: &str = "post";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HttpSink {
    pub uri: String,
    pub method: String,
    pub encoding: Encoding,
    #[serde(skip_serializing_if = "Request::is_empty")]
    pub request: Request,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<Auth>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls: Option<Tls>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Request {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

impl Request {
    pub fn is_empty(&self) -> bool {
        self.timeout_secs.is_none() && self.headers.is_empty()
    }
}

pub fn build(ctx: &SinkContext<'_>, settings: &Http) -> Vec<Element> {
    let sink = HttpSink {
        uri: ctx.output.url.clone(),
        method: settings
            .method
            .as_deref()
            .map(str::to_ascii_lowercase)
            .unwrap_or_else(|| DEFAULT_METHOD.to_string()),
        encoding: Encoding::json(),
        request: Request {
            timeout_secs: settings.timeout,
            headers: settings.headers.clone(),
        },
        auth: ctx.auth(),
        tls: ctx.tls(),
    };

    vec![Element::sink(
        ids::output_sink(&ctx.output.name),
        ctx.inputs.iter().cloned(),
        SinkConfig::Http(sink),
    )]
}
