//! elasticsearch sink.

use crate::compiler::element::Element;
use crate::compiler::expr;
use crate::compiler::ids;
use crate::compiler::sinks::{Auth, Encoding, SinkConfig, SinkContext, Tls};
use crate::spec::input::LogType;
use crate::spec::output::Elasticsearch;
use serde::Serialize;

const WRITE_INDEX_FIELD: &str = "write_index";
const DEFAULT_VERSION: u8 = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElasticsearchSink {
    pub endpoints: Vec<String>,
    pub api_version: String,
    pub bulk: Bulk,
    pub encoding: Encoding,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<Auth>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls: Option<Tls>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bulk {
    pub action: String,
    pub index: String,
}

/// A configured index template goes straight to the sink. Otherwise a remap
/// picks a per-log-type write alias (`app-write`, `infra-write`, `audit-write`).
pub fn build(ctx: &SinkContext<'_>, settings: &Elasticsearch) -> Vec<Element> {
    let sink_id = ids::output_sink(&ctx.output.name);
    let sink = |index: String, encoding: Encoding| ElasticsearchSink {
        endpoints: vec![ctx.output.url.clone()],
        api_version: format!("v{}", settings.version.unwrap_or(DEFAULT_VERSION)),
        bulk: Bulk {
            action: "create".to_string(),
            index,
        },
        encoding,
        auth: ctx.auth(),
        tls: ctx.tls(),
    };

    if let Some(index) = &settings.index {
        return vec![Element::sink(
            sink_id,
            ctx.inputs.iter().cloned(),
            SinkConfig::Elasticsearch(sink(index.clone(), Encoding::json())),
        )];
    }

    let normalizer = ids::output_normalizer(&ctx.output.name);
    vec![
        Element::remap(
            normalizer.as_str(),
            ctx.inputs.iter().cloned(),
            "Set Elasticsearch index",
            write_index_vrl(),
        ),
        Element::sink(
            sink_id,
            [normalizer],
            SinkConfig::Elasticsearch(sink(
                format!("{{{{ {} }}}}", WRITE_INDEX_FIELD),
                Encoding::json().except([WRITE_INDEX_FIELD]),
            )),
        ),
    ]
}

fn write_index_vrl() -> String {
    let aliases = [
        (LogType::Application, "app"),
        (LogType::Infrastructure, "infra"),
        (LogType::Audit, "audit"),
    ];
    let mut lines = vec![r#"index = "default""#.to_string()];
    for (log_type, alias) in aliases {
        lines.push(format!(
            "if (.log_type == {}) {{ index = {} }}",
            expr::quote(log_type.as_str()),
            expr::quote(alias)
        ));
    }
    lines.push(format!(r#".{} = index + "-write""#, WRITE_INDEX_FIELD));
    lines.join("\n")
}
