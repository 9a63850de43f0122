//! Output dispatcher.
//!
//! Per output, in declaration order: resolve the credential, collect the
//! pipelines that feed it, optionally put a throttle in front, then hand off
//! to the family builder. The metrics stage is appended last.

use crate::compiler::element::Element;
use crate::compiler::ids;
use crate::compiler::options::Options;
use crate::compiler::sinks::{self, SinkContext, prometheus};
use crate::spec::output::Destination;
use crate::spec::secret::{LOG_COLLECTOR_TOKEN, Secret, Secrets};
use crate::spec::{Forwarder, Output};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, trace};

/// Output name -> names of the pipelines that reference it.
pub fn pipelines_by_output(forwarder: &Forwarder) -> BTreeMap<&str, BTreeSet<&str>> {
    let mut index: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for pipeline in &forwarder.pipelines {
        for output_ref in &pipeline.output_refs {
            index
                .entry(output_ref.as_str())
                .or_default()
                .insert(pipeline.name.as_str());
        }
    }
    index
}

/// Output-specific secret, else the collector token, else nothing.
pub fn resolve_secret<'a>(secrets: &'a Secrets, output: &str) -> Option<&'a Secret> {
    if let Some(secret) = secrets.get(output) {
        trace!(output, secret = %secret.name, "using secret configured in output");
        return Some(secret);
    }
    match secrets.get(LOG_COLLECTOR_TOKEN) {
        Some(secret) => {
            trace!(output, secret = %secret.name, "using secret configured in {}", LOG_COLLECTOR_TOKEN);
            Some(secret)
        }
        None => {
            trace!(output, "no secret found in {}", LOG_COLLECTOR_TOKEN);
            None
        }
    }
}

pub fn dispatch(forwarder: &Forwarder, secrets: &Secrets, options: &Options) -> Vec<Element> {
    let index = pipelines_by_output(forwarder);
    let mut elements = Vec::new();

    for output in &forwarder.outputs {
        let secret = resolve_secret(secrets, &output.name);
        let mut inputs: Vec<String> = index
            .get(output.name.as_str())
            .map(|names| names.iter().map(|n| n.to_string()).collect())
            .unwrap_or_default();
        if inputs.is_empty() {
            debug!(output = %output.name, "output is not referenced by any pipeline");
        }

        if let Some(limit) = &output.rate_limit {
            match u64::try_from(limit.threshold) {
                Ok(threshold) if threshold > 0 => {
                    let throttle_id = ids::sink_throttle(&output.name);
                    elements.push(Element::throttle(throttle_id.as_str(), inputs, threshold, None));
                    inputs = vec![throttle_id];
                }
                _ => {
                    debug!(output = %output.name, threshold = limit.threshold, "suppressing sink with non-positive limit");
                    continue;
                }
            }
        }

        let ctx = SinkContext {
            output,
            inputs,
            secret,
            options,
        };
        let built = build(&ctx);
        debug!(output = %output.name, kind = output.destination.type_tag(), elements = built.len(), "built output");
        elements.extend(built);
    }

    elements.extend(prometheus::metrics(options));
    elements
}

/// Family builder for the output's destination; unknown families build nothing.
fn build(ctx: &SinkContext<'_>) -> Vec<Element> {
    let output: &Output = ctx.output;
    match &output.destination {
        Destination::Kafka(s) => sinks::kafka::build(ctx, s),
        Destination::Loki(s) => sinks::loki::build(ctx, s),
        Destination::Elasticsearch(s) => sinks::elasticsearch::build(ctx, s),
        Destination::Cloudwatch(s) => sinks::cloudwatch::build(ctx, s),
        Destination::GoogleCloudLogging(s) => sinks::gcl::build(ctx, s),
        Destination::Splunk(s) => sinks::splunk::build(ctx, s),
        Destination::Http(s) => sinks::http::build(ctx, s),
        Destination::Syslog(s) => sinks::syslog::build(ctx, s),
        Destination::Unknown(tag) => {
            debug!(output = %output.name, kind = %tag, "dropping output of unknown type");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::element::{ElementKind, Throttle};
    use crate::compiler::sinks::SinkConfig;
    use crate::spec::output::{Http, Splunk};
    use crate::spec::pipeline::Pipeline;
    use crate::spec::secret::KEY_SPLUNK_HEC_TOKEN;
    use pretty_assertions::assert_eq;

    fn http(name: &str) -> Output {
        Output::new(name, "http://collector:8080", Destination::Http(Http::default()))
    }

    fn ids_of(elements: &[Element]) -> Vec<&str> {
        elements.iter().map(|e| e.component_id.as_str()).collect()
    }

    #[test]
    fn inverse_index_is_sorted() {
        let forwarder = Forwarder {
            pipelines: vec![
                Pipeline::new("zeta", ["application"], ["a", "b"]),
                Pipeline::new("alpha", ["audit"], ["a"]),
            ],
            ..Default::default()
        };
        let index = pipelines_by_output(&forwarder);
        assert_eq!(index["a"].iter().copied().collect::<Vec<_>>(), vec!["alpha", "zeta"]);
        assert_eq!(index["b"].len(), 1);
    }

    #[test]
    fn credential_fallback() {
        let mut secrets = Secrets::new();
        assert_eq!(resolve_secret(&secrets, "es"), None);

        secrets.insert(LOG_COLLECTOR_TOKEN.to_string(), Secret::new("collector-token"));
        assert_eq!(resolve_secret(&secrets, "es").map(|s| s.name.as_str()), Some("collector-token"));

        secrets.insert("es".to_string(), Secret::new("es-secret"));
        assert_eq!(resolve_secret(&secrets, "es").map(|s| s.name.as_str()), Some("es-secret"));
    }

    #[test]
    fn fallback_secret_reaches_builder() {
        let forwarder = Forwarder {
            outputs: vec![Output::new(
                "splunk",
                "https://splunk:8088",
                Destination::Splunk(Splunk::default()),
            )],
            ..Default::default()
        };
        let secrets = Secrets::from([(
            LOG_COLLECTOR_TOKEN.to_string(),
            Secret::new("token").with(KEY_SPLUNK_HEC_TOKEN, "fallback"),
        )]);
        let elements = dispatch(&forwarder, &secrets, &Options::default());
        let ElementKind::Sink(SinkConfig::SplunkHecLogs(sink)) = &elements[0].kind else {
            panic!("expected splunk sink");
        };
        assert_eq!(sink.default_token, "fallback");
    }

    #[test]
    fn throttle_rewrites_sink_inputs() {
        let forwarder = Forwarder {
            outputs: vec![http("web").with_rate_limit(50)],
            pipelines: vec![
                Pipeline::new("p2", ["application"], ["web"]),
                Pipeline::new("p1", ["audit"], ["web"]),
            ],
            ..Default::default()
        };
        let elements = dispatch(&forwarder, &Secrets::new(), &Options::default());
        assert_eq!(
            ids_of(&elements),
            vec!["sink_throttle_web", "output_web", "add_nodename_to_metric", "prometheus_output"]
        );
        assert_eq!(elements[0].inputs, vec!["p1", "p2"]);
        assert_eq!(
            elements[0].kind,
            ElementKind::Throttle(Throttle {
                threshold: 50,
                window_secs: 1,
                key_field: None
            })
        );
        assert_eq!(elements[1].inputs, vec!["sink_throttle_web"]);
    }

    #[test]
    fn non_positive_limit_suppresses_sink() {
        let forwarder = Forwarder {
            outputs: vec![http("zero").with_rate_limit(0), http("negative").with_rate_limit(-1), http("ok")],
            pipelines: vec![Pipeline::new("p", ["application"], ["zero", "negative", "ok"])],
            ..Default::default()
        };
        let elements = dispatch(&forwarder, &Secrets::new(), &Options::default());
        assert_eq!(
            ids_of(&elements),
            vec!["output_ok", "add_nodename_to_metric", "prometheus_output"]
        );
    }

    #[test]
    fn unknown_type_is_dropped() {
        let forwarder = Forwarder {
            outputs: vec![
                Output::new("fwd", "tcp://fluentd:24224", Destination::Unknown("fluentdForward".to_string())),
                http("after"),
            ],
            ..Default::default()
        };
        let elements = dispatch(&forwarder, &Secrets::new(), &Options::default());
        assert_eq!(
            ids_of(&elements),
            vec!["output_after", "add_nodename_to_metric", "prometheus_output"]
        );
        assert!(elements[0].inputs.is_empty());
    }
}
