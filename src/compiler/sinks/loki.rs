//! loki sink.

use crate::compiler::element::Element;
use crate::compiler::ids;
use crate::compiler::sinks::{Auth, Encoding, SinkConfig, SinkContext, Tls, Toggle};
use crate::spec::output::Loki;
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use tracing::debug;

/// Record fields promoted to stream labels when none are configured.
const DEFAULT_LABEL_KEYS: [&str; 4] = [
    "log_type",
    "kubernetes.namespace_name",
    "kubernetes.pod_name",
    "kubernetes.host",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LokiSink {
    pub endpoint: String,
    pub out_of_order_action: String,
    pub healthcheck: Toggle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    pub encoding: Encoding,
    pub labels: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<Auth>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls: Option<Tls>,
}

pub fn build(ctx: &SinkContext<'_>, settings: &Loki) -> Vec<Element> {
    let sink = LokiSink {
        endpoint: ctx.output.url.clone(),
        out_of_order_action: "accept".to_string(),
        healthcheck: Toggle::OFF,
        tenant_id: settings.tenant_key.as_deref().map(template),
        encoding: Encoding::json(),
        labels: labels(&settings.label_keys),
        auth: ctx.auth(),
        tls: ctx.tls(),
    };

    vec![Element::sink(
        ids::output_sink(&ctx.output.name),
        ctx.inputs.iter().cloned(),
        SinkConfig::Loki(sink),
    )]
}

/// `{{ field.path }}` event template.
fn template(field: &str) -> String {
    format!("{{{{ {} }}}}", field)
}

/// Label name for a field path: every non-alphanumeric becomes `_`.
fn label_name(key: &str) -> String {
    key.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Stream labels keyed by label name. When two field paths map to the same
/// name, the first one listed keeps it.
fn labels(keys: &[String]) -> BTreeMap<String, String> {
    let keys: Vec<&str> = if keys.is_empty() {
        DEFAULT_LABEL_KEYS.to_vec()
    } else {
        keys.iter().map(String::as_str).collect()
    };
    let mut labels = BTreeMap::new();
    for key in keys {
        match labels.entry(label_name(key)) {
            Entry::Vacant(slot) => {
                slot.insert(template(key));
            }
            Entry::Occupied(slot) => {
                debug!(label = %slot.key(), field = key, "dropping label key that maps to an existing label");
            }
        }
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::element::ElementKind;
    use crate::compiler::options::Options;
    use crate::compiler::sinks::testing::context;
    use crate::spec::Output;
    use crate::spec::output::Destination;
    use crate::spec::secret::{KEY_TOKEN, Secret};
    use pretty_assertions::assert_eq;

    fn loki_sink(elements: &[Element]) -> LokiSink {
        match &elements[0].kind {
            ElementKind::Sink(SinkConfig::Loki(l)) => l.clone(),
            other => panic!("expected loki sink, got {:?}", other),
        }
    }

    #[test]
    fn default_labels() {
        let output = Output::new("loki", "https://loki:3100", Destination::Loki(Loki::default()));
        let secret = Secret::new("loki-token").with(KEY_TOKEN, "t");
        let ctx = context(output, Some(secret), Options::default());
        let sink = loki_sink(&build(&ctx, &Loki::default()));

        assert_eq!(sink.endpoint, "https://loki:3100");
        assert_eq!(
            sink.labels.into_iter().collect::<Vec<_>>(),
            vec![
                ("kubernetes_host".to_string(), "{{ kubernetes.host }}".to_string()),
                ("kubernetes_namespace_name".to_string(), "{{ kubernetes.namespace_name }}".to_string()),
                ("kubernetes_pod_name".to_string(), "{{ kubernetes.pod_name }}".to_string()),
                ("log_type".to_string(), "{{ log_type }}".to_string()),
            ]
        );
        assert_eq!(sink.auth, Some(Auth::Bearer { token: "t".to_string() }));
        assert_eq!(sink.tenant_id, None);
    }

    #[test]
    fn tenant_and_custom_labels() {
        let settings = Loki {
            tenant_key: Some("kubernetes.namespace_name".to_string()),
            label_keys: vec!["kubernetes.labels.app".to_string()],
        };
        let output = Output::new("loki", "http://loki:3100", Destination::Loki(settings.clone()));
        let sink = loki_sink(&build(&context(output, None, Options::default()), &settings));

        assert_eq!(sink.tenant_id.as_deref(), Some("{{ kubernetes.namespace_name }}"));
        assert_eq!(sink.labels.len(), 1);
        assert_eq!(sink.labels["kubernetes_labels_app"], "{{ kubernetes.labels.app }}");
        assert_eq!(sink.tls, None);
    }

    #[test]
    fn colliding_label_names_keep_the_first_key() {
        let settings = Loki {
            tenant_key: None,
            label_keys: vec!["kubernetes.host".to_string(), "kubernetes_host".to_string()],
        };
        let output = Output::new("loki", "http://loki:3100", Destination::Loki(settings.clone()));
        let sink = loki_sink(&build(&context(output, None, Options::default()), &settings));

        assert_eq!(sink.labels.len(), 1);
        assert_eq!(sink.labels["kubernetes_host"], "{{ kubernetes.host }}");
    }
}
