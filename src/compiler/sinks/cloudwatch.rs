//! aws_cloudwatch_logs sink, fed by a remap that computes group and stream names.

use crate::compiler::element::Element;
use crate::compiler::expr;
use crate::compiler::ids;
use crate::compiler::sinks::{Encoding, SinkConfig, SinkContext, Tls, Toggle};
use crate::spec::output::{Cloudwatch, CloudwatchGroupBy};
use crate::spec::secret::{KEY_AWS_ACCESS_KEY_ID, KEY_AWS_SECRET_ACCESS_KEY};
use serde::Serialize;

const GROUP_NAME_FIELD: &str = "group_name";
const STREAM_NAME_FIELD: &str = "stream_name";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CloudwatchSink {
    pub region: String,
    pub compression: String,
    pub group_name: String,
    pub stream_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    pub healthcheck: Toggle,
    pub encoding: Encoding,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<AwsAuth>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls: Option<Tls>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AwsAuth {
    pub access_key_id: String,
    pub secret_access_key: String,
}

pub fn build(ctx: &SinkContext<'_>, settings: &Cloudwatch) -> Vec<Element> {
    let normalizer = ids::output_normalizer(&ctx.output.name);
    let remap = Element::remap(
        normalizer.as_str(),
        ctx.inputs.iter().cloned(),
        "Cloudwatch group and stream names",
        [
            group_vrl(settings.group_by, settings.group_prefix.as_deref()),
            STREAM_VRL.to_string(),
        ]
        .join("\n"),
    );

    let auth = match (
        ctx.secret_value(KEY_AWS_ACCESS_KEY_ID),
        ctx.secret_value(KEY_AWS_SECRET_ACCESS_KEY),
    ) {
        (Some(access_key_id), Some(secret_access_key)) => Some(AwsAuth {
            access_key_id,
            secret_access_key,
        }),
        _ => None,
    };

    let sink = CloudwatchSink {
        region: settings.region.clone(),
        compression: "none".to_string(),
        group_name: format!("{{{{ {} }}}}", GROUP_NAME_FIELD),
        stream_name: format!("{{{{ {} }}}}", STREAM_NAME_FIELD),
        endpoint: (!ctx.output.url.is_empty()).then(|| ctx.output.url.clone()),
        healthcheck: Toggle::OFF,
        encoding: Encoding::json().except([GROUP_NAME_FIELD, STREAM_NAME_FIELD]),
        auth,
        tls: ctx.tls(),
    };

    vec![
        remap,
        Element::sink(
            ids::output_sink(&ctx.output.name),
            [normalizer],
            SinkConfig::AwsCloudwatchLogs(sink),
        ),
    ]
}

const STREAM_VRL: &str = r#".stream_name = "default"
if (.log_type == "audit") { .stream_name = (.hostname + "." + .log_type) ?? .stream_name }
if exists(.kubernetes) { .stream_name = (.kubernetes.host + "." + .kubernetes.namespace_name + "_" + .kubernetes.pod_name + "_" + .kubernetes.container_name) ?? .stream_name }
if (.log_type == "infrastructure") && !exists(.kubernetes) { .stream_name = (.hostname + ".journal.system") ?? .stream_name }"#;

fn group_vrl(group_by: CloudwatchGroupBy, prefix: Option<&str>) -> String {
    let prefix = prefix.map(|p| format!("{}.", p)).unwrap_or_default();
    let per_app = match group_by {
        CloudwatchGroupBy::LogType => None,
        CloudwatchGroupBy::NamespaceName => Some(".kubernetes.namespace_name"),
        CloudwatchGroupBy::NamespaceUuid => Some(".kubernetes.namespace_id"),
    };
    let mut lines = vec![format!(
        ".{} = {} + .log_type",
        GROUP_NAME_FIELD,
        expr::quote(&prefix)
    )];
    if let Some(field) = per_app {
        lines.push(format!(
            "if (.log_type == \"application\") {{ .{} = ({} + {}) ?? .{} }}",
            GROUP_NAME_FIELD,
            expr::quote(&prefix),
            field,
            GROUP_NAME_FIELD
        ));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::element::ElementKind;
    use crate::compiler::options::Options;
    use crate::compiler::sinks::testing::context;
    use crate::spec::Output;
    use crate::spec::output::Destination;
    use crate::spec::secret::Secret;
    use pretty_assertions::assert_eq;

    #[test]
    fn group_by_log_type() {
        assert_eq!(group_vrl(CloudwatchGroupBy::LogType, None), r#".group_name = "" + .log_type"#);
    }

    #[test]
    fn group_by_namespace_with_prefix() {
        assert_eq!(
            group_vrl(CloudwatchGroupBy::NamespaceName, Some("cluster-a")),
            concat!(
                ".group_name = \"cluster-a.\" + .log_type\n",
                "if (.log_type == \"application\") { .group_name = (\"cluster-a.\" + .kubernetes.namespace_name) ?? .group_name }"
            )
        );
    }

    #[test]
    fn sink_reads_remap_and_uses_aws_keys() {
        let settings = Cloudwatch {
            region: "us-east-2".to_string(),
            ..Default::default()
        };
        let secret = Secret::new("cw")
            .with(KEY_AWS_ACCESS_KEY_ID, "AKIA")
            .with(KEY_AWS_SECRET_ACCESS_KEY, "s3cr3t");
        let output = Output::new("cw", "", Destination::Cloudwatch(settings.clone()));
        let elements = build(&context(output, Some(secret), Options::default()), &settings);

        assert_eq!(elements[0].component_id, "normalize_output_cw");
        assert_eq!(elements[1].inputs, vec!["normalize_output_cw"]);
        let ElementKind::Sink(SinkConfig::AwsCloudwatchLogs(sink)) = &elements[1].kind else {
            panic!("expected cloudwatch sink");
        };
        assert_eq!(sink.region, "us-east-2");
        assert_eq!(sink.endpoint, None);
        assert_eq!(sink.group_name, "{{ group_name }}");
        assert_eq!(
            sink.auth,
            Some(AwsAuth {
                access_key_id: "AKIA".to_string(),
                secret_access_key: "s3cr3t".to_string(),
            })
        );
    }
}
