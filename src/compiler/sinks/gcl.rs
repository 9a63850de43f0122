//! gcp_stackdriver_logs sink (Google Cloud Logging).

use crate::compiler::element::Element;
use crate::compiler::ids;
use crate::compiler::sinks::{SinkConfig, SinkContext, Tls};
use crate::spec::output::GoogleCloudLogging;
use crate::spec::secret::KEY_GOOGLE_CREDENTIALS;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackdriverSink {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials_path: Option<String>,
    #[serde(flatten)]
    pub parent: Parent,
    pub log_id: String,
    pub severity_key: String,
    pub resource: Resource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls: Option<Tls>,
}

/// Resource the log entries are written under; the first configured one wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Parent {
    ProjectId(String),
    FolderId(String),
    OrganizationId(String),
    BillingAccountId(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resource {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub node_name: String,
}

pub fn build(ctx: &SinkContext<'_>, settings: &GoogleCloudLogging) -> Vec<Element> {
    let sink = StackdriverSink {
        credentials_path: ctx
            .secret
            .filter(|s| s.has(KEY_GOOGLE_CREDENTIALS))
            .map(|s| s.mounted_path(KEY_GOOGLE_CREDENTIALS)),
        parent: parent(settings),
        log_id: settings.log_id.clone(),
        severity_key: "level".to_string(),
        resource: Resource {
            resource_type: "k8s_node".to_string(),
            node_name: "{{ hostname }}".to_string(),
        },
        tls: ctx.tls(),
    };

    vec![Element::sink(
        ids::output_sink(&ctx.output.name),
        ctx.inputs.iter().cloned(),
        SinkConfig::GcpStackdriverLogs(sink),
    )]
}

fn parent(settings: &GoogleCloudLogging) -> Parent {
    let candidates = [
        settings.project_id.clone().map(Parent::ProjectId),
        settings.folder_id.clone().map(Parent::FolderId),
        settings.organization_id.clone().map(Parent::OrganizationId),
        settings.billing_account_id.clone().map(Parent::BillingAccountId),
    ];
    candidates
        .into_iter()
        .flatten()
        .next()
        .unwrap_or_else(|| Parent::ProjectId(String::new()))
}
