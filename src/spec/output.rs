//! Output declarations.
//!
//! JSON shape:
//! {
//!   "name": "es",
//!   "type": "elasticsearch",
//!   "url": "https://es.svc:9200",
//!   "tls": { "insecureSkipVerify": false },
//!   "limit": { "maxRecordsPerSecond": 1000 },
//!   "elasticsearch": { "index": "{{ log_type }}-write" }
//! }
//!
//! The settings block matching `type` is optional; missing blocks fall back
//! to defaults. A `type` nobody knows is kept as [`Destination::Unknown`].

use crate::spec::limit::{LimitSpec, RateLimit};
use serde::Deserialize;
use std::collections::BTreeMap;

pub const OUTPUT_TYPE_KAFKA: &str = "kafka";
pub const OUTPUT_TYPE_LOKI: &str = "loki";
pub const OUTPUT_TYPE_ELASTICSEARCH: &str = "elasticsearch";
pub const OUTPUT_TYPE_CLOUDWATCH: &str = "cloudwatch";
pub const OUTPUT_TYPE_GOOGLE_CLOUD_LOGGING: &str = "googleCloudLogging";
pub const OUTPUT_TYPE_SPLUNK: &str = "splunk";
pub const OUTPUT_TYPE_HTTP: &str = "http";
pub const OUTPUT_TYPE_SYSLOG: &str = "syslog";

/// Raw output shape as it appears in the forwarder JSON.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOutput {
    pub name: String,

    #[serde(rename = "type")]
    pub output_type: String,

    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub tls: Option<OutputTls>,

    #[serde(default)]
    pub limit: Option<LimitSpec>,

    #[serde(default)]
    pub kafka: Option<Kafka>,

    #[serde(default)]
    pub loki: Option<Loki>,

    #[serde(default)]
    pub elasticsearch: Option<Elasticsearch>,

    #[serde(default)]
    pub cloudwatch: Option<Cloudwatch>,

    #[serde(default)]
    pub google_cloud_logging: Option<GoogleCloudLogging>,

    #[serde(default)]
    pub splunk: Option<Splunk>,

    #[serde(default)]
    pub http: Option<Http>,

    #[serde(default)]
    pub syslog: Option<Syslog>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OutputTls {
    pub insecure_skip_verify: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Kafka {
    /// Overrides the topic taken from the URL path.
    pub topic: Option<String>,
    /// Additional bootstrap brokers.
    pub brokers: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Loki {
    /// Record field holding the tenant ID.
    pub tenant_key: Option<String>,
    /// Record fields promoted to stream labels. Empty means the default set.
    pub label_keys: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Elasticsearch {
    /// Index template; defaults to a per-log-type write alias.
    pub index: Option<String>,
    /// Major Elasticsearch version the bulk API targets.
    pub version: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Cloudwatch {
    pub region: String,
    pub group_by: CloudwatchGroupBy,
    pub group_prefix: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CloudwatchGroupBy {
    #[default]
    LogType,
    NamespaceName,
    #[serde(rename = "namespaceUUID")]
    NamespaceUuid,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GoogleCloudLogging {
    pub project_id: Option<String>,
    pub folder_id: Option<String>,
    pub organization_id: Option<String>,
    pub billing_account_id: Option<String>,
    pub log_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Splunk {
    pub index: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Http {
    pub headers: BTreeMap<String, String>,
    pub method: Option<String>,
    /// Request timeout in seconds.
    pub timeout: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Syslog {
    pub rfc: SyslogRfc,
    pub facility: Option<String>,
    pub severity: Option<String>,
    pub app_name: Option<String>,
    pub msg_id: Option<String>,
    pub proc_id: Option<String>,
    pub tag: Option<String>,
    pub payload_key: Option<String>,
    pub add_log_source: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum SyslogRfc {
    #[serde(rename = "RFC3164")]
    Rfc3164,
    #[default]
    #[serde(rename = "RFC5424")]
    Rfc5424,
}

/// Destination family of an output together with its settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Kafka(Kafka),
    Loki(Loki),
    Elasticsearch(Elasticsearch),
    Cloudwatch(Cloudwatch),
    GoogleCloudLogging(GoogleCloudLogging),
    Splunk(Splunk),
    Http(Http),
    Syslog(Syslog),
    /// Type tag with no registered family.
    Unknown(String),
}

type DestinationCtor = fn(&RawOutput) -> Destination;

fn kafka(o: &RawOutput) -> Destination {
    Destination::Kafka(o.kafka.clone().unwrap_or_default())
}

fn loki(o: &RawOutput) -> Destination {
    Destination::Loki(o.loki.clone().unwrap_or_default())
}

fn elasticsearch(o: &RawOutput) -> Destination {
    Destination::Elasticsearch(o.elasticsearch.clone().unwrap_or_default())
}

fn cloudwatch(o: &RawOutput) -> Destination {
    Destination::Cloudwatch(o.cloudwatch.clone().unwrap_or_default())
}

fn google_cloud_logging(o: &RawOutput) -> Destination {
    Destination::GoogleCloudLogging(o.google_cloud_logging.clone().unwrap_or_default())
}

fn splunk(o: &RawOutput) -> Destination {
    Destination::Splunk(o.splunk.clone().unwrap_or_default())
}

fn http(o: &RawOutput) -> Destination {
    Destination::Http(o.http.clone().unwrap_or_default())
}

fn syslog(o: &RawOutput) -> Destination {
    Destination::Syslog(o.syslog.clone().unwrap_or_default())
}

/// Known destination families keyed by their `type` tag.
static DESTINATIONS: &[(&str, DestinationCtor)] = &[
    (OUTPUT_TYPE_KAFKA, kafka),
    (OUTPUT_TYPE_LOKI, loki),
    (OUTPUT_TYPE_ELASTICSEARCH, elasticsearch),
    (OUTPUT_TYPE_CLOUDWATCH, cloudwatch),
    (OUTPUT_TYPE_GOOGLE_CLOUD_LOGGING, google_cloud_logging),
    (OUTPUT_TYPE_SPLUNK, splunk),
    (OUTPUT_TYPE_HTTP, http),
    (OUTPUT_TYPE_SYSLOG, syslog),
];

impl Destination {
    /// Look the type tag up in the registry; misses become [`Destination::Unknown`].
    pub fn from_raw(raw: &RawOutput) -> Self {
        DESTINATIONS
            .iter()
            .find(|(tag, _)| *tag == raw.output_type)
            .map(|(_, ctor)| ctor(raw))
            .unwrap_or_else(|| Destination::Unknown(raw.output_type.clone()))
    }

    pub fn type_tag(&self) -> &str {
        match self {
            Self::Kafka(_) => OUTPUT_TYPE_KAFKA,
            Self::Loki(_) => OUTPUT_TYPE_LOKI,
            Self::Elasticsearch(_) => OUTPUT_TYPE_ELASTICSEARCH,
            Self::Cloudwatch(_) => OUTPUT_TYPE_CLOUDWATCH,
            Self::GoogleCloudLogging(_) => OUTPUT_TYPE_GOOGLE_CLOUD_LOGGING,
            Self::Splunk(_) => OUTPUT_TYPE_SPLUNK,
            Self::Http(_) => OUTPUT_TYPE_HTTP,
            Self::Syslog(_) => OUTPUT_TYPE_SYSLOG,
            Self::Unknown(tag) => tag,
        }
    }
}

/// Validated output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    pub name: String,
    pub url: String,
    pub tls: OutputTls,
    pub rate_limit: Option<RateLimit>,
    pub destination: Destination,
}

impl Output {
    pub fn new(name: impl Into<String>, url: impl Into<String>, destination: Destination) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            tls: OutputTls::default(),
            rate_limit: None,
            destination,
        }
    }

    pub fn with_rate_limit(mut self, threshold: i64) -> Self {
        self.rate_limit = Some(RateLimit::group(threshold));
        self
    }
}

impl RawOutput {
    pub fn validate(&self) -> Output {
        Output {
            name: self.name.clone(),
            url: self.url.clone(),
            tls: self.tls.clone().unwrap_or_default(),
            rate_limit: self.limit.map(|l| RateLimit::group(l.max_records_per_second)),
            destination: Destination::from_raw(self),
        }
    }
}
