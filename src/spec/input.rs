//! Input declarations.
//!
//! JSON shape (exactly one of the four blocks is set):
//! {
//!   "name": "my-app",
//!   "application": {
//!     "namespaces": ["ns-a", "team-*"],
//!     "excludeNamespaces": ["team-test"],
//!     "containers": { "include": ["web-*"], "exclude": ["istio-proxy"] },
//!     "selector": {
//!       "matchLabels": { "team": "x" },
//!       "matchExpressions": [{ "key": "tier", "operator": "In", "values": ["fe"] }]
//!     },
//!     "containerLimit": { "maxRecordsPerSecond": 100 }
//!   },
//!   "infrastructure": {},
//!   "audit": {},
//!   "receiver": { "type": "http", "http": { "port": 8443, "format": "kubeAPIAudit" } }
//! }

use crate::error::{Result, SpecError};
use crate::spec::limit::{LimitSpec, RateLimit};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

pub const INPUT_APPLICATION: &str = "application";
pub const INPUT_INFRASTRUCTURE: &str = "infrastructure";
pub const INPUT_AUDIT: &str = "audit";

/// Input names users may reference without declaring them.
pub const RESERVED_INPUT_NAMES: [&str; 3] = [INPUT_APPLICATION, INPUT_INFRASTRUCTURE, INPUT_AUDIT];

pub const RECEIVER_TYPE_HTTP: &str = "http";
pub const RECEIVER_TYPE_SYSLOG: &str = "syslog";

const DEFAULT_HTTP_RECEIVER_PORT: u16 = 8443;
const DEFAULT_SYSLOG_RECEIVER_PORT: u16 = 10514;

/// Canonical log type every record is tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogType {
    Application,
    Infrastructure,
    Audit,
}

impl LogType {
    pub const ALL: [LogType; 3] = [LogType::Application, LogType::Infrastructure, LogType::Audit];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Application => INPUT_APPLICATION,
            Self::Infrastructure => INPUT_INFRASTRUCTURE,
            Self::Audit => INPUT_AUDIT,
        }
    }

    /// Resolve one of the reserved input names.
    pub fn from_reserved(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

impl fmt::Display for LogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw input shape as it appears in the forwarder JSON.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInput {
    pub name: String,

    #[serde(default)]
    pub application: Option<RawApplication>,

    #[serde(default)]
    pub infrastructure: Option<EmptyBlock>,

    #[serde(default)]
    pub audit: Option<EmptyBlock>,

    #[serde(default)]
    pub receiver: Option<RawReceiver>,
}

/// Selector blocks that carry no settings (`"infrastructure": {}`).
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct EmptyBlock {}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawApplication {
    pub namespaces: Vec<String>,
    pub exclude_namespaces: Vec<String>,
    pub containers: Option<InclusionSpec>,
    pub selector: Option<LabelSelector>,
    pub container_limit: Option<LimitSpec>,
    pub group_limit: Option<LimitSpec>,
}

/// Include/exclude glob lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InclusionSpec {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LabelSelector {
    pub match_labels: BTreeMap<String, String>,
    pub match_expressions: Vec<LabelSelectorRequirement>,
}

impl LabelSelector {
    pub fn is_empty(&self) -> bool {
        self.match_labels.is_empty() && self.match_expressions.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LabelSelectorRequirement {
    pub key: String,
    pub operator: SelectorOperator,
    #[serde(default)]
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum SelectorOperator {
    In,
    NotIn,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawReceiver {
    #[serde(rename = "type")]
    pub receiver_type: String,

    #[serde(default)]
    pub http: Option<RawHttpReceiver>,

    #[serde(default)]
    pub syslog: Option<RawSyslogReceiver>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawHttpReceiver {
    #[serde(default)]
    pub port: Option<u16>,
    pub format: HttpReceiverFormat,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSyslogReceiver {
    pub port: Option<u16>,
    pub protocol: SyslogProtocol,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum HttpReceiverFormat {
    /// Kubernetes API audit events in list form.
    #[serde(rename = "kubeAPIAudit")]
    KubeApiAudit,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyslogProtocol {
    #[default]
    Tcp,
    Udp,
}

/// Validated input.
#[derive(Debug, Clone, PartialEq)]
pub struct Input {
    pub name: String,
    pub selector: Selector,
    pub rate_limit: Option<RateLimit>,
}

/// Which raw records an input selects.
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    Application(Application),
    Infrastructure,
    Audit,
    Receiver(Receiver),
}

/// Structural filter over application container logs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Application {
    pub namespaces: Vec<String>,
    pub exclude_namespaces: Vec<String>,
    pub containers: InclusionSpec,
    pub labels: LabelSelector,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Receiver {
    Http { port: u16, format: HttpReceiverFormat },
    Syslog { port: u16, protocol: SyslogProtocol },
}

impl Input {
    /// Application input without filters or limits; handy in tests.
    pub fn application(name: impl Into<String>, application: Application) -> Self {
        Self {
            name: name.into(),
            selector: Selector::Application(application),
            rate_limit: None,
        }
    }

    pub fn with_rate_limit(mut self, limit: RateLimit) -> Self {
        self.rate_limit = Some(limit);
        self
    }

    /// Canonical type of the records this input selects, if any.
    pub fn log_type(&self) -> Option<LogType> {
        match self.selector {
            Selector::Application(_) => Some(LogType::Application),
            Selector::Infrastructure => Some(LogType::Infrastructure),
            Selector::Audit => Some(LogType::Audit),
            Selector::Receiver(_) => None,
        }
    }
}

impl RawInput {
    /// Turn the optional-field JSON shape into a validated [`Input`].
    ///
    /// Name syntax and uniqueness are checked by the caller.
    pub fn validate(&self) -> Result<Input> {
        let found = [
            self.application.is_some(),
            self.infrastructure.is_some(),
            self.audit.is_some(),
            self.receiver.is_some(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count();
        if found != 1 {
            return Err(SpecError::SelectorCount {
                name: self.name.clone(),
                found,
            });
        }

        let (selector, rate_limit) = if let Some(app) = &self.application {
            let rate_limit = match (app.container_limit, app.group_limit) {
                (Some(_), Some(_)) => return Err(SpecError::ConflictingLimits(self.name.clone())),
                (Some(l), None) => Some(RateLimit::per_container(l.max_records_per_second)),
                (None, Some(l)) => Some(RateLimit::group(l.max_records_per_second)),
                (None, None) => None,
            };
            let application = Application {
                namespaces: app.namespaces.clone(),
                exclude_namespaces: app.exclude_namespaces.clone(),
                containers: app.containers.clone().unwrap_or_default(),
                labels: app.selector.clone().unwrap_or_default(),
            };
            (Selector::Application(application), rate_limit)
        } else if self.infrastructure.is_some() {
            (Selector::Infrastructure, None)
        } else if self.audit.is_some() {
            (Selector::Audit, None)
        } else if let Some(receiver) = &self.receiver {
            (Selector::Receiver(self.validate_receiver(receiver)?), None)
        } else {
            unreachable!("exactly one selector block is set")
        };

        Ok(Input {
            name: self.name.clone(),
            selector,
            rate_limit,
        })
    }

    fn validate_receiver(&self, receiver: &RawReceiver) -> Result<Receiver> {
        let mismatch = || SpecError::ReceiverMismatch {
            name: self.name.clone(),
            receiver_type: receiver.receiver_type.clone(),
        };
        match receiver.receiver_type.as_str() {
            RECEIVER_TYPE_HTTP => {
                let http = receiver.http.as_ref().ok_or_else(mismatch)?;
                Ok(Receiver::Http {
                    port: http.port.unwrap_or(DEFAULT_HTTP_RECEIVER_PORT),
                    format: http.format,
                })
            }
            RECEIVER_TYPE_SYSLOG => {
                let syslog = receiver.syslog.clone().unwrap_or_default();
                Ok(Receiver::Syslog {
                    port: syslog.port.unwrap_or(DEFAULT_SYSLOG_RECEIVER_PORT),
                    protocol: syslog.protocol,
                })
            }
            other => Err(SpecError::UnknownReceiver {
                name: self.name.clone(),
                receiver_type: other.to_string(),
            }),
        }
    }
}
