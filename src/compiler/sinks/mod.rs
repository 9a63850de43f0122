//! Destination builders.
//!
//! Each family turns one output into its sink (plus an optional
//! `normalize_output_<name>` remap in front of it). Builders never fail:
//! missing credentials or an unparsable URL degrade the generated settings
//! instead.

pub mod cloudwatch;
pub mod elasticsearch;
pub mod gcl;
pub mod http;
pub mod kafka;
pub mod loki;
pub mod prometheus;
pub mod splunk;
pub mod syslog;

use crate::compiler::options::Options;
use crate::spec::Output;
use crate::spec::secret::{
    KEY_CA_BUNDLE, KEY_PASSPHRASE, KEY_PASSWORD, KEY_TLS_CERT, KEY_TLS_KEY, KEY_TOKEN, KEY_USERNAME,
    Secret,
};
use serde::Serialize;
use tracing::debug;
use url::Url;

/// Sink payload, tagged with the engine's sink `type`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SinkConfig {
    Kafka(kafka::KafkaSink),
    Loki(loki::LokiSink),
    Elasticsearch(elasticsearch::ElasticsearchSink),
    AwsCloudwatchLogs(cloudwatch::CloudwatchSink),
    GcpStackdriverLogs(gcl::StackdriverSink),
    SplunkHecLogs(splunk::SplunkSink),
    Http(http::HttpSink),
    Socket(syslog::SocketSink),
    PrometheusExporter(prometheus::PrometheusSink),
}

/// Everything a builder sees for one output.
#[derive(Debug, Clone)]
pub struct SinkContext<'a> {
    pub output: &'a Output,
    /// Upstream component IDs, already rewritten to the sink throttle if any.
    pub inputs: Vec<String>,
    pub secret: Option<&'a Secret>,
    pub options: &'a Options,
}

impl SinkContext<'_> {
    pub fn url(&self) -> Option<Url> {
        match Url::parse(&self.output.url) {
            Ok(url) => Some(url),
            Err(err) => {
                if !self.output.url.is_empty() {
                    debug!(output = %self.output.name, url = %self.output.url, %err, "unparsable output URL");
                }
                None
            }
        }
    }

    /// Whether the output URL asks for an encrypted connection.
    pub fn is_secure(&self) -> bool {
        self.url()
            .is_some_and(|u| matches!(u.scheme(), "https" | "tls" | "ssl" | "wss"))
    }

    pub fn secret_value(&self, key: &str) -> Option<String> {
        self.secret.and_then(|s| s.get(key)).map(str::to_string)
    }

    /// Basic auth when the secret carries a username and password, bearer
    /// auth when it carries a token.
    pub fn auth(&self) -> Option<Auth> {
        let secret = self.secret?;
        if let (Some(user), Some(password)) = (secret.get(KEY_USERNAME), secret.get(KEY_PASSWORD)) {
            return Some(Auth::Basic {
                user: user.to_string(),
                password: password.to_string(),
            });
        }
        secret.get(KEY_TOKEN).map(|token| Auth::Bearer {
            token: token.to_string(),
        })
    }

    /// TLS settings from the secret, the caller's profile and the output's
    /// skip-verify flag. `None` when nothing applies.
    pub fn tls(&self) -> Option<Tls> {
        let mut tls = Tls::default();
        let secure = self.is_secure();

        if let Some(secret) = self.secret {
            if secret.has(KEY_CA_BUNDLE) {
                tls.ca_file = Some(secret.mounted_path(KEY_CA_BUNDLE));
            }
            if secret.has(KEY_TLS_CERT) && secret.has(KEY_TLS_KEY) {
                tls.crt_file = Some(secret.mounted_path(KEY_TLS_CERT));
                tls.key_file = Some(secret.mounted_path(KEY_TLS_KEY));
            }
            tls.key_pass = secret.get(KEY_PASSPHRASE).map(str::to_string);
        }
        if secure && tls.ca_file.is_none() {
            tls.ca_file = self.options.trusted_ca.clone();
        }
        if secure {
            if let Some(profile) = &self.options.tls_profile {
                tls.min_tls_version = profile.min_tls_version.clone();
                tls.ciphersuites = profile.cipher_suites();
            }
        }
        if self.output.tls.insecure_skip_verify {
            tls.verify_certificate = Some(false);
            tls.verify_hostname = Some(false);
        }

        if tls.is_empty() { None } else { Some(tls) }
    }

    /// [`tls`](Self::tls) for sinks that need TLS switched on explicitly
    /// rather than inferring it from the URL scheme.
    pub fn explicit_tls(&self) -> Option<Tls> {
        if self.is_secure() {
            Some(self.tls().unwrap_or_default().enable())
        } else {
            self.tls()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum Auth {
    Basic { user: String, password: String },
    Bearer { token: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Tls {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verify_certificate: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verify_hostname: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_tls_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ciphersuites: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crt_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_pass: Option<String>,
}

impl Tls {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn enable(self) -> Self {
        Self {
            enabled: Some(true),
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Encoding {
    pub codec: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp_format: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub except_fields: Vec<String>,
}

impl Encoding {
    pub fn json() -> Self {
        Self {
            codec: "json".to_string(),
            timestamp_format: None,
            except_fields: Vec::new(),
        }
    }

    pub fn with_rfc3339(self) -> Self {
        Self {
            timestamp_format: Some("rfc3339".to_string()),
            ..self
        }
    }

    pub fn except<I>(self, fields: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            except_fields: fields.into_iter().map(Into::into).collect(),
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Toggle {
    pub enabled: bool,
}

impl Toggle {
    pub const OFF: Toggle = Toggle { enabled: false };
}

/// `host:port` of a URL, defaulting the port.
pub fn host_port(url: &Url, default_port: u16) -> Option<String> {
    let host = url.host_str()?;
    let port = url.port_or_known_default().unwrap_or(default_port);
    Some(format!("{}:{}", host, port))
}
