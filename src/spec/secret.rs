//! Credentials handed to the compiler by its caller.
//!
//! The caller fetches secrets and keys them by output name; a process-wide
//! fallback lives under [`LOG_COLLECTOR_TOKEN`]. Values are plain text.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lookup key of the fallback credential used when an output has none.
pub const LOG_COLLECTOR_TOKEN: &str = "logcollector-token";

/// Directory where the collector mounts each secret as files.
pub const SECRET_MOUNT_PATH: &str = "/var/run/ocp-collector/secrets";

pub const KEY_USERNAME: &str = "username";
pub const KEY_PASSWORD: &str = "password";
pub const KEY_TOKEN: &str = "token";
pub const KEY_TLS_CERT: &str = "tls.crt";
pub const KEY_TLS_KEY: &str = "tls.key";
pub const KEY_CA_BUNDLE: &str = "ca-bundle.crt";
pub const KEY_PASSPHRASE: &str = "passphrase";
pub const KEY_SASL_ENABLE: &str = "sasl.enable";
pub const KEY_SASL_MECHANISMS: &str = "sasl.mechanisms";
pub const KEY_AWS_ACCESS_KEY_ID: &str = "aws_access_key_id";
pub const KEY_AWS_SECRET_ACCESS_KEY: &str = "aws_secret_access_key";
pub const KEY_GOOGLE_CREDENTIALS: &str = "google-application-credentials.json";
pub const KEY_SPLUNK_HEC_TOKEN: &str = "hecToken";

/// An already-fetched secret.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secret {
    pub name: String,
    #[serde(default)]
    pub data: BTreeMap<String, String>,
}

/// Secrets keyed by output name (plus [`LOG_COLLECTOR_TOKEN`]).
pub type Secrets = BTreeMap<String, Secret>;

impl Secret {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: BTreeMap::new(),
        }
    }

    /// Builder-style helper, mostly for tests and fixtures.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    pub fn has(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Path of `key` once the secret is mounted into the collector.
    pub fn mounted_path(&self, key: &str) -> String {
        format!("{}/{}/{}", SECRET_MOUNT_PATH, self.name, key)
    }
}
