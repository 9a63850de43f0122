//! CLI configuration
//!
//! Optional TOML file, every section defaulted. An empty file (or no file at
//! all) compiles with plain listeners, no TLS profile and `info` logging.
//!
//! ```
//! use logfwd_gen::config::CompilerConfig;
//! use std::str::FromStr;
//!
//! let config = CompilerConfig::from_str("[generator]\nipv6 = true").unwrap();
//! assert!(config.generator.ipv6);
//! ```
//!
//! # Example
//!
//! ```toml
//! [log]
//! level = "debug"
//!
//! [generator]
//! ipv6 = false
//! trusted_ca = "/etc/pki/ca-trust/extracted/pem/tls-ca-bundle.pem"
//!
//! [generator.tls_profile]
//! min_tls_version = "VersionTLS12"
//! ciphers = ["ECDHE-RSA-AES128-GCM-SHA256"]
//! ```

use crate::compiler::Options;
use crate::error::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Logging configuration
    pub log: LogConfig,

    /// Options copied into the generated configuration
    pub generator: Options,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive, e.g. `info` or `logfwd_gen=trace`
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl CompilerConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or contains invalid TOML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&contents)
    }
}

impl FromStr for CompilerConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(s)?)
    }
}
