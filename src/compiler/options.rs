//! Caller-supplied generator options.
//!
//! These arrive already resolved: the caller owns fetching the cluster TLS
//! profile and the trusted CA bundle, the compiler only copies them into
//! sink settings.

use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Options {
    /// TLS settings applied to every secure connection the collector opens.
    pub tls_profile: Option<TlsProfile>,
    /// Path of the CA bundle used when an output's secret carries none.
    pub trusted_ca: Option<String>,
    /// Listen on IPv6 wildcard addresses.
    pub ipv6: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TlsProfile {
    /// e.g. `VersionTLS12`
    pub min_tls_version: Option<String>,
    /// OpenSSL cipher names.
    pub ciphers: Vec<String>,
}

impl TlsProfile {
    /// Ciphers in the comma-separated form sinks expect.
    pub fn cipher_suites(&self) -> Option<String> {
        if self.ciphers.is_empty() {
            None
        } else {
            Some(self.ciphers.join(","))
        }
    }
}

impl Options {
    /// Address every listener binds to.
    pub fn listen_all(&self) -> &'static str {
        if self.ipv6 { "[::]" } else { "0.0.0.0" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listen_address_follows_ipv6() {
        assert_eq!(Options::default().listen_all(), "0.0.0.0");
        let options = Options {
            ipv6: true,
            ..Default::default()
        };
        assert_eq!(options.listen_all(), "[::]");
    }

    #[test]
    fn cipher_suites_join() {
        let profile = TlsProfile {
            min_tls_version: None,
            ciphers: vec!["TLS_AES_128_GCM_SHA256".to_string(), "ECDHE-RSA-AES128-GCM-SHA256".to_string()],
        };
        assert_eq!(
            profile.cipher_suites().as_deref(),
            Some("TLS_AES_128_GCM_SHA256,ECDHE-RSA-AES128-GCM-SHA256")
        );
        assert_eq!(TlsProfile::default().cipher_suites(), None);
    }
}
