//! Rate-limit policies.

use serde::Deserialize;

/// Throttle bucket template used for per-container limits: one bucket per log file.
pub const PER_CONTAINER_KEY_FIELD: &str = "{{ file }}";

/// Limit block as it appears in the forwarder JSON (`containerLimit`,
/// `groupLimit`, output `limit`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitSpec {
    pub max_records_per_second: i64,
}

/// Validated policy: records per second, optionally bucketed by a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimit {
    pub threshold: i64,
    pub key_field: Option<String>,
}

impl RateLimit {
    /// Limit applied to each container separately.
    pub fn per_container(threshold: i64) -> Self {
        Self {
            threshold,
            key_field: Some(PER_CONTAINER_KEY_FIELD.to_string()),
        }
    }

    /// Limit shared by everything the input or output selects.
    pub fn group(threshold: i64) -> Self {
        Self {
            threshold,
            key_field: None,
        }
    }

    /// A throttle cannot be configured with a threshold below one.
    pub fn is_enforceable(&self) -> bool {
        self.threshold > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_container_limits_bucket_by_file() {
        let limit = RateLimit::per_container(100);
        assert_eq!(limit.key_field.as_deref(), Some("{{ file }}"));
        assert!(RateLimit::group(100).key_field.is_none());
    }

    #[test]
    fn non_positive_thresholds_are_not_enforceable() {
        assert!(RateLimit::group(1).is_enforceable());
        assert!(!RateLimit::group(0).is_enforceable());
        assert!(!RateLimit::per_container(-5).is_enforceable());
    }

    #[test]
    fn deserialize_limit_block() {
        let spec: LimitSpec = serde_json::from_str(r#"{"maxRecordsPerSecond": 42}"#).unwrap();
        assert_eq!(spec.max_records_per_second, 42);
    }
}
