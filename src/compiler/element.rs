//! Compiled graph nodes.

use crate::compiler::sinks::SinkConfig;
use serde::Serialize;
use std::collections::BTreeMap;

/// One stage of the compiled configuration graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    pub component_id: String,
    /// Upstream component IDs or raw source names, in emission order.
    pub inputs: Vec<String>,
    #[serde(flatten)]
    pub kind: ElementKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ElementKind {
    /// Fans the single upstream out to named branches (`<id>.<branch>`).
    Route { routes: BTreeMap<String, String> },
    /// Rewrites records with a VRL program.
    Remap { desc: String, vrl: String },
    Throttle(Throttle),
    Sink(SinkConfig),
}

/// Rate limit of `threshold` records per `window_secs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Throttle {
    pub threshold: u64,
    pub window_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_field: Option<String>,
}

impl Element {
    pub fn route<I>(component_id: impl Into<String>, inputs: I, routes: BTreeMap<String, String>) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self::new(component_id, inputs, ElementKind::Route { routes })
    }

    pub fn remap<I>(component_id: impl Into<String>, inputs: I, desc: impl Into<String>, vrl: impl Into<String>) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self::new(
            component_id,
            inputs,
            ElementKind::Remap {
                desc: desc.into(),
                vrl: vrl.into(),
            },
        )
    }

    /// Throttle over a one-second window.
    ///
    /// Callers must only pass enforceable thresholds; there is no throttle
    /// with a zero threshold.
    pub fn throttle<I>(component_id: impl Into<String>, inputs: I, threshold: u64, key_field: Option<String>) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        debug_assert!(threshold > 0, "throttle threshold must be positive");
        Self::new(
            component_id,
            inputs,
            ElementKind::Throttle(Throttle {
                threshold,
                window_secs: 1,
                key_field,
            }),
        )
    }

    pub fn sink<I>(component_id: impl Into<String>, inputs: I, config: SinkConfig) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self::new(component_id, inputs, ElementKind::Sink(config))
    }

    fn new<I>(component_id: impl Into<String>, inputs: I, kind: ElementKind) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            component_id: component_id.into(),
            inputs: inputs.into_iter().map(Into::into).collect(),
            kind,
        }
    }

    pub fn is_sink(&self) -> bool {
        matches!(self.kind, ElementKind::Sink(_))
    }

    pub fn is_throttle(&self) -> bool {
        matches!(self.kind, ElementKind::Throttle(_))
    }

    /// Branch names when this element is a route.
    pub fn branches(&self) -> Option<impl Iterator<Item = &str>> {
        match &self.kind {
            ElementKind::Route { routes } => Some(routes.keys().map(String::as_str)),
            _ => None,
        }
    }

    pub fn vrl(&self) -> Option<&str> {
        match &self.kind {
            ElementKind::Remap { vrl, .. } => Some(vrl),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn route_serializes_with_kind_tag() {
        let mut routes = BTreeMap::new();
        routes.insert("b".to_string(), "true".to_string());
        routes.insert("a".to_string(), "false".to_string());
        let el = Element::route("r", ["src"], routes);

        assert_eq!(
            serde_json::to_value(&el).unwrap(),
            json!({
                "component_id": "r",
                "inputs": ["src"],
                "kind": "route",
                "routes": {"a": "false", "b": "true"}
            })
        );
        assert_eq!(el.branches().unwrap().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn throttle_omits_missing_key() {
        let el = Element::throttle("t", ["in"], 10, None);
        assert!(el.is_throttle());
        assert_eq!(
            serde_json::to_value(&el).unwrap(),
            json!({"component_id": "t", "inputs": ["in"], "kind": "throttle", "threshold": 10, "window_secs": 1})
        );
    }
}
