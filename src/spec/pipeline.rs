//! Pipelines bind inputs to outputs.

use serde::Deserialize;
use std::collections::BTreeMap;

/// Name given to unnamed pipelines, followed by their position.
pub const PIPELINE_NAME_PREFIX: &str = "pipeline_";

/// Raw pipeline shape as it appears in the forwarder JSON.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawPipeline {
    /// Optional; unnamed pipelines are called `pipeline_<index>`.
    pub name: Option<String>,
    pub input_refs: Vec<String>,
    pub output_refs: Vec<String>,
    pub labels: BTreeMap<String, String>,
}

/// Validated pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pipeline {
    pub name: String,
    pub input_refs: Vec<String>,
    pub output_refs: Vec<String>,
    pub labels: BTreeMap<String, String>,
}

impl Pipeline {
    pub fn new<I, O>(name: impl Into<String>, inputs: I, outputs: O) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        O: IntoIterator,
        O::Item: Into<String>,
    {
        Self {
            name: name.into(),
            input_refs: inputs.into_iter().map(Into::into).collect(),
            output_refs: outputs.into_iter().map(Into::into).collect(),
            labels: BTreeMap::new(),
        }
    }
}

impl RawPipeline {
    /// The configured name, if any; empty names count as unset.
    pub fn explicit_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }

    /// Build the validated pipeline under `name`, resolved by the caller.
    pub fn validate(&self, name: String) -> Pipeline {
        Pipeline {
            name,
            input_refs: self.input_refs.clone(),
            output_refs: self.output_refs.clone(),
            labels: self.labels.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_names_are_unset() {
        let raw: RawPipeline =
            serde_json::from_str(r#"{"inputRefs": ["application"], "outputRefs": ["es"]}"#).unwrap();
        assert_eq!(raw.explicit_name(), None);
        let pipeline = raw.validate("pipeline_3".to_string());
        assert_eq!(pipeline.name, "pipeline_3");
        assert_eq!(pipeline.input_refs, vec!["application"]);

        let raw: RawPipeline = serde_json::from_str(r#"{"name": "", "outputRefs": ["es"]}"#).unwrap();
        assert_eq!(raw.explicit_name(), None);

        let raw: RawPipeline = serde_json::from_str(r#"{"name": "app-es"}"#).unwrap();
        assert_eq!(raw.explicit_name(), Some("app-es"));
    }
}
