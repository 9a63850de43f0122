//! Forwarder spec (forwarder.json): inputs, outputs, and the pipelines
//! connecting them.
//!
//! JSON shape:
//! {
//!   "inputs":    [ { "name": "my-app", "application": { ... } } ],
//!   "outputs":   [ { "name": "es", "type": "elasticsearch", "url": "..." } ],
//!   "pipelines": [ { "name": "app-to-es", "inputRefs": ["my-app"], "outputRefs": ["es"] } ]
//! }
//!
//! We validate names, turn optional-field blocks into sum types, and keep
//! declaration order. References between entities are not checked here; the
//! compiler skips the ones that do not resolve.

use crate::compiler::ids;
use crate::error::{Result, SpecError};
use crate::spec::input::{Input, RESERVED_INPUT_NAMES, RawInput};
use crate::spec::output::{Output, RawOutput};
use crate::spec::pipeline::{PIPELINE_NAME_PREFIX, Pipeline, RawPipeline};
use regex::Regex;
use serde::Deserialize;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]*$").expect("name pattern is valid")
});

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ForwarderSpec {
    pub inputs: Vec<RawInput>,
    pub outputs: Vec<RawOutput>,
    pub pipelines: Vec<RawPipeline>,
}

/// Validated forwarder, ready to compile.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forwarder {
    pub inputs: Vec<Input>,
    pub outputs: Vec<Output>,
    pub pipelines: Vec<Pipeline>,
}

impl ForwarderSpec {
    /// Validate every entity and build a [`Forwarder`]:
    /// - names are non-empty, component-ID safe and unique per kind
    /// - inputs do not shadow the canonical log types or generated IDs
    /// - each input sets exactly one selector block
    /// - pipeline names do not collide with generated components
    /// - no two entities generate the same component ID or source name
    pub fn validate_and_build(&self) -> Result<Forwarder> {
        let mut seen = BTreeSet::new();
        let mut inputs = Vec::with_capacity(self.inputs.len());
        for raw in &self.inputs {
            check_name("input", &raw.name, &mut seen)?;
            if RESERVED_INPUT_NAMES.contains(&raw.name.as_str()) || ids::has_generated_prefix(&raw.name) {
                return Err(SpecError::ReservedInputName(raw.name.clone()));
            }
            inputs.push(raw.validate()?);
        }

        let mut seen = BTreeSet::new();
        let mut outputs = Vec::with_capacity(self.outputs.len());
        for raw in &self.outputs {
            check_name("output", &raw.name, &mut seen)?;
            outputs.push(raw.validate());
        }

        // explicit names first, so positional names never take one of them
        let mut seen = BTreeSet::new();
        for name in self.pipelines.iter().filter_map(RawPipeline::explicit_name) {
            check_name("pipeline", name, &mut seen)?;
        }
        let mut pipelines = Vec::with_capacity(self.pipelines.len());
        for (index, raw) in self.pipelines.iter().enumerate() {
            let name = match raw.explicit_name() {
                Some(name) => name.to_string(),
                None => positional_name(index, &mut seen),
            };
            if ids::is_reserved(&name) {
                return Err(SpecError::ReservedPipelineName(name));
            }
            pipelines.push(raw.validate(name));
        }

        check_generated_ids(&inputs, &outputs, &pipelines)?;

        Ok(Forwarder {
            inputs,
            outputs,
            pipelines,
        })
    }
}

/// `pipeline_<index>`, or the next free index when a pipeline is already called that.
fn positional_name(index: usize, seen: &mut BTreeSet<String>) -> String {
    (index..)
        .map(|i| format!("{}{}", PIPELINE_NAME_PREFIX, i))
        .find(|name| seen.insert(name.clone()))
        .unwrap_or_default()
}

/// Every ID or source name an entity brings into the graph must be its own.
fn check_generated_ids(inputs: &[Input], outputs: &[Output], pipelines: &[Pipeline]) -> Result<()> {
    let mut owners: BTreeMap<String, String> = ids::fixed_ids()
        .map(|id| (id.to_string(), "a collector component".to_string()))
        .collect();

    let claims = inputs
        .iter()
        .map(|i| (format!("input '{}'", i.name), ids::input_ids(i)))
        .chain(outputs.iter().map(|o| (format!("output '{}'", o.name), ids::output_ids(o))))
        .chain(pipelines.iter().map(|p| (format!("pipeline '{}'", p.name), vec![p.name.clone()])));

    for (owner, generated) in claims {
        for id in generated {
            match owners.entry(id) {
                Entry::Vacant(slot) => {
                    slot.insert(owner.clone());
                }
                Entry::Occupied(slot) => {
                    return Err(SpecError::ComponentCollision {
                        id: slot.key().clone(),
                        first: slot.get().clone(),
                        second: owner,
                    });
                }
            }
        }
    }
    Ok(())
}

fn check_name(kind: &'static str, name: &str, seen: &mut BTreeSet<String>) -> Result<()> {
    if !NAME_RE.is_match(name) {
        return Err(SpecError::InvalidName {
            kind,
            name: name.to_string(),
        });
    }
    if !seen.insert(name.to_string()) {
        return Err(SpecError::DuplicateName {
            kind,
            name: name.to_string(),
        });
    }
    Ok(())
}

impl Forwarder {
    /// Declared inputs keyed by name.
    pub fn input_map(&self) -> BTreeMap<&str, &Input> {
        self.inputs.iter().map(|i| (i.name.as_str(), i)).collect()
    }
}
