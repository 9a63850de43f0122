//! TOML configuration for the collector.
//!
//! ```toml
//! [transforms.application]
//! type = "remap"
//! inputs = ["route_container_logs.app"]
//! source = '''
//! .log_type = "application"
//! '''
//!
//! [sinks.output_es]
//! type = "elasticsearch"
//! inputs = ["normalize_output_es"]
//! ...
//! ```
//!
//! Tables keep compilation order; within a table `type` and `inputs` come first.

use crate::compiler::{Element, ElementKind};
use crate::error::RenderError;
use serde::Serialize;
use toml::{Table, Value};

const TRANSFORMS: &str = "transforms";
const SINKS: &str = "sinks";

pub fn to_toml(elements: &[Element]) -> Result<String, RenderError> {
    let mut transforms = Table::new();
    let mut sinks = Table::new();

    for el in elements {
        let section = if el.is_sink() { &mut sinks } else { &mut transforms };
        if section.contains_key(&el.component_id) {
            return Err(RenderError::DuplicateComponent(el.component_id.clone()));
        }
        section.insert(el.component_id.clone(), Value::Table(component(el)?));
    }

    let mut doc = Table::new();
    if !transforms.is_empty() {
        doc.insert(TRANSFORMS.to_string(), Value::Table(transforms));
    }
    if !sinks.is_empty() {
        doc.insert(SINKS.to_string(), Value::Table(sinks));
    }
    Ok(toml::to_string(&doc)?)
}

fn component(el: &Element) -> Result<Table, RenderError> {
    let inputs = Value::Array(el.inputs.iter().cloned().map(Value::String).collect());
    let mut table = Table::new();

    match &el.kind {
        ElementKind::Route { routes } => {
            table.insert("type".to_string(), Value::String("route".to_string()));
            table.insert("inputs".to_string(), inputs);
            let route = routes
                .iter()
                .map(|(name, condition)| (name.clone(), Value::String(condition.clone())))
                .collect();
            table.insert("route".to_string(), Value::Table(route));
        }
        ElementKind::Remap { vrl, .. } => {
            table.insert("type".to_string(), Value::String("remap".to_string()));
            table.insert("inputs".to_string(), inputs);
            table.insert("source".to_string(), Value::String(vrl.clone()));
        }
        ElementKind::Throttle(throttle) => {
            table.insert("type".to_string(), Value::String("throttle".to_string()));
            table.insert("inputs".to_string(), inputs);
            table.extend(payload(el, throttle)?);
        }
        ElementKind::Sink(config) => {
            let mut payload = payload(el, config)?;
            if let Some(kind) = payload.remove("type") {
                table.insert("type".to_string(), kind);
            }
            table.insert("inputs".to_string(), inputs);
            table.extend(payload);
        }
    }
    Ok(table)
}

fn payload<T: Serialize>(el: &Element, value: &T) -> Result<Table, RenderError> {
    Table::try_from(value).map_err(|source| RenderError::Value {
        component: el.component_id.clone(),
        source,
    })
}
