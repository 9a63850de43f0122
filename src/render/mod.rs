//! Serialization of compiled elements.
//!
//! - TOML: the collector's configuration file
//! - JSON: the element list as is, for inspection and diffing

mod document;

pub use document::to_toml;

use crate::compiler::Element;
use crate::error::RenderError;

/// Pretty-printed JSON array of elements, in compilation order.
pub fn to_json(elements: &[Element]) -> Result<String, RenderError> {
    Ok(serde_json::to_string_pretty(elements)?)
}
