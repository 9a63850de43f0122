//! Spec layer: JSON schemas + validated in-memory structures.
//!
//! This module is intentionally separate from compiling and rendering.
//! It owns:
//! - the forwarder document (inputs, outputs, pipelines)
//! - rate-limit policies
//! - credentials supplied by the caller

pub mod forwarder;
pub mod input;
pub mod limit;
pub mod output;
pub mod pipeline;
pub mod secret;

pub use forwarder::{Forwarder, ForwarderSpec};
pub use input::{
    Application, InclusionSpec, Input, LabelSelector, LabelSelectorRequirement, LogType, Receiver,
    Selector, SelectorOperator,
};
pub use limit::RateLimit;
pub use output::{Destination, Output, OutputTls};
pub use pipeline::Pipeline;
pub use secret::{LOG_COLLECTOR_TOKEN, Secret, Secrets};
