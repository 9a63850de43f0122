//! Error types
//!
//! The compiler itself never fails: malformed entries are dropped while
//! compiling. Errors only come from loading and validating a specification,
//! verifying a compiled graph, reading configuration, and rendering.

use std::io;
use thiserror::Error;

/// Result type for specification loading and validation
pub type Result<T> = std::result::Result<T, SpecError>;

/// Errors raised while validating a forwarder specification
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpecError {
    /// A name is empty or contains characters not allowed in component IDs
    #[error("{kind} name {name:?} is invalid: must match [A-Za-z0-9][A-Za-z0-9_-]*")]
    InvalidName {
        /// Entity kind ("input", "output", "pipeline")
        kind: &'static str,
        /// Offending name
        name: String,
    },

    /// Two entities of the same kind share a name
    #[error("duplicate {kind} name '{name}'")]
    DuplicateName {
        /// Entity kind
        kind: &'static str,
        /// Duplicated name
        name: String,
    },

    /// An input uses one of the canonical log type names
    #[error("input name '{0}' is reserved")]
    ReservedInputName(String),

    /// A pipeline name collides with a component the compiler generates
    #[error("pipeline name '{0}' collides with a generated component")]
    ReservedPipelineName(String),

    /// An input does not populate exactly one selector block
    #[error("input '{name}' must set exactly one of application, infrastructure, audit, receiver (found {found})")]
    SelectorCount {
        /// Input name
        name: String,
        /// Number of populated blocks
        found: usize,
    },

    /// An input sets both a container and a group limit
    #[error("input '{0}' sets both containerLimit and groupLimit")]
    ConflictingLimits(String),

    /// Two entities would emit the same component ID or source name
    #[error("component id '{id}' of {second} collides with {first}")]
    ComponentCollision {
        /// Contested ID
        id: String,
        /// Entity that claimed the ID first
        first: String,
        /// Entity that claimed it again
        second: String,
    },

    /// A receiver's `type` has no matching settings block
    #[error("receiver input '{name}' of type '{receiver_type}' is missing its '{receiver_type}' block")]
    ReceiverMismatch {
        /// Input name
        name: String,
        /// Declared receiver type
        receiver_type: String,
    },

    /// A receiver type that the collector cannot listen for
    #[error("receiver input '{name}' has unsupported type '{receiver_type}'")]
    UnknownReceiver {
        /// Input name
        name: String,
        /// Declared receiver type
        receiver_type: String,
    },
}

/// Errors found while verifying a compiled element graph
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    /// Two elements claim the same component ID
    #[error("component id '{0}' is emitted more than once")]
    DuplicateComponent(String),

    /// A component ID equals the name of a raw source
    #[error("component id '{0}' shadows a raw source")]
    ShadowedSource(String),

    /// An element reads from something that is neither a raw source nor a component
    #[error("component '{component}' reads from unknown input '{input}'")]
    DanglingInput {
        /// Reading component
        component: String,
        /// Unresolved input
        input: String,
    },

    /// The element graph contains a cycle
    #[error("cycle detected: {}", .0.join(" -> "))]
    Cycle(Vec<String>),
}

/// Errors raised while loading the CLI configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file
    #[error("failed to read config file '{path}': {source}")]
    IoError {
        /// Path to the file
        path: String,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Errors raised while serializing compiled elements
#[derive(Debug, Error)]
pub enum RenderError {
    /// An element payload could not be turned into a TOML value
    #[error("cannot render component '{component}': {source}")]
    Value {
        /// Component being rendered
        component: String,
        /// Underlying serializer error
        #[source]
        source: toml::ser::Error,
    },

    /// Two elements of the same table share an ID
    #[error("component id '{0}' is rendered more than once")]
    DuplicateComponent(String),

    /// The assembled document could not be written as TOML
    #[error("cannot write TOML document: {0}")]
    Toml(#[from] toml::ser::Error),

    /// JSON serialization failed
    #[error("cannot write JSON document: {0}")]
    Json(#[from] serde_json::Error),
}
