//! Log-forwarding pipeline compiler.
//!
//! A forwarder specification (inputs, outputs, pipelines) is validated into a
//! [`Forwarder`], compiled into an ordered list of collector components
//! ([`Element`]), checked with [`compiler::graph::verify`] and rendered as the
//! collector's TOML configuration.
//!
//! ```no_run
//! use logfwd_gen::{ForwarderSpec, Options, Secrets, compile, render};
//!
//! # fn main() -> anyhow::Result<()> {
//! let spec: ForwarderSpec = serde_json::from_str(&std::fs::read_to_string("forwarder.json")?)?;
//! let forwarder = spec.validate_and_build()?;
//! let elements = compile(&forwarder, &Secrets::new(), &Options::default());
//! println!("{}", render::to_toml(&elements)?);
//! # Ok(())
//! # }
//! ```

pub mod compiler;
pub mod config;
pub mod error;
pub mod render;
pub mod spec;

pub use compiler::{Element, ElementKind, Options, compile};
pub use error::{ConfigError, GraphError, RenderError, SpecError};
pub use spec::{Forwarder, ForwarderSpec, Secret, Secrets};
