//! Pipeline compiler: validated forwarder -> ordered element graph.
//!
//! Stages, each appending to one list:
//! 1) classify raw sources into canonical log types
//! 2) user application routes + source throttles
//! 3) receiver tagging
//! 4) one remap per pipeline
//! 5) outputs (sink throttles, family builders) + metrics
//!
//! Every element reads only from raw sources or elements emitted before it.
//! Compilation is pure and never fails; entries that cannot be compiled are
//! dropped with a debug log.

pub mod element;
pub mod expr;
pub mod graph;
pub mod ids;
pub mod inputs;
pub mod options;
pub mod outputs;
pub mod pipelines;
pub mod routing;
pub mod selector;
pub mod sinks;

pub use element::{Element, ElementKind, Throttle};
pub use options::{Options, TlsProfile};

use crate::spec::{Forwarder, Secrets};
use tracing::debug;

pub fn compile(forwarder: &Forwarder, secrets: &Secrets, options: &Options) -> Vec<Element> {
    let types = inputs::gather_log_types(forwarder);
    let routes = routing::route_map(forwarder);

    let mut elements = inputs::classify(&types);
    elements.extend(routing::user_routes(forwarder, &routes));
    elements.extend(inputs::receivers(forwarder));
    elements.extend(pipelines::stage(forwarder, &routes));
    elements.extend(outputs::dispatch(forwarder, secrets, options));

    debug!(
        inputs = forwarder.inputs.len(),
        outputs = forwarder.outputs.len(),
        pipelines = forwarder.pipelines.len(),
        elements = elements.len(),
        "compiled forwarder"
    );
    elements
}
