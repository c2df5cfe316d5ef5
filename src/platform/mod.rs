//! Platform - the browser host (wasm32 only)
//!
//! - probe    - host signals for the tier decision
//! - host     - canvas, passive listeners, animation-frame loop
//! - present  - WebGL textured quad and Canvas2D presenters

mod host;
mod present;
mod probe;

pub use host::{mount, Mount};
pub use probe::probe_signals;
