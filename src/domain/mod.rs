//! Domain - what the engine is configured to draw
//!
//! - config      - serde-loaded engine settings
//! - palette     - color stops for the velocity colorize pass
//! - capability  - rendering tier decision from host signals

pub mod capability;
pub mod config;
pub mod palette;

pub use capability::{decide, HostSignals, Tier};
pub use config::{EngineConfig, TrailConfig};
pub use palette::{Palette, Rgb};
