//! Fluid Backdrop - pointer-reactive fluid background engine in WASM
//!
//! Picks a rendering tier from host capability, runs a grid fluid solver
//! (or a software gradient trail on weak hosts) and degrades instead of
//! failing.
//!
//! Architecture:
//! - core/        - shared primitives
//! - domain/      - config, palette, capability tiers
//! - spatial/     - grid sizing, fields, buffer arena
//! - systems/     - solver, trail, input, scheduler, typewriter
//! - simulation/  - engine orchestration + wasm facade
//! - platform/    - browser host (wasm32)
//! - contact/     - contact-form endpoint

pub mod core;
pub mod spatial;
pub mod domain;
pub mod error;
pub mod systems;
pub mod simulation;
pub mod contact;
#[cfg(target_arch = "wasm32")]
pub mod platform;

use wasm_bindgen::prelude::*;

#[cfg(all(feature = "parallel", target_arch = "wasm32"))]
pub use wasm_bindgen_rayon::init_thread_pool;

pub use domain::{decide, EngineConfig, HostSignals, Palette, Tier};
pub use error::{ConfigError, EngineError, PaletteError};
pub use simulation::{Engine, EngineCore, FrameOutcome, PerfStats, TypewriterHandle};
pub use systems::input::{InputEvent, Rect};

#[cfg(feature = "console_error_panic_hook")]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Initialize panic reporting and the console logger
#[wasm_bindgen]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    set_panic_hook();

    #[cfg(target_arch = "wasm32")]
    console_log::init_with_level(log::Level::Info).ok();

    log::info!("fluid-backdrop {} initialized", env!("CARGO_PKG_VERSION"));
}

/// Get engine version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
