//! Systems - the per-frame machinery driven by `EngineCore`
//!
//! - solver      - CPU fluid stages (Gpu tier)
//! - trail       - software gradient trail (Fallback2d tier)
//! - input       - pointer/touch arbitration, autopilot, hand-off
//! - scheduler   - frame pacing and scroll throttling
//! - typewriter  - animated heading text

pub mod input;
pub mod scheduler;
pub mod solver;
pub mod trail;
pub mod typewriter;
