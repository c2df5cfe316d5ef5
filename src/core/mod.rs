//! Core - small primitives shared by every layer
//!
//! - vec2   - 2D vector math for pointer and field sampling
//! - rng    - xorshift32 (deterministic, seedable)
//! - timer  - wall-clock timer for perf metrics

pub mod rng;
pub mod timer;
pub mod vec2;

pub use vec2::{smoothstep, Vec2};
