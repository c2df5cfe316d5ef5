//! Spatial - the solver's storage
//!
//! - grid     - grid sizing, SoA fields, bilinear sampling, row kernels
//! - buffers  - ping-pong pairs and the named slot arena

pub mod buffers;
pub mod grid;

pub use buffers::{FieldArena, PingPong, Slot};
pub use grid::{GridSize, ScalarField, VectorField};
