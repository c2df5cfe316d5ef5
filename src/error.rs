//! Error types
//!
//! Visual-engine errors never escape a frame: they are either reported at
//! construction time or turned into a tier degradation.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid config json: {0}")]
    Json(String),
    #[error("config field `{field}` must be finite")]
    NonFinite { field: &'static str },
    #[error("config field `{field}` out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
    #[error("fixed size needs both fixedWidthPx and fixedHeightPx")]
    PartialFixedSize,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PaletteError {
    #[error("unparseable color `{0}`")]
    BadColor(String),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("gpu context unavailable: {0}")]
    GpuUnavailable(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Palette(#[from] PaletteError),
    #[error("engine already disposed")]
    Disposed,
}
