//! Engine configuration
//!
//! Construction-time settings, immutable for an engine's lifetime.
//! Loaded from JSON (camelCase keys) or built from `Default`.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_COLORS: [&str; 3] = ["#5227FF", "#FF9FFC", "#B19EEF"];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Master switch; `false` always yields the disabled tier
    pub enabled: bool,

    // === Solver ===
    pub mouse_force: f32,
    /// Force footprint half-extent, in grid cells times two
    pub cursor_size: f32,
    #[serde(alias = "isViscous")]
    pub viscous: bool,
    pub viscosity: f32,
    pub viscous_iterations: u32,
    pub poisson_iterations: u32,
    /// Fixed timestep, never derived from measured frame time
    pub dt: f32,
    #[serde(alias = "BFECC")]
    pub bfecc: bool,
    /// Grid cells per viewport pixel, in (0, 1]
    pub resolution: f32,
    /// `true` = zero velocity at walls, `false` = open domain
    #[serde(alias = "isBounce")]
    pub bounded: bool,
    pub colors: Vec<String>,

    // === Autonomous driver ===
    pub auto_demo: bool,
    /// Normalized units per second
    pub auto_speed: f32,
    pub auto_intensity: f32,
    pub auto_resume_delay_ms: f64,
    pub auto_ramp_duration_ms: f64,
    pub takeover_duration_ms: f64,

    // === Surface ===
    pub fixed_width_px: Option<u32>,
    pub fixed_height_px: Option<u32>,
    pub max_pixel_ratio: f32,

    // === Scheduler ===
    pub scroll_throttle_fps: u32,
    pub scroll_idle_ms: f64,

    pub trail: TrailConfig,

    /// Seed for the autonomous driver's target picker
    pub seed: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mouse_force: 20.0,
            cursor_size: 100.0,
            viscous: false,
            viscosity: 30.0,
            viscous_iterations: 32,
            poisson_iterations: 32,
            dt: 0.014,
            bfecc: true,
            resolution: 0.5,
            bounded: false,
            colors: DEFAULT_COLORS.iter().map(|c| c.to_string()).collect(),
            auto_demo: true,
            auto_speed: 0.5,
            auto_intensity: 2.2,
            auto_resume_delay_ms: 1000.0,
            auto_ramp_duration_ms: 600.0,
            takeover_duration_ms: 250.0,
            fixed_width_px: None,
            fixed_height_px: None,
            max_pixel_ratio: 2.0,
            scroll_throttle_fps: 18,
            scroll_idle_ms: 100.0,
            trail: TrailConfig::default(),
            seed: 0x2545_F491,
        }
    }
}

/// Settings for the software (Canvas2D) tier
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrailConfig {
    /// Base gradient radius in CSS pixels
    pub cursor_size: f32,
    /// Edge softening in CSS pixels
    pub blur: f32,
    /// Fraction of alpha removed per tick
    pub fade: f32,
    pub intensity: f32,
    /// Surface pixels per device pixel
    pub resolution: f32,
    pub idle_fps: u32,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            cursor_size: 160.0,
            blur: 28.0,
            fade: 0.08,
            intensity: 1.0,
            resolution: 1.0,
            idle_fps: 24,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Json(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite: [(&'static str, f64); 14] = [
            ("mouseForce", self.mouse_force as f64),
            ("cursorSize", self.cursor_size as f64),
            ("viscosity", self.viscosity as f64),
            ("dt", self.dt as f64),
            ("resolution", self.resolution as f64),
            ("autoSpeed", self.auto_speed as f64),
            ("autoIntensity", self.auto_intensity as f64),
            ("autoResumeDelayMs", self.auto_resume_delay_ms),
            ("autoRampDurationMs", self.auto_ramp_duration_ms),
            ("takeoverDurationMs", self.takeover_duration_ms),
            ("maxPixelRatio", self.max_pixel_ratio as f64),
            ("scrollIdleMs", self.scroll_idle_ms),
            ("trail.fade", self.trail.fade as f64),
            ("trail.resolution", self.trail.resolution as f64),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field });
            }
        }

        if self.resolution <= 0.0 || self.resolution > 1.0 {
            return Err(ConfigError::OutOfRange { field: "resolution", value: self.resolution as f64 });
        }
        if self.dt <= 0.0 {
            return Err(ConfigError::OutOfRange { field: "dt", value: self.dt as f64 });
        }
        if self.max_pixel_ratio <= 0.0 {
            return Err(ConfigError::OutOfRange { field: "maxPixelRatio", value: self.max_pixel_ratio as f64 });
        }
        if !(0.0..=1.0).contains(&self.trail.fade) {
            return Err(ConfigError::OutOfRange { field: "trail.fade", value: self.trail.fade as f64 });
        }
        if self.trail.resolution <= 0.0 {
            return Err(ConfigError::OutOfRange { field: "trail.resolution", value: self.trail.resolution as f64 });
        }
        for (field, value) in [
            ("autoResumeDelayMs", self.auto_resume_delay_ms),
            ("autoRampDurationMs", self.auto_ramp_duration_ms),
            ("takeoverDurationMs", self.takeover_duration_ms),
            ("scrollIdleMs", self.scroll_idle_ms),
        ] {
            if value < 0.0 {
                return Err(ConfigError::OutOfRange { field, value });
            }
        }

        match (self.fixed_width_px, self.fixed_height_px) {
            (Some(_), None) | (None, Some(_)) => Err(ConfigError::PartialFixedSize),
            _ => Ok(()),
        }
    }

    /// Pinned surface size, when both dimensions were given
    pub fn fixed_size(&self) -> Option<(u32, u32)> {
        match (self.fixed_width_px, self.fixed_height_px) {
            (Some(w), Some(h)) => Some((w.max(1), h.max(1))),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_gives_defaults() {
        let cfg = EngineConfig::from_json("{}").unwrap();
        assert_eq!(cfg, EngineConfig::default());
        assert_eq!(cfg.poisson_iterations, 32);
        assert_eq!(cfg.trail.idle_fps, 24);
    }

    #[test]
    fn camel_case_and_aliases() {
        let cfg = EngineConfig::from_json(
            r#"{"mouseForce":30,"isViscous":true,"isBounce":true,"BFECC":false,"trail":{"fade":0.06}}"#,
        )
        .unwrap();
        assert_eq!(cfg.mouse_force, 30.0);
        assert!(cfg.viscous);
        assert!(cfg.bounded);
        assert!(!cfg.bfecc);
        assert_eq!(cfg.trail.fade, 0.06);
        assert_eq!(cfg.trail.blur, 28.0);
    }

    #[test]
    fn rejects_bad_resolution() {
        let err = EngineConfig::from_json(r#"{"resolution":0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { field: "resolution", .. }));
    }

    #[test]
    fn rejects_half_fixed_size() {
        let err = EngineConfig::from_json(r#"{"fixedWidthPx":800}"#).unwrap_err();
        assert_eq!(err, ConfigError::PartialFixedSize);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(EngineConfig::from_json("{"), Err(ConfigError::Json(_))));
    }
}
