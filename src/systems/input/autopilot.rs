use crate::core::rng::{next_signed, seed_state};
use crate::core::{smoothstep, Vec2};
use crate::domain::config::EngineConfig;

/// Targets stay this far inside the [-1, 1] square
const MARGIN: f32 = 0.2;
/// Distance at which the current target counts as reached
const ARRIVE_DIST: f32 = 0.01;
/// Gaps longer than this (tab switch, breakpoint) are treated as one frame
const MAX_DT_SEC: f32 = 0.2;
const FALLBACK_DT_SEC: f32 = 0.016;

/// Autonomous wander driver.
///
/// Arms once the user has been idle for `resume_delay_ms` and the pointer
/// is outside the container, then glides between random targets at a
/// constant speed, easing in over `ramp_ms`.
#[derive(Clone, Debug)]
pub struct Autopilot {
    enabled: bool,
    speed: f32,
    resume_delay_ms: f64,
    ramp_ms: f64,
    active: bool,
    current: Vec2,
    target: Vec2,
    last_ms: f64,
    activation_ms: f64,
    rng: u32,
}

impl Autopilot {
    pub fn new(config: &EngineConfig) -> Self {
        let mut pilot = Self {
            enabled: config.auto_demo,
            speed: config.auto_speed,
            resume_delay_ms: config.auto_resume_delay_ms,
            ramp_ms: config.auto_ramp_duration_ms,
            active: false,
            current: Vec2::ZERO,
            target: Vec2::ZERO,
            last_ms: 0.0,
            activation_ms: 0.0,
            rng: seed_state(config.seed),
        };
        pilot.pick_target();
        pilot
    }

    fn pick_target(&mut self) {
        let span = 1.0 - MARGIN;
        self.target = Vec2::new(next_signed(&mut self.rng) * span, next_signed(&mut self.rng) * span);
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[inline]
    pub fn target(&self) -> Vec2 {
        self.target
    }

    pub fn stop(&mut self) {
        self.active = false;
    }

    /// Advance the driver. Returns the synthetic pointer position while the
    /// driver owns the pointer, `None` otherwise.
    pub fn update(&mut self, now_ms: f64, last_interaction_ms: f64, hovering: bool, coords: Vec2) -> Option<Vec2> {
        if !self.enabled {
            return None;
        }
        if now_ms - last_interaction_ms < self.resume_delay_ms || hovering {
            self.stop();
            return None;
        }
        if !self.active {
            self.active = true;
            self.current = coords;
            self.last_ms = now_ms;
            self.activation_ms = now_ms;
        }

        let mut dt = ((now_ms - self.last_ms) / 1000.0) as f32;
        self.last_ms = now_ms;
        if dt > MAX_DT_SEC {
            dt = FALLBACK_DT_SEC;
        }

        let to_target = self.target - self.current;
        let dist = to_target.length();
        if dist < ARRIVE_DIST {
            self.pick_target();
            return Some(self.current);
        }

        let ramp = if self.ramp_ms > 0.0 {
            smoothstep(((now_ms - self.activation_ms) / self.ramp_ms).min(1.0) as f32)
        } else {
            1.0
        };
        let step = (self.speed * dt.max(0.0) * ramp).min(dist);
        self.current += to_target.normalize() * step;
        Some(self.current)
    }
}
