use crate::core::{smoothstep, Vec2};

/// Eased transfer of pointer ownership from the autopilot to the user.
///
/// The target is kept in client coordinates until a frame with valid
/// container bounds normalizes it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Handoff {
    pub from: Vec2,
    pub target_client: Vec2,
    pub start_ms: f64,
    pub duration_ms: f64,
}

/// Where the pointer sits during a hand-off
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HandoffStep {
    Moving(Vec2),
    Done(Vec2),
}

impl Handoff {
    pub fn new(from: Vec2, target_client: Vec2, start_ms: f64, duration_ms: f64) -> Self {
        Self { from, target_client, start_ms, duration_ms }
    }

    /// Later real input during the hand-off moves the destination, not the clock
    pub fn retarget(&mut self, target_client: Vec2) {
        self.target_client = target_client;
    }

    /// Linear progress in [0, 1]
    pub fn progress(&self, now_ms: f64) -> f32 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        ((now_ms - self.start_ms) / self.duration_ms).clamp(0.0, 1.0) as f32
    }

    /// Position at `now_ms` given the normalized target
    pub fn step(&self, now_ms: f64, target: Vec2) -> HandoffStep {
        let t = self.progress(now_ms);
        if t >= 1.0 {
            HandoffStep::Done(target)
        } else {
            HandoffStep::Moving(self.from.lerp(target, smoothstep(t)))
        }
    }
}
