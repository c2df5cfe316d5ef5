//! Input - pointer/touch normalization and ownership arbitration
//!
//! Host handlers only enqueue `InputEvent`s. Once per frame `tick` drains
//! the queue, advances the autopilot and any hand-off, normalizes pending
//! coordinates against the container bounds, and produces the frame's
//! `ForceInput`.

mod autopilot;
mod handoff;

pub use autopilot::Autopilot;
pub use handoff::{Handoff, HandoffStep};

use crate::core::Vec2;
use crate::domain::config::EngineConfig;
use crate::systems::solver::ForceInput;

/// Container bounds in client pixels
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self { left, top, width, height }
    }

    /// Bounds that can normalize a coordinate
    #[inline]
    pub fn is_usable(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Inclusive hit test in client pixels
    #[inline]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left && x <= self.left + self.width && y >= self.top && y <= self.top + self.height
    }

    /// Client pixels -> NDC (`[-1, 1]`, y up)
    #[inline]
    pub fn normalize(&self, client: Vec2) -> Vec2 {
        let nx = (client.x - self.left) / self.width;
        let ny = (client.y - self.top) / self.height;
        Vec2::new(nx * 2.0 - 1.0, -(ny * 2.0 - 1.0))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    PointerMove { x: f32, y: f32, at_ms: f64 },
    TouchStart { x: f32, y: f32, touches: u32, at_ms: f64 },
    TouchMove { x: f32, y: f32, touches: u32, at_ms: f64 },
    TouchEnd { at_ms: f64 },
    HoverEnter { at_ms: f64 },
    HoverLeave { at_ms: f64 },
}

impl InputEvent {
    /// Client position of a real single-pointer interaction
    pub fn interaction_point(&self) -> Option<(Vec2, f64)> {
        match *self {
            InputEvent::PointerMove { x, y, at_ms } => Some((Vec2::new(x, y), at_ms)),
            InputEvent::TouchStart { x, y, touches: 1, at_ms }
            | InputEvent::TouchMove { x, y, touches: 1, at_ms } => Some((Vec2::new(x, y), at_ms)),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Owner {
    Idle,
    User,
    Autopilot,
}

/// The one piece of state shared with the renderers (read-only for them)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerState {
    pub coords: Vec2,
    pub coords_old: Vec2,
    pub diff: Vec2,
    pub owner: Owner,
    pub hovering: bool,
    pub handoff: Option<Handoff>,
}

impl Default for PointerState {
    fn default() -> Self {
        Self {
            coords: Vec2::ZERO,
            coords_old: Vec2::ZERO,
            diff: Vec2::ZERO,
            owner: Owner::Idle,
            hovering: false,
            handoff: None,
        }
    }
}

pub struct InputController {
    queue: Vec<InputEvent>,
    /// Latest real client position awaiting usable bounds
    pending: Option<Vec2>,
    state: PointerState,
    autopilot: Autopilot,
    last_interaction_ms: Option<f64>,
    auto_intensity: f32,
    takeover_ms: f64,
}

impl InputController {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            queue: Vec::with_capacity(16),
            pending: None,
            state: PointerState::default(),
            autopilot: Autopilot::new(config),
            last_interaction_ms: None,
            auto_intensity: config.auto_intensity,
            takeover_ms: config.takeover_duration_ms,
        }
    }

    pub fn push(&mut self, event: InputEvent) {
        self.queue.push(event);
    }

    #[inline]
    pub fn state(&self) -> &PointerState {
        &self.state
    }

    #[inline]
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn last_interaction_ms(&self) -> Option<f64> {
        self.last_interaction_ms
    }

    fn apply(&mut self, event: InputEvent) {
        if let Some((client, at_ms)) = event.interaction_point() {
            if !client.is_finite() {
                return;
            }
            let driven_by_autopilot = self.state.owner == Owner::Autopilot;
            self.last_interaction_ms = Some(at_ms);
            self.autopilot.stop();

            if let Some(handoff) = self.state.handoff.as_mut() {
                handoff.retarget(client);
            } else if driven_by_autopilot {
                self.state.handoff = Some(Handoff::new(self.state.coords, client, at_ms, self.takeover_ms));
                self.pending = None;
            } else {
                self.pending = Some(client);
            }
            self.state.owner = Owner::User;
            return;
        }

        match event {
            InputEvent::HoverEnter { .. } => self.state.hovering = true,
            InputEvent::HoverLeave { .. } => {
                self.state.hovering = false;
                if self.state.owner == Owner::User && self.state.handoff.is_none() {
                    self.state.owner = Owner::Idle;
                }
            }
            InputEvent::TouchEnd { .. } => self.state.hovering = false,
            // multi-touch gestures belong to the page
            _ => {}
        }
    }

    /// Process one frame of input and return the force for the solver
    pub fn tick(&mut self, now_ms: f64, bounds: Rect) -> ForceInput {
        let events = std::mem::take(&mut self.queue);
        for event in events.iter().copied() {
            self.apply(event);
        }
        self.queue = events;
        self.queue.clear();

        let last = *self.last_interaction_ms.get_or_insert(now_ms);
        match self.autopilot.update(now_ms, last, self.state.hovering, self.state.coords) {
            Some(p) if self.state.handoff.is_none() => {
                self.state.coords = p;
                self.state.owner = Owner::Autopilot;
            }
            _ => {
                if self.state.owner == Owner::Autopilot {
                    self.state.owner = Owner::Idle;
                }
            }
        }

        if bounds.is_usable() {
            if let Some(client) = self.pending.take() {
                self.state.coords = bounds.normalize(client);
            }
        }

        let mut snapped = false;
        if let Some(handoff) = self.state.handoff {
            if bounds.is_usable() {
                match handoff.step(now_ms, bounds.normalize(handoff.target_client)) {
                    HandoffStep::Moving(p) => self.state.coords = p,
                    HandoffStep::Done(p) => {
                        self.state.coords = p;
                        self.state.coords_old = p;
                        self.state.diff = Vec2::ZERO;
                        self.state.handoff = None;
                        snapped = true;
                    }
                }
            }
        }

        if !snapped {
            let first_sample = self.state.coords_old.is_origin();
            self.state.diff = self.state.coords - self.state.coords_old;
            self.state.coords_old = self.state.coords;
            if first_sample {
                self.state.diff = Vec2::ZERO;
            }
            if self.state.owner == Owner::Autopilot && self.state.handoff.is_none() {
                self.state.diff = self.state.diff * self.auto_intensity;
            }
        }

        ForceInput { coords: self.state.coords, diff: self.state.diff }
    }
}
