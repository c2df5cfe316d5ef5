//! Engine - orchestration of one mounted background
//!
//! `EngineCore` owns the active renderer for its tier together with the
//! input controller and frame scheduler. It is pure Rust and is driven by
//! explicit timestamps; the browser host and the `Engine` facade only
//! forward events and animation-frame callbacks into it.
//!
//! Tier changes only ever go one way (Gpu -> Fallback2d), through `degrade`.

use std::collections::VecDeque;

use crate::domain::{EngineConfig, HostSignals, Palette, Tier};
use crate::error::EngineError;
use crate::systems::input::{InputController, InputEvent, Rect};
use crate::systems::scheduler::{FrameScheduler, ScrollThrottle};

#[path = "perf/perf_stats.rs"]
mod perf_stats;
#[path = "init/init.rs"]
mod init;
#[path = "init/settings.rs"]
mod settings;
#[path = "step/step.rs"]
mod step;
mod facade;
mod renderer;

pub use facade::{Engine, TypewriterHandle};
pub use perf_stats::PerfStats;
pub use renderer::{ActiveRenderer, Renderer, Viewport};

use wasm_bindgen::prelude::*;

/// Events beyond this are dropped oldest-first while no frame drains them
pub const MAX_QUEUED_EVENTS: usize = 256;

/// What a frame callback ended up doing
#[wasm_bindgen]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Paused, hidden, disposed or disabled
    Stopped = 0,
    /// Running, but the rate cap skipped this callback
    Throttled = 1,
    /// Zero-sized viewport
    NotDrawable = 2,
    Rendered = 3,
}

/// Called once when the engine falls back to the software tier.
/// An `Err` is logged and otherwise ignored.
pub type DegradeHandler = Box<dyn FnMut(&EngineError) -> Result<(), String>>;

#[derive(Clone, Copy, Debug, PartialEq)]
enum ViewportMode {
    /// Captured from config on the first resize, later resizes are ignored
    Fixed { width: u32, height: u32, captured: bool },
    Tracked,
}

pub struct EngineCore {
    config: EngineConfig,
    signals: HostSignals,
    tier: Tier,
    palette: Palette,
    renderer: ActiveRenderer,
    input: InputController,
    events: VecDeque<InputEvent>,
    scheduler: FrameScheduler,
    scroll: ScrollThrottle,
    viewport: Viewport,
    viewport_mode: ViewportMode,
    on_degrade: Option<DegradeHandler>,
    disposed: bool,
    frame: u64,
    perf_enabled: bool,
    perf_stats: PerfStats,
}

impl EngineCore {
    pub fn new(config: EngineConfig, signals: &HostSignals) -> Result<Self, EngineError> {
        init::create_engine_core(config, signals)
    }

    /// Parse both documents and build the engine
    pub fn from_json(config_json: &str, signals_json: &str) -> Result<Self, EngineError> {
        let config = EngineConfig::from_json(config_json)?;
        let signals = init::parse_signals(signals_json)?;
        Self::new(config, &signals)
    }

    #[inline]
    pub fn tier(&self) -> Tier {
        self.tier
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[inline]
    pub fn signals(&self) -> &HostSignals {
        &self.signals
    }

    #[inline]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    #[inline]
    pub fn renderer(&self) -> &ActiveRenderer {
        &self.renderer
    }

    #[inline]
    pub fn input(&self) -> &InputController {
        &self.input
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[inline]
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Current frame-rate cap, 0 = uncapped
    #[inline]
    pub fn target_fps(&self) -> u32 {
        self.scheduler.target_fps()
    }

    pub fn set_degrade_handler(&mut self, handler: DegradeHandler) {
        self.on_degrade = Some(handler);
    }

    pub fn start(&mut self) {
        settings::start(self);
    }

    pub fn pause(&mut self) {
        settings::pause(self);
    }

    pub fn set_throttle(&mut self, fps: u32) {
        settings::set_throttle(self, fps);
    }

    pub fn notify_wheel(&mut self, now_ms: f64) {
        settings::notify_wheel(self, now_ms);
    }

    pub fn set_visibility(&mut self, visible: bool) {
        settings::set_visibility(self, visible);
    }

    /// Container size in CSS pixels; returns whether surfaces were reallocated
    pub fn resize(&mut self, css_width: f32, css_height: f32, dpr: f32) -> bool {
        step::resize(self, css_width, css_height, dpr)
    }

    /// Queue an input event for the next rendered frame
    pub fn push_event(&mut self, event: InputEvent) {
        if self.disposed || self.renderer.is_inert() {
            return;
        }
        if self.events.len() >= MAX_QUEUED_EVENTS {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    #[inline]
    pub fn queued_events(&self) -> usize {
        self.events.len()
    }

    /// One display-refresh callback
    pub fn frame(&mut self, now_ms: f64, bounds: Rect) -> FrameOutcome {
        step::frame(self, now_ms, bounds)
    }

    /// Swap the fluid tier for the software trail; no-op on any other tier
    pub fn degrade(&mut self, reason: &str) -> bool {
        step::degrade(self, reason)
    }

    /// Release every surface and stop; later calls are no-ops
    pub fn dispose(&mut self) {
        step::dispose(self);
    }

    /// Latest frame as straight-alpha RGBA8 rows, top-down
    pub fn pixels(&self) -> &[u8] {
        self.renderer.pixels()
    }

    /// Size of `pixels()` in pixels
    pub fn surface_size(&self) -> (u32, u32) {
        self.renderer.surface_size()
    }

    pub fn enable_perf_metrics(&mut self, enabled: bool) {
        settings::enable_perf_metrics(self, enabled);
    }

    pub fn get_perf_stats(&self) -> PerfStats {
        settings::get_perf_stats(self)
    }
}

#[cfg(test)]
#[path = "tests/tests.rs"]
mod tests;
