use wasm_bindgen::prelude::*;

use crate::domain::Tier;
use crate::systems::input::{InputEvent, Rect};
use crate::systems::typewriter::{Typewriter, TypewriterEvent};

use super::perf_stats::PerfStats;
use super::{EngineCore, FrameOutcome};

/// Browser-facing engine handle. JS owns the canvas and the frame loop
/// (or uses `platform::mount`), reading frames straight out of wasm memory.
#[wasm_bindgen]
pub struct Engine {
    core: EngineCore,
}

impl Engine {
    pub fn core(&self) -> &EngineCore {
        &self.core
    }
}

#[wasm_bindgen]
impl Engine {
    /// `signals_json` may be empty when the host reports nothing
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str, signals_json: &str) -> Result<Engine, JsValue> {
        let core = EngineCore::from_json(config_json, signals_json)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Engine { core })
    }

    #[wasm_bindgen(getter)]
    pub fn tier(&self) -> Tier {
        self.core.tier()
    }

    /// `callback(reason: string)` runs once if the engine falls back to 2D
    pub fn set_degrade_callback(&mut self, callback: js_sys::Function) {
        self.core.set_degrade_handler(Box::new(move |error| {
            callback
                .call1(&JsValue::NULL, &JsValue::from_str(&error.to_string()))
                .map(|_| ())
                .map_err(|e| format!("{e:?}"))
        }));
    }

    pub fn start(&mut self) {
        self.core.start();
    }

    pub fn pause(&mut self) {
        self.core.pause();
    }

    pub fn set_throttle(&mut self, fps: u32) {
        self.core.set_throttle(fps);
    }

    pub fn notify_wheel(&mut self, now_ms: f64) {
        self.core.notify_wheel(now_ms);
    }

    pub fn set_visibility(&mut self, visible: bool) {
        self.core.set_visibility(visible);
    }

    pub fn resize(&mut self, css_width: f32, css_height: f32, dpr: f32) -> bool {
        self.core.resize(css_width, css_height, dpr)
    }

    // === Input ===

    pub fn pointer_move(&mut self, x: f32, y: f32, at_ms: f64) {
        self.core.push_event(InputEvent::PointerMove { x, y, at_ms });
    }

    pub fn touch_start(&mut self, x: f32, y: f32, touches: u32, at_ms: f64) {
        self.core.push_event(InputEvent::TouchStart { x, y, touches, at_ms });
    }

    pub fn touch_move(&mut self, x: f32, y: f32, touches: u32, at_ms: f64) {
        self.core.push_event(InputEvent::TouchMove { x, y, touches, at_ms });
    }

    pub fn touch_end(&mut self, at_ms: f64) {
        self.core.push_event(InputEvent::TouchEnd { at_ms });
    }

    pub fn hover_enter(&mut self, at_ms: f64) {
        self.core.push_event(InputEvent::HoverEnter { at_ms });
    }

    pub fn hover_leave(&mut self, at_ms: f64) {
        self.core.push_event(InputEvent::HoverLeave { at_ms });
    }

    // === Frame ===

    /// One animation-frame callback; bounds are the container's client rect
    pub fn frame(&mut self, now_ms: f64, left: f32, top: f32, width: f32, height: f32) -> FrameOutcome {
        self.core.frame(now_ms, Rect::new(left, top, width, height))
    }

    pub fn degrade(&mut self, reason: &str) -> bool {
        self.core.degrade(reason)
    }

    pub fn dispose(&mut self) {
        self.core.dispose();
    }

    #[wasm_bindgen(getter)]
    pub fn disposed(&self) -> bool {
        self.core.is_disposed()
    }

    // === Zero-copy frame access ===

    pub fn pixels_ptr(&self) -> *const u8 {
        self.core.pixels().as_ptr()
    }

    pub fn pixels_len(&self) -> usize {
        self.core.pixels().len()
    }

    #[wasm_bindgen(getter)]
    pub fn surface_width(&self) -> u32 {
        self.core.surface_size().0
    }

    #[wasm_bindgen(getter)]
    pub fn surface_height(&self) -> u32 {
        self.core.surface_size().1
    }

    #[wasm_bindgen(getter)]
    pub fn frame_count(&self) -> u32 {
        self.core.frame_count().min(u32::MAX as u64) as u32
    }

    // === Perf ===

    pub fn enable_perf_metrics(&mut self, enabled: bool) {
        self.core.enable_perf_metrics(enabled);
    }

    pub fn get_perf_stats(&self) -> PerfStats {
        self.core.get_perf_stats()
    }
}

/// Typewriter heading driven from the same animation-frame clock
#[wasm_bindgen(js_name = Typewriter)]
pub struct TypewriterHandle {
    inner: Typewriter,
}

#[wasm_bindgen(js_class = Typewriter)]
impl TypewriterHandle {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<TypewriterHandle, JsValue> {
        let inner = Typewriter::from_json(config_json).map_err(|e| JsValue::from_str(&e))?;
        Ok(TypewriterHandle { inner })
    }

    /// Returns whether the text changed
    pub fn tick(&mut self, now_ms: f64) -> bool {
        self.inner.tick(now_ms)
    }

    #[wasm_bindgen(getter)]
    pub fn text(&self) -> String {
        self.inner.text()
    }

    #[wasm_bindgen(getter)]
    pub fn reserve_width(&self) -> u32 {
        self.inner.reserve_width() as u32
    }

    #[wasm_bindgen(getter)]
    pub fn color(&self) -> String {
        self.inner.current_color().to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn cursor_hidden(&self) -> bool {
        self.inner.cursor_hidden()
    }

    /// Indices of phrases that finished typing since the last call
    pub fn take_completed(&mut self) -> Vec<u32> {
        self.inner
            .drain_events()
            .into_iter()
            .map(|event| match event {
                TypewriterEvent::SentenceComplete { index, .. } => index as u32,
            })
            .collect()
    }
}
