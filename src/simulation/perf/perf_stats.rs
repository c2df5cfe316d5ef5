use wasm_bindgen::prelude::*;

#[wasm_bindgen]
#[derive(Clone, Debug)]
pub struct PerfStats {
    pub(super) frame_ms: f64,
    pub(super) input_ms: f64,
    pub(super) advection_ms: f64,
    pub(super) force_ms: f64,
    pub(super) viscosity_ms: f64,
    pub(super) divergence_ms: f64,
    pub(super) poisson_ms: f64,
    pub(super) pressure_ms: f64,
    pub(super) colorize_ms: f64,
    pub(super) trail_ms: f64,
    pub(super) frames_rendered: u32,
    pub(super) frames_skipped: u32,
    pub(super) grid_width: u32,
    pub(super) grid_height: u32,
    pub(super) cells: u32,
    pub(super) memory_bytes: u32,
    pub(super) queued_events: u32,
}

impl PerfStats {
    /// Clear per-frame timings; running counters survive
    pub(crate) fn reset_frame(&mut self) {
        self.frame_ms = 0.0;
        self.input_ms = 0.0;
        self.advection_ms = 0.0;
        self.force_ms = 0.0;
        self.viscosity_ms = 0.0;
        self.divergence_ms = 0.0;
        self.poisson_ms = 0.0;
        self.pressure_ms = 0.0;
        self.colorize_ms = 0.0;
        self.trail_ms = 0.0;
    }

    pub(crate) fn reset(&mut self) {
        *self = PerfStats::default();
    }
}

impl Default for PerfStats {
    fn default() -> Self {
        PerfStats {
            frame_ms: 0.0,
            input_ms: 0.0,
            advection_ms: 0.0,
            force_ms: 0.0,
            viscosity_ms: 0.0,
            divergence_ms: 0.0,
            poisson_ms: 0.0,
            pressure_ms: 0.0,
            colorize_ms: 0.0,
            trail_ms: 0.0,
            frames_rendered: 0,
            frames_skipped: 0,
            grid_width: 0,
            grid_height: 0,
            cells: 0,
            memory_bytes: 0,
            queued_events: 0,
        }
    }
}

#[wasm_bindgen]
impl PerfStats {
    #[wasm_bindgen(getter)]
    pub fn frame_ms(&self) -> f64 { self.frame_ms }
    #[wasm_bindgen(getter)]
    pub fn input_ms(&self) -> f64 { self.input_ms }
    #[wasm_bindgen(getter)]
    pub fn advection_ms(&self) -> f64 { self.advection_ms }
    #[wasm_bindgen(getter)]
    pub fn force_ms(&self) -> f64 { self.force_ms }
    #[wasm_bindgen(getter)]
    pub fn viscosity_ms(&self) -> f64 { self.viscosity_ms }
    #[wasm_bindgen(getter)]
    pub fn divergence_ms(&self) -> f64 { self.divergence_ms }
    #[wasm_bindgen(getter)]
    pub fn poisson_ms(&self) -> f64 { self.poisson_ms }
    #[wasm_bindgen(getter)]
    pub fn pressure_ms(&self) -> f64 { self.pressure_ms }
    #[wasm_bindgen(getter)]
    pub fn colorize_ms(&self) -> f64 { self.colorize_ms }
    #[wasm_bindgen(getter)]
    pub fn trail_ms(&self) -> f64 { self.trail_ms }
    #[wasm_bindgen(getter)]
    pub fn frames_rendered(&self) -> u32 { self.frames_rendered }
    #[wasm_bindgen(getter)]
    pub fn frames_skipped(&self) -> u32 { self.frames_skipped }
    #[wasm_bindgen(getter)]
    pub fn grid_width(&self) -> u32 { self.grid_width }
    #[wasm_bindgen(getter)]
    pub fn grid_height(&self) -> u32 { self.grid_height }
    #[wasm_bindgen(getter)]
    pub fn cells(&self) -> u32 { self.cells }
    #[wasm_bindgen(getter)]
    pub fn memory_bytes(&self) -> u32 { self.memory_bytes }
    #[wasm_bindgen(getter)]
    pub fn queued_events(&self) -> u32 { self.queued_events }
}
