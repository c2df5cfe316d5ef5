//! Solver - grid-based incompressible fluid on the CPU
//!
//! Stages run in a fixed order each frame:
//!   advection -> external force -> viscosity (optional) -> divergence
//!   -> poisson -> pressure -> colorize
//!
//! Each stage reads its inputs from named arena slots and reports the slot
//! that now holds its output; the pipeline threads the current velocity
//! slot from stage to stage.

mod advection;
mod colorize;
mod force;
mod projection;
mod viscosity;

pub use advection::advect;
pub use colorize::colorize;
pub use force::{apply_force, clamp_center, falloff, ForceInput};
pub use projection::{divergence, solve_pressure, subtract_gradient};
pub use viscosity::diffuse;

use crate::core::timer::timed;
use crate::domain::config::EngineConfig;
use crate::domain::palette::Palette;
use crate::spatial::buffers::{FieldArena, Slot};
use crate::spatial::grid::{GridSize, VectorField};

pub const STAGE_COUNT: usize = 7;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    Advection = 0,
    ExternalForce = 1,
    Viscosity = 2,
    Divergence = 3,
    Poisson = 4,
    Pressure = 5,
    Colorize = 6,
}

/// Where a stage left its result
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageOutput {
    Field(Slot),
    Pixels,
}

const PIPELINE: [Stage; 7] = [
    Stage::Advection,
    Stage::ExternalForce,
    Stage::Viscosity,
    Stage::Divergence,
    Stage::Poisson,
    Stage::Pressure,
    Stage::Colorize,
];

const PIPELINE_INVISCID: [Stage; 6] = [
    Stage::Advection,
    Stage::ExternalForce,
    Stage::Divergence,
    Stage::Poisson,
    Stage::Pressure,
    Stage::Colorize,
];

/// Stage order for one frame
pub fn pipeline(viscous: bool) -> &'static [Stage] {
    if viscous {
        &PIPELINE
    } else {
        &PIPELINE_INVISCID
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolverParams {
    pub mouse_force: f32,
    pub cursor_size: f32,
    pub viscous: bool,
    pub viscosity: f32,
    pub viscous_iterations: u32,
    pub poisson_iterations: u32,
    pub dt: f32,
    pub bfecc: bool,
    pub bounded: bool,
    pub resolution: f32,
}

impl SolverParams {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            mouse_force: config.mouse_force,
            cursor_size: config.cursor_size,
            viscous: config.viscous,
            viscosity: config.viscosity,
            viscous_iterations: config.viscous_iterations,
            poisson_iterations: config.poisson_iterations,
            dt: config.dt,
            bfecc: config.bfecc,
            bounded: config.bounded,
            resolution: config.resolution,
        }
    }
}

impl Default for SolverParams {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

/// Per-frame inputs shared by every stage
pub struct StageContext<'a> {
    pub params: &'a SolverParams,
    pub force: ForceInput,
    pub palette: &'a Palette,
}

#[inline]
fn apply_boundary(field: &mut VectorField, bounded: bool) {
    if bounded {
        field.zero_border();
    } else {
        field.extrapolate_border();
    }
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Stage::Advection => "advection",
            Stage::ExternalForce => "external_force",
            Stage::Viscosity => "viscosity",
            Stage::Divergence => "divergence",
            Stage::Poisson => "poisson",
            Stage::Pressure => "pressure",
            Stage::Colorize => "colorize",
        }
    }

    /// Run this stage; `velocity` is the slot holding the current velocity
    pub fn run(
        self,
        fields: &mut FieldArena,
        pixels: &mut [u8],
        ctx: &StageContext<'_>,
        velocity: Slot,
    ) -> StageOutput {
        let p = ctx.params;
        match self {
            Stage::Advection => {
                let (src, dst) = fields.velocity.split();
                advect(src, dst, p.dt, p.bfecc);
                fields.velocity.swap();
                apply_boundary(fields.velocity.front_mut(), p.bounded);
                StageOutput::Field(Slot::Velocity)
            }
            Stage::ExternalForce => {
                apply_force(fields.velocity.front_mut(), ctx.force, p.mouse_force, p.cursor_size);
                StageOutput::Field(Slot::Velocity)
            }
            Stage::Viscosity => {
                diffuse(
                    fields.velocity.front(),
                    &mut fields.viscous,
                    p.viscosity,
                    p.dt,
                    p.viscous_iterations,
                );
                StageOutput::Field(Slot::Viscous)
            }
            Stage::Divergence => {
                let src = match velocity {
                    Slot::Viscous => fields.viscous.front(),
                    _ => fields.velocity.front(),
                };
                divergence(src, &mut fields.divergence, p.dt);
                StageOutput::Field(Slot::Divergence)
            }
            Stage::Poisson => {
                solve_pressure(&fields.divergence, &mut fields.pressure, p.poisson_iterations);
                StageOutput::Field(Slot::Pressure)
            }
            Stage::Pressure => {
                match velocity {
                    Slot::Viscous => subtract_gradient(
                        fields.pressure.front(),
                        fields.viscous.front(),
                        fields.velocity.back_mut(),
                        p.dt,
                    ),
                    _ => {
                        let (src, dst) = fields.velocity.split();
                        subtract_gradient(fields.pressure.front(), src, dst, p.dt);
                    }
                }
                fields.velocity.swap();
                apply_boundary(fields.velocity.front_mut(), p.bounded);
                StageOutput::Field(Slot::Velocity)
            }
            Stage::Colorize => {
                colorize(fields.velocity.front(), ctx.palette, pixels);
                StageOutput::Pixels
            }
        }
    }
}

/// Owns every field plus the colorized output for one grid
pub struct FluidSolver {
    params: SolverParams,
    fields: FieldArena,
    palette: Palette,
    pixels: Vec<u8>,
    stage_ms: [f64; STAGE_COUNT],
    timing: bool,
}

impl FluidSolver {
    pub fn new(params: SolverParams, palette: Palette, size: GridSize) -> Self {
        Self {
            params,
            fields: FieldArena::new(size),
            palette,
            pixels: vec![0; size.cells() * 4],
            stage_ms: [0.0; STAGE_COUNT],
            timing: false,
        }
    }

    #[inline]
    pub fn size(&self) -> GridSize {
        self.fields.size()
    }

    #[inline]
    pub fn params(&self) -> &SolverParams {
        &self.params
    }

    /// Reallocate every field and the output; no-op when the size is unchanged
    pub fn resize(&mut self, size: GridSize) -> bool {
        if size == self.fields.size() {
            return false;
        }
        self.fields.resize(size);
        self.pixels = vec![0; size.cells() * 4];
        true
    }

    pub fn set_timing(&mut self, enabled: bool) {
        self.timing = enabled;
        if !enabled {
            self.stage_ms = [0.0; STAGE_COUNT];
        }
    }

    /// Last frame's duration per stage, indexed by `Stage as usize`
    pub fn stage_ms(&self) -> &[f64; STAGE_COUNT] {
        &self.stage_ms
    }

    /// Advance one fixed timestep and refresh `pixels()`
    pub fn step(&mut self, force: ForceInput) {
        self.stage_ms = [0.0; STAGE_COUNT];
        let ctx = StageContext { params: &self.params, force, palette: &self.palette };
        let mut velocity = Slot::Velocity;

        for &stage in pipeline(self.params.viscous) {
            let fields = &mut self.fields;
            let pixels = &mut self.pixels;
            let out = timed(self.timing, &mut self.stage_ms[stage as usize], || {
                stage.run(fields, pixels, &ctx, velocity)
            });
            if let StageOutput::Field(slot @ (Slot::Velocity | Slot::Viscous)) = out {
                velocity = slot;
            }
        }
    }

    pub fn velocity(&self) -> &VectorField {
        self.fields.velocity.front()
    }

    pub fn fields(&self) -> &FieldArena {
        &self.fields
    }

    /// Straight-alpha RGBA8, top-down rows, `size().cells() * 4` bytes
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn memory_bytes(&self) -> usize {
        self.fields.memory_bytes() + self.pixels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Vec2;

    fn solver(viscous: bool, bounded: bool) -> FluidSolver {
        let params = SolverParams { viscous, bounded, ..SolverParams::default() };
        let palette = Palette::from_hex(&["#5227FF", "#FF9FFC", "#B19EEF"]).unwrap();
        FluidSolver::new(params, palette, GridSize::new(48, 32))
    }

    fn push(s: &mut FluidSolver) {
        s.step(ForceInput { coords: Vec2::new(0.0, 0.0), diff: Vec2::new(0.05, 0.02) });
    }

    #[test]
    fn pipeline_order_is_fixed() {
        assert_eq!(pipeline(true).len(), 7);
        assert_eq!(pipeline(false).len(), 6);
        assert!(!pipeline(false).contains(&Stage::Viscosity));
        assert_eq!(pipeline(true)[0], Stage::Advection);
        assert_eq!(*pipeline(true).last().unwrap(), Stage::Colorize);
    }

    #[test]
    fn still_frame_stays_transparent() {
        let mut s = solver(false, false);
        s.step(ForceInput::default());
        assert!(s.pixels().chunks(4).all(|p| p[3] == 0));
        assert_eq!(s.velocity().max_magnitude(), 0.0);
    }

    #[test]
    fn pointer_motion_produces_visible_output() {
        for viscous in [false, true] {
            let mut s = solver(viscous, false);
            push(&mut s);
            assert!(s.velocity().max_magnitude() > 0.0);
            assert!(s.pixels().chunks(4).any(|p| p[3] > 0));
        }
    }

    #[test]
    fn bounded_walls_stay_still() {
        let mut s = solver(false, true);
        for _ in 0..5 {
            push(&mut s);
        }
        let size = s.size();
        for x in 0..size.width {
            assert_eq!(s.velocity().get(x, 0), Vec2::ZERO);
            assert_eq!(s.velocity().get(x, size.height - 1), Vec2::ZERO);
        }
    }

    #[test]
    fn resize_reallocates_output() {
        let mut s = solver(false, false);
        push(&mut s);
        assert!(s.resize(GridSize::new(10, 10)));
        assert_eq!(s.pixels().len(), 400);
        assert_eq!(s.velocity().max_magnitude(), 0.0);
        assert!(!s.resize(GridSize::new(10, 10)));
    }

    #[test]
    fn timing_records_every_stage() {
        let mut s = solver(true, false);
        s.set_timing(true);
        push(&mut s);
        assert!(s.stage_ms().iter().all(|ms| *ms >= 0.0));
    }
}
