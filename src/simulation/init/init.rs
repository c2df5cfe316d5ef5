use std::collections::VecDeque;

use crate::domain::{decide, EngineConfig, HostSignals, Palette, Tier};
use crate::error::{ConfigError, EngineError};
use crate::spatial::grid::GridSize;
use crate::systems::input::InputController;
use crate::systems::scheduler::{FrameScheduler, ScrollThrottle};
use crate::systems::solver::{FluidSolver, SolverParams};
use crate::systems::trail::TrailRenderer;

use super::perf_stats::PerfStats;
use super::{ActiveRenderer, EngineCore, Viewport, ViewportMode};

pub(super) fn create_engine_core(
    config: EngineConfig,
    signals: &HostSignals,
) -> Result<EngineCore, EngineError> {
    config.validate()?;
    let palette = Palette::from_hex(config.colors.as_slice())?;

    let effective = HostSignals { enabled: signals.enabled && config.enabled, ..signals.clone() };
    let tier = decide(&effective);
    log::info!(
        "tier {:?} (enabled={}, reduced_motion={}, gpu_context={}, cores={:?}, memory_gb={:?}, connection={:?})",
        tier,
        effective.enabled,
        effective.reduced_motion,
        effective.gpu_context,
        effective.logical_cores,
        effective.device_memory_gb,
        effective.effective_connection,
    );

    let viewport_mode = match config.fixed_size() {
        Some((width, height)) => ViewportMode::Fixed { width, height, captured: false },
        None => ViewportMode::Tracked,
    };

    Ok(EngineCore {
        renderer: build_renderer(tier, &config, &palette),
        input: InputController::new(&config),
        events: VecDeque::with_capacity(32),
        scheduler: FrameScheduler::new(),
        scroll: ScrollThrottle::new(config.scroll_throttle_fps, config.scroll_idle_ms),
        viewport: Viewport::EMPTY,
        viewport_mode,
        on_degrade: None,
        disposed: false,
        frame: 0,
        perf_enabled: false,
        perf_stats: PerfStats::default(),
        signals: effective,
        tier,
        palette,
        config,
    })
}

/// Renderer for `tier`, sized 1x1 until the first resize
pub(super) fn build_renderer(tier: Tier, config: &EngineConfig, palette: &Palette) -> ActiveRenderer {
    match tier {
        Tier::Gpu => ActiveRenderer::Fluid(FluidSolver::new(
            SolverParams::from_config(config),
            palette.clone(),
            GridSize::ONE,
        )),
        Tier::Fallback2d => ActiveRenderer::Trail(TrailRenderer::new(config.trail.clone(), palette)),
        Tier::Disabled => ActiveRenderer::Inert,
    }
}

/// Empty input means "nothing reported"
pub(super) fn parse_signals(json: &str) -> Result<HostSignals, EngineError> {
    if json.trim().is_empty() {
        return Ok(HostSignals::default());
    }
    serde_json::from_str(json).map_err(|e| EngineError::Config(ConfigError::Json(e.to_string())))
}
