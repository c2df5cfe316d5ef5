use super::perf_stats::PerfStats;
use super::{ActiveRenderer, EngineCore};

pub(super) fn enable_perf_metrics(engine: &mut EngineCore, enabled: bool) {
    engine.perf_enabled = enabled;
    if let ActiveRenderer::Fluid(solver) = &mut engine.renderer {
        solver.set_timing(enabled);
    }
    if !enabled {
        engine.perf_stats.reset();
    }
}

pub(super) fn get_perf_stats(engine: &EngineCore) -> PerfStats {
    engine.perf_stats.clone()
}

pub(super) fn start(engine: &mut EngineCore) {
    if engine.disposed || engine.renderer.is_inert() {
        return;
    }
    engine.scheduler.start();
}

pub(super) fn pause(engine: &mut EngineCore) {
    engine.scheduler.pause();
}

pub(super) fn set_throttle(engine: &mut EngineCore, fps: u32) {
    engine.scheduler.set_throttle(fps);
}

pub(super) fn notify_wheel(engine: &mut EngineCore, now_ms: f64) {
    if let Some(fps) = engine.scroll.on_wheel(now_ms) {
        log::debug!("scroll burst, throttling to {fps} fps");
        engine.scheduler.set_throttle(fps);
    }
}

pub(super) fn set_visibility(engine: &mut EngineCore, visible: bool) {
    engine.scheduler.set_visibility(visible);
}
