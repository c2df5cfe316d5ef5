use crate::core::timer::{timed, PerfTimer};
use crate::domain::Tier;
use crate::error::EngineError;
use crate::systems::input::{InputController, InputEvent, Rect};
use crate::systems::solver::Stage;
use crate::systems::trail::TrailRenderer;

use super::init::build_renderer;
use super::{ActiveRenderer, EngineCore, FrameOutcome, Renderer, Viewport, ViewportMode};

pub(super) fn frame(engine: &mut EngineCore, now_ms: f64, bounds: Rect) -> FrameOutcome {
    if engine.disposed || engine.renderer.is_inert() {
        return FrameOutcome::Stopped;
    }
    if let Some(fps) = engine.scroll.poll(now_ms) {
        log::debug!("scroll idle, throttle back to {fps}");
        engine.scheduler.set_throttle(fps);
    }
    if !engine.scheduler.is_running() {
        return FrameOutcome::Stopped;
    }
    if !engine.scheduler.should_render(now_ms) {
        engine.perf_stats.frames_skipped += 1;
        return FrameOutcome::Throttled;
    }
    if !engine.viewport.is_drawable() {
        engine.perf_stats.frames_skipped += 1;
        return FrameOutcome::NotDrawable;
    }

    let perf_on = engine.perf_enabled;
    if perf_on {
        engine.perf_stats.reset_frame();
    }
    let frame_start = if perf_on { Some(PerfTimer::start()) } else { None };

    let rendered = match &mut engine.renderer {
        ActiveRenderer::Fluid(solver) => {
            for event in engine.events.drain(..) {
                engine.input.push(event);
            }
            let input = &mut engine.input;
            let force = timed(perf_on, &mut engine.perf_stats.input_ms, || input.tick(now_ms, bounds));
            solver.step(force);
            true
        }
        ActiveRenderer::Trail(trail) => {
            for event in engine.events.drain(..) {
                forward_to_trail(trail, event, bounds);
            }
            if trail.frame_due(now_ms) {
                timed(perf_on, &mut engine.perf_stats.trail_ms, || trail.render(now_ms));
                true
            } else {
                false
            }
        }
        ActiveRenderer::Inert => return FrameOutcome::Stopped,
    };

    if !rendered {
        engine.perf_stats.frames_skipped += 1;
        return FrameOutcome::Throttled;
    }
    engine.scheduler.mark_rendered(now_ms);
    engine.frame += 1;

    if let Some(t0) = frame_start {
        record_perf(engine, t0.elapsed_ms());
    }
    FrameOutcome::Rendered
}

/// The trail works in container-relative CSS pixels
fn forward_to_trail(trail: &mut TrailRenderer, event: InputEvent, bounds: Rect) {
    if let Some((client, _)) = event.interaction_point() {
        trail.pointer_move(client.x - bounds.left, client.y - bounds.top);
        return;
    }
    if let InputEvent::HoverLeave { .. } | InputEvent::TouchEnd { .. } = event {
        trail.pointer_leave();
    }
}

fn record_perf(engine: &mut EngineCore, frame_ms: f64) {
    let stats = &mut engine.perf_stats;
    stats.frame_ms = frame_ms;
    stats.frames_rendered += 1;
    stats.queued_events = engine.events.len() as u32;
    stats.memory_bytes = engine.renderer.memory_bytes().min(u32::MAX as usize) as u32;

    let (w, h) = engine.renderer.surface_size();
    stats.grid_width = w;
    stats.grid_height = h;
    stats.cells = w.saturating_mul(h);

    if let ActiveRenderer::Fluid(solver) = &engine.renderer {
        let ms = solver.stage_ms();
        stats.advection_ms = ms[Stage::Advection as usize];
        stats.force_ms = ms[Stage::ExternalForce as usize];
        stats.viscosity_ms = ms[Stage::Viscosity as usize];
        stats.divergence_ms = ms[Stage::Divergence as usize];
        stats.poisson_ms = ms[Stage::Poisson as usize];
        stats.pressure_ms = ms[Stage::Pressure as usize];
        stats.colorize_ms = ms[Stage::Colorize as usize];
    }
}

pub(super) fn resize(engine: &mut EngineCore, css_width: f32, css_height: f32, dpr: f32) -> bool {
    if engine.disposed {
        return false;
    }
    let dpr = if dpr.is_finite() && dpr > 0.0 {
        dpr.min(engine.config.max_pixel_ratio)
    } else {
        1.0
    };
    let (width, height) = match &mut engine.viewport_mode {
        ViewportMode::Fixed { captured: true, .. } => {
            log::debug!("fixed viewport, resize to {css_width}x{css_height} ignored");
            return false;
        }
        ViewportMode::Fixed { width, height, captured } => {
            *captured = true;
            (*width as f32, *height as f32)
        }
        ViewportMode::Tracked => (css_dimension(css_width), css_dimension(css_height)),
    };

    engine.viewport = Viewport { css_width: width, css_height: height, dpr };
    if !engine.viewport.is_drawable() {
        return false;
    }
    let changed = engine.renderer.resize(&engine.viewport);
    if changed {
        let (w, h) = engine.renderer.surface_size();
        log::info!("surface reallocated: {w}x{h} for {width}x{height} css px @ {dpr}");
    }
    changed
}

#[inline]
fn css_dimension(v: f32) -> f32 {
    if v.is_finite() && v > 0.0 {
        v.floor()
    } else {
        0.0
    }
}

pub(super) fn degrade(engine: &mut EngineCore, reason: &str) -> bool {
    if engine.disposed || engine.tier != Tier::Gpu {
        return false;
    }
    log::warn!("degrading to the software tier: {reason}");

    engine.tier = Tier::Fallback2d;
    let mut renderer = build_renderer(Tier::Fallback2d, &engine.config, &engine.palette);
    if engine.viewport.is_drawable() {
        renderer.resize(&engine.viewport);
    }
    engine.renderer = renderer;
    engine.input = InputController::new(&engine.config);
    engine.perf_stats.reset();

    let error = EngineError::GpuUnavailable(reason.to_string());
    if let Some(handler) = engine.on_degrade.as_mut() {
        if let Err(e) = handler(&error) {
            log::error!("degrade handler failed: {e}");
        }
    }
    true
}

pub(super) fn dispose(engine: &mut EngineCore) {
    if engine.disposed {
        return;
    }
    engine.disposed = true;
    engine.scheduler.pause();
    engine.renderer = ActiveRenderer::Inert;
    engine.events.clear();
    engine.on_degrade = None;
    log::info!("engine disposed after {} frames", engine.frame);
}
