use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::error::ConfigError;

fn calm_config() -> EngineConfig {
    EngineConfig { auto_demo: false, ..EngineConfig::default() }
}

fn gpu_engine(config: EngineConfig) -> EngineCore {
    let mut engine = EngineCore::new(config, &HostSignals::default()).unwrap();
    engine.resize(400.0, 300.0, 1.0);
    engine.start();
    engine
}

fn trail_engine() -> EngineCore {
    let signals = HostSignals { gpu_context: false, ..HostSignals::default() };
    let mut engine = EngineCore::new(calm_config(), &signals).unwrap();
    engine.resize(200.0, 100.0, 1.0);
    engine.start();
    engine
}

const BOUNDS: Rect = Rect { left: 0.0, top: 0.0, width: 400.0, height: 300.0 };

fn fluid(engine: &EngineCore) -> &crate::systems::solver::FluidSolver {
    match engine.renderer() {
        ActiveRenderer::Fluid(solver) => solver,
        _ => panic!("expected the fluid renderer"),
    }
}

#[test]
fn tier_selects_renderer() {
    let engine = EngineCore::new(calm_config(), &HostSignals::default()).unwrap();
    assert_eq!(engine.tier(), Tier::Gpu);
    assert!(matches!(engine.renderer(), ActiveRenderer::Fluid(_)));

    let no_gl = HostSignals { gpu_context: false, ..HostSignals::default() };
    let engine = EngineCore::new(calm_config(), &no_gl).unwrap();
    assert_eq!(engine.tier(), Tier::Fallback2d);
    assert!(matches!(engine.renderer(), ActiveRenderer::Trail(_)));

    let reduced = HostSignals { reduced_motion: true, ..HostSignals::default() };
    let engine = EngineCore::new(calm_config(), &reduced).unwrap();
    assert_eq!(engine.tier(), Tier::Disabled);
    assert!(engine.renderer().is_inert());

    let off = EngineConfig { enabled: false, ..calm_config() };
    let engine = EngineCore::new(off, &HostSignals::default()).unwrap();
    assert_eq!(engine.tier(), Tier::Disabled);
}

#[test]
fn construction_rejects_bad_config() {
    let bad_resolution = EngineConfig { resolution: 0.0, ..EngineConfig::default() };
    assert!(matches!(
        EngineCore::new(bad_resolution, &HostSignals::default()),
        Err(EngineError::Config(_))
    ));

    let bad_color = EngineConfig { colors: vec!["not-a-color".into()], ..EngineConfig::default() };
    assert!(matches!(
        EngineCore::new(bad_color, &HostSignals::default()),
        Err(EngineError::Palette(_))
    ));

    assert!(matches!(
        EngineCore::from_json("{ nope", ""),
        Err(EngineError::Config(ConfigError::Json(_)))
    ));
}

#[test]
fn from_json_with_empty_signals_is_capable() {
    let engine = EngineCore::from_json(r#"{"mouseForce": 30, "isViscous": true}"#, "").unwrap();
    assert_eq!(engine.tier(), Tier::Gpu);
    assert!(engine.config().viscous);
    assert_eq!(engine.config().mouse_force, 30.0);
}

#[test]
fn frames_stop_until_started() {
    let mut engine = EngineCore::new(calm_config(), &HostSignals::default()).unwrap();
    engine.resize(400.0, 300.0, 1.0);
    assert_eq!(engine.frame(0.0, BOUNDS), FrameOutcome::Stopped);
    engine.start();
    assert_eq!(engine.frame(16.0, BOUNDS), FrameOutcome::Rendered);
    assert_eq!(engine.frame_count(), 1);
    engine.pause();
    assert_eq!(engine.frame(32.0, BOUNDS), FrameOutcome::Stopped);
}

#[test]
fn zero_size_viewport_skips_frames() {
    let mut engine = EngineCore::new(calm_config(), &HostSignals::default()).unwrap();
    engine.start();
    assert_eq!(engine.frame(0.0, BOUNDS), FrameOutcome::NotDrawable);

    engine.resize(400.0, 300.0, 1.0);
    assert_eq!(engine.frame(16.0, BOUNDS), FrameOutcome::Rendered);

    engine.resize(0.0, 0.0, 1.0);
    assert_eq!(engine.frame(32.0, BOUNDS), FrameOutcome::NotDrawable);
}

#[test]
fn resize_sizes_grid_from_resolution() {
    let mut engine = EngineCore::new(calm_config(), &HostSignals::default()).unwrap();
    assert!(engine.resize(400.0, 300.0, 1.0));
    assert_eq!(engine.surface_size(), (200, 150));
    assert_eq!(engine.pixels().len(), 200 * 150 * 4);
    assert!(!engine.resize(400.0, 300.0, 1.0));
}

#[test]
fn fixed_viewport_is_captured_once() {
    let config = EngineConfig {
        fixed_width_px: Some(320),
        fixed_height_px: Some(200),
        ..calm_config()
    };
    let mut engine = EngineCore::new(config, &HostSignals::default()).unwrap();
    assert!(engine.resize(1000.0, 800.0, 1.0));
    assert_eq!(engine.surface_size(), (160, 100));
    assert!(!engine.resize(500.0, 500.0, 1.0));
    assert_eq!(engine.surface_size(), (160, 100));
}

#[test]
fn pixel_ratio_is_clamped() {
    let mut engine = trail_engine();
    engine.resize(100.0, 50.0, 3.0);
    assert_eq!(engine.viewport().dpr, 2.0);
    assert_eq!(engine.surface_size(), (200, 100));

    engine.resize(100.0, 50.0, f32::NAN);
    assert_eq!(engine.viewport().dpr, 1.0);
}

#[test]
fn pointer_motion_stirs_the_fluid() {
    let mut engine = gpu_engine(calm_config());
    engine.push_event(InputEvent::PointerMove { x: 100.0, y: 100.0, at_ms: 0.0 });
    assert_eq!(engine.frame(0.0, BOUNDS), FrameOutcome::Rendered);
    assert_eq!(fluid(&engine).velocity().max_magnitude(), 0.0);

    engine.push_event(InputEvent::PointerMove { x: 160.0, y: 120.0, at_ms: 10.0 });
    assert_eq!(engine.frame(16.0, BOUNDS), FrameOutcome::Rendered);
    assert!(fluid(&engine).velocity().max_magnitude() > 0.0);
    assert!(engine.pixels().chunks_exact(4).any(|px| px[3] > 0));
    assert_eq!(engine.queued_events(), 0);
}

#[test]
fn idle_autopilot_keeps_the_fluid_moving() {
    let mut engine = gpu_engine(EngineConfig::default());
    let mut now = 0.0;
    while now < 2500.0 {
        engine.frame(now, BOUNDS);
        now += 16.0;
    }
    assert_eq!(engine.input().state().owner, crate::systems::input::Owner::Autopilot);
    assert!(fluid(&engine).velocity().max_magnitude() > 0.0);
}

#[test]
fn throttle_caps_the_rate() {
    let mut engine = gpu_engine(calm_config());
    assert_eq!(engine.frame(0.0, BOUNDS), FrameOutcome::Rendered);
    engine.set_throttle(18);
    assert_eq!(engine.frame(5.0, BOUNDS), FrameOutcome::Rendered);
    assert_eq!(engine.frame(20.0, BOUNDS), FrameOutcome::Throttled);
    assert_eq!(engine.frame(65.0, BOUNDS), FrameOutcome::Rendered);
}

#[test]
fn wheel_burst_throttles_then_resets() {
    let mut engine = gpu_engine(calm_config());
    engine.notify_wheel(0.0);
    assert_eq!(engine.target_fps(), 18);
    engine.notify_wheel(50.0);
    assert_eq!(engine.frame(60.0, BOUNDS), FrameOutcome::Rendered);
    assert_eq!(engine.target_fps(), 18);
    engine.frame(200.0, BOUNDS);
    assert_eq!(engine.target_fps(), 0);
}

#[test]
fn hidden_document_stops_frames() {
    let mut engine = gpu_engine(calm_config());
    engine.set_visibility(false);
    assert_eq!(engine.frame(0.0, BOUNDS), FrameOutcome::Stopped);
    engine.set_visibility(true);
    assert_eq!(engine.frame(16.0, BOUNDS), FrameOutcome::Rendered);
}

#[test]
fn degrade_swaps_to_trail_and_reports_once() {
    let reasons = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&reasons);
    let mut engine = gpu_engine(calm_config());
    engine.set_degrade_handler(Box::new(move |e| {
        sink.borrow_mut().push(e.to_string());
        Ok(())
    }));

    assert!(engine.degrade("context lost"));
    assert_eq!(engine.tier(), Tier::Fallback2d);
    assert!(matches!(engine.renderer(), ActiveRenderer::Trail(_)));
    assert_eq!(engine.surface_size(), (400, 300));
    assert_eq!(engine.frame(0.0, BOUNDS), FrameOutcome::Rendered);

    assert!(!engine.degrade("again"));
    let reasons = reasons.borrow();
    assert_eq!(reasons.len(), 1);
    assert!(reasons[0].contains("context lost"));
}

#[test]
fn failing_degrade_handler_is_swallowed() {
    let mut engine = gpu_engine(calm_config());
    engine.set_degrade_handler(Box::new(|_| Err("host threw".into())));
    assert!(engine.degrade("no webgl"));
    assert_eq!(engine.tier(), Tier::Fallback2d);
}

#[test]
fn trail_tier_follows_the_pointer() {
    let mut engine = trail_engine();
    let bounds = Rect::new(10.0, 20.0, 200.0, 100.0);
    engine.push_event(InputEvent::PointerMove { x: 60.0, y: 70.0, at_ms: 0.0 });
    assert_eq!(engine.frame(0.0, bounds), FrameOutcome::Rendered);
    let alpha = engine.pixels()[(50 * 200 + 50) * 4 + 3];
    assert!(alpha > 0);
}

#[test]
fn idle_trail_is_paced() {
    let mut engine = trail_engine();
    assert_eq!(engine.frame(0.0, BOUNDS), FrameOutcome::Rendered);
    assert_eq!(engine.frame(10.0, BOUNDS), FrameOutcome::Throttled);
    assert_eq!(engine.frame(50.0, BOUNDS), FrameOutcome::Rendered);
}

#[test]
fn disabled_tier_never_runs() {
    let reduced = HostSignals { reduced_motion: true, ..HostSignals::default() };
    let mut engine = EngineCore::new(calm_config(), &reduced).unwrap();
    engine.resize(400.0, 300.0, 1.0);
    engine.start();
    assert!(!engine.is_running());
    engine.push_event(InputEvent::HoverEnter { at_ms: 0.0 });
    assert_eq!(engine.queued_events(), 0);
    assert_eq!(engine.frame(0.0, BOUNDS), FrameOutcome::Stopped);
    assert!(engine.pixels().is_empty());
}

#[test]
fn event_queue_is_bounded() {
    let mut engine = gpu_engine(calm_config());
    for i in 0..(MAX_QUEUED_EVENTS + 40) {
        engine.push_event(InputEvent::PointerMove { x: i as f32, y: 1.0, at_ms: i as f64 });
    }
    assert_eq!(engine.queued_events(), MAX_QUEUED_EVENTS);
}

#[test]
fn dispose_is_idempotent() {
    let mut engine = gpu_engine(calm_config());
    engine.frame(0.0, BOUNDS);
    engine.dispose();
    engine.dispose();
    assert!(engine.is_disposed());
    assert!(!engine.is_running());
    assert!(engine.pixels().is_empty());
    assert_eq!(engine.frame(16.0, BOUNDS), FrameOutcome::Stopped);

    engine.start();
    assert!(!engine.is_running());
    assert!(!engine.degrade("late"));
}

#[test]
fn perf_stats_track_rendered_frames() {
    let mut engine = gpu_engine(calm_config());
    engine.enable_perf_metrics(true);
    engine.frame(0.0, BOUNDS);
    engine.frame(16.0, BOUNDS);

    let stats = engine.get_perf_stats();
    assert_eq!(stats.frames_rendered(), 2);
    assert_eq!((stats.grid_width(), stats.grid_height()), (200, 150));
    assert_eq!(stats.cells(), 200 * 150);
    assert!(stats.memory_bytes() > 0);
    assert!(stats.frame_ms() >= 0.0);

    engine.enable_perf_metrics(false);
    assert_eq!(engine.get_perf_stats().frames_rendered(), 0);
}
