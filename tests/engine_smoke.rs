use fluid_backdrop::{EngineConfig, EngineCore, FrameOutcome, HostSignals, InputEvent, Rect, Tier};

const BOUNDS: Rect = Rect { left: 0.0, top: 0.0, width: 320.0, height: 240.0 };

#[test]
fn fluid_engine_runs_a_second_of_frames() {
    let mut engine = EngineCore::new(EngineConfig::default(), &HostSignals::default()).unwrap();
    assert_eq!(engine.tier(), Tier::Gpu);
    engine.resize(320.0, 240.0, 2.0);
    engine.start();
    engine.enable_perf_metrics(true);

    let mut rendered = 0;
    for i in 0..60 {
        let now = i as f64 * 16.0;
        let x = 40.0 + i as f32 * 4.0;
        engine.push_event(InputEvent::PointerMove { x, y: 120.0, at_ms: now });
        if engine.frame(now, BOUNDS) == FrameOutcome::Rendered {
            rendered += 1;
        }
    }
    assert_eq!(rendered, 60);

    let (w, h) = engine.surface_size();
    assert_eq!((w, h), (160, 120));
    assert_eq!(engine.pixels().len(), (w * h * 4) as usize);
    assert!(engine.pixels().chunks_exact(4).any(|px| px[3] > 0));

    let stats = engine.get_perf_stats();
    assert_eq!(stats.frames_rendered(), 60);
    assert!(stats.poisson_ms() >= 0.0);
}

#[test]
fn weak_host_gets_the_trail() {
    let signals = HostSignals { logical_cores: Some(2), ..HostSignals::default() };
    let mut engine = EngineCore::new(EngineConfig::default(), &signals).unwrap();
    assert_eq!(engine.tier(), Tier::Fallback2d);
    engine.resize(320.0, 240.0, 1.0);
    engine.start();
    assert_eq!(engine.frame(0.0, BOUNDS), FrameOutcome::Rendered);
    assert_eq!(engine.surface_size(), (320, 240));
    // idle disc is drawn even without a pointer
    assert!(engine.pixels().chunks_exact(4).any(|px| px[3] > 0));
}

#[test]
fn json_round_trip_drives_the_engine() {
    let config = EngineConfig { viscous: true, viscous_iterations: 4, poisson_iterations: 8, ..EngineConfig::default() };
    let json = config.to_json();
    let mut engine = EngineCore::from_json(&json, r#"{"logicalCores": 8, "deviceMemoryGb": 8}"#).unwrap();
    assert_eq!(engine.config(), &config);
    engine.resize(64.0, 64.0, 1.0);
    engine.start();
    assert_eq!(engine.frame(0.0, Rect::new(0.0, 0.0, 64.0, 64.0)), FrameOutcome::Rendered);
}
