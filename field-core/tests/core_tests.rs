use field_core::event::{FieldEvent, Severity};
use field_core::scene::{FieldFrame, FieldScene, SceneConfig};

fn event(id: &str, timestamp_ms: i64, severity: Severity) -> FieldEvent {
    FieldEvent {
        id: id.to_string(),
        title: format!("event {id}"),
        timestamp_ms,
        severity,
        category: "core".to_string(),
        summary: Some(format!("summary {id}")),
        location: None,
        created_at_ms: Some(timestamp_ms),
        updated_at_ms: None,
    }
}

fn sample_events(now: i64) -> Vec<FieldEvent> {
    vec![
        event("alpha", now - 80_000_000, Severity::Low),
        event("beta", now - 40_000_000, Severity::High),
        event("gamma", now - 10_000_000, Severity::Critical),
    ]
}

#[test]
fn scene_tick_produces_complete_frame() {
    let now = 1_770_600_000_000;
    let mut scene = FieldScene::new_with_seed(SceneConfig::default(), 1);
    let frame = scene.tick(&sample_events(now), now);

    assert_eq!(frame.time_ms, now);
    assert_eq!(frame.elapsed_ms, 0.0);
    assert_eq!(frame.entrance_scale, 0.0);
    assert_eq!(frame.angles.len(), 3);
    assert!(frame.pulses.is_empty(), "snapshot load must not pulse");
    assert!(!frame.clusters.is_empty());
    assert_eq!(
        frame.contour.samples.len(),
        scene.config().synthesis.sample_count
    );
}

#[test]
fn entrance_ramp_reaches_unity() {
    let now = 1_000_000;
    let mut scene = FieldScene::new_with_seed(SceneConfig::default(), 3);
    let events = sample_events(now);

    let first = scene.tick(&events, now);
    assert_eq!(first.entrance_scale, 0.0);

    let mid = scene.tick(&events, now + 900);
    assert!(mid.entrance_scale > 0.0 && mid.entrance_scale < 1.0);

    let done = scene.tick(&events, now + 10_000);
    assert_eq!(done.entrance_scale, 1.0);
}

#[test]
fn seeded_scenes_replay_identically() {
    let now = 500_000;
    let events = sample_events(now);
    let mut a = FieldScene::new_with_seed(SceneConfig::default(), 77);
    let mut b = FieldScene::new_with_seed(SceneConfig::default(), 77);

    for step in 0..20 {
        let t = now + step * 160;
        let fa = a.tick(&events, t);
        let fb = b.tick(&events, t);
        assert_eq!(fa.clusters, fb.clusters);
        assert_eq!(fa.contour, fb.contour);
    }
}

#[test]
fn changed_event_pulses_then_fades() {
    let now = 2_000_000;
    let mut scene = FieldScene::new_with_seed(SceneConfig::default(), 11);
    let mut events = sample_events(now);
    scene.tick(&events, now);

    events[1].updated_at_ms = Some(now + 1_000);
    events[1].severity = Severity::Critical;
    let frame = scene.tick(&events, now + 1_000);
    assert_eq!(frame.pulses.len(), 1);
    assert_eq!(frame.pulses[0].event_id, "beta");

    let lifetime = scene.config().pulses.pulse_lifetime_ms;
    let later = scene.tick(&events, now + 1_000 + lifetime + 1);
    assert!(later.pulses.is_empty());
}

#[test]
fn frame_roundtrips_through_json() {
    let now = 1_234_567;
    let mut scene = FieldScene::new_with_seed(SceneConfig::default(), 5);
    scene.tick(&sample_events(now), now);
    let json = scene
        .tick_json(&sample_events(now), now + 500)
        .expect("serialize");
    let decoded: FieldFrame = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(decoded.time_ms, now + 500);
    assert_eq!(decoded.angles.len(), 3);
    assert_eq!(
        decoded.contour.samples.len(),
        scene.config().synthesis.sample_count
    );
}

#[test]
fn ndjson_frames_end_with_newline() {
    let now = 42_000;
    let mut scene = FieldScene::new_with_seed(SceneConfig::default(), 5);
    let line = scene
        .tick_ndjson(&sample_events(now), now)
        .expect("serialize");
    assert!(line.ends_with('\n'));
    assert_eq!(line.matches('\n').count(), 1);
}

#[test]
fn reset_restarts_entrance_and_clusters() {
    let now = 10_000_000;
    let mut scene = FieldScene::new_with_seed(SceneConfig::default(), 21);
    let events = sample_events(now);
    let first = scene.tick(&events, now);
    scene.tick(&events, now + 5_000);

    scene.reset();
    let replay = scene.tick(&events, now);
    assert_eq!(replay.entrance_scale, 0.0);
    assert_eq!(first.clusters, replay.clusters);
    // Pulse signatures survive a reset, so nothing re-fires.
    assert!(replay.pulses.is_empty());
}
