use field_core::event::{FieldEvent, Severity};
use field_core::geometry::TAU;
use field_core::layout::{
    cluster_threshold_rad, compute_event_angles, resolve_mode, DistributionMode, LayoutParams,
    PlacementMode,
};

fn event(id: &str, timestamp_ms: i64, severity: Severity) -> FieldEvent {
    FieldEvent {
        id: id.to_string(),
        title: format!("event {id}"),
        timestamp_ms,
        severity,
        category: "infra".to_string(),
        summary: None,
        location: None,
        created_at_ms: None,
        updated_at_ms: None,
    }
}

fn params(now_ms: i64, window_ms: i64, max_visible: usize, mode: DistributionMode) -> LayoutParams {
    LayoutParams {
        now_ms,
        window_ms,
        max_visible_count: max_visible,
        distribution_mode: mode,
        ..LayoutParams::default()
    }
}

#[test]
fn cluster_sizes_sum_to_event_count() {
    let now = 1_000_000;
    let window = 100_000;
    let events: Vec<FieldEvent> = (0..40)
        .map(|i| {
            event(
                &format!("e{i:02}"),
                now - window + i * 2_500,
                Severity::Medium,
            )
        })
        .collect();
    let p = params(now, window, 8, DistributionMode::TimeWindow);
    let slots = compute_event_angles(&events, &p);

    assert!(slots.len() <= 8);
    let total: usize = slots.iter().map(|s| s.cluster_size).sum();
    assert_eq!(total, events.len());
    assert!(slots.iter().any(|s| s.is_cluster));
}

#[test]
fn output_is_order_independent() {
    let now = 500_000;
    let window = 200_000;
    let mut events: Vec<FieldEvent> = (0..12)
        .map(|i| {
            let severity = match i % 4 {
                0 => Severity::Low,
                1 => Severity::Medium,
                2 => Severity::High,
                _ => Severity::Critical,
            };
            event(&format!("e{i}"), now - window + i * 15_000, severity)
        })
        .collect();
    let p = params(now, window, 5, DistributionMode::TimeWindow);

    let forward = compute_event_angles(&events, &p);
    events.reverse();
    let reversed = compute_event_angles(&events, &p);

    assert_eq!(forward.len(), reversed.len());
    for (a, b) in forward.iter().zip(reversed.iter()) {
        assert_eq!(a.event.id, b.event.id);
        assert_eq!(a.member_ids, b.member_ids);
        assert_eq!(a.cluster_size, b.cluster_size);
        assert!((a.angle_rad - b.angle_rad).abs() < 1e-12);
    }
}

#[test]
fn ordered_mode_spreads_four_events_evenly() {
    let events = vec![
        event("a", 100, Severity::Low),
        event("b", 200, Severity::Low),
        event("c", 300, Severity::Low),
        event("d", 400, Severity::Low),
    ];
    let p = params(10_000, 86_400_000, 24, DistributionMode::Ordered);
    let slots = compute_event_angles(&events, &p);

    assert_eq!(slots.len(), 4);
    let expected = [0.0, TAU / 4.0, TAU / 2.0, 3.0 * TAU / 4.0];
    for (slot, want) in slots.iter().zip(expected) {
        assert!(
            (slot.angle_rad - want).abs() < 1e-9,
            "angle {} != {want}",
            slot.angle_rad
        );
    }
}

#[test]
fn ordered_single_event_sits_at_now() {
    let events = vec![event("solo", 42, Severity::High)];
    let p = params(10_000, 86_400_000, 24, DistributionMode::Ordered);
    let slots = compute_event_angles(&events, &p);
    assert_eq!(slots.len(), 1);
    assert!(slots[0].angle_rad > TAU * 0.999_999);
    assert!(slots[0].angle_rad < TAU);
}

#[test]
fn seam_cluster_resolves_near_zero() {
    let now = 1_000_000;
    let window = 100_000;
    // 1% and 99% of the window sit on either side of the 0/2π seam once
    // clustered together.
    let events = vec![
        event("early", now - window + window / 100, Severity::Low),
        event("late", now - window / 100, Severity::Low),
    ];
    let p = params(now, window, 1, DistributionMode::TimeWindow);
    let slots = compute_event_angles(&events, &p);

    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].cluster_size, 2);
    let angle = slots[0].angle_rad;
    let seam_distance = angle.min(TAU - angle);
    assert!(
        seam_distance < 0.1,
        "seam cluster angle {angle} should land near 0, not near π"
    );
}

#[test]
fn threshold_is_exactly_tau_over_count() {
    for count in [1usize, 2, 5, 8, 24, 60] {
        assert_eq!(cluster_threshold_rad(count), TAU / count as f64);
    }
}

#[test]
fn representative_prefers_severity_then_recency_then_id() {
    let now = 1_000_000;
    let window = 100_000;
    // All land in one bucket; the critical one must represent it.
    let events = vec![
        event("b", now - 900, Severity::High),
        event("a", now - 1_000, Severity::Critical),
        event("c", now - 800, Severity::Critical),
    ];
    let p = params(now, window, 1, DistributionMode::TimeWindow);
    let slots = compute_event_angles(&events, &p);
    assert_eq!(slots.len(), 1);
    // "c" is critical and more recent than "a".
    assert_eq!(slots[0].event.id, "c");
    assert_eq!(slots[0].marker_height, Severity::Critical.marker_height());
}

#[test]
fn adaptive_falls_back_to_ordered_for_narrow_spans() {
    let now = 1_000_000_000;
    let window = 86_400_000;
    // Span of 1 minute inside a 24 h window.
    let narrow: Vec<FieldEvent> = (0..4)
        .map(|i| event(&format!("n{i}"), now - 60_000 + i * 15_000, Severity::Low))
        .collect();
    let p = params(now, window, 24, DistributionMode::Adaptive);
    assert_eq!(resolve_mode(&narrow, &p), PlacementMode::Ordered);

    // Span of 20 h keeps time mapping.
    let wide: Vec<FieldEvent> = (0..4)
        .map(|i| event(&format!("w{i}"), now - i * 24_000_000, Severity::Low))
        .collect();
    assert_eq!(resolve_mode(&wide, &p), PlacementMode::TimeWindow);
}

#[test]
fn window_edges_map_to_expected_angles() {
    let now: i64 = 1_770_600_000_000;
    let window: i64 = 86_400_000;
    let p = params(now, window, 24, DistributionMode::TimeWindow);

    let oldest = vec![event("old", now - window - 1, Severity::Low)];
    let slots = compute_event_angles(&oldest, &p);
    assert!(slots[0].angle_rad.abs() < 1e-9);

    let newest = vec![event("new", now, Severity::Low)];
    let slots = compute_event_angles(&newest, &p);
    assert!(slots[0].angle_rad > TAU * 0.999_999);
    assert!(slots[0].angle_rad < TAU);
}

#[test]
fn empty_input_yields_empty_output() {
    let p = params(1_000, 1_000, 8, DistributionMode::Adaptive);
    assert!(compute_event_angles(&[], &p).is_empty());
}

#[test]
fn output_is_sorted_by_angle() {
    let now = 1_000_000;
    let window = 400_000;
    let events: Vec<FieldEvent> = (0..9)
        .map(|i| {
            event(
                &format!("s{i}"),
                now - window + (i * 37 % 9) as i64 * 40_000,
                Severity::Low,
            )
        })
        .collect();
    let p = params(now, window, 24, DistributionMode::TimeWindow);
    let slots = compute_event_angles(&events, &p);
    for pair in slots.windows(2) {
        assert!(pair[0].angle_rad <= pair[1].angle_rad);
    }
}
