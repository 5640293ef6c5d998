//! Angular layout engine
//!
//! Maps a set of events to angles on the circle.  Two base placements
//! exist: `TimeWindow` spreads events by their position inside a sliding
//! time window, `Ordered` spreads them evenly by rank.  The `Adaptive`
//! mode resolves to one of the two based on how much of the window the
//! events actually span, so near-simultaneous events do not collapse onto
//! the same angle.  When more distinct events exist than visible slots,
//! markers are clustered into fixed-width angular buckets.
//!
//! Layout is stateless: every call recomputes fresh from its inputs and
//! permuting the input order yields identical output.

use serde::{Deserialize, Serialize};

use crate::event::FieldEvent;
use crate::geometry::{clamp01, normalize_angle, shortest_angular_distance, TAU};

/// Fraction of the window the timestamps must span before time mapping is
/// considered readable.
pub const DEFAULT_MIN_TIME_SPAN_RATIO: f64 = 0.35;

/// Pulls the upper window bound in so the newest event never wraps to 0.
const ANGLE_WRAP_EPSILON: f64 = 1e-7;

/// Requested distribution mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DistributionMode {
    TimeWindow,
    Ordered,
    Adaptive,
}

/// Concrete placement after the adaptive decision has been made.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlacementMode {
    TimeWindow,
    Ordered,
}

/// Layout configuration for one call.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LayoutParams {
    pub now_ms: i64,
    pub window_ms: i64,
    pub max_visible_count: usize,
    pub distribution_mode: DistributionMode,
    pub min_time_span_ratio: f64,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            now_ms: 0,
            window_ms: 86_400_000,
            max_visible_count: 24,
            distribution_mode: DistributionMode::Adaptive,
            min_time_span_ratio: DEFAULT_MIN_TIME_SPAN_RATIO,
        }
    }
}

/// One visible slot: either a single marker or a cluster of markers.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ComputedEventAngle {
    /// Representative event (by severity desc, timestamp desc, id asc for
    /// clusters; the event itself otherwise).
    pub event: FieldEvent,
    /// Ids of every member, ascending.  Length 1 for a simple marker.
    pub member_ids: Vec<String>,
    /// Final angle in `[0, 2π)`.
    pub angle_rad: f64,
    /// Severity-derived height fraction (max over members for clusters).
    pub marker_height: f64,
    pub cluster_size: usize,
    pub is_cluster: bool,
}

/// Width of one clustering bucket.  Exactly `2π / max_visible_count`.
pub fn cluster_threshold_rad(max_visible_count: usize) -> f64 {
    TAU / max_visible_count.max(1) as f64
}

/// Resolve the adaptive mode decision into a concrete placement.
///
/// Kept separate from angle computation so the decision is independently
/// testable.
pub fn resolve_mode(events: &[FieldEvent], params: &LayoutParams) -> PlacementMode {
    match params.distribution_mode {
        DistributionMode::TimeWindow => PlacementMode::TimeWindow,
        DistributionMode::Ordered => PlacementMode::Ordered,
        DistributionMode::Adaptive => {
            if events.len() < 2 || params.window_ms <= 0 {
                return PlacementMode::TimeWindow;
            }
            let min_ts = events.iter().map(|e| e.timestamp_ms).min().unwrap_or(0);
            let max_ts = events.iter().map(|e| e.timestamp_ms).max().unwrap_or(0);
            let span = (max_ts - min_ts) as f64;
            if span < params.min_time_span_ratio * params.window_ms as f64 {
                PlacementMode::Ordered
            } else {
                PlacementMode::TimeWindow
            }
        }
    }
}

/// Angle for a timestamp inside the sliding window.
///
/// The unit position is clamped to `1 - ε` so an event exactly at `now`
/// lands just below 2π instead of wrapping to 0.
pub fn time_window_angle(timestamp_ms: i64, now_ms: i64, window_ms: i64) -> f64 {
    if window_ms <= 0 {
        return 0.0;
    }
    let window_start = now_ms - window_ms;
    let unit = clamp01((timestamp_ms - window_start) as f64 / window_ms as f64);
    normalize_angle(unit.min(1.0 - ANGLE_WRAP_EPSILON) * TAU)
}

/// Compute the visible slots for an event set.
///
/// Invariant: the cluster sizes of the output sum to the number of input
/// events.  Output is ordered by (angle, representative id).
pub fn compute_event_angles(events: &[FieldEvent], params: &LayoutParams) -> Vec<ComputedEventAngle> {
    if events.is_empty() {
        return Vec::new();
    }

    let markers = place_markers(events, params);

    let mut slots = if markers.len() > params.max_visible_count.max(1) {
        cluster_markers(markers, params)
    } else {
        markers
            .into_iter()
            .map(|m| ComputedEventAngle {
                marker_height: m.event.severity.marker_height(),
                member_ids: vec![m.event.id.clone()],
                angle_rad: m.angle_rad,
                cluster_size: 1,
                is_cluster: false,
                event: m.event.clone(),
            })
            .collect()
    };

    slots.sort_by(|a, b| {
        a.angle_rad
            .partial_cmp(&b.angle_rad)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.event.id.cmp(&b.event.id))
    });
    slots
}

struct PlacedMarker<'a> {
    event: &'a FieldEvent,
    angle_rad: f64,
}

fn place_markers<'a>(events: &'a [FieldEvent], params: &LayoutParams) -> Vec<PlacedMarker<'a>> {
    match resolve_mode(events, params) {
        PlacementMode::TimeWindow => events
            .iter()
            .map(|event| PlacedMarker {
                event,
                angle_rad: time_window_angle(event.timestamp_ms, params.now_ms, params.window_ms),
            })
            .collect(),
        PlacementMode::Ordered => {
            let mut ordered: Vec<&FieldEvent> = events.iter().collect();
            ordered.sort_by(|a, b| {
                a.timestamp_ms
                    .cmp(&b.timestamp_ms)
                    .then_with(|| a.id.cmp(&b.id))
                    .then_with(|| a.title.cmp(&b.title))
            });
            let count = ordered.len();
            ordered
                .into_iter()
                .enumerate()
                .map(|(index, event)| PlacedMarker {
                    event,
                    angle_rad: if count == 1 {
                        time_window_angle(params.now_ms, params.now_ms, params.window_ms)
                    } else {
                        normalize_angle(TAU * index as f64 / count as f64)
                    },
                })
                .collect()
        }
    }
}

fn cluster_markers(markers: Vec<PlacedMarker<'_>>, params: &LayoutParams) -> Vec<ComputedEventAngle> {
    let bucket_count = params.max_visible_count.max(1);
    let width = cluster_threshold_rad(bucket_count);

    let mut buckets: Vec<Vec<PlacedMarker<'_>>> = (0..bucket_count).map(|_| Vec::new()).collect();
    for marker in markers {
        // The last angular position lands exactly on bucket_count; clamp it
        // into the final bucket.
        let index = ((marker.angle_rad / width) as usize).min(bucket_count - 1);
        buckets[index].push(marker);
    }

    buckets
        .into_iter()
        .filter(|members| !members.is_empty())
        .map(|mut members| {
            // Deterministic member order regardless of input permutation.
            members.sort_by(|a, b| {
                a.angle_rad
                    .partial_cmp(&b.angle_rad)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.event.id.cmp(&b.event.id))
            });

            let representative = members
                .iter()
                .max_by(|a, b| {
                    a.event
                        .severity
                        .cmp(&b.event.severity)
                        .then_with(|| a.event.timestamp_ms.cmp(&b.event.timestamp_ms))
                        .then_with(|| b.event.id.cmp(&a.event.id))
                })
                .expect("bucket is non-empty")
                .event
                .clone();

            let angle_rad = circular_mean(&members);
            let marker_height = members
                .iter()
                .map(|m| m.event.severity.marker_height())
                .fold(0.0, f64::max);

            let mut member_ids: Vec<String> =
                members.iter().map(|m| m.event.id.clone()).collect();
            member_ids.sort();

            ComputedEventAngle {
                cluster_size: members.len(),
                is_cluster: members.len() > 1,
                event: representative,
                member_ids,
                angle_rad,
                marker_height,
            }
        })
        .collect()
}

/// Seam-aware circular mean of a bucket's member angles.
///
/// Members are unwrapped into the first member's frame via the shortest
/// signed distance before averaging, so a bucket straddling the 0/2π seam
/// resolves near the seam rather than near π.  Buckets are narrower than π
/// in practical configurations, which keeps the unwrap unambiguous.
fn circular_mean(members: &[PlacedMarker<'_>]) -> f64 {
    let base = members[0].angle_rad;
    let mean_offset = members
        .iter()
        .map(|m| shortest_angular_distance(base, m.angle_rad))
        .sum::<f64>()
        / members.len() as f64;
    normalize_angle(base + mean_offset)
}
