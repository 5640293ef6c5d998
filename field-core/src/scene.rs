//! Per-tick scene runtime.
//!
//! This module owns the two stateful trackers and wires them, the layout
//! engine and the synthesizer into the single frame object a renderer
//! consumes.  One instance per rendered scene; independent scenes must use
//! independent instances so their trackers cannot cross-talk.

use serde::{Deserialize, Serialize};

use crate::cluster::{ClusterParams, ClusterTracker, DivergenceCluster};
use crate::contour::{
    synthesize_with_angles, FieldContour, FieldFrameInput, SynthesisParams,
};
use crate::event::FieldEvent;
use crate::geometry::clamp01;
use crate::layout::{compute_event_angles, ComputedEventAngle, LayoutParams};
use crate::pulse::{DivergencePulse, PulseParams, PulseTracker};

/// Duration of the intro fade-in ramp.
pub const DEFAULT_ENTRANCE_MS: f64 = 1_800.0;

/// Aggregate configuration for one scene.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SceneConfig {
    pub layout: LayoutParams,
    pub pulses: PulseParams,
    pub clusters: ClusterParams,
    pub synthesis: SynthesisParams,
    pub entrance_ms: f64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            layout: LayoutParams::default(),
            pulses: PulseParams::default(),
            clusters: ClusterParams::default(),
            synthesis: SynthesisParams::default(),
            entrance_ms: DEFAULT_ENTRANCE_MS,
        }
    }
}

/// Everything the renderer needs for one animation frame.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldFrame {
    pub time_ms: i64,
    pub elapsed_ms: f64,
    pub entrance_scale: f64,
    pub angles: Vec<ComputedEventAngle>,
    pub pulses: Vec<DivergencePulse>,
    pub clusters: Vec<DivergenceCluster>,
    pub contour: FieldContour,
}

/// The per-frame integration point: trackers + layout + synthesis.
pub struct FieldScene {
    config: SceneConfig,
    pulse_tracker: PulseTracker,
    cluster_tracker: ClusterTracker,
    first_tick_ms: Option<i64>,
}

impl FieldScene {
    /// Create a scene with an entropy-seeded cluster tracker.
    pub fn new(config: SceneConfig) -> Self {
        let pulse_tracker = PulseTracker::new(config.pulses);
        let cluster_tracker = ClusterTracker::new(config.clusters);
        Self {
            config,
            pulse_tracker,
            cluster_tracker,
            first_tick_ms: None,
        }
    }

    /// Create a scene whose cluster lifecycle replays from `seed`.
    pub fn new_with_seed(config: SceneConfig, seed: u32) -> Self {
        let pulse_tracker = PulseTracker::new(config.pulses);
        let cluster_tracker = ClusterTracker::new_with_seed(config.clusters, seed);
        Self {
            config,
            pulse_tracker,
            cluster_tracker,
            first_tick_ms: None,
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Advance both trackers and synthesize the frame for `time_ms`.
    pub fn tick(&mut self, events: &[FieldEvent], time_ms: i64) -> FieldFrame {
        let first = *self.first_tick_ms.get_or_insert(time_ms);
        let elapsed_ms = (time_ms - first).max(0) as f64;
        let entrance_scale = if self.config.entrance_ms > 0.0 {
            clamp01(elapsed_ms / self.config.entrance_ms)
        } else {
            1.0
        };

        let mut layout = self.config.layout.clone();
        layout.now_ms = time_ms;

        self.pulse_tracker.update_events(events, time_ms);
        let pulses = self.pulse_tracker.get_active_pulses(time_ms);

        self.cluster_tracker.update(time_ms as f64);
        let clusters = self.cluster_tracker.get_active_clusters(time_ms as f64);

        let angles = compute_event_angles(events, &layout);
        let contour = synthesize_with_angles(
            &angles,
            &FieldFrameInput {
                events,
                pulses: &pulses,
                clusters: &clusters,
                layout: &layout,
                time_ms,
                elapsed_ms,
                entrance_scale,
            },
            &self.config.synthesis,
        );

        FieldFrame {
            time_ms,
            elapsed_ms,
            entrance_scale,
            angles,
            pulses,
            clusters,
            contour,
        }
    }

    /// Tick and serialize the frame to JSON.
    pub fn tick_json(&mut self, events: &[FieldEvent], time_ms: i64) -> serde_json::Result<String> {
        let frame = self.tick(events, time_ms);
        serde_json::to_string(&frame)
    }

    /// Tick and serialize the frame as one NDJSON line.
    pub fn tick_ndjson(
        &mut self,
        events: &[FieldEvent],
        time_ms: i64,
    ) -> serde_json::Result<String> {
        let mut json = self.tick_json(events, time_ms)?;
        json.push('\n');
        Ok(json)
    }

    /// Reset the cluster lifecycle and the entrance ramp.  Pulse
    /// signatures are kept so a reset does not re-fire change pulses.
    pub fn reset(&mut self) {
        self.cluster_tracker.reset();
        self.first_tick_ms = None;
    }
}
