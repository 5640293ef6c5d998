//! Field synthesis
//!
//! Combines the event angle table, active pulses and active clusters into
//! one sampled radius-per-angle contour plus the higher-frequency mountain
//! bands the renderer traces behind it.  Synthesis is pure: it holds no
//! state, draws no randomness, and recomputes every sample fresh each
//! frame.  All offsets are expressed as fractions of the viewport's outer
//! radius so the field looks the same at any resolution.

use serde::{Deserialize, Serialize};

use crate::cluster::DivergenceCluster;
use crate::event::{FieldEvent, Severity};
use crate::geometry::{clamp01, normalize_angle, shortest_angular_distance, TAU};
use crate::layout::{compute_event_angles, ComputedEventAngle, LayoutParams};
use crate::pulse::DivergencePulse;

/// Resting contour radius.
pub const BASE_RADIUS_FRACTION: f64 = 0.58;
/// Amplitude of the always-on low-frequency baseline wobble.
pub const BASELINE_WOBBLE_FRACTION: f64 = 0.012;
/// Gain and soft cap for the windowed pulse excitation.
pub const PULSE_EXCITATION_FRACTION: f64 = 0.055;
pub const PULSE_EXCITATION_CAP_FRACTION: f64 = 0.08;
/// Independent soft caps for the outward and inward extension sums.
pub const EXTENSION_OUTWARD_CAP_FRACTION: f64 = 0.24;
pub const EXTENSION_INWARD_CAP_FRACTION: f64 = 0.09;
/// Gain applied to a unit-strength extension lobe.
const EXTENSION_GAIN_FRACTION: f64 = 0.16;
/// Amplitude of the influence-gated fine noise.
const FINE_NOISE_FRACTION: f64 = 0.018;

/// No sample can exceed this radius fraction: base + wobble + both capped
/// disturbance paths + full-influence fine noise.
pub const MAX_RADIUS_FRACTION: f64 = BASE_RADIUS_FRACTION
    + BASELINE_WOBBLE_FRACTION
    + PULSE_EXCITATION_CAP_FRACTION
    + EXTENSION_OUTWARD_CAP_FRACTION
    + FINE_NOISE_FRACTION;

/// Angular half-width of a pulse's raised-cosine window.
const PULSE_WINDOW_RAD: f64 = 0.85;
/// Fraction of a pulse's lifetime spent in the attack phase.
const PULSE_ATTACK_FRACTION: f64 = 0.22;

/// Strongest pulses promoted to extension sources.
const MAX_PULSE_EXTENSIONS: usize = 6;
const PULSE_EXTENSION_WIDTH_RAD: f64 = 0.45;
const PULSE_EXTENSION_RATIO: f64 = 0.6;
/// Bound on the merged extension source list.
const MAX_EXTENSION_SOURCES: usize = 24;
/// Each cluster carves a shallow trough opposite its outward lobe.
const INWARD_TROUGH_RATIO: f64 = 0.35;
const INWARD_TROUGH_WIDTH_SCALE: f64 = 1.6;

/// Mountain band count and shaping.
const MOUNTAIN_LAYER_COUNT: usize = 2;
const MOUNTAIN_BASE_FRACTIONS: [f64; MOUNTAIN_LAYER_COUNT] = [0.44, 0.37];
const MOUNTAIN_AMPLITUDE_FRACTIONS: [f64; MOUNTAIN_LAYER_COUNT] = [0.045, 0.032];
const MOUNTAIN_FREQUENCIES: [f64; MOUNTAIN_LAYER_COUNT] = [7.0, 11.0];
const MOUNTAIN_PHASES: [f64; MOUNTAIN_LAYER_COUNT] = [0.0, 2.1];

/// Amplitude multiplier per severity, shared by pulses and clusters.
pub fn severity_amplitude(severity: Severity) -> f64 {
    match severity {
        Severity::Low => 0.35,
        Severity::Medium => 0.55,
        Severity::High => 0.78,
        Severity::Critical => 1.0,
    }
}

/// Synthesis configuration.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SynthesisParams {
    pub sample_count: usize,
    pub outer_radius: f64,
    /// Must match the pulse tracker's lifetime so envelopes end exactly
    /// when pulses are pruned.
    pub pulse_lifetime_ms: i64,
}

impl Default for SynthesisParams {
    fn default() -> Self {
        Self {
            sample_count: 240,
            outer_radius: 1.0,
            pulse_lifetime_ms: crate::pulse::DEFAULT_PULSE_LIFETIME_MS,
        }
    }
}

/// Per-frame inputs to synthesis.
#[derive(Clone, Copy, Debug)]
pub struct FieldFrameInput<'a> {
    pub events: &'a [FieldEvent],
    pub pulses: &'a [DivergencePulse],
    pub clusters: &'a [DivergenceCluster],
    pub layout: &'a LayoutParams,
    pub time_ms: i64,
    pub elapsed_ms: f64,
    /// Linear attenuation of every disturbance, `[0, 1]`; the baseline
    /// wobble is unaffected.
    pub entrance_scale: f64,
}

/// One sample of the renderable contour.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContourSample {
    pub angle_rad: f64,
    pub radius: f64,
    pub pulse_influence: f64,
}

/// A higher-frequency band behind the main contour.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MountainLayer {
    pub samples: Vec<ContourSample>,
}

/// Full synthesis output for one frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldContour {
    pub samples: Vec<ContourSample>,
    pub mountains: Vec<MountainLayer>,
}

/// Raised-cosine falloff: 1 at distance 0, 0 at `window` and beyond.
#[inline]
pub fn raised_cosine(distance_rad: f64, window_rad: f64) -> f64 {
    let distance = distance_rad.abs();
    if window_rad <= 0.0 || distance >= window_rad {
        0.0
    } else {
        0.5 * (1.0 + (std::f64::consts::PI * distance / window_rad).cos())
    }
}

/// Smooth monotone limiter: identity near 0, asymptotic to `cap`.
#[inline]
pub fn soft_limit(value: f64, cap: f64) -> f64 {
    if cap <= 0.0 || value <= 0.0 {
        0.0
    } else {
        cap * (value / cap).tanh()
    }
}

/// Pulse envelope at `time_ms`: quadratic rise over the attack window,
/// quadratic fall over the rest, zero outside the lifetime.
pub fn pulse_envelope(pulse: &DivergencePulse, time_ms: i64, lifetime_ms: i64) -> f64 {
    if lifetime_ms <= 0 {
        return 0.0;
    }
    let age = (time_ms - pulse.started_at_ms) as f64;
    let lifetime = lifetime_ms as f64;
    if age < 0.0 || age > lifetime {
        return 0.0;
    }
    let attack = lifetime * PULSE_ATTACK_FRACTION;
    if age < attack {
        let t = age / attack;
        t * t
    } else {
        let t = (age - attack) / (lifetime - attack);
        (1.0 - t) * (1.0 - t)
    }
}

/// Cluster envelope at `time_ms`: attack/hold/decay phases, scaled by the
/// cluster's strength and severity amplitude, modulated by its flare.
pub fn cluster_envelope(cluster: &DivergenceCluster, time_ms: f64) -> f64 {
    let age = time_ms - cluster.started_at_ms;
    if age < 0.0 || age > cluster.total_lifetime_ms() {
        return 0.0;
    }
    let phase = if age < cluster.attack_ms {
        let t = age / cluster.attack_ms;
        t * t
    } else if age < cluster.attack_ms + cluster.hold_ms {
        1.0
    } else {
        let t = (age - cluster.attack_ms - cluster.hold_ms) / cluster.decay_ms;
        (1.0 - t) * (1.0 - t)
    };
    let age_sec = age / 1_000.0;
    let flare = 0.82
        + 0.18
            * (TAU * cluster.flare_speed_hz * age_sec + cluster.flare_phase_offset_rad).sin();
    phase * cluster.strength * severity_amplitude(cluster.severity) * flare
}

/// Current angular center of a cluster, including drift.
pub fn cluster_drifted_center(cluster: &DivergenceCluster, time_ms: f64) -> f64 {
    let age_sec = (time_ms - cluster.started_at_ms) / 1_000.0;
    normalize_angle(cluster.center_angle_rad + cluster.drift_rad_per_sec * age_sec)
}

struct ExtensionSource {
    angle_rad: f64,
    width_rad: f64,
    /// Positive pushes outward, negative carves inward.
    strength: f64,
}

/// Synthesize the full contour for one frame.
///
/// Computes the event angle table internally; use
/// [`synthesize_with_angles`] when the table is already available.
pub fn synthesize_field(input: &FieldFrameInput<'_>, params: &SynthesisParams) -> FieldContour {
    let angles = compute_event_angles(input.events, input.layout);
    synthesize_with_angles(&angles, input, params)
}

/// Synthesize against a precomputed angle table.
pub fn synthesize_with_angles(
    angles: &[ComputedEventAngle],
    input: &FieldFrameInput<'_>,
    params: &SynthesisParams,
) -> FieldContour {
    if params.sample_count == 0 {
        return FieldContour {
            samples: Vec::new(),
            mountains: Vec::new(),
        };
    }

    let entrance = clamp01(input.entrance_scale);
    let time = input.time_ms as f64;
    let time_sec = time / 1_000.0;
    let elapsed_sec = input.elapsed_ms.max(0.0) / 1_000.0;

    let pulse_lobes = resolve_pulse_lobes(angles, input, params);
    let extensions = resolve_extensions(&pulse_lobes, input.clusters, time);

    let mut samples = Vec::with_capacity(params.sample_count);
    let mut influences = Vec::with_capacity(params.sample_count);

    for index in 0..params.sample_count {
        let angle = TAU * index as f64 / params.sample_count as f64;

        let wobble = BASELINE_WOBBLE_FRACTION
            * (0.6 * (angle * 3.0 + time_sec * 0.23).sin()
                + 0.4 * (angle * 5.0 - time_sec * 0.17).sin());

        let mut excitation = 0.0;
        for lobe in &pulse_lobes {
            let distance = shortest_angular_distance(angle, lobe.angle_rad);
            excitation += lobe.strength * raised_cosine(distance, PULSE_WINDOW_RAD);
        }
        let pulse_influence = clamp01(excitation);
        let pulse_term = soft_limit(
            excitation * PULSE_EXCITATION_FRACTION,
            PULSE_EXCITATION_CAP_FRACTION,
        );

        let mut outward = 0.0;
        let mut inward = 0.0;
        for source in &extensions {
            let distance = shortest_angular_distance(angle, source.angle_rad);
            let lobe = raised_cosine(distance, source.width_rad);
            if source.strength >= 0.0 {
                outward += source.strength * lobe;
            } else {
                inward += -source.strength * lobe;
            }
        }
        let outward_term = soft_limit(
            outward * EXTENSION_GAIN_FRACTION,
            EXTENSION_OUTWARD_CAP_FRACTION,
        );
        let inward_term = soft_limit(
            inward * EXTENSION_GAIN_FRACTION,
            EXTENSION_INWARD_CAP_FRACTION,
        );

        let influence = clamp01(
            pulse_influence + outward_term / EXTENSION_OUTWARD_CAP_FRACTION,
        );
        let noise = FINE_NOISE_FRACTION
            * influence
            * (0.5 * (angle * 9.0 + elapsed_sec * 0.9).sin()
                + 0.3 * (angle * 17.0 - elapsed_sec * 1.3).sin()
                + 0.2 * (angle * 29.0 + elapsed_sec * 2.1).sin());

        let radius_fraction = BASE_RADIUS_FRACTION
            + wobble
            + entrance * (pulse_term + outward_term - inward_term + noise);

        samples.push(ContourSample {
            angle_rad: angle,
            radius: radius_fraction * params.outer_radius,
            pulse_influence,
        });
        influences.push(influence);
    }

    let mountains = synthesize_mountains(&samples, &influences, entrance, elapsed_sec, params);

    FieldContour { samples, mountains }
}

struct PulseLobe {
    angle_rad: f64,
    strength: f64,
}

/// Resolve each active pulse to (slot angle, envelope strength).  Pulses
/// whose event no longer occupies a slot contribute nothing.
fn resolve_pulse_lobes(
    angles: &[ComputedEventAngle],
    input: &FieldFrameInput<'_>,
    params: &SynthesisParams,
) -> Vec<PulseLobe> {
    let mut lobes = Vec::new();
    for pulse in input.pulses {
        let envelope = pulse_envelope(pulse, input.time_ms, params.pulse_lifetime_ms);
        if envelope <= 0.0 {
            continue;
        }
        let slot = angles
            .iter()
            .find(|slot| slot.member_ids.iter().any(|id| id == &pulse.event_id));
        if let Some(slot) = slot {
            lobes.push(PulseLobe {
                angle_rad: slot.angle_rad,
                strength: envelope * severity_amplitude(pulse.severity),
            });
        }
    }
    lobes
}

/// Merge the strongest pulses and every live cluster/spike contribution
/// into a bounded extension source list.
fn resolve_extensions(
    pulse_lobes: &[PulseLobe],
    clusters: &[DivergenceCluster],
    time_ms: f64,
) -> Vec<ExtensionSource> {
    let mut sources = Vec::new();

    let mut strongest: Vec<&PulseLobe> = pulse_lobes.iter().collect();
    strongest.sort_by(|a, b| {
        b.strength
            .partial_cmp(&a.strength)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    for lobe in strongest.into_iter().take(MAX_PULSE_EXTENSIONS) {
        sources.push(ExtensionSource {
            angle_rad: lobe.angle_rad,
            width_rad: PULSE_EXTENSION_WIDTH_RAD,
            strength: lobe.strength * PULSE_EXTENSION_RATIO,
        });
    }

    for cluster in clusters {
        let envelope = cluster_envelope(cluster, time_ms);
        if envelope <= 0.0 {
            continue;
        }
        let center = cluster_drifted_center(cluster, time_ms);
        sources.push(ExtensionSource {
            angle_rad: center,
            width_rad: cluster.width_rad,
            strength: envelope,
        });
        // Shallow counter-trough on the far side keeps the silhouette from
        // inflating uniformly as clusters accumulate.
        sources.push(ExtensionSource {
            angle_rad: normalize_angle(center + std::f64::consts::PI),
            width_rad: cluster.width_rad * INWARD_TROUGH_WIDTH_SCALE,
            strength: -envelope * INWARD_TROUGH_RATIO,
        });

        let age_sec = (time_ms - cluster.started_at_ms) / 1_000.0;
        for spike in &cluster.spikes {
            let flicker = 0.7
                + 0.3 * (TAU * spike.flicker_hz * age_sec + spike.phase_offset_rad).sin();
            sources.push(ExtensionSource {
                angle_rad: normalize_angle(center + spike.angle_offset_rad),
                width_rad: spike.width_rad,
                strength: envelope * spike.strength_scale * flicker,
            });
        }
    }

    if sources.len() > MAX_EXTENSION_SOURCES {
        sources.sort_by(|a, b| {
            b.strength
                .abs()
                .partial_cmp(&a.strength.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        sources.truncate(MAX_EXTENSION_SOURCES);
    }
    sources
}

/// Derive the mountain bands from the main pass's local influence.
fn synthesize_mountains(
    samples: &[ContourSample],
    influences: &[f64],
    entrance: f64,
    elapsed_sec: f64,
    params: &SynthesisParams,
) -> Vec<MountainLayer> {
    (0..MOUNTAIN_LAYER_COUNT)
        .map(|layer| {
            let base = MOUNTAIN_BASE_FRACTIONS[layer];
            let amplitude = MOUNTAIN_AMPLITUDE_FRACTIONS[layer];
            let frequency = MOUNTAIN_FREQUENCIES[layer];
            let phase = MOUNTAIN_PHASES[layer];
            let layer_samples = samples
                .iter()
                .zip(influences)
                .map(|(sample, &influence)| {
                    let ridge = (sample.angle_rad * frequency + phase + elapsed_sec * 0.31).sin();
                    let gain = 0.3 + 0.7 * influence;
                    let fraction =
                        base + entrance * amplitude * gain * ridge.max(0.0);
                    ContourSample {
                        angle_rad: sample.angle_rad,
                        radius: fraction * params.outer_radius,
                        pulse_influence: sample.pulse_influence,
                    }
                })
                .collect();
            MountainLayer {
                samples: layer_samples,
            }
        })
        .collect()
}
