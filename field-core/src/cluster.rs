//! Autonomous divergence cluster tracker
//!
//! Generates longer-lived "flare" disturbances independently of real
//! events, holding the live population inside a configured band.  Every
//! random decision (spawn timing, archetype, placement, spike shapes)
//! comes from the tracker's own [`DeterministicRng`] stream, so the whole
//! lifecycle replays identically for a given seed and call sequence.
//!
//! Clusters are immutable after spawn and expire lazily once their
//! attack+hold+decay envelope has elapsed.

use serde::{Deserialize, Serialize};

use crate::event::Severity;
use crate::geometry::{normalize_angle, shortest_angular_distance, TAU};
use crate::rng::DeterministicRng;

pub const DEFAULT_MIN_ACTIVE_CLUSTERS: usize = 2;
pub const DEFAULT_MAX_ACTIVE_CLUSTERS: usize = 5;

/// Base range for the delay between opportunistic spawns, in ms.
const SPAWN_DELAY_MIN_MS: f64 = 2_400.0;
const SPAWN_DELAY_MAX_MS: f64 = 6_400.0;
/// Extra delay factor applied as the population approaches the maximum.
const SPAWN_DENSITY_SLOWDOWN: f64 = 1.5;

/// How many candidate angles are scored per placement.
const PLACEMENT_CANDIDATES: usize = 6;
/// Random jitter added to each candidate's clearance score.
const PLACEMENT_JITTER_RAD: f64 = 0.25;

/// Largest fraction of a lifetime a backfilled cluster starts into.
const BACKFILL_MAX_LIFETIME_FRACTION: f64 = 0.75;

/// Cluster tracker configuration.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ClusterParams {
    pub min_active_clusters: usize,
    pub max_active_clusters: usize,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            min_active_clusters: DEFAULT_MIN_ACTIVE_CLUSTERS,
            max_active_clusters: DEFAULT_MAX_ACTIVE_CLUSTERS,
        }
    }
}

/// A secondary shimmer spike inside a cluster, fixed at spawn time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClusterSpike {
    pub angle_offset_rad: f64,
    pub width_rad: f64,
    pub strength_scale: f64,
    pub flicker_hz: f64,
    pub phase_offset_rad: f64,
}

/// A long-lived flare disturbance, immutable until it expires.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DivergenceCluster {
    pub id: u64,
    pub center_angle_rad: f64,
    pub width_rad: f64,
    pub strength: f64,
    pub severity: Severity,
    pub started_at_ms: f64,
    pub attack_ms: f64,
    pub hold_ms: f64,
    pub decay_ms: f64,
    pub drift_rad_per_sec: f64,
    pub flare_speed_hz: f64,
    pub flare_phase_offset_rad: f64,
    pub spikes: Vec<ClusterSpike>,
}

impl DivergenceCluster {
    /// Total envelope lifetime, fixed at creation.
    pub fn total_lifetime_ms(&self) -> f64 {
        self.attack_ms + self.hold_ms + self.decay_ms
    }

    pub fn is_expired(&self, time_ms: f64) -> bool {
        time_ms - self.started_at_ms > self.total_lifetime_ms()
    }
}

/// Parameter ranges for one severity tier, selected by weighted draw.
struct Archetype {
    severity: Severity,
    weight: f64,
    width_rad: (f64, f64),
    strength: (f64, f64),
    attack_ms: (f64, f64),
    hold_ms: (f64, f64),
    decay_ms: (f64, f64),
    max_drift_rad_per_sec: f64,
    flare_speed_hz: (f64, f64),
    spike_count: (i64, i64),
    spike_width_fraction: (f64, f64),
    spike_strength_scale: (f64, f64),
    spike_flicker_hz: (f64, f64),
}

static ARCHETYPES: [Archetype; 4] = [
    Archetype {
        severity: Severity::Low,
        weight: 0.40,
        width_rad: (0.45, 0.85),
        strength: (0.25, 0.45),
        attack_ms: (1_200.0, 2_400.0),
        hold_ms: (1_800.0, 4_000.0),
        decay_ms: (2_200.0, 4_200.0),
        max_drift_rad_per_sec: 0.04,
        flare_speed_hz: (0.08, 0.18),
        spike_count: (2, 4),
        spike_width_fraction: (0.12, 0.26),
        spike_strength_scale: (0.25, 0.55),
        spike_flicker_hz: (0.4, 1.1),
    },
    Archetype {
        severity: Severity::Medium,
        weight: 0.32,
        width_rad: (0.55, 1.05),
        strength: (0.40, 0.65),
        attack_ms: (1_000.0, 2_200.0),
        hold_ms: (2_000.0, 4_400.0),
        decay_ms: (2_400.0, 4_400.0),
        max_drift_rad_per_sec: 0.05,
        flare_speed_hz: (0.10, 0.24),
        spike_count: (2, 5),
        spike_width_fraction: (0.12, 0.28),
        spike_strength_scale: (0.30, 0.65),
        spike_flicker_hz: (0.5, 1.4),
    },
    Archetype {
        severity: Severity::High,
        weight: 0.18,
        width_rad: (0.70, 1.30),
        strength: (0.60, 0.85),
        attack_ms: (900.0, 1_800.0),
        hold_ms: (2_400.0, 4_800.0),
        decay_ms: (2_600.0, 4_800.0),
        max_drift_rad_per_sec: 0.06,
        flare_speed_hz: (0.12, 0.28),
        spike_count: (3, 5),
        spike_width_fraction: (0.14, 0.30),
        spike_strength_scale: (0.35, 0.75),
        spike_flicker_hz: (0.6, 1.6),
    },
    Archetype {
        severity: Severity::Critical,
        weight: 0.10,
        width_rad: (0.90, 1.60),
        strength: (0.80, 1.00),
        attack_ms: (800.0, 1_600.0),
        hold_ms: (2_600.0, 5_200.0),
        decay_ms: (2_800.0, 5_000.0),
        max_drift_rad_per_sec: 0.07,
        flare_speed_hz: (0.15, 0.35),
        spike_count: (3, 6),
        spike_width_fraction: (0.16, 0.32),
        spike_strength_scale: (0.45, 0.90),
        spike_flicker_hz: (0.8, 2.0),
    },
];

/// Autonomous, population-bounded generator of divergence clusters.
#[derive(Clone, Debug)]
pub struct ClusterTracker {
    params: ClusterParams,
    seed: u32,
    rng: DeterministicRng,
    clusters: Vec<DivergenceCluster>,
    next_spawn_at_ms: Option<f64>,
    next_id: u64,
    initialized: bool,
}

impl ClusterTracker {
    /// Create a tracker with an entropy seed.  Use
    /// [`ClusterTracker::new_with_seed`] for bit-for-bit repeatability.
    pub fn new(params: ClusterParams) -> Self {
        Self::new_with_seed(params, rand::random::<u32>())
    }

    /// Create a tracker whose whole lifecycle replays from `seed`.
    pub fn new_with_seed(params: ClusterParams, seed: u32) -> Self {
        Self {
            params,
            seed,
            rng: DeterministicRng::new(seed),
            clusters: Vec::new(),
            next_spawn_at_ms: None,
            next_id: 0,
            initialized: false,
        }
    }

    pub fn params(&self) -> &ClusterParams {
        &self.params
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Re-seed the RNG and clear all state, as if freshly constructed.
    pub fn reset(&mut self) {
        self.rng = DeterministicRng::new(self.seed);
        self.clusters.clear();
        self.next_spawn_at_ms = None;
        self.next_id = 0;
        self.initialized = false;
    }

    /// Advance the population state machine to `time_ms`.
    ///
    /// First call: backfill to the minimum with randomized negative start
    /// offsets so the initial clusters are already mid-lifecycle.
    /// Subsequent calls: expire, top back up to the minimum, and spawn one
    /// more when the scheduled time has been reached and the population is
    /// below the maximum.
    pub fn update(&mut self, time_ms: f64) {
        let min_active = self.params.min_active_clusters;
        let max_active = self.params.max_active_clusters.max(min_active);

        if !self.initialized {
            self.initialized = true;
            for _ in 0..min_active {
                let cluster = self.spawn(time_ms, true);
                self.clusters.push(cluster);
            }
            self.schedule_next_spawn(time_ms);
            return;
        }

        self.clusters.retain(|cluster| !cluster.is_expired(time_ms));

        while self.clusters.len() < min_active {
            let cluster = self.spawn(time_ms, false);
            self.clusters.push(cluster);
        }

        match self.next_spawn_at_ms {
            Some(next) if time_ms >= next => {
                if self.clusters.len() < max_active {
                    let cluster = self.spawn(time_ms, false);
                    self.clusters.push(cluster);
                }
                self.schedule_next_spawn(time_ms);
            }
            None => self.schedule_next_spawn(time_ms),
            _ => {}
        }
    }

    /// Prune expired clusters and return a snapshot of the survivors.
    pub fn get_active_clusters(&mut self, time_ms: f64) -> Vec<DivergenceCluster> {
        self.clusters.retain(|cluster| !cluster.is_expired(time_ms));
        self.clusters.clone()
    }

    pub fn active_count(&self) -> usize {
        self.clusters.len()
    }

    /// Spawn delay scales inversely with population density so a full band
    /// spawns slower than an empty one.
    fn schedule_next_spawn(&mut self, time_ms: f64) {
        let density =
            self.clusters.len() as f64 / self.params.max_active_clusters.max(1) as f64;
        let base = self.rng.next_float(SPAWN_DELAY_MIN_MS, SPAWN_DELAY_MAX_MS);
        let delay = base * (1.0 + SPAWN_DENSITY_SLOWDOWN * density);
        self.next_spawn_at_ms = Some(time_ms + delay);
    }

    fn spawn(&mut self, time_ms: f64, backfill: bool) -> DivergenceCluster {
        let archetype = self.pick_archetype();
        let center_angle_rad = self.place_center();

        let width_rad = self
            .rng
            .next_float(archetype.width_rad.0, archetype.width_rad.1);
        let strength = self
            .rng
            .next_float(archetype.strength.0, archetype.strength.1);
        let attack_ms = self
            .rng
            .next_float(archetype.attack_ms.0, archetype.attack_ms.1);
        let hold_ms = self.rng.next_float(archetype.hold_ms.0, archetype.hold_ms.1);
        let decay_ms = self
            .rng
            .next_float(archetype.decay_ms.0, archetype.decay_ms.1);
        let drift_rad_per_sec = self.rng.next_float(
            -archetype.max_drift_rad_per_sec,
            archetype.max_drift_rad_per_sec,
        );
        let flare_speed_hz = self
            .rng
            .next_float(archetype.flare_speed_hz.0, archetype.flare_speed_hz.1);
        let flare_phase_offset_rad = self.rng.next_float(0.0, TAU);

        let mut spikes = Vec::new();
        let spike_count = self
            .rng
            .next_int(archetype.spike_count.0, archetype.spike_count.1);
        for _ in 0..spike_count {
            let half_width = width_rad * 0.5;
            spikes.push(ClusterSpike {
                angle_offset_rad: self.rng.next_float(-half_width, half_width),
                width_rad: width_rad
                    * self.rng.next_float(
                        archetype.spike_width_fraction.0,
                        archetype.spike_width_fraction.1,
                    ),
                strength_scale: self.rng.next_float(
                    archetype.spike_strength_scale.0,
                    archetype.spike_strength_scale.1,
                ),
                flicker_hz: self.rng.next_float(
                    archetype.spike_flicker_hz.0,
                    archetype.spike_flicker_hz.1,
                ),
                phase_offset_rad: self.rng.next_float(0.0, TAU),
            });
        }
        spikes.sort_by(|a, b| {
            b.strength_scale
                .partial_cmp(&a.strength_scale)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let total = attack_ms + hold_ms + decay_ms;
        let started_at_ms = if backfill {
            time_ms - self.rng.next_float(0.0, total * BACKFILL_MAX_LIFETIME_FRACTION)
        } else {
            time_ms
        };

        let id = self.next_id;
        self.next_id += 1;

        DivergenceCluster {
            id,
            center_angle_rad,
            width_rad,
            strength,
            severity: archetype.severity,
            started_at_ms,
            attack_ms,
            hold_ms,
            decay_ms,
            drift_rad_per_sec,
            flare_speed_hz,
            flare_phase_offset_rad,
            spikes,
        }
    }

    fn pick_archetype(&mut self) -> &'static Archetype {
        let total: f64 = ARCHETYPES.iter().map(|a| a.weight).sum();
        let mut roll = self.rng.next() * total;
        for archetype in &ARCHETYPES {
            if roll < archetype.weight {
                return archetype;
            }
            roll -= archetype.weight;
        }
        &ARCHETYPES[ARCHETYPES.len() - 1]
    }

    /// Sample several candidate angles and keep the one with the best
    /// worst-case clearance to existing clusters, width-discounted, with a
    /// little jitter so placements do not lock into a lattice.
    fn place_center(&mut self) -> f64 {
        let mut best_angle = 0.0;
        let mut best_score = f64::NEG_INFINITY;
        for _ in 0..PLACEMENT_CANDIDATES {
            let angle = self.rng.next_float(0.0, TAU);
            let clearance = self
                .clusters
                .iter()
                .map(|other| {
                    shortest_angular_distance(angle, other.center_angle_rad).abs()
                        - other.width_rad * 0.5
                })
                .fold(TAU, f64::min);
            let score = clearance + self.rng.next_float(0.0, PLACEMENT_JITTER_RAD);
            if score > best_score {
                best_score = score;
                best_angle = angle;
            }
        }
        normalize_angle(best_angle)
    }
}
