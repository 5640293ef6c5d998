//! Change-triggered pulse tracker
//!
//! Watches the event set between ticks and emits a short-lived pulse
//! whenever an event appears or its revision signature changes.  Pulses
//! are owned by the tracker until their fixed lifetime elapses, then
//! filtered out lazily.  One tracker instance per scene; calls must be
//! serialized by the caller.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::event::{FieldEvent, Severity};

pub const DEFAULT_MAX_ACTIVE_PULSES: usize = 48;
pub const DEFAULT_PULSE_LIFETIME_MS: i64 = 2_800;

/// Pulse tracker configuration.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct PulseParams {
    pub max_active_pulses: usize,
    pub pulse_lifetime_ms: i64,
    /// When false (the default), the very first non-empty update records
    /// signatures without emitting, so loading a saved snapshot does not
    /// fire a burst of pulses.
    pub emit_initial_pulses: bool,
}

impl Default for PulseParams {
    fn default() -> Self {
        Self {
            max_active_pulses: DEFAULT_MAX_ACTIVE_PULSES,
            pulse_lifetime_ms: DEFAULT_PULSE_LIFETIME_MS,
            emit_initial_pulses: false,
        }
    }
}

/// A transient excitation tied to one event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DivergencePulse {
    pub event_id: String,
    pub started_at_ms: i64,
    pub severity: Severity,
}

/// Composite key summarizing an event's mutable fields, used to detect
/// "this event changed" without a diff.
fn revision_signature(event: &FieldEvent) -> String {
    format!(
        "{}|{}|{}|{}|{}",
        event.revision_time_ms(),
        event.timestamp_ms,
        event.severity.label(),
        event.title,
        event.category
    )
}

/// Stateful tracker for change-triggered pulses.
#[derive(Clone, Debug)]
pub struct PulseTracker {
    params: PulseParams,
    signatures: HashMap<String, String>,
    active: Vec<DivergencePulse>,
    primed: bool,
}

impl PulseTracker {
    pub fn new(params: PulseParams) -> Self {
        Self {
            params,
            signatures: HashMap::new(),
            active: Vec::new(),
            primed: false,
        }
    }

    pub fn params(&self) -> &PulseParams {
        &self.params
    }

    /// Diff the event set against the last-seen signatures, emitting a
    /// pulse per new or changed event, then prune and cap the active set.
    pub fn update_events(&mut self, events: &[FieldEvent], time_ms: i64) {
        let first_load = !self.primed;
        if !events.is_empty() {
            self.primed = true;
        }
        let suppress = first_load && !self.params.emit_initial_pulses;

        for event in events {
            let signature = revision_signature(event);
            let changed = self
                .signatures
                .get(&event.id)
                .map(|previous| previous != &signature)
                .unwrap_or(true);
            if changed && !suppress {
                self.active.push(DivergencePulse {
                    event_id: event.id.clone(),
                    started_at_ms: time_ms,
                    severity: event.severity,
                });
            }
            self.signatures.insert(event.id.clone(), signature);
        }

        self.prune(time_ms);

        if self.active.len() > self.params.max_active_pulses {
            self.active.sort_by_key(|pulse| pulse.started_at_ms);
            let excess = self.active.len() - self.params.max_active_pulses;
            self.active.drain(0..excess);
        }
    }

    /// Prune expired pulses and return a snapshot of the survivors.
    pub fn get_active_pulses(&mut self, time_ms: i64) -> Vec<DivergencePulse> {
        self.prune(time_ms);
        self.active.clone()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    fn prune(&mut self, time_ms: i64) {
        let lifetime = self.params.pulse_lifetime_ms;
        self.active
            .retain(|pulse| time_ms - pulse.started_at_ms <= lifetime);
    }
}
