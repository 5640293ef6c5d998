//! Event data model
//!
//! Events are consumed read-only; ingestion, normalization and
//! deduplication happen upstream of this crate.

use serde::{Deserialize, Serialize};

/// Event severity, ordered `Low < Medium < High < Critical`.
///
/// The order is used pervasively as a tie-break and to index the fixed
/// amplitude/height tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Stable text label, also used in revision signatures.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    /// Marker height as a fraction of the outer radius.
    pub fn marker_height(&self) -> f64 {
        match self {
            Severity::Low => 0.34,
            Severity::Medium => 0.48,
            Severity::High => 0.68,
            Severity::Critical => 0.88,
        }
    }
}

/// A timestamped, severity-tagged event placed on the circle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldEvent {
    pub id: String,
    pub title: String,
    pub timestamp_ms: i64,
    pub severity: Severity,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at_ms: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at_ms: Option<i64>,
}

impl FieldEvent {
    /// Effective revision time: `updated_at ?? created_at ?? timestamp`.
    pub fn revision_time_ms(&self) -> i64 {
        self.updated_at_ms
            .or(self.created_at_ms)
            .unwrap_or(self.timestamp_ms)
    }
}
