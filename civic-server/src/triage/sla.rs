//! SLA evaluation
//!
//! Each canonical issue type carries a resolution deadline in hours. A row's
//! SLA state is derived, never stored: it depends on wall-clock time, so it
//! is recomputed on every evaluation pass.
//!
//! Reference time rules:
//! - open rows measure elapsed time against "now" (live display)
//! - resolved/closed rows measure against `resolved_at` (historical breach
//!   state), falling back to "now" only when `resolved_at` is missing

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::types::IssueStatus;

use super::taxonomy::normalize;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Default deadline for issue types without a table entry
pub const DEFAULT_SLA_HOURS: f64 = 24.0;

/// Per-issue-type deadlines (hours)
const SLA_HOURS: &[(&str, f64)] = &[
    ("potholes", 12.0),
    ("garbage_overflow", 8.0),
    ("street_debris", 10.0),
    ("animal_carcases", 12.0),
    ("water_puddles", 12.0),
    ("open_manholes", 12.0),
    ("road_cracks", 24.0),
    ("sand_on_road", 24.0),
    ("street_hawkers", 24.0),
];

/// Derived SLA state of a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlaStatus {
    /// No parsable creation date
    #[serde(rename = "unknown")]
    Unknown,
    /// Still open, past the deadline
    #[serde(rename = "breached")]
    Breached,
    /// Still open, within the deadline
    #[serde(rename = "onTrack")]
    OnTrack,
    /// Settled within the deadline
    #[serde(rename = "solvedWithinSLA")]
    SolvedWithinSla,
    /// Settled after the deadline
    #[serde(rename = "solvedAfterSLA")]
    SolvedAfterSla,
}

/// Full evaluation result attached to each flattened row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlaEvaluation {
    pub status: SlaStatus,
    /// Elapsed hours against the reference time; 0.0 when unknown.
    /// Floating point, unrounded — display layers round.
    pub hours_elapsed: f64,
    pub sla_hours: f64,
}

/// Deadline table, default-constructed from the built-in values
#[derive(Debug, Clone)]
pub struct SlaTable {
    entries: Vec<(String, f64)>,
    default_hours: f64,
}

impl Default for SlaTable {
    fn default() -> Self {
        Self {
            entries: SLA_HOURS
                .iter()
                .map(|(tag, hours)| ((*tag).to_string(), *hours))
                .collect(),
            default_hours: DEFAULT_SLA_HOURS,
        }
    }
}

impl SlaTable {
    /// Deadline in hours for an issue type (raw or normalized)
    pub fn hours_for(&self, issue_type: &str) -> f64 {
        let normalized = normalize(issue_type);
        self.entries
            .iter()
            .find(|(tag, _)| *tag == normalized)
            .map(|(_, hours)| *hours)
            .unwrap_or(self.default_hours)
    }

    /// Classify a row's SLA state at `now`.
    pub fn evaluate(
        &self,
        issue_type: &str,
        status: IssueStatus,
        created_at: Option<DateTime<Utc>>,
        resolved_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> SlaEvaluation {
        let sla_hours = self.hours_for(issue_type);

        let Some(created) = created_at else {
            return SlaEvaluation {
                status: SlaStatus::Unknown,
                hours_elapsed: 0.0,
                sla_hours,
            };
        };

        let reference = if status.is_settled() {
            resolved_at.unwrap_or(now)
        } else {
            now
        };

        let hours_elapsed = hours_between(created, reference);
        let breached = hours_elapsed > sla_hours;

        let status = match (status.is_settled(), breached) {
            (true, false) => SlaStatus::SolvedWithinSla,
            (true, true) => SlaStatus::SolvedAfterSla,
            (false, true) => SlaStatus::Breached,
            (false, false) => SlaStatus::OnTrack,
        };

        SlaEvaluation {
            status,
            hours_elapsed,
            sla_hours,
        }
    }
}

/// Elapsed hours between two instants, as millisecond difference ÷ 3.6e6
pub fn hours_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to.timestamp_millis() - from.timestamp_millis()) as f64 / MILLIS_PER_HOUR
}

/// Breach check against a deadline in hours
pub fn is_breached(hours_elapsed: f64, sla_hours: f64) -> bool {
    hours_elapsed > sla_hours
}
