use serde::Serialize;

use crate::events::ScheduledDeliveryEvent;
use crate::preferences::UserPreference;

/// Why a fired event was not delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SkipReason {
    Paused,
    NoPreference,
}

/// Outcome of re-checking a fired event against the stored preference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryDecision {
    /// Deliver using the current preference, not the event's snapshot.
    Deliver(UserPreference),
    Skip(SkipReason),
}

/// Counters for one dispatch round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchSummary {
    pub delivered: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl DispatchSummary {
    pub fn total(&self) -> usize {
        self.delivered + self.skipped + self.failed
    }
}

/// Result of one dispatch round.
#[derive(Debug, Default)]
pub struct DispatchReport {
    pub summary: DispatchSummary,
    /// Events that failed and must be offered again on a later round.
    pub retry: Vec<ScheduledDeliveryEvent>,
}
