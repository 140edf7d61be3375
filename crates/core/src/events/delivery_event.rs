//! Scheduled delivery event types.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::preferences::{Frequency, UserPreference};

/// Payload of a `newsletter.schedule` event: a snapshot of the preference
/// at the moment the delivery was scheduled.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryPayload {
    pub user_id: String,
    pub email: String,
    pub categories: Vec<String>,
    pub frequency: Frequency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_for: Option<DateTime<Utc>>,
}

impl DeliveryPayload {
    pub fn from_preference(
        preference: &UserPreference,
        scheduled_for: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            user_id: preference.user_id.clone(),
            email: preference.email.clone(),
            categories: preference.categories.clone(),
            frequency: preference.frequency,
            scheduled_for,
        }
    }
}

/// An event known to the delivery substrate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledDeliveryEvent {
    pub event_id: String,
    pub event_type: String,
    pub payload: DeliveryPayload,
    pub fire_at: DateTime<Utc>,
}

/// When a submitted event should fire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FireAt {
    #[default]
    Immediately,
    At(DateTime<Utc>),
    After(Duration),
}

impl FireAt {
    /// Absolute fire time relative to `now`.
    pub fn resolve(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            FireAt::Immediately => now,
            FireAt::At(instant) => *instant,
            FireAt::After(delay) => now + *delay,
        }
    }
}

impl From<Option<DateTime<Utc>>> for FireAt {
    fn from(instant: Option<DateTime<Utc>>) -> Self {
        instant.map_or(FireAt::Immediately, FireAt::At)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_payload_wire_format() {
        let payload = DeliveryPayload {
            user_id: "user-1".to_string(),
            email: "a@x.com".to_string(),
            categories: vec!["technology".to_string(), "business".to_string()],
            frequency: Frequency::Weekly,
            scheduled_for: Some(Utc.with_ymd_and_hms(2024, 1, 8, 9, 0, 0).unwrap()),
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["userId"], "user-1");
        assert_eq!(json["email"], "a@x.com");
        assert_eq!(json["categories"][1], "business");
        assert_eq!(json["frequency"], "weekly");
        assert_eq!(json["scheduledFor"], "2024-01-08T09:00:00Z");
    }

    #[test]
    fn test_payload_without_scheduled_for() {
        let json = r#"{"userId":"u","email":"e@x.com","categories":["health"],"frequency":"daily"}"#;
        let payload: DeliveryPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.scheduled_for, None);
        assert!(!serde_json::to_string(&payload).unwrap().contains("scheduledFor"));
    }

    #[test]
    fn test_fire_at_resolution() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 1, 8, 9, 0, 0).unwrap();

        assert_eq!(FireAt::Immediately.resolve(now), now);
        assert_eq!(FireAt::At(later).resolve(now), later);
        assert_eq!(
            FireAt::After(Duration::hours(2)).resolve(now),
            now + Duration::hours(2)
        );
        assert_eq!(FireAt::from(None), FireAt::Immediately);
        assert_eq!(FireAt::from(Some(later)), FireAt::At(later));
    }
}
