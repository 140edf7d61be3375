//! Event scheduler trait and the in-process substrate.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use super::{DeliveryPayload, FireAt, ScheduledDeliveryEvent};
use crate::errors::{Result, SchedulingError};
use crate::utils::{Clock, SystemClock};

/// Gateway to the durable event-delivery substrate.
///
/// The substrate offers no delete/abort primitive. Once submitted, an event
/// fires; consumers must re-check the preference before acting on it.
#[async_trait]
pub trait EventSchedulerTrait: Send + Sync {
    /// Enqueues an event and returns the identifier assigned by the substrate.
    async fn submit(
        &self,
        event_type: &str,
        payload: DeliveryPayload,
        fire_at: FireAt,
    ) -> Result<String>;

    /// Best-effort, eventually-consistent view of events of `event_type`
    /// that have not fired yet.
    async fn list_by_type(&self, event_type: &str) -> Result<Vec<ScheduledDeliveryEvent>>;
}

/// Substrate that keeps pending events in process memory.
///
/// Used when no remote event API is configured. Fired events are pulled with
/// [`InMemoryEventScheduler::take_due`].
pub struct InMemoryEventScheduler {
    pending: Mutex<Vec<ScheduledDeliveryEvent>>,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryEventScheduler {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl InMemoryEventScheduler {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            pending: Mutex::new(Vec::new()),
            clock,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<ScheduledDeliveryEvent>>> {
        self.pending
            .lock()
            .map_err(|_| SchedulingError::Internal("event queue lock poisoned".to_string()).into())
    }

    /// Removes and returns every event whose fire time is at or before `now`,
    /// earliest first.
    pub fn take_due(&self, now: DateTime<Utc>) -> Result<Vec<ScheduledDeliveryEvent>> {
        let mut pending = self.lock()?;
        let (mut due, remaining): (Vec<_>, Vec<_>) =
            pending.drain(..).partition(|event| event.fire_at <= now);
        *pending = remaining;
        due.sort_by_key(|event| event.fire_at);
        Ok(due)
    }

    /// Puts events back in the queue, e.g. after a failed delivery attempt.
    /// They keep their id and fire time, so they are due again immediately.
    pub fn requeue(&self, events: Vec<ScheduledDeliveryEvent>) -> Result<()> {
        if events.is_empty() {
            return Ok(());
        }
        debug!("Requeueing {} undelivered event(s)", events.len());
        self.lock()?.extend(events);
        Ok(())
    }

    /// Number of events that have not fired yet.
    pub fn pending_count(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }
}

#[async_trait]
impl EventSchedulerTrait for InMemoryEventScheduler {
    async fn submit(
        &self,
        event_type: &str,
        payload: DeliveryPayload,
        fire_at: FireAt,
    ) -> Result<String> {
        let event = ScheduledDeliveryEvent {
            event_id: Uuid::new_v4().to_string(),
            event_type: event_type.to_string(),
            payload,
            fire_at: fire_at.resolve(self.clock.now()),
        };
        debug!(
            "Queued {} event {} for user {} at {}",
            event.event_type, event.event_id, event.payload.user_id, event.fire_at
        );

        let event_id = event.event_id.clone();
        self.lock()?.push(event);
        Ok(event_id)
    }

    async fn list_by_type(&self, event_type: &str) -> Result<Vec<ScheduledDeliveryEvent>> {
        Ok(self
            .lock()?
            .iter()
            .filter(|event| event.event_type == event_type)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::NEWSLETTER_SCHEDULE_EVENT;
    use crate::preferences::Frequency;
    use crate::utils::ManualClock;
    use chrono::{Duration, TimeZone};

    fn payload(user_id: &str) -> DeliveryPayload {
        DeliveryPayload {
            user_id: user_id.to_string(),
            email: format!("{user_id}@example.com"),
            categories: vec!["science".to_string()],
            frequency: Frequency::Daily,
            scheduled_for: None,
        }
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_submit_and_list_by_type() {
        let scheduler = InMemoryEventScheduler::new(Arc::new(ManualClock::new(start())));

        let first = scheduler
            .submit(NEWSLETTER_SCHEDULE_EVENT, payload("a"), FireAt::Immediately)
            .await
            .unwrap();
        let second = scheduler
            .submit("other.event", payload("b"), FireAt::Immediately)
            .await
            .unwrap();
        assert_ne!(first, second);

        let listed = scheduler
            .list_by_type(NEWSLETTER_SCHEDULE_EVENT)
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].event_id, first);
        assert_eq!(listed[0].fire_at, start());
        assert_eq!(scheduler.pending_count().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_relative_delay_resolves_against_clock() {
        let scheduler = InMemoryEventScheduler::new(Arc::new(ManualClock::new(start())));
        scheduler
            .submit(
                NEWSLETTER_SCHEDULE_EVENT,
                payload("a"),
                FireAt::After(Duration::minutes(30)),
            )
            .await
            .unwrap();

        let listed = scheduler
            .list_by_type(NEWSLETTER_SCHEDULE_EVENT)
            .await
            .unwrap();
        assert_eq!(listed[0].fire_at, start() + Duration::minutes(30));
    }

    #[tokio::test]
    async fn test_take_due_only_returns_fired_events() {
        let scheduler = InMemoryEventScheduler::new(Arc::new(ManualClock::new(start())));
        let later = start() + Duration::days(3);
        let soon = start() + Duration::hours(1);

        scheduler
            .submit(NEWSLETTER_SCHEDULE_EVENT, payload("late"), FireAt::At(later))
            .await
            .unwrap();
        scheduler
            .submit(NEWSLETTER_SCHEDULE_EVENT, payload("soon"), FireAt::At(soon))
            .await
            .unwrap();
        scheduler
            .submit(NEWSLETTER_SCHEDULE_EVENT, payload("now"), FireAt::Immediately)
            .await
            .unwrap();

        let due = scheduler.take_due(soon).unwrap();
        let users: Vec<_> = due.iter().map(|e| e.payload.user_id.as_str()).collect();
        assert_eq!(users, vec!["now", "soon"]);
        assert_eq!(scheduler.pending_count().unwrap(), 1);

        assert!(scheduler.take_due(soon).unwrap().is_empty());
        assert_eq!(scheduler.take_due(later).unwrap().len(), 1);
        assert_eq!(scheduler.pending_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_requeued_events_are_due_again() {
        let scheduler = InMemoryEventScheduler::new(Arc::new(ManualClock::new(start())));
        let event_id = scheduler
            .submit(NEWSLETTER_SCHEDULE_EVENT, payload("a"), FireAt::Immediately)
            .await
            .unwrap();

        let due = scheduler.take_due(start()).unwrap();
        assert_eq!(scheduler.pending_count().unwrap(), 0);

        scheduler.requeue(due).unwrap();
        let again = scheduler.take_due(start()).unwrap();
        assert_eq!(again.len(), 1);
        assert_eq!(again[0].event_id, event_id);
        assert_eq!(again[0].fire_at, start());
    }
}
