//! Background dispatcher for deliveries queued in process.
//!
//! Only runs when no remote event API is configured. Every tick it drains the
//! due events, re-checks each against the stored preference and hands the
//! admitted ones to the delivery handler. Events that fail go back in the
//! queue for the next tick.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use newsletter_core::{
    delivery::{dispatch, DeliveryGate, DeliveryHandlerTrait, DispatchSummary},
    events::{InMemoryEventScheduler, ScheduledDeliveryEvent},
    preferences::UserPreference,
    Result,
};
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::main_lib::AppState;

/// Delivery handler that records the delivery in the log. Content selection
/// and rendering happen downstream of this service.
pub struct LoggingDeliveryHandler;

#[async_trait]
impl DeliveryHandlerTrait for LoggingDeliveryHandler {
    async fn deliver(
        &self,
        event: &ScheduledDeliveryEvent,
        preference: &UserPreference,
    ) -> Result<()> {
        info!(
            event_id = %event.event_id,
            user_id = %preference.user_id,
            email = %preference.email,
            frequency = %preference.frequency,
            categories = ?preference.categories,
            "Delivering newsletter"
        );
        Ok(())
    }
}

/// Starts the local delivery dispatcher if deliveries are queued in process.
pub fn start_delivery_dispatcher(state: Arc<AppState>, every: Duration) {
    let Some(queue) = state.local_scheduler.clone() else {
        debug!("Delivery dispatcher not started: event API handles deliveries");
        return;
    };
    let gate = DeliveryGate::new(state.preference_repository.clone());

    tokio::spawn(async move {
        info!("Delivery dispatcher started ({}s interval)", every.as_secs());
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            run_dispatch(&queue, &gate, &LoggingDeliveryHandler).await;
        }
    });
}

/// Runs a single dispatch round.
pub async fn run_dispatch(
    queue: &InMemoryEventScheduler,
    gate: &DeliveryGate,
    handler: &dyn DeliveryHandlerTrait,
) -> DispatchSummary {
    let due = match queue.take_due(Utc::now()) {
        Ok(due) => due,
        Err(e) => {
            warn!("Failed to read due deliveries: {}", e);
            return DispatchSummary::default();
        }
    };
    if due.is_empty() {
        return DispatchSummary::default();
    }

    let report = dispatch(gate, handler, due).await;
    if let Err(e) = queue.requeue(report.retry) {
        warn!("Failed to requeue undelivered events: {}", e);
    }
    report.summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use newsletter_core::{
        errors::DatabaseError,
        events::{DeliveryPayload, EventSchedulerTrait, FireAt},
        preferences::{Frequency, NewUserPreference, PreferencePatch, PreferenceRepositoryTrait},
        utils::ManualClock,
    };
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Repository whose reads fail while `down` is set.
    struct FlakyRepository {
        preference: UserPreference,
        down: AtomicBool,
    }

    #[async_trait]
    impl PreferenceRepositoryTrait for FlakyRepository {
        fn get_by_user(&self, user_id: &str) -> Result<Option<UserPreference>> {
            if self.down.load(Ordering::SeqCst) {
                let reason = "database is locked".to_string();
                return Err(DatabaseError::ConnectionFailed(reason).into());
            }
            Ok((self.preference.user_id == user_id).then(|| self.preference.clone()))
        }

        async fn upsert(&self, _preference: NewUserPreference) -> Result<UserPreference> {
            unimplemented!()
        }

        async fn update(&self, _user_id: &str, _patch: PreferencePatch) -> Result<UserPreference> {
            unimplemented!()
        }
    }

    #[derive(Default)]
    struct CountingHandler {
        delivered: AtomicUsize,
    }

    #[async_trait]
    impl DeliveryHandlerTrait for CountingHandler {
        async fn deliver(
            &self,
            _event: &ScheduledDeliveryEvent,
            _preference: &UserPreference,
        ) -> Result<()> {
            self.delivered.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_failed_check_is_retried_on_next_round() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let preference = UserPreference {
            user_id: "u1".to_string(),
            categories: vec!["science".to_string()],
            frequency: Frequency::Daily,
            email: "u1@example.com".to_string(),
            is_active: true,
            created_at: at,
            updated_at: at,
        };
        let repository = Arc::new(FlakyRepository {
            preference: preference.clone(),
            down: AtomicBool::new(true),
        });
        let gate = DeliveryGate::new(repository.clone());
        let queue = InMemoryEventScheduler::new(Arc::new(ManualClock::new(at)));
        let handler = CountingHandler::default();

        queue
            .submit(
                "newsletter.schedule",
                DeliveryPayload::from_preference(&preference, None),
                FireAt::Immediately,
            )
            .await
            .unwrap();

        let first = run_dispatch(&queue, &gate, &handler).await;
        assert_eq!(first.failed, 1);
        assert_eq!(queue.pending_count().unwrap(), 1);

        repository.down.store(false, Ordering::SeqCst);
        let second = run_dispatch(&queue, &gate, &handler).await;
        assert_eq!(second.delivered, 1);
        assert_eq!(second.failed, 0);
        assert_eq!(handler.delivered.load(Ordering::SeqCst), 1);
        assert_eq!(queue.pending_count().unwrap(), 0);
    }
}
