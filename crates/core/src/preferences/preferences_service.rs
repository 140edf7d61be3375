use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use std::sync::Arc;

use super::catalog::is_known_category;
use super::preferences_model::{
    PreferencePatch, PreferenceSubmission, PreferenceUpdateOutcome, SavedPreference,
    SchedulingOutcome, UserPreference,
};
use super::preferences_traits::{PreferenceRepositoryTrait, PreferenceServiceTrait};
use crate::auth::AuthSession;
use crate::constants::NEWSLETTER_SCHEDULE_EVENT;
use crate::errors::{Error, Result, SchedulingError, ValidationError};
use crate::events::{DeliveryPayload, EventSchedulerTrait, FireAt};
use crate::schedule::ScheduleCalculator;
use crate::utils::{Clock, SystemClock};

/// Orchestrates preference changes and the delivery schedule that follows
/// from them.
///
/// Per-user states are `Unset -> Active <-> Paused`:
/// - submitting a preference upserts it as active and schedules a delivery;
/// - pausing flips the flag and only inspects outstanding events (they still
///   fire, the consumer re-checks `active`);
/// - resuming flips the flag and schedules a fresh delivery from "now".
pub struct PreferenceService {
    repository: Arc<dyn PreferenceRepositoryTrait>,
    scheduler: Arc<dyn EventSchedulerTrait>,
    calculator: ScheduleCalculator,
    clock: Arc<dyn Clock>,
}

impl PreferenceService {
    pub fn new(
        repository: Arc<dyn PreferenceRepositoryTrait>,
        scheduler: Arc<dyn EventSchedulerTrait>,
    ) -> Self {
        PreferenceService {
            repository,
            scheduler,
            calculator: ScheduleCalculator::default(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_calculator(mut self, calculator: ScheduleCalculator) -> Self {
        self.calculator = calculator;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Computes the next fire time from the current clock and submits a
    /// delivery event carrying a snapshot of `preference`.
    async fn schedule_delivery(
        &self,
        preference: &UserPreference,
    ) -> Result<(String, DateTime<Utc>)> {
        let fire_at = self
            .calculator
            .next_fire(preference.frequency, self.clock.now());
        let payload = DeliveryPayload::from_preference(preference, Some(fire_at));

        let event_id = self
            .scheduler
            .submit(NEWSLETTER_SCHEDULE_EVENT, payload, FireAt::At(fire_at))
            .await
            .map_err(|e| match e {
                Error::Scheduling(_) => e,
                other => Error::Scheduling(SchedulingError::Internal(other.to_string())),
            })?;

        info!(
            "Scheduled {} event {} for user {} at {}",
            NEWSLETTER_SCHEDULE_EVENT, event_id, preference.user_id, fire_at
        );
        Ok((event_id, fire_at))
    }

    /// Pause bookkeeping: enumerate the user's outstanding events for
    /// visibility. Nothing is cancelled.
    async fn inspect_outstanding(&self, user_id: &str) -> SchedulingOutcome {
        match self.scheduler.list_by_type(NEWSLETTER_SCHEDULE_EVENT).await {
            Ok(events) => {
                let outstanding: Vec<_> = events
                    .into_iter()
                    .filter(|event| event.payload.user_id == user_id)
                    .collect();
                info!(
                    "Preference for user {} paused with {} outstanding delivery event(s); they will be skipped at fire time",
                    user_id,
                    outstanding.len()
                );
                for event in &outstanding {
                    debug!(
                        "Outstanding event {} for user {} fires at {}",
                        event.event_id, user_id, event.fire_at
                    );
                }
                SchedulingOutcome::Inspected { outstanding }
            }
            Err(e) => {
                warn!(
                    "Failed to list outstanding delivery events for user {}: {}",
                    user_id, e
                );
                SchedulingOutcome::SoftFailure {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Resume bookkeeping: re-read the current row and schedule a fresh
    /// delivery from the current time.
    async fn reschedule(&self, user_id: &str) -> SchedulingOutcome {
        let current = match self.repository.get_by_user(user_id) {
            Ok(Some(preference)) => preference,
            Ok(None) => {
                warn!(
                    "Preference for user {} vanished before it could be rescheduled",
                    user_id
                );
                return SchedulingOutcome::SoftFailure {
                    reason: format!("No preference found for user {user_id}"),
                };
            }
            Err(e) => {
                warn!(
                    "Failed to re-read preference for user {} while resuming: {}",
                    user_id, e
                );
                return SchedulingOutcome::SoftFailure {
                    reason: e.to_string(),
                };
            }
        };

        match self.schedule_delivery(&current).await {
            Ok((event_id, fire_at)) => SchedulingOutcome::Scheduled { event_id, fire_at },
            Err(e) => {
                warn!(
                    "Failed to reschedule delivery for resumed user {}: {}",
                    user_id, e
                );
                SchedulingOutcome::SoftFailure {
                    reason: e.to_string(),
                }
            }
        }
    }
}

#[async_trait]
impl PreferenceServiceTrait for PreferenceService {
    fn get_preference(&self, session: &dyn AuthSession) -> Result<Option<UserPreference>> {
        let user = session.require_user()?;
        self.repository.get_by_user(&user.user_id)
    }

    async fn save_preference(
        &self,
        session: &dyn AuthSession,
        submission: PreferenceSubmission,
    ) -> Result<SavedPreference> {
        let user = session.require_user()?;
        let new_preference = submission.validate(&user)?;

        for category in &new_preference.categories {
            if !is_known_category(category) {
                debug!(
                    "User {} selected category '{}' outside the catalog",
                    user.user_id, category
                );
            }
        }

        let preference = self
            .repository
            .upsert(new_preference)
            .await
            .inspect_err(|e| {
                error!("Error saving preferences for user {}: {}", user.user_id, e);
            })?;

        // The row is committed at this point; a scheduling failure is
        // surfaced without rolling it back.
        let (event_id, fire_at) = self.schedule_delivery(&preference).await.inspect_err(|e| {
            error!(
                "Preferences for user {} saved but delivery scheduling failed: {}",
                user.user_id, e
            );
        })?;

        Ok(SavedPreference {
            preference,
            event_id,
            fire_at,
        })
    }

    async fn update_preference(
        &self,
        session: &dyn AuthSession,
        patch: PreferencePatch,
    ) -> Result<PreferenceUpdateOutcome> {
        let user = session.require_user()?;
        let Some(active) = patch.active else {
            return Err(ValidationError::MissingField("active".to_string()).into());
        };

        let preference = self.repository.update(&user.user_id, patch).await?;

        let scheduling = if active {
            self.reschedule(&user.user_id).await
        } else {
            self.inspect_outstanding(&user.user_id).await
        };

        Ok(PreferenceUpdateOutcome {
            preference,
            scheduling,
        })
    }
}
