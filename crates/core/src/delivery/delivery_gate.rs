use log::{debug, info, warn};
use std::sync::Arc;

use super::delivery_model::{DeliveryDecision, DispatchReport, SkipReason};
use super::delivery_traits::DeliveryHandlerTrait;
use crate::errors::Result;
use crate::events::ScheduledDeliveryEvent;
use crate::preferences::PreferenceRepositoryTrait;

/// Re-checks fired events against the preference store.
pub struct DeliveryGate {
    repository: Arc<dyn PreferenceRepositoryTrait>,
}

impl DeliveryGate {
    pub fn new(repository: Arc<dyn PreferenceRepositoryTrait>) -> Self {
        Self { repository }
    }

    /// Decides whether `event` should be delivered right now.
    pub fn admit(&self, event: &ScheduledDeliveryEvent) -> Result<DeliveryDecision> {
        let user_id = &event.payload.user_id;
        match self.repository.get_by_user(user_id)? {
            None => {
                debug!("Skipping event {}: user {} has no preference", event.event_id, user_id);
                Ok(DeliveryDecision::Skip(SkipReason::NoPreference))
            }
            Some(preference) if !preference.is_active => {
                debug!("Skipping event {}: user {} is paused", event.event_id, user_id);
                Ok(DeliveryDecision::Skip(SkipReason::Paused))
            }
            Some(preference) => Ok(DeliveryDecision::Deliver(preference)),
        }
    }
}

/// Runs fired events through the gate and hands admitted ones to `handler`.
///
/// A failing event is counted, logged and handed back in
/// [`DispatchReport::retry`]; the remaining events are still processed.
pub async fn dispatch(
    gate: &DeliveryGate,
    handler: &dyn DeliveryHandlerTrait,
    events: Vec<ScheduledDeliveryEvent>,
) -> DispatchReport {
    let mut report = DispatchReport::default();

    for event in events {
        let decision = match gate.admit(&event) {
            Ok(decision) => decision,
            Err(e) => {
                warn!("Failed to check preference for event {}: {}", event.event_id, e);
                report.summary.failed += 1;
                report.retry.push(event);
                continue;
            }
        };

        match decision {
            DeliveryDecision::Skip(_) => report.summary.skipped += 1,
            DeliveryDecision::Deliver(preference) => {
                let delivered = handler.deliver(&event, &preference).await;
                match delivered {
                    Ok(()) => report.summary.delivered += 1,
                    Err(e) => {
                        warn!("Delivery of event {} failed: {}", event.event_id, e);
                        report.summary.failed += 1;
                        report.retry.push(event);
                    }
                }
            }
        }
    }

    let summary = report.summary;
    if summary.total() > 0 {
        info!(
            "Dispatched {} event(s): {} delivered, {} skipped, {} failed",
            summary.total(),
            summary.delivered,
            summary.skipped,
            summary.failed
        );
    }
    report
}
