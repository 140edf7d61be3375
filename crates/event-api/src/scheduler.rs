//! [`EventSchedulerTrait`] implementation backed by the remote event API.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use std::sync::Arc;

use newsletter_core::errors::{Result, SchedulingError};
use newsletter_core::events::{
    DeliveryPayload, EventSchedulerTrait, FireAt, ScheduledDeliveryEvent,
};
use newsletter_core::utils::{Clock, SystemClock};

use crate::client::EventApiClient;
use crate::error::EventApiError;
use crate::types::{EventEnvelope, StoredEvent};

pub struct EventApiScheduler {
    client: EventApiClient,
    clock: Arc<dyn Clock>,
}

impl EventApiScheduler {
    pub fn new(client: EventApiClient) -> Self {
        Self {
            client,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    fn decode(stored: StoredEvent) -> Option<ScheduledDeliveryEvent> {
        let fire_at = DateTime::<Utc>::from_timestamp_millis(stored.ts)?;
        match serde_json::from_value::<DeliveryPayload>(stored.data) {
            Ok(payload) => Some(ScheduledDeliveryEvent {
                event_id: stored.internal_id,
                event_type: stored.name,
                payload,
                fire_at,
            }),
            Err(e) => {
                warn!(
                    "Skipping event {} with undecodable payload: {}",
                    stored.internal_id, e
                );
                None
            }
        }
    }
}

#[async_trait]
impl EventSchedulerTrait for EventApiScheduler {
    async fn submit(
        &self,
        event_type: &str,
        payload: DeliveryPayload,
        fire_at: FireAt,
    ) -> Result<String> {
        let envelope = EventEnvelope {
            name: event_type.to_string(),
            data: serde_json::to_value(&payload).map_err(EventApiError::from)?,
            ts: fire_at.resolve(self.clock.now()).timestamp_millis(),
        };

        let response = self.client.send_events(&[envelope]).await?;
        let event_id = response.ids.into_iter().next().ok_or_else(|| {
            SchedulingError::InvalidResponse("Event API returned no event id".to_string())
        })?;

        debug!(
            "Event API accepted {} event {} for user {}",
            event_type, event_id, payload.user_id
        );
        Ok(event_id)
    }

    async fn list_by_type(&self, event_type: &str) -> Result<Vec<ScheduledDeliveryEvent>> {
        let response = self.client.list_events(event_type).await?;
        let now = self.clock.now();

        Ok(response
            .data
            .into_iter()
            .filter(|stored| stored.name == event_type)
            .filter_map(Self::decode)
            .filter(|event| event.fire_at > now)
            .collect())
    }
}
