use async_trait::async_trait;

use crate::errors::Result;
use crate::events::ScheduledDeliveryEvent;
use crate::preferences::UserPreference;

/// Sends one newsletter issue for an admitted event.
#[async_trait]
pub trait DeliveryHandlerTrait: Send + Sync {
    async fn deliver(
        &self,
        event: &ScheduledDeliveryEvent,
        preference: &UserPreference,
    ) -> Result<()>;
}
