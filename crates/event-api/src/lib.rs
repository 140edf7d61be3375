//! Remote event API adapter.
//!
//! Implements [`newsletter_core::events::EventSchedulerTrait`] on top of an
//! HTTP event-delivery service: events are posted to an ingestion endpoint
//! keyed by an event key, and pending events are listed through a management
//! endpoint authenticated with a signing key.

mod client;
mod error;
mod scheduler;
mod types;

pub use client::{EventApiClient, EventApiConfig};
pub use error::{EventApiError, Result};
pub use scheduler::EventApiScheduler;
pub use types::*;
