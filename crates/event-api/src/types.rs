//! Wire types for the event API.

use serde::{Deserialize, Serialize};

/// One event in an ingestion batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub name: String,
    pub data: serde_json::Value,
    /// Fire time in epoch milliseconds.
    pub ts: i64,
}

/// Response to an ingestion batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendEventsResponse {
    #[serde(default)]
    pub ids: Vec<String>,
    pub status: u16,
}

/// An event as returned by the listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredEvent {
    pub internal_id: String,
    pub name: String,
    pub data: serde_json::Value,
    pub ts: i64,
}

/// Response of the listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListEventsResponse {
    #[serde(default)]
    pub data: Vec<StoredEvent>,
}

/// Error body returned by the event API on failures, when it returns one.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: String,
}
