//! HTTP client for the remote event API.

use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use std::time::Duration;

use crate::error::{EventApiError, Result};
use crate::types::*;

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the event API.
#[derive(Debug, Clone)]
pub struct EventApiConfig {
    /// Base URL of the event API (e.g. "https://events.example.com").
    pub base_url: String,
    /// Key identifying the ingestion endpoint.
    pub event_key: String,
    /// Key for the management endpoints. Listing fails without it.
    pub signing_key: Option<String>,
    pub timeout: Duration,
}

impl EventApiConfig {
    pub fn new(base_url: impl Into<String>, event_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            event_key: event_key.into(),
            signing_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_signing_key(mut self, signing_key: impl Into<String>) -> Self {
        self.signing_key = Some(signing_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Client for the event ingestion and listing endpoints.
#[derive(Debug, Clone)]
pub struct EventApiClient {
    client: reqwest::Client,
    base_url: String,
    event_key: String,
    signing_key: Option<String>,
}

impl EventApiClient {
    pub fn new(config: EventApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            event_key: config.event_key,
            signing_key: config.signing_key,
        })
    }

    /// Headers for the management endpoints.
    fn management_headers(&self) -> Result<HeaderMap> {
        let signing_key = self
            .signing_key
            .as_deref()
            .ok_or_else(|| EventApiError::config("Event API signing key is not configured"))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let auth_value = HeaderValue::from_str(&format!("Bearer {}", signing_key))
            .map_err(|_| EventApiError::config("Invalid signing key format"))?;
        headers.insert(AUTHORIZATION, auth_value);
        Ok(headers)
    }

    /// Parse a JSON response body.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;
        debug!("Event API response ({}): {}", status, body);

        if !status.is_success() {
            if let Ok(error) = serde_json::from_str::<ApiErrorResponse>(&body) {
                return Err(EventApiError::api(status.as_u16(), error.error));
            }
            return Err(EventApiError::api(
                status.as_u16(),
                format!("Request failed: {}", body),
            ));
        }

        serde_json::from_str(&body).map_err(|e| {
            log::error!(
                "Failed to deserialize event API response. Body: {}, Error: {}",
                body,
                e
            );
            EventApiError::Json(e)
        })
    }

    /// Send a batch of events.
    ///
    /// POST /e/{eventKey}
    pub async fn send_events(&self, events: &[EventEnvelope]) -> Result<SendEventsResponse> {
        let url = format!(
            "{}/e/{}",
            self.base_url,
            urlencoding::encode(&self.event_key)
        );
        debug!("Sending {} event(s) to event API", events.len());

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .json(events)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// List recorded events with the given name.
    ///
    /// GET /v1/events?name={name}
    pub async fn list_events(&self, name: &str) -> Result<ListEventsResponse> {
        let url = format!(
            "{}/v1/events?name={}",
            self.base_url,
            urlencoding::encode(name)
        );

        let response = self
            .client
            .get(&url)
            .headers(self.management_headers()?)
            .send()
            .await?;

        Self::parse_response(response).await
    }
}
