use anyhow::{bail, Context};
use chrono_tz::Tz;
use std::{net::SocketAddr, time::Duration};

use crate::auth::decode_secret_key;

/// Connection settings for the remote event API. When absent, deliveries are
/// queued in process and fired by the local dispatcher.
#[derive(Debug, Clone)]
pub struct EventApiSettings {
    pub base_url: String,
    pub event_key: String,
    pub signing_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub jwt_secret: Vec<u8>,
    pub delivery_timezone: Tz,
    pub event_api: Option<EventApiSettings>,
    pub dispatch_interval: Duration,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let listen_addr: SocketAddr = env_or("NL_LISTEN_ADDR", "0.0.0.0:8080")
            .parse()
            .context("Invalid NL_LISTEN_ADDR")?;
        let db_path = env_or("NL_DB_PATH", "./db/newsletter.db");
        let cors_allow = env_or("NL_CORS_ALLOW_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = env_or("NL_REQUEST_TIMEOUT_MS", "30000")
            .parse()
            .unwrap_or(30000);

        let Some(raw_secret) = env_opt("NL_JWT_SECRET") else {
            bail!("NL_JWT_SECRET must be set");
        };
        let jwt_secret = decode_secret_key(&raw_secret).context("Invalid NL_JWT_SECRET")?;

        let delivery_timezone: Tz = env_or("NL_DELIVERY_TIMEZONE", "UTC")
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid NL_DELIVERY_TIMEZONE: {e}"))?;

        let event_api = match env_opt("NL_EVENT_API_URL") {
            Some(base_url) => {
                let Some(event_key) = env_opt("NL_EVENT_KEY") else {
                    bail!("NL_EVENT_KEY must be set when NL_EVENT_API_URL is configured");
                };
                Some(EventApiSettings {
                    base_url,
                    event_key,
                    signing_key: env_opt("NL_EVENT_SIGNING_KEY"),
                })
            }
            None => None,
        };

        let dispatch_secs: u64 = env_or("NL_DISPATCH_INTERVAL_SECS", "60")
            .parse()
            .unwrap_or(60);

        Ok(Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            jwt_secret,
            delivery_timezone,
            event_api,
            dispatch_interval: Duration::from_secs(dispatch_secs.max(1)),
        })
    }
}
