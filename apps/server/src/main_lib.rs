use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use newsletter_core::{
    events::{EventSchedulerTrait, InMemoryEventScheduler},
    preferences::{PreferenceRepositoryTrait, PreferenceService, PreferenceServiceTrait},
    schedule::ScheduleCalculator,
};
use newsletter_event_api::{EventApiClient, EventApiConfig, EventApiScheduler};
use newsletter_storage_sqlite::{
    db::{self, write_actor},
    PreferenceRepository,
};

use crate::{auth::AuthManager, config::Config};

pub struct AppState {
    pub preference_service: Arc<dyn PreferenceServiceTrait>,
    pub preference_repository: Arc<dyn PreferenceRepositoryTrait>,
    /// Present when deliveries are queued in process instead of on the
    /// remote event API.
    pub local_scheduler: Option<Arc<InMemoryEventScheduler>>,
    pub auth: Arc<AuthManager>,
}

pub fn init_tracing() {
    let log_format = std::env::var("NL_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = write_actor::spawn_writer((*pool).clone());

    let preference_repository: Arc<dyn PreferenceRepositoryTrait> =
        Arc::new(PreferenceRepository::new(pool.clone(), writer));

    let (scheduler, local_scheduler): (
        Arc<dyn EventSchedulerTrait>,
        Option<Arc<InMemoryEventScheduler>>,
    ) = match &config.event_api {
        Some(settings) => {
            tracing::info!("Scheduling deliveries through event API at {}", settings.base_url);
            let mut api_config = EventApiConfig::new(&settings.base_url, &settings.event_key)
                .with_timeout(config.request_timeout);
            if let Some(signing_key) = &settings.signing_key {
                api_config = api_config.with_signing_key(signing_key);
            } else {
                tracing::warn!(
                    "NL_EVENT_SIGNING_KEY is not set; outstanding events cannot be listed on pause"
                );
            }
            let client = EventApiClient::new(api_config)?;
            (Arc::new(EventApiScheduler::new(client)), None)
        }
        None => {
            tracing::info!("No event API configured; deliveries are queued in process");
            let local = Arc::new(InMemoryEventScheduler::default());
            (local.clone(), Some(local))
        }
    };

    let calculator = ScheduleCalculator::new(config.delivery_timezone);
    let preference_service: Arc<dyn PreferenceServiceTrait> = Arc::new(
        PreferenceService::new(preference_repository.clone(), scheduler)
            .with_calculator(calculator),
    );

    Ok(Arc::new(AppState {
        preference_service,
        preference_repository,
        local_scheduler,
        auth: Arc::new(AuthManager::new(&config.jwt_secret)),
    }))
}
