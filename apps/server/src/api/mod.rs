use std::sync::Arc;

use axum::{http::HeaderValue, routing::get, Json, Router};
use newsletter_core::preferences::catalog::{CategoryInfo, FrequencyInfo, CATEGORIES, FREQUENCIES};
use serde::Serialize;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{config::Config, main_lib::AppState};

pub mod preferences;

pub async fn healthz() -> &'static str {
    "ok"
}

#[derive(Serialize)]
pub struct CatalogResponse {
    pub categories: &'static [CategoryInfo],
    pub frequencies: &'static [FrequencyInfo],
}

pub async fn catalog() -> Json<CatalogResponse> {
    Json(CatalogResponse {
        categories: CATEGORIES,
        frequencies: FREQUENCIES,
    })
}

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let cors = if config.cors_allow.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins = config
            .cors_allow
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(origin) => Some(origin),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin '{}'", o);
                    None
                }
            })
            .collect::<Vec<_>>();
        CorsLayer::new().allow_origin(origins)
    }
    .allow_methods(Any)
    .allow_headers(Any);

    let api = Router::new()
        .route("/healthz", get(healthz))
        .route("/catalog", get(catalog))
        .merge(preferences::router());

    Router::new()
        .nest("/api/v1", api)
        .with_state(state)
        .layer(cors)
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
