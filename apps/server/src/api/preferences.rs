use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use newsletter_core::auth::AuthSession;
use newsletter_core::preferences::{
    PreferencePatch, PreferenceSubmission, SchedulingOutcome, UserPreference,
};
use serde::Serialize;

use crate::{
    auth::CurrentUser,
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePreferenceResponse {
    pub success: bool,
    pub message: String,
    pub preference: UserPreference,
    pub event_id: String,
    pub fire_at: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePreferenceResponse {
    pub success: bool,
    pub preference: UserPreference,
    pub scheduling: SchedulingOutcome,
}

/// Unwraps a JSON body. Anonymous callers get 401 even when the body is
/// malformed.
fn json_body<T>(user: &CurrentUser, payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => {
            user.require_user()?;
            Err(ApiError::from(rejection))
        }
    }
}

async fn get_preference(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> ApiResult<Json<UserPreference>> {
    let preference = state
        .preference_service
        .get_preference(&user)?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(preference))
}

async fn save_preference(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    payload: Result<Json<PreferenceSubmission>, JsonRejection>,
) -> ApiResult<Json<SavePreferenceResponse>> {
    let submission = json_body(&user, payload)?;
    let saved = state
        .preference_service
        .save_preference(&user, submission)
        .await?;
    Ok(Json(SavePreferenceResponse {
        success: true,
        message: "Preferences saved successfully.".to_string(),
        preference: saved.preference,
        event_id: saved.event_id,
        fire_at: saved.fire_at,
    }))
}

async fn update_preference(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    payload: Result<Json<PreferencePatch>, JsonRejection>,
) -> ApiResult<Json<UpdatePreferenceResponse>> {
    let patch = json_body(&user, payload)?;
    let outcome = state
        .preference_service
        .update_preference(&user, patch)
        .await?;
    Ok(Json(UpdatePreferenceResponse {
        success: true,
        preference: outcome.preference,
        scheduling: outcome.scheduling,
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route(
        "/user-preferences",
        get(get_preference)
            .post(save_preference)
            .patch(update_preference),
    )
}
