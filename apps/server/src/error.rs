use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use newsletter_core::errors::{DatabaseError, Error as CoreError};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("Not Found")]
    NotFound,
    #[error("{0}")]
    BadRequest(String),
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

fn core_status(err: &CoreError) -> StatusCode {
    match err {
        CoreError::AuthenticationRequired => StatusCode::UNAUTHORIZED,
        CoreError::Validation(_) => StatusCode::BAD_REQUEST,
        CoreError::Database(DatabaseError::NotFound(_)) => StatusCode::NOT_FOUND,
        CoreError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        CoreError::Scheduling(_) => StatusCode::BAD_GATEWAY,
        CoreError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match &self {
            ApiError::Core(e) => (core_status(e), e.to_string()),
            ApiError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::BadRequest(reason) => (StatusCode::BAD_REQUEST, reason.clone()),
        };
        if status.is_server_error() {
            tracing::error!("Request failed with {}: {}", status, msg);
        }
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message: msg,
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use newsletter_core::errors::{SchedulingError, ValidationError};

    fn status_of(err: CoreError) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn test_core_errors_map_to_http_status() {
        assert_eq!(
            status_of(CoreError::AuthenticationRequired),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(ValidationError::EmptyCategories.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(DatabaseError::NotFound("x".into()).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(DatabaseError::QueryFailed("x".into()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(SchedulingError::Unreachable("x".into()).into()),
            StatusCode::BAD_GATEWAY
        );
    }
}
