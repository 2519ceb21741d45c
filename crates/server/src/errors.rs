use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::types::ApiResponse;
use service::auth::AuthError;
use thiserror::Error;
use tracing::{error, warn};

pub const INTERNAL_ERROR: &str = "Internal server error";

/// Error returned by every handler; rendered as the `{success, message}`
/// envelope with the matching status code.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Auth(e) => match e {
                AuthError::Validation(_) | AuthError::Conflict(_) | AuthError::InvalidCode(_) => StatusCode::BAD_REQUEST,
                AuthError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
                AuthError::NotFound(_) => StatusCode::NOT_FOUND,
                AuthError::HashError(_) | AuthError::TokenError(_) | AuthError::Email(_) | AuthError::Repository(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Auth(e) if e.is_internal() => {
                error!(code = e.code(), error = %e, "request failed");
                INTERNAL_ERROR.to_string()
            }
            ApiError::Auth(e) => {
                warn!(code = e.code(), status = status.as_u16(), message = %e, "request rejected");
                e.to_string()
            }
            other => {
                warn!(status = status.as_u16(), message = %other, "request rejected");
                other.to_string()
            }
        };
        (status, Json(ApiResponse::<()>::failure(message))).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("email transport misconfigured: {0}")]
    Email(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_keep_their_status() {
        assert_eq!(ApiError::from(AuthError::validation("x")).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::from(AuthError::Conflict("x".into())).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::from(AuthError::InvalidCode("x".into())).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::from(AuthError::unauthorized("x")).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::from(AuthError::not_found("x")).status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn downstream_failures_are_500() {
        let resp = ApiError::from(AuthError::Repository("connection reset".into())).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let resp = ApiError::from(AuthError::Email("smtp down".into())).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
