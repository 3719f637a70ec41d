use crate::orchestration::SessionError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Upstream error: {0}")]
    Upstream(String),
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotConnected | SessionError::Transition(_) => {
                AppError::Conflict(err.to_string())
            }
            SessionError::InvalidAmount(_) | SessionError::ZeroAmount => {
                AppError::BadRequest(err.to_string())
            }
            SessionError::Withdraw(_) => AppError::Upstream(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::DataSourceError;

    #[test]
    fn test_session_error_mapping() {
        let status = |e: SessionError| AppError::from(e).into_response().status();
        assert_eq!(status(SessionError::NotConnected), StatusCode::CONFLICT);
        assert_eq!(status(SessionError::ZeroAmount), StatusCode::BAD_REQUEST);
        assert_eq!(
            status(SessionError::Withdraw(DataSourceError::RateLimited)),
            StatusCode::BAD_GATEWAY
        );
    }
}
