use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::chat::ChatError;
use crate::recommendation::profile::ProfileError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    /// The occupation corpus failed to load at startup.
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Not configured: {0}")]
    NotConfigured(String),

    #[error("Degraded service: {0}")]
    Degraded(String),
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        match e {
            ChatError::Validation(msg) => AppError::Validation(msg),
            ChatError::NotConfigured(msg) => AppError::NotConfigured(msg),
            ChatError::Degraded(msg) => AppError::Degraded(msg),
        }
    }
}

impl From<ProfileError> for AppError {
    fn from(e: ProfileError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::DataUnavailable(reason) => {
                tracing::error!("Recommendation refused, corpus unavailable: {reason}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "DATA_UNAVAILABLE",
                    "Occupation data could not be loaded; recommendations are unavailable"
                        .to_string(),
                )
            }
            AppError::NotConfigured(msg) => {
                tracing::warn!("Chat refused, not configured: {msg}");
                (StatusCode::SERVICE_UNAVAILABLE, "NOT_CONFIGURED", msg.clone())
            }
            AppError::Degraded(msg) => {
                tracing::error!("Degraded service: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "DEGRADED_SERVICE",
                    "The assistant is temporarily unavailable, please try again later".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (AppError::DataUnavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE),
            (AppError::NotConfigured("x".into()), StatusCode::SERVICE_UNAVAILABLE),
            (AppError::Degraded("x".into()), StatusCode::BAD_GATEWAY),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn test_chat_errors_keep_their_kind() {
        assert!(matches!(
            AppError::from(ChatError::NotConfigured("language model".into())),
            AppError::NotConfigured(_)
        ));
        assert!(matches!(
            AppError::from(ChatError::Degraded("timeout".into())),
            AppError::Degraded(_)
        ));
    }
}
