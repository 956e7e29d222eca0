use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Invalid JSON body")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("{0}")]
    TtsError(String),

    #[error("Audio payload too small: {size} bytes (minimum {minimum})")]
    AudioTooSmall { size: usize, minimum: usize },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::TtsError(_)
            | AppError::AudioTooSmall { .. }
            | AppError::Http(_)
            | AppError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            AppError::BadRequest(msg) => ErrorResponse {
                error: msg.clone(),
                details: None,
            },
            AppError::InvalidJson(e) => ErrorResponse {
                error: self.to_string(),
                details: Some(e.to_string()),
            },
            AppError::MethodNotAllowed => ErrorResponse {
                error: self.to_string(),
                details: None,
            },
            _ => ErrorResponse {
                error: "Failed to generate audio".to_string(),
                details: Some(self.to_string()),
            },
        };

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "TTS API error: {}", self);
        } else {
            tracing::warn!(status = status.as_u16(), "Request rejected: {}", self);
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::BadRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::MethodNotAllowed.status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            AppError::AudioTooSmall { size: 3, minimum: 100 }.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_too_small_message_names_both_sizes() {
        let message = AppError::AudioTooSmall { size: 42, minimum: 1000 }.to_string();
        assert!(message.contains("42 bytes"));
        assert!(message.contains("minimum 1000"));
    }

    #[test]
    fn test_bad_request_body_has_no_details() {
        let body = ErrorResponse {
            error: "Text is required".into(),
            details: None,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({ "error": "Text is required" })
        );
    }
}
