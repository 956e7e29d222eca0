use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use super::{text_too_long, HealthResponse, SpeakRequest};
use crate::api::routes::AppState;
use crate::error::AppError;

pub async fn speak(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, AppError> {
    let body = body.map_err(body_rejection)?;
    let request = SpeakRequest::from_body(&body)?.validate()?;

    let artifact = state.tts.speak(&request).await?;

    let content_type = HeaderValue::from_str(&artifact.content_type())
        .map_err(|e| AppError::TtsError(format!("Invalid content type: {}", e)))?;
    let disposition =
        HeaderValue::from_str(&format!("attachment; filename=\"{}\"", artifact.filename()))
            .map_err(|e| AppError::TtsError(format!("Invalid filename: {}", e)))?;
    let length = HeaderValue::from(artifact.bytes.len());

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
            (header::CONTENT_LENGTH, length),
        ],
        artifact.bytes,
    )
        .into_response())
}

/// A body over the router's limit can only carry text over the character limit.
fn body_rejection(rejection: BytesRejection) -> AppError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        text_too_long()
    } else {
        AppError::BadRequest(rejection.body_text())
    }
}

/// CORS pre-flight. The CORS headers themselves are added by the router.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        provider: state.tts.provider_name().to_string(),
    })
}
