use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use super::{AudioArtifact, SpeechProvider, SynthesisRequest};
use crate::error::AppError;

#[derive(Debug, Serialize)]
struct RelayRequest<'a> {
    text: &'a str,
    voice: &'a str,
    format: &'a str,
}

/// Forwards the job to another TTS service that speaks the same JSON shape.
pub struct RelayProvider {
    client: Client,
    url: String,
}

impl RelayProvider {
    pub fn new(client: Client, url: String) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl SpeechProvider for RelayProvider {
    fn name(&self) -> &'static str {
        "relay"
    }

    fn min_audio_bytes(&self) -> usize {
        100
    }

    async fn synthesize(&self, request: &SynthesisRequest) -> Result<AudioArtifact, AppError> {
        let body = RelayRequest {
            text: &request.text,
            voice: &request.voice,
            format: &request.format,
        };

        let response = self.client.post(&self.url).json(&body).send().await?;

        if !response.status().is_success() {
            return Err(AppError::TtsError(format!(
                "TTS service error: {}",
                response.status()
            )));
        }

        let bytes = response.bytes().await?;

        Ok(AudioArtifact {
            bytes: bytes.to_vec(),
            format: request.format.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::Value;

    use super::*;
    use crate::tts::test_support::{request, spawn_server};

    #[tokio::test]
    async fn test_posts_json_body() {
        let app = Router::new().route(
            "/tts",
            post(|Json(body): Json<Value>| async move { serde_json::to_vec(&body).unwrap() }),
        );
        let base_url = spawn_server(app).await;
        let provider = RelayProvider::new(Client::new(), format!("{}/tts", base_url));

        let artifact = provider.synthesize(&request("Hello world")).await.unwrap();
        let echoed: Value = serde_json::from_slice(&artifact.bytes).unwrap();

        assert_eq!(
            echoed,
            serde_json::json!({ "text": "Hello world", "voice": "en", "format": "mp3" })
        );
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let app = Router::new().route(
            "/tts",
            post(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
        );
        let base_url = spawn_server(app).await;
        let provider = RelayProvider::new(Client::new(), format!("{}/tts", base_url));

        let err = provider.synthesize(&request("Hello")).await.unwrap_err();
        assert!(err.to_string().contains("502"));
    }

    #[tokio::test]
    async fn test_unreachable_relay_is_an_error() {
        // Port 9 (discard) is not expected to accept HTTP connections locally
        let provider = RelayProvider::new(Client::new(), "http://127.0.0.1:9/tts".into());

        let err = provider.synthesize(&request("Hello")).await.unwrap_err();
        assert!(matches!(err, AppError::Http(_)));
    }
}
