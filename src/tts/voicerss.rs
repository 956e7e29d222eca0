use async_trait::async_trait;
use reqwest::Client;

use super::{AudioArtifact, SpeechProvider, SynthesisRequest};
use crate::error::AppError;

pub const DEFAULT_URL: &str = "https://api.voicerss.org/";

const SAMPLE_FORMAT: &str = "44khz_16bit_stereo";

/// VoiceRSS public API. The key travels in the query string, so request
/// errors are reported without their URL.
pub struct VoiceRssProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl VoiceRssProvider {
    pub fn new(client: Client, base_url: String, api_key: String) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }
}

/// Maps a speed multiplier onto the `-10..=10` rate scale, 1.0 being 0.
pub fn speech_rate(speed: f32) -> i32 {
    ((speed - 1.0) * 10.0).round().clamp(-10.0, 10.0) as i32
}

#[async_trait]
impl SpeechProvider for VoiceRssProvider {
    fn name(&self) -> &'static str {
        "voicerss"
    }

    fn min_audio_bytes(&self) -> usize {
        100
    }

    async fn synthesize(&self, request: &SynthesisRequest) -> Result<AudioArtifact, AppError> {
        let codec = request.format.to_uppercase();
        let rate = speech_rate(request.speed).to_string();

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("hl", request.voice.as_str()),
                ("src", request.text.as_str()),
                ("c", codec.as_str()),
                ("f", SAMPLE_FORMAT),
                ("r", rate.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Http(e.without_url()))?;

        if !response.status().is_success() {
            return Err(AppError::TtsError(format!(
                "TTS service error: {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::Http(e.without_url()))?;

        // Failures come back as a 200 with a plain-text "ERROR: ..." body
        if bytes.starts_with(b"ERROR") {
            let message = String::from_utf8_lossy(&bytes).trim().to_string();
            return Err(AppError::TtsError(format!("TTS service error: {}", message)));
        }

        Ok(AudioArtifact {
            bytes: bytes.to_vec(),
            format: request.format.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use axum::{extract::Query, http::StatusCode, routing::get, Router};

    use super::*;
    use crate::tts::test_support::{request, spawn_server};
    use crate::tts::TtsService;

    #[test]
    fn test_speech_rate() {
        assert_eq!(speech_rate(1.0), 0);
        assert_eq!(speech_rate(1.5), 5);
        assert_eq!(speech_rate(0.5), -5);
        assert_eq!(speech_rate(4.0), 10);
        assert_eq!(speech_rate(0.01), -10);
    }

    #[tokio::test]
    async fn test_sends_expected_query() {
        // Echo the query back so the test can inspect it
        let app = Router::new().route(
            "/",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                serde_json::to_vec(&params).unwrap()
            }),
        );
        let base_url = spawn_server(app).await;
        let provider = VoiceRssProvider::new(Client::new(), format!("{}/", base_url), "k3y".into());

        let artifact = provider.synthesize(&request("Hello & goodbye")).await.unwrap();
        let params: HashMap<String, String> = serde_json::from_slice(&artifact.bytes).unwrap();

        assert_eq!(params["key"], "k3y");
        assert_eq!(params["hl"], "en");
        assert_eq!(params["src"], "Hello & goodbye");
        assert_eq!(params["c"], "MP3");
        assert_eq!(params["f"], "44khz_16bit_stereo");
        assert_eq!(params["r"], "0");
        assert_eq!(artifact.format, "mp3");
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let app = Router::new().route("/", get(|| async { StatusCode::SERVICE_UNAVAILABLE }));
        let base_url = spawn_server(app).await;
        let provider = VoiceRssProvider::new(Client::new(), format!("{}/", base_url), "k".into());

        let err = provider.synthesize(&request("Hello")).await.unwrap_err();
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_in_band_error_is_an_error() {
        let app = Router::new().route(
            "/",
            get(|| async { "ERROR: The API key is not available!" }),
        );
        let base_url = spawn_server(app).await;
        let provider = VoiceRssProvider::new(Client::new(), format!("{}/", base_url), "k".into());

        let err = provider.synthesize(&request("Hello")).await.unwrap_err();
        assert!(err.to_string().contains("API key is not available"));
    }

    #[tokio::test]
    async fn test_threshold_is_one_hundred_bytes() {
        let app = Router::new().route("/", get(|| async { vec![0xFFu8; 99] }));
        let base_url = spawn_server(app).await;
        let provider = VoiceRssProvider::new(Client::new(), format!("{}/", base_url), "k".into());
        let service = TtsService::new(Arc::new(provider), None);

        let err = service.speak(&request("Hello")).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::AudioTooSmall {
                size: 99,
                minimum: 100
            }
        ));
    }
}
