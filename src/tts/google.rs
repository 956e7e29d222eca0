use async_trait::async_trait;
use reqwest::{header, Client};

use super::{AudioArtifact, SpeechProvider, SynthesisRequest};
use crate::error::AppError;

pub const DEFAULT_URL: &str = "https://translate.google.com/translate_tts";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Google Translate's unauthenticated speech endpoint. Always answers with MP3.
pub struct GoogleProvider {
    client: Client,
    base_url: String,
    user_agent: String,
}

impl GoogleProvider {
    pub fn new(client: Client, base_url: String, user_agent: String) -> Self {
        Self {
            client,
            base_url,
            user_agent,
        }
    }
}

#[async_trait]
impl SpeechProvider for GoogleProvider {
    fn name(&self) -> &'static str {
        "google"
    }

    fn min_audio_bytes(&self) -> usize {
        1000
    }

    async fn synthesize(&self, request: &SynthesisRequest) -> Result<AudioArtifact, AppError> {
        let speed = request.speed.to_string();
        let text_len = request.text.chars().count().to_string();

        let response = self
            .client
            .get(&self.base_url)
            .header(header::USER_AGENT, &self.user_agent)
            .query(&[
                ("ie", "UTF-8"),
                ("q", request.text.as_str()),
                ("tl", request.voice.as_str()),
                ("client", "tw-ob"),
                ("ttsspeed", speed.as_str()),
                ("total", "1"),
                ("idx", "0"),
                ("textlen", text_len.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::TtsError(format!(
                "TTS service error: {}",
                response.status()
            )));
        }

        let bytes = response.bytes().await?;

        Ok(AudioArtifact {
            bytes: bytes.to_vec(),
            format: "mp3".to_string(),
        })
    }
}
