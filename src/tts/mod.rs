pub mod command;
pub mod google;
pub mod relay;
pub mod voicerss;

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use crate::error::AppError;

pub use command::CommandProvider;
pub use google::GoogleProvider;
pub use relay::RelayProvider;
pub use voicerss::VoiceRssProvider;

/// A validated synthesis job. Lives for one request only.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisRequest {
    pub text: String,
    pub voice: String,
    pub format: String,
    pub speed: f32,
}

/// Audio bytes returned by a provider, tagged with their format.
#[derive(Debug, Clone)]
pub struct AudioArtifact {
    pub bytes: Vec<u8>,
    pub format: String,
}

impl AudioArtifact {
    pub fn content_type(&self) -> String {
        match self.format.as_str() {
            "mp3" => "audio/mpeg".to_string(),
            other => format!("audio/{}", other),
        }
    }

    pub fn filename(&self) -> String {
        format!("voice_message.{}", self.format)
    }
}

/// An external collaborator that turns text into audio.
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Artifacts below this size are treated as failures.
    fn min_audio_bytes(&self) -> usize;

    async fn synthesize(&self, request: &SynthesisRequest) -> Result<AudioArtifact, AppError>;
}

pub struct TtsService {
    provider: Arc<dyn SpeechProvider>,
    min_audio_bytes: usize,
}

impl TtsService {
    pub fn new(provider: Arc<dyn SpeechProvider>, min_audio_bytes: Option<usize>) -> Self {
        let min_audio_bytes = min_audio_bytes.unwrap_or_else(|| provider.min_audio_bytes());
        Self {
            provider,
            min_audio_bytes,
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    pub async fn speak(&self, request: &SynthesisRequest) -> Result<AudioArtifact, AppError> {
        let start_time = Instant::now();

        tracing::info!(
            provider = self.provider.name(),
            voice = %request.voice,
            format = %request.format,
            speed = request.speed,
            text_length = request.text.chars().count(),
            "TTS synthesis request"
        );

        let artifact = self.provider.synthesize(request).await?;

        if artifact.bytes.len() < self.min_audio_bytes {
            return Err(AppError::AudioTooSmall {
                size: artifact.bytes.len(),
                minimum: self.min_audio_bytes,
            });
        }

        tracing::info!(
            provider = self.provider.name(),
            audio_size_bytes = artifact.bytes.len(),
            latency_ms = start_time.elapsed().as_millis() as u64,
            "TTS synthesis completed"
        );

        Ok(artifact)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{request, FakeProvider};
    use super::*;

    #[test]
    fn test_content_type_for_mp3() {
        let artifact = AudioArtifact {
            bytes: Vec::new(),
            format: "mp3".into(),
        };
        assert_eq!(artifact.content_type(), "audio/mpeg");
        assert_eq!(artifact.filename(), "voice_message.mp3");
    }

    #[test]
    fn test_content_type_passthrough() {
        let artifact = AudioArtifact {
            bytes: Vec::new(),
            format: "ogg".into(),
        };
        assert_eq!(artifact.content_type(), "audio/ogg");
    }

    #[tokio::test]
    async fn test_speak_returns_payload_unchanged() {
        let payload: Vec<u8> = (0..4000u32).map(|i| (i % 251) as u8).collect();
        let service = TtsService::new(Arc::new(FakeProvider::returning(payload.clone())), None);

        let artifact = service.speak(&request("Hello world")).await.unwrap();
        assert_eq!(artifact.bytes, payload);
    }

    #[tokio::test]
    async fn test_speak_rejects_undersized_audio() {
        let service = TtsService::new(Arc::new(FakeProvider::returning(vec![0; 99])), None);

        let err = service.speak(&request("Hello")).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::AudioTooSmall {
                size: 99,
                minimum: 100
            }
        ));
    }

    #[tokio::test]
    async fn test_override_minimum() {
        let provider = Arc::new(FakeProvider::returning(vec![0; 500]));
        let service = TtsService::new(provider, Some(1000));

        let err = service.speak(&request("Hello")).await.unwrap_err();
        assert!(matches!(err, AppError::AudioTooSmall { minimum: 1000, .. }));
    }

    #[tokio::test]
    async fn test_provider_failure_propagates() {
        let provider = Arc::new(FakeProvider::failing("TTS service error: 503"));
        let service = TtsService::new(provider.clone(), None);

        let err = service.speak(&request("Hello")).await.unwrap_err();
        assert_eq!(err.to_string(), "TTS service error: 503");
        assert_eq!(provider.calls(), 1);
    }
}
