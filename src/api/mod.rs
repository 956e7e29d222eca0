pub mod handlers;
pub mod routes;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::tts::SynthesisRequest;

pub const MAX_TEXT_CHARS: usize = 5000;

lazy_static! {
    // Language tags such as "en", "en-us" or "pt_BR"
    static ref VOICE_REGEX: Regex = Regex::new(r"^[A-Za-z]{2,3}([-_][A-Za-z0-9]{2,8})*$").unwrap();
    static ref FORMAT_REGEX: Regex = Regex::new(r"^[A-Za-z0-9]{1,8}$").unwrap();
}

#[derive(Debug, Deserialize)]
pub struct SpeakRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default = "default_voice")]
    pub voice: String,
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default = "default_speed")]
    pub speed: f32,
}

fn default_voice() -> String {
    "en".to_string()
}

fn default_format() -> String {
    "mp3".to_string()
}

fn default_speed() -> f32 {
    1.0
}

pub fn text_too_long() -> AppError {
    AppError::BadRequest(format!(
        "Text too long (max {} characters)",
        MAX_TEXT_CHARS
    ))
}

impl SpeakRequest {
    /// Parses a raw request body. An empty body counts as `{}`.
    pub fn from_body(body: &[u8]) -> Result<Self, AppError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::from_str("{}")?);
        }
        Ok(serde_json::from_slice(body)?)
    }

    pub fn validate(self) -> Result<SynthesisRequest, AppError> {
        let text = match self.text {
            Some(text) if !text.is_empty() => text,
            _ => return Err(AppError::BadRequest("Text is required".into())),
        };

        if text.chars().count() > MAX_TEXT_CHARS {
            return Err(text_too_long());
        }

        if !VOICE_REGEX.is_match(&self.voice) {
            return Err(AppError::BadRequest(format!("Invalid voice: {}", self.voice)));
        }

        if !FORMAT_REGEX.is_match(&self.format) {
            return Err(AppError::BadRequest(format!(
                "Invalid format: {}",
                self.format
            )));
        }

        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err(AppError::BadRequest(
                "Speed must be a positive number".into(),
            ));
        }

        Ok(SynthesisRequest {
            text,
            voice: self.voice,
            format: self.format.to_ascii_lowercase(),
            speed: self.speed,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub provider: String,
}
