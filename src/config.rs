use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::tts::{command, google, voicerss};

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is not valid: {value}")]
    Invalid { name: &'static str, value: String },

    #[error("Unknown TTS_PROVIDER '{0}' (expected voicerss, relay, google or command)")]
    UnknownProvider(String),
}

/// Which collaborator synthesizes audio. Fixed for the life of the process.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderConfig {
    VoiceRss {
        base_url: String,
        api_key: String,
    },
    Relay {
        url: String,
    },
    Google {
        base_url: String,
        user_agent: String,
    },
    Command {
        program: String,
        args: Vec<String>,
        scratch_dir: PathBuf,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub provider: ProviderConfig,
    pub min_audio_bytes: Option<usize>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host_raw = var("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let host = host_raw.parse().map_err(|_| ConfigError::Invalid {
            name: "HOST",
            value: host_raw.clone(),
        })?;

        let port_raw = var("PORT").unwrap_or_else(|| "3000".to_string());
        let port = port_raw.parse().map_err(|_| ConfigError::Invalid {
            name: "PORT",
            value: port_raw.clone(),
        })?;

        let min_audio_bytes = match var("TTS_MIN_AUDIO_BYTES") {
            Some(raw) => Some(raw.parse().map_err(|_| ConfigError::Invalid {
                name: "TTS_MIN_AUDIO_BYTES",
                value: raw.clone(),
            })?),
            None => None,
        };

        let provider_name = var("TTS_PROVIDER").unwrap_or_else(|| "voicerss".to_string());
        let provider = match provider_name.to_lowercase().as_str() {
            "voicerss" => ProviderConfig::VoiceRss {
                base_url: var("VOICERSS_URL")
                    .unwrap_or_else(|| voicerss::DEFAULT_URL.to_string()),
                api_key: var("VOICERSS_API_KEY")
                    .ok_or(ConfigError::Missing("VOICERSS_API_KEY"))?,
            },
            "relay" => ProviderConfig::Relay {
                url: var("TTS_RELAY_URL").ok_or(ConfigError::Missing("TTS_RELAY_URL"))?,
            },
            "google" => ProviderConfig::Google {
                base_url: var("GOOGLE_TTS_URL")
                    .unwrap_or_else(|| google::DEFAULT_URL.to_string()),
                user_agent: var("GOOGLE_TTS_USER_AGENT")
                    .unwrap_or_else(|| google::DEFAULT_USER_AGENT.to_string()),
            },
            "command" => {
                let command_line =
                    var("TTS_COMMAND").unwrap_or_else(|| command::DEFAULT_PROGRAM.to_string());
                let mut parts = command_line.split_whitespace().map(str::to_string);
                let program = parts.next().ok_or(ConfigError::Missing("TTS_COMMAND"))?;
                ProviderConfig::Command {
                    program,
                    args: parts.collect(),
                    scratch_dir: var("TTS_SCRATCH_DIR")
                        .map(PathBuf::from)
                        .unwrap_or_else(std::env::temp_dir),
                }
            }
            _ => return Err(ConfigError::UnknownProvider(provider_name)),
        };

        Ok(Self {
            host,
            port,
            provider,
            min_audio_bytes,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
