use std::sync::Arc;

use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod error;
mod tts;

use api::routes::{create_router, AppState};
use config::{Config, ProviderConfig};
use tts::{
    CommandProvider, GoogleProvider, RelayProvider, SpeechProvider, TtsService, VoiceRssProvider,
};

fn build_provider(config: ProviderConfig, client: reqwest::Client) -> Arc<dyn SpeechProvider> {
    match config {
        ProviderConfig::VoiceRss { base_url, api_key } => {
            Arc::new(VoiceRssProvider::new(client, base_url, api_key))
        }
        ProviderConfig::Relay { url } => Arc::new(RelayProvider::new(client, url)),
        ProviderConfig::Google {
            base_url,
            user_agent,
        } => Arc::new(GoogleProvider::new(client, base_url, user_agent)),
        ProviderConfig::Command {
            program,
            args,
            scratch_dir,
        } => Arc::new(CommandProvider::new(program, args, scratch_dir)),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let addr = config.addr();

    tracing::info!("Speech relay v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Starting server on http://{}", addr);

    let client = reqwest::Client::builder().build()?;
    let provider = build_provider(config.provider, client);
    let tts = TtsService::new(provider, config.min_audio_bytes);
    tracing::info!(provider = tts.provider_name(), "TTS provider ready");

    let state = Arc::new(AppState { tts });
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
