/// Voice service binary
///
/// Standalone probe for the speech services: verifies credentials,
/// lists available voices, and stays up for supervision.

use anyhow::Context;
use tracing::{error, info, warn};
use voice_session::ElevenLabsClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("voice_session=info".parse().unwrap()),
        )
        .init();

    info!("Starting voice service");

    let client = ElevenLabsClient::from_env();

    if client.is_configured() {
        match client.voices().await {
            Ok(voices) => {
                info!("Speech services reachable: {} voices available", voices.len());
                for voice in voices.iter().take(5) {
                    info!("  voice {}: {}", voice.voice_id, voice.name);
                }
            }
            Err(e) => {
                error!("Failed to reach speech services: {}", e);
            }
        }
    } else {
        warn!("No API key configured; synthesis and transcription are disabled");
    }

    info!("Voice service initialized");

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;

    info!("Shutting down voice service");
    Ok(())
}
