//! ElevenLabs speech services
//!
//! HTTP implementations of the synthesis and transcription seams.
//! Construction never fails: a missing API key surfaces per call so the
//! session can degrade instead of crashing.

use crate::session::{AudioClip, SpeechSynthesizer, Transcriber, VoiceError};
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Rachel, a warm and friendly default voice
pub const DEFAULT_VOICE_ID: &str = "21m00Tcm4TlvDq8ikWAM";

const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io";
const TTS_MODEL: &str = "eleven_multilingual_v2";
const STT_MODEL: &str = "scribe_v1";

/// ElevenLabs API errors
#[derive(Error, Debug)]
pub enum ElevenLabsError {
    #[error("API key not configured")]
    MissingApiKey,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Synthesis tuning for natural conversation
#[derive(Debug, Clone, Serialize)]
pub struct VoiceSettings {
    pub stability: f32,
    pub similarity_boost: f32,
    pub style: f32,
    pub use_speaker_boost: bool,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: 0.5,
            similarity_boost: 0.75,
            style: 0.5,
            use_speaker_boost: true,
        }
    }
}

#[derive(Debug, Serialize)]
struct TtsRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: &'a VoiceSettings,
}

#[derive(Debug, Deserialize)]
struct SttResponse {
    #[serde(default)]
    text: String,
}

/// An available synthesis voice
#[derive(Debug, Clone, Deserialize)]
pub struct Voice {
    pub voice_id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct VoicesResponse {
    #[serde(default)]
    voices: Vec<Voice>,
}

/// ElevenLabs TTS/STT client
pub struct ElevenLabsClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    settings: VoiceSettings,
}

impl ElevenLabsClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            settings: VoiceSettings::default(),
        }
    }

    /// Build a client from the `ELEVENLABS_API_KEY` environment variable
    pub fn from_env() -> Self {
        let api_key = std::env::var("ELEVENLABS_API_KEY").unwrap_or_default();
        if api_key.is_empty() {
            warn!("ELEVENLABS_API_KEY not set; voice features will be disabled");
        }
        Self::new(api_key)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_settings(mut self, settings: VoiceSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Whether credentials are present
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Convert text to speech, returning the raw audio payload
    pub async fn text_to_speech(
        &self,
        text: &str,
        voice_id: &str,
    ) -> Result<Bytes, ElevenLabsError> {
        if !self.is_configured() {
            return Err(ElevenLabsError::MissingApiKey);
        }

        debug!("TTS request: {} chars", text.len());

        let response = self
            .client
            .post(format!("{}/v1/text-to-speech/{}", self.base_url, voice_id))
            .header("xi-api-key", &self.api_key)
            .header("Accept", "audio/mpeg")
            .json(&TtsRequest {
                text,
                model_id: TTS_MODEL,
                voice_settings: &self.settings,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ElevenLabsError::Api { status, body });
        }

        let audio = response.bytes().await?;
        debug!("TTS response: {} bytes", audio.len());
        Ok(audio)
    }

    /// Transcribe a recorded clip. An empty transcript is a valid
    /// outcome (no speech detected).
    pub async fn speech_to_text(&self, clip: &AudioClip) -> Result<String, ElevenLabsError> {
        if !self.is_configured() {
            return Err(ElevenLabsError::MissingApiKey);
        }

        let file = reqwest::multipart::Part::bytes(clip.data.to_vec())
            .file_name("recording.webm")
            .mime_str(&clip.mime_type)?;

        let form = reqwest::multipart::Form::new()
            .part("file", file)
            .text("model_id", STT_MODEL);

        let response = self
            .client
            .post(format!("{}/v1/speech-to-text", self.base_url))
            .header("xi-api-key", &self.api_key)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ElevenLabsError::Api { status, body });
        }

        let parsed: SttResponse = response
            .json()
            .await
            .map_err(|e| ElevenLabsError::InvalidResponse(e.to_string()))?;

        Ok(parsed.text)
    }

    /// List available synthesis voices
    pub async fn voices(&self) -> Result<Vec<Voice>, ElevenLabsError> {
        if !self.is_configured() {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .get(format!("{}/v1/voices", self.base_url))
            .header("xi-api-key", &self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ElevenLabsError::Api { status, body });
        }

        let parsed: VoicesResponse = response
            .json()
            .await
            .map_err(|e| ElevenLabsError::InvalidResponse(e.to_string()))?;

        Ok(parsed.voices)
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsClient {
    fn is_available(&self) -> bool {
        self.is_configured()
    }

    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<Bytes, VoiceError> {
        self.text_to_speech(text, voice_id)
            .await
            .map_err(|e| match e {
                ElevenLabsError::MissingApiKey => VoiceError::Configuration,
                other => VoiceError::Synthesis(other.to_string()),
            })
    }
}

#[async_trait]
impl Transcriber for ElevenLabsClient {
    fn is_available(&self) -> bool {
        self.is_configured()
    }

    async fn transcribe(&self, clip: &AudioClip) -> Result<String, VoiceError> {
        self.speech_to_text(clip).await.map_err(|e| match e {
            ElevenLabsError::MissingApiKey => VoiceError::Configuration,
            other => VoiceError::Transcription(other.to_string()),
        })
    }
}
