//! Voice session state machine
//!
//! Coordinates microphone capture, transcription and speech playback.
//! Listening and speaking are mutually exclusive; starting one preempts
//! the other. Only one transcription may be in flight, and commands that
//! arrive while transcribing are ignored until it resolves.

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Voice session errors
#[derive(Error, Debug)]
pub enum VoiceError {
    #[error("Voice capability unavailable: {0}")]
    Capability(String),

    #[error("Voice service API key not configured")]
    Configuration,

    #[error("Audio capture failed: {0}")]
    Capture(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Speech synthesis failed: {0}")]
    Synthesis(String),

    #[error("Playback failed: {0}")]
    Playback(String),
}

/// Session state, poll-able via [`VoiceSession::state`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Listening,
    Transcribing,
    Speaking,
}

/// Events a UI surface can subscribe to
#[derive(Debug, Clone, PartialEq)]
pub enum VoiceEvent {
    ListeningChanged(bool),
    SpeakingChanged(bool),
    TranscribingChanged(bool),

    /// A finalized user utterance, emitted exactly once per successful
    /// transcription
    TranscriptFinalized(String),

    Error(String),
}

/// A recorded audio clip
#[derive(Debug, Clone)]
pub struct AudioClip {
    pub data: Bytes,
    pub duration_ms: u64,
    pub mime_type: String,
}

/// Microphone capture device. The session owns the only handle;
/// `stop` must release the hardware on every path.
#[async_trait]
pub trait AudioCapture: Send + Sync {
    /// Whether capture is available at all on this platform
    fn is_supported(&self) -> bool;

    async fn start(&self) -> Result<(), VoiceError>;

    async fn stop(&self) -> Result<AudioClip, VoiceError>;
}

/// Speech-to-text service
#[async_trait]
pub trait Transcriber: Send + Sync {
    fn is_available(&self) -> bool {
        true
    }

    /// Empty or whitespace-only text means "no speech detected",
    /// not an error
    async fn transcribe(&self, clip: &AudioClip) -> Result<String, VoiceError>;
}

/// Text-to-speech service
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    fn is_available(&self) -> bool {
        true
    }

    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<Bytes, VoiceError>;
}

/// Audio output. `play` resolves when playback finishes naturally;
/// cancellation is handled by the session.
#[async_trait]
pub trait AudioPlayback: Send + Sync {
    async fn play(&self, audio: Bytes) -> Result<(), VoiceError>;
}

/// Voice feature support, probed at initialization so the surface can
/// gate affordances off instead of failing per call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceSupport {
    pub tts: bool,
    pub stt: bool,
    pub fully_supported: bool,
}

/// Session configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// Voice used for synthesis
    pub voice_id: String,

    /// Clips shorter than this are discarded without transcribing,
    /// avoiding spurious empty submissions
    pub min_clip_duration_ms: u64,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            voice_id: crate::elevenlabs::DEFAULT_VOICE_ID.to_string(),
            min_clip_duration_ms: 300,
        }
    }
}

impl VoiceConfig {
    pub fn validate(&self) -> Result<(), VoiceError> {
        if self.voice_id.trim().is_empty() {
            return Err(VoiceError::Capability(
                "Voice id must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

struct SessionInner {
    phase: SessionState,
    playback_cancel: Option<CancellationToken>,
}

/// Voice session coordinating capture, transcription and playback.
///
/// Shareable across tasks; every public operation converts failures at
/// this boundary and always leaves the session in a safe state.
pub struct VoiceSession {
    capture: Arc<dyn AudioCapture>,
    transcriber: Arc<dyn Transcriber>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    playback: Arc<dyn AudioPlayback>,
    config: VoiceConfig,
    state: Arc<RwLock<SessionInner>>,
    event_tx: mpsc::UnboundedSender<VoiceEvent>,
    event_rx: Arc<RwLock<mpsc::UnboundedReceiver<VoiceEvent>>>,
}

impl VoiceSession {
    pub fn new(
        capture: Arc<dyn AudioCapture>,
        transcriber: Arc<dyn Transcriber>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        playback: Arc<dyn AudioPlayback>,
        config: VoiceConfig,
    ) -> Result<Self, VoiceError> {
        config.validate()?;

        info!(
            "Initializing voice session (voice: {}, min clip: {}ms)",
            config.voice_id, config.min_clip_duration_ms
        );

        let (event_tx, event_rx) = mpsc::unbounded_channel();

        Ok(Self {
            capture,
            transcriber,
            synthesizer,
            playback,
            config,
            state: Arc::new(RwLock::new(SessionInner {
                phase: SessionState::Idle,
                playback_cancel: None,
            })),
            event_tx,
            event_rx: Arc::new(RwLock::new(event_rx)),
        })
    }

    /// Current state
    pub async fn state(&self) -> SessionState {
        self.state.read().await.phase
    }

    /// Probe which voice features are usable
    pub fn support(&self) -> VoiceSupport {
        let tts = self.synthesizer.is_available();
        let stt = self.transcriber.is_available() && self.capture.is_supported();
        VoiceSupport {
            tts,
            stt,
            fully_supported: tts && stt,
        }
    }

    /// Get the next event (non-blocking)
    pub async fn try_recv_event(&self) -> Option<VoiceEvent> {
        let mut rx = self.event_rx.write().await;
        rx.try_recv().ok()
    }

    /// Get the next event (blocking)
    pub async fn recv_event(&self) -> Option<VoiceEvent> {
        let mut rx = self.event_rx.write().await;
        rx.recv().await
    }

    /// Begin audio capture.
    ///
    /// No-op while already listening or while a transcription is in
    /// flight. Preempts speaking. Reports a capability error and stays
    /// idle when capture is unsupported or permission is denied.
    pub async fn start_listening(&self) -> Result<(), VoiceError> {
        // Read the phase into a local so the guard is not held across
        // the awaits below
        let phase = self.state.read().await.phase;
        match phase {
            SessionState::Listening => {
                warn!("Already listening");
                return Ok(());
            }
            SessionState::Transcribing => {
                debug!("start_listening ignored while transcribing");
                return Ok(());
            }
            SessionState::Speaking => {
                self.stop_speaking().await;
            }
            SessionState::Idle => {}
        }

        if !self.capture.is_supported() {
            let message = "Microphone capture is not supported".to_string();
            self.emit(VoiceEvent::Error(message.clone()));
            return Err(VoiceError::Capability(message));
        }

        match self.capture.start().await {
            Ok(()) => {
                self.set_phase(SessionState::Listening).await;
                self.emit(VoiceEvent::ListeningChanged(true));
                info!("Listening started");
                Ok(())
            }
            Err(e) => {
                self.emit(VoiceEvent::Error(e.to_string()));
                Err(e)
            }
        }
    }

    /// Stop capture and transcribe the buffered audio.
    ///
    /// Clips below the minimum duration are discarded silently. On a
    /// non-empty transcript the finalized utterance is returned and
    /// emitted exactly once as [`VoiceEvent::TranscriptFinalized`].
    pub async fn stop_listening(&self) -> Result<Option<String>, VoiceError> {
        if self.state.read().await.phase != SessionState::Listening {
            debug!("stop_listening called while not listening");
            return Ok(None);
        }

        self.set_phase(SessionState::Idle).await;
        self.emit(VoiceEvent::ListeningChanged(false));

        let clip = match self.capture.stop().await {
            Ok(clip) => clip,
            Err(e) => {
                self.emit(VoiceEvent::Error(e.to_string()));
                return Err(e);
            }
        };

        if clip.duration_ms < self.config.min_clip_duration_ms {
            debug!("Recording too short ({}ms), ignoring", clip.duration_ms);
            return Ok(None);
        }

        self.set_phase(SessionState::Transcribing).await;
        self.emit(VoiceEvent::TranscribingChanged(true));

        let result = self.transcriber.transcribe(&clip).await;

        self.set_phase(SessionState::Idle).await;
        self.emit(VoiceEvent::TranscribingChanged(false));

        match result {
            Ok(text) => {
                let text = text.trim().to_string();
                if text.is_empty() {
                    debug!("No speech detected in recording");
                    Ok(None)
                } else {
                    info!("Transcript finalized: {} chars", text.len());
                    self.emit(VoiceEvent::TranscriptFinalized(text.clone()));
                    Ok(Some(text))
                }
            }
            Err(e) => {
                self.emit(VoiceEvent::Error(e.to_string()));
                Err(e)
            }
        }
    }

    /// Synthesize and play `text`.
    ///
    /// No-op on empty text, while already speaking, or while
    /// transcribing. Preempts listening: capture is force-stopped and
    /// the interrupted clip discarded without transcription. Resolves
    /// when playback completes or is cancelled.
    pub async fn speak(&self, text: &str) -> Result<(), VoiceError> {
        if text.trim().is_empty() {
            debug!("Skipping speak: empty text");
            return Ok(());
        }

        let phase = self.state.read().await.phase;
        match phase {
            SessionState::Speaking => {
                debug!("Already speaking, skipping");
                return Ok(());
            }
            SessionState::Transcribing => {
                debug!("speak ignored while transcribing");
                return Ok(());
            }
            SessionState::Listening => {
                // Speaking preempts listening; the interrupted clip is
                // discarded, never transcribed
                if let Err(e) = self.capture.stop().await {
                    warn!("Failed to stop capture before speaking: {}", e);
                }
                self.emit(VoiceEvent::ListeningChanged(false));
            }
            SessionState::Idle => {}
        }

        self.set_phase(SessionState::Speaking).await;
        self.emit(VoiceEvent::SpeakingChanged(true));

        let audio = match self
            .synthesizer
            .synthesize(text, &self.config.voice_id)
            .await
        {
            Ok(audio) => audio,
            Err(e) => {
                self.finish_speaking().await;
                self.emit(VoiceEvent::Error(e.to_string()));
                return Err(e);
            }
        };

        let cancel = CancellationToken::new();
        self.state.write().await.playback_cancel = Some(cancel.clone());

        debug!("Playing {} bytes of audio", audio.len());

        let outcome = tokio::select! {
            result = self.playback.play(audio) => result,
            _ = cancel.cancelled() => {
                debug!("Playback cancelled");
                Ok(())
            }
        };

        self.finish_speaking().await;

        if let Err(e) = outcome {
            self.emit(VoiceEvent::Error(e.to_string()));
            return Err(e);
        }

        Ok(())
    }

    /// Interrupt playback immediately
    pub async fn stop_speaking(&self) {
        let mut state = self.state.write().await;

        if let Some(cancel) = state.playback_cancel.take() {
            cancel.cancel();
        }

        if state.phase == SessionState::Speaking {
            state.phase = SessionState::Idle;
            drop(state);
            self.emit(VoiceEvent::SpeakingChanged(false));
            info!("Playback stopped");
        }
    }

    /// Force-stop any capture and playback, releasing both handles
    pub async fn shutdown(&self) {
        if self.state.read().await.phase == SessionState::Listening {
            if let Err(e) = self.capture.stop().await {
                warn!("Failed to release capture on shutdown: {}", e);
            }
            self.emit(VoiceEvent::ListeningChanged(false));
        }

        self.stop_speaking().await;
        self.state.write().await.phase = SessionState::Idle;

        info!("Voice session shut down");
    }

    /// Tear down playback bookkeeping after `speak` resolves. Skips the
    /// state change when an explicit stop already reset it.
    async fn finish_speaking(&self) {
        let mut state = self.state.write().await;
        state.playback_cancel = None;

        if state.phase == SessionState::Speaking {
            state.phase = SessionState::Idle;
            drop(state);
            self.emit(VoiceEvent::SpeakingChanged(false));
        }
    }

    async fn set_phase(&self, phase: SessionState) {
        self.state.write().await.phase = phase;
    }

    fn emit(&self, event: VoiceEvent) {
        // Receiver may have been dropped by a departed surface
        let _ = self.event_tx.send(event);
    }
}
