/// Voice session library
///
/// Provides the voice session state machine coordinating microphone
/// capture, transcription and speech playback, plus the ElevenLabs
/// client used for synthesis and transcription.

pub mod elevenlabs;
pub mod session;

// Re-export main types
pub use elevenlabs::{ElevenLabsClient, ElevenLabsError, Voice, VoiceSettings, DEFAULT_VOICE_ID};
pub use session::{
    AudioCapture, AudioClip, AudioPlayback, SessionState, SpeechSynthesizer, Transcriber,
    VoiceConfig, VoiceError, VoiceEvent, VoiceSession, VoiceSupport,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
