//! Error types for voicechat

use thiserror::Error;

use crate::conversation::Phase;

/// Result type alias for voicechat operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in voicechat
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// A localization bundle is missing a value
    #[error("localization bundle for {language} has an empty `{field}`")]
    IncompleteBundle {
        language: &'static str,
        field: &'static str,
    },

    /// Action not allowed in the current conversation phase
    #[error("cannot {action} while {phase}")]
    InvalidTransition {
        action: &'static str,
        phase: Phase,
    },

    /// Completion service failed (transport, status, or payload)
    #[error("completion failed: {0}")]
    Completion(String),

    /// Speech synthesis or playback failed
    #[error("speech output failed: {0}")]
    SpeechOutput(String),

    /// Text-to-speech error
    #[error("TTS error: {0}")]
    Tts(String),

    /// Speech-to-text error
    #[error("STT error: {0}")]
    Stt(String),

    /// Audio device error
    #[error("audio error: {0}")]
    Audio(String),

    /// Session not found
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
