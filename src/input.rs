//! Input acquisition
//!
//! Turns a microphone recording, an uploaded WAV, or typed text into the
//! single utterance string the turn controller accepts. An empty string
//! means nothing usable was heard; that is an expected outcome, not an error.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::voice::{self, ListenWindow, SAMPLE_RATE};
use crate::{Error, Result};

/// How the user supplies a question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMethod {
    Microphone,
    Text,
}

/// Converts recorded speech to text
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Recognize WAV audio in `locale` (e.g. "ur-PK")
    ///
    /// Returns an empty string when nothing was confidently recognized.
    ///
    /// # Errors
    ///
    /// Returns error on transport or service failure
    async fn recognize(&self, wav: &[u8], locale: &str) -> Result<String>;
}

/// Normalize typed text into an utterance
#[must_use]
pub fn text_utterance(raw: &str) -> String {
    raw.trim().to_string()
}

/// Microphone capture plus recognition
pub struct MicrophoneInput {
    recognizer: Arc<dyn SpeechRecognizer>,
    window: ListenWindow,
}

impl MicrophoneInput {
    #[must_use]
    pub fn new(recognizer: Arc<dyn SpeechRecognizer>, window: ListenWindow) -> Self {
        Self { recognizer, window }
    }

    /// Record from the local microphone and recognize in `locale`
    ///
    /// # Errors
    ///
    /// Returns error if the microphone cannot be opened or recognition fails
    pub async fn listen(&self, locale: &str) -> Result<String> {
        let window = self.window;
        let recording = tokio::task::spawn_blocking(move || voice::record_utterance(window))
            .await
            .map_err(|e| Error::Audio(format!("recording task failed: {e}")))??;

        let Some(samples) = recording else {
            return Ok(String::new());
        };

        tracing::debug!(
            duration_ms = voice::samples_duration(&samples).as_millis(),
            "utterance recorded"
        );

        let wav = voice::samples_to_wav(&samples, SAMPLE_RATE)?;
        self.recognize_wav(&wav, locale).await
    }

    /// Recognize an already-recorded WAV
    ///
    /// # Errors
    ///
    /// Returns error if recognition fails
    pub async fn recognize_wav(&self, wav: &[u8], locale: &str) -> Result<String> {
        if wav.is_empty() {
            return Ok(String::new());
        }

        let transcript = self.recognizer.recognize(wav, locale).await?;
        Ok(text_utterance(&transcript))
    }
}
