//! Speech output
//!
//! Synthesizes a reply and plays it on the local speakers. Audio stays in
//! memory for the duration of one call; nothing is written to disk.

use async_trait::async_trait;

use crate::voice::{AudioPlayback, TextToSpeech};
use crate::{Error, Result};

/// Speaks text aloud
#[async_trait]
pub trait SpeechOutput: Send + Sync {
    /// Synthesize `text` with `voice` and play it to completion
    ///
    /// # Errors
    ///
    /// Returns `Error::SpeechOutput` on synthesis or playback failure
    async fn speak(&self, text: &str, voice: &str) -> Result<()>;
}

/// Hosted synthesis followed by local playback
pub struct SpeakerOutput {
    tts: TextToSpeech,
}

impl SpeakerOutput {
    #[must_use]
    pub const fn new(tts: TextToSpeech) -> Self {
        Self { tts }
    }
}

#[async_trait]
impl SpeechOutput for SpeakerOutput {
    async fn speak(&self, text: &str, voice: &str) -> Result<()> {
        let mp3 = self
            .tts
            .synthesize(text, voice)
            .await
            .map_err(|e| Error::SpeechOutput(e.to_string()))?;

        tracing::debug!(bytes = mp3.len(), "playing synthesized reply");

        tokio::task::spawn_blocking(move || AudioPlayback::new()?.play_mp3(&mp3))
            .await
            .map_err(|e| Error::SpeechOutput(format!("playback task failed: {e}")))?
            .map_err(|e| Error::SpeechOutput(e.to_string()))
    }
}

/// Output used when voice is disabled
#[derive(Debug, Default, Clone, Copy)]
pub struct MutedOutput;

#[async_trait]
impl SpeechOutput for MutedOutput {
    async fn speak(&self, text: &str, voice: &str) -> Result<()> {
        tracing::trace!(voice, chars = text.len(), "voice disabled, not speaking");
        Ok(())
    }
}
