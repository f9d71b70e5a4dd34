//! Adapter wiring
//!
//! Builds the turn controller and input adapter from [`Config`], picking
//! real or muted speech output depending on what is configured.

use std::sync::Arc;

use secrecy::ExposeSecret;

use crate::completion::{ChatCompletionClient, CompletionClient};
use crate::config::SttBackend;
use crate::input::{MicrophoneInput, SpeechRecognizer};
use crate::speech::{MutedOutput, SpeakerOutput, SpeechOutput};
use crate::turn::TurnController;
use crate::voice::{SpeechToText, TextToSpeech};
use crate::{Config, Result, locale};

/// Everything a front-end needs to run conversations
pub struct App {
    pub turns: Arc<TurnController>,
    /// Present when a speech recognizer is configured
    pub input: Option<Arc<MicrophoneInput>>,
    pub voice_enabled: bool,
}

impl App {
    /// Wire adapters from configuration
    ///
    /// # Errors
    ///
    /// Returns error if a localization bundle is incomplete or the completion
    /// client cannot be created
    pub fn from_config(config: &Config) -> Result<Self> {
        locale::validate()?;

        let completion: Arc<dyn CompletionClient> =
            Arc::new(ChatCompletionClient::new(&config.completion)?);
        tracing::info!(
            model = %config.completion.model,
            endpoint = %config.completion.endpoint,
            "completion client initialized"
        );

        let speech = build_speech_output(config);
        let recognizer = build_recognizer(config);

        let input = recognizer.map(|r| Arc::new(MicrophoneInput::new(r, config.listen)));

        Ok(Self {
            turns: Arc::new(TurnController::new(completion, speech)),
            input,
            voice_enabled: config.voice_enabled,
        })
    }

    /// Microphone input, only when voice is enabled
    #[must_use]
    pub fn microphone(&self) -> Option<&MicrophoneInput> {
        self.input.as_deref().filter(|_| self.voice_enabled)
    }
}

fn build_speech_output(config: &Config) -> Arc<dyn SpeechOutput> {
    if !config.voice_enabled {
        return Arc::new(MutedOutput);
    }

    let key = config
        .speech
        .azure_key
        .as_ref()
        .map(|k| k.expose_secret().to_owned())
        .unwrap_or_default();

    match TextToSpeech::new_azure(&key, &config.speech.azure_region) {
        Ok(tts) => {
            tracing::info!(region = %config.speech.azure_region, "speech output initialized");
            Arc::new(SpeakerOutput::new(tts))
        }
        Err(e) => {
            tracing::warn!(error = %e, "speech output unavailable, replies will be text only");
            Arc::new(MutedOutput)
        }
    }
}

fn build_recognizer(config: &Config) -> Option<Arc<dyn SpeechRecognizer>> {
    let result = match config.speech.stt {
        SttBackend::Azure => {
            let key = config
                .speech
                .azure_key
                .as_ref()
                .map(|k| k.expose_secret().to_owned())
                .unwrap_or_default();
            SpeechToText::new_azure(&key, &config.speech.azure_region)
        }
        SttBackend::Whisper => {
            let key = config
                .speech
                .openai_key
                .as_ref()
                .map(|k| k.expose_secret().to_owned())
                .unwrap_or_default();
            SpeechToText::new_whisper(&key, config.speech.whisper_model.clone())
        }
    };

    match result {
        Ok(stt) => {
            tracing::info!(backend = ?config.speech.stt, "speech recognition initialized");
            Some(Arc::new(stt))
        }
        Err(e) => {
            tracing::warn!(error = %e, "speech recognition unavailable, text input only");
            None
        }
    }
}
