//! Speech-to-text (STT) processing
//!
//! Recognition is locale-aware: the caller passes the active bundle's
//! recognizer locale with every request. "Nothing recognized" comes back as
//! an empty transcript rather than an error.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::input::SpeechRecognizer;
use crate::{Error, Result};

/// Response from the Azure short-audio recognition API
#[derive(serde::Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AzureRecognitionResponse {
    recognition_status: String,
    #[serde(default)]
    display_text: String,
}

/// Response from OpenAI Whisper transcription API
#[derive(serde::Deserialize)]
struct WhisperResponse {
    text: String,
}

/// STT provider backend
#[derive(Clone, Copy, Debug)]
enum SttProvider {
    Azure,
    Whisper,
}

/// Transcribes WAV audio to text
pub struct SpeechToText {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
    provider: SttProvider,
}

impl SpeechToText {
    /// Create a recognizer backed by Azure Speech in `region`
    ///
    /// # Errors
    ///
    /// Returns error if the subscription key is missing
    pub fn new_azure(api_key: &str, region: &str) -> Result<Self> {
        Self::new_azure_with_base_url(
            api_key,
            format!("https://{region}.stt.speech.microsoft.com"),
        )
    }

    /// Create an Azure recognizer against an explicit base URL
    ///
    /// # Errors
    ///
    /// Returns error if the subscription key is missing
    pub fn new_azure_with_base_url(api_key: &str, base_url: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "Azure Speech key required for recognition (set AZURE_SPEECH_KEY)".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key: SecretString::from(api_key),
            base_url,
            model: String::new(),
            provider: SttProvider::Azure,
        })
    }

    /// Create a recognizer backed by `OpenAI` Whisper
    ///
    /// # Errors
    ///
    /// Returns error if API key is missing
    pub fn new_whisper(api_key: &str, model: String) -> Result<Self> {
        Self::new_whisper_with_base_url(api_key, model, "https://api.openai.com".to_string())
    }

    /// Create a Whisper recognizer against an explicit base URL
    ///
    /// # Errors
    ///
    /// Returns error if API key is missing
    pub fn new_whisper_with_base_url(
        api_key: &str,
        model: String,
        base_url: String,
    ) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "OpenAI API key required for Whisper".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key: SecretString::from(api_key),
            base_url,
            model,
            provider: SttProvider::Whisper,
        })
    }

    /// Transcribe WAV audio in the given locale (e.g. "ur-PK")
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response is malformed
    pub async fn transcribe(&self, audio: &[u8], locale: &str) -> Result<String> {
        let transcript = match self.provider {
            SttProvider::Azure => self.transcribe_azure(audio, locale).await?,
            SttProvider::Whisper => self.transcribe_whisper(audio, locale).await?,
        };

        tracing::debug!(locale, chars = transcript.chars().count(), "transcription complete");
        Ok(transcript.trim().to_string())
    }

    /// Transcribe using the Azure short-audio REST API
    async fn transcribe_azure(&self, audio: &[u8], locale: &str) -> Result<String> {
        tracing::debug!(audio_bytes = audio.len(), locale, "starting Azure recognition");

        let url = format!(
            "{}/speech/recognition/conversation/cognitiveservices/v1",
            self.base_url
        );

        let response = self
            .client
            .post(&url)
            .query(&[("language", locale), ("format", "simple")])
            .header("Ocp-Apim-Subscription-Key", self.api_key.expose_secret())
            .header(
                "Content-Type",
                "audio/wav; codecs=audio/pcm; samplerate=16000",
            )
            .header("Accept", "application/json")
            .body(audio.to_vec())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Azure STT error");
            return Err(Error::Stt(format!("Azure STT error {status}: {body}")));
        }

        let result: AzureRecognitionResponse = response.json().await?;

        if result.recognition_status == "Success" {
            Ok(result.display_text)
        } else {
            tracing::debug!(status = %result.recognition_status, "nothing recognized");
            Ok(String::new())
        }
    }

    /// Transcribe using `OpenAI` Whisper
    async fn transcribe_whisper(&self, audio: &[u8], locale: &str) -> Result<String> {
        tracing::debug!(audio_bytes = audio.len(), locale, "starting Whisper transcription");

        // Whisper takes ISO-639-1 codes
        let language = locale.split('-').next().unwrap_or(locale).to_lowercase();

        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(audio.to_vec())
                    .file_name("audio.wav")
                    .mime_str("audio/wav")
                    .map_err(|e| Error::Stt(e.to_string()))?,
            )
            .text("model", self.model.clone())
            .text("language", language);

        let response = self
            .client
            .post(format!("{}/v1/audio/transcriptions", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Whisper API error");
            return Err(Error::Stt(format!("Whisper API error {status}: {body}")));
        }

        let result: WhisperResponse = response.json().await?;
        Ok(result.text)
    }
}

#[async_trait]
impl SpeechRecognizer for SpeechToText {
    async fn recognize(&self, wav: &[u8], locale: &str) -> Result<String> {
        self.transcribe(wav, locale).await
    }
}
