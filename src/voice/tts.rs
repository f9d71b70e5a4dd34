//! Text-to-speech (TTS) processing via Azure Speech neural voices

use secrecy::{ExposeSecret, SecretString};

use crate::{Error, Result};

/// Output format requested from the service; matches [`super::PLAYBACK_SAMPLE_RATE`]
const OUTPUT_FORMAT: &str = "audio-24khz-48kbitrate-mono-mp3";

/// Synthesizes speech from text
pub struct TextToSpeech {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl TextToSpeech {
    /// Create a synthesizer for an Azure Speech `region`
    ///
    /// # Errors
    ///
    /// Returns error if the subscription key is missing
    pub fn new_azure(api_key: &str, region: &str) -> Result<Self> {
        Self::with_base_url(api_key, format!("https://{region}.tts.speech.microsoft.com"))
    }

    /// Create a synthesizer against an explicit base URL
    ///
    /// # Errors
    ///
    /// Returns error if the subscription key is missing
    pub fn with_base_url(api_key: &str, base_url: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "Azure Speech key required for TTS (set AZURE_SPEECH_KEY)".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key: SecretString::from(api_key),
            base_url,
        })
    }

    /// Synthesize `text` with a neural voice (e.g. "ur-PK-UzmaNeural")
    ///
    /// # Returns
    ///
    /// Audio bytes (MP3 format)
    ///
    /// # Errors
    ///
    /// Returns error if synthesis fails
    pub async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>> {
        tracing::debug!(voice, chars = text.len(), "synthesizing speech");

        let response = self
            .client
            .post(format!("{}/cognitiveservices/v1", self.base_url))
            .header("Ocp-Apim-Subscription-Key", self.api_key.expose_secret())
            .header("Content-Type", "application/ssml+xml")
            .header("X-Microsoft-OutputFormat", OUTPUT_FORMAT)
            .header("User-Agent", "voicechat")
            .body(build_ssml(text, voice))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Tts(format!("Azure TTS error {status}: {body}")));
        }

        let audio = response.bytes().await?;
        Ok(audio.to_vec())
    }
}

/// Wrap text in an SSML document for `voice`
///
/// The document language is the voice's locale prefix ("ur-PK-UzmaNeural" → "ur-PK").
#[must_use]
pub fn build_ssml(text: &str, voice: &str) -> String {
    let lang = voice.splitn(3, '-').take(2).collect::<Vec<_>>().join("-");
    format!(
        "<speak version='1.0' xml:lang='{lang}'><voice name='{}'>{}</voice></speak>",
        escape_xml(voice),
        escape_xml(text)
    )
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
