//! Configuration management for voicechat
//!
//! Values are resolved env > TOML file > default. Credentials are never
//! compiled in; they arrive through the environment or the config file.

pub mod file;

use std::time::Duration;

use secrecy::SecretString;

use crate::locale::LanguageMode;
use crate::voice::ListenWindow;
use crate::{Error, Result};

use file::VoicechatConfigFile;

/// Default chat-completions endpoint
pub const DEFAULT_COMPLETION_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Default completion model
pub const DEFAULT_MODEL: &str = "openai/gpt-3.5-turbo";

/// Default HTTP port for the session API
pub const DEFAULT_PORT: u16 = 8501;

/// Default idle time before an HTTP session is dropped
pub const DEFAULT_SESSION_IDLE: Duration = Duration::from_secs(30 * 60);

/// voicechat configuration
#[derive(Debug)]
pub struct Config {
    /// Language new sessions start in
    pub language: LanguageMode,

    /// Completion service configuration
    pub completion: CompletionConfig,

    /// Speech recognition/synthesis configuration
    pub speech: SpeechConfig,

    /// Microphone listening window
    pub listen: ListenWindow,

    /// Whether audio input/output is enabled
    pub voice_enabled: bool,

    /// HTTP API port
    pub port: u16,

    /// Idle time after which an HTTP session expires
    pub session_idle: Duration,
}

/// Completion service configuration
#[derive(Debug)]
pub struct CompletionConfig {
    /// Bearer credential (`OPENROUTER_API_KEY`)
    pub api_key: Option<SecretString>,

    /// Chat-completions URL
    pub endpoint: String,

    /// Model identifier
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_COMPLETION_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            timeout_secs: 30,
        }
    }
}

/// Speech recognizer backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SttBackend {
    #[default]
    Azure,
    Whisper,
}

impl std::str::FromStr for SttBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "azure" => Ok(Self::Azure),
            "whisper" | "openai" => Ok(Self::Whisper),
            other => Err(Error::Config(format!("unknown STT backend: {other}"))),
        }
    }
}

/// Speech service configuration
#[derive(Debug)]
pub struct SpeechConfig {
    /// Recognizer backend
    pub stt: SttBackend,

    /// Azure Speech subscription key (synthesis, and recognition when `stt = azure`)
    pub azure_key: Option<SecretString>,

    /// Azure Speech region (e.g. "eastus")
    pub azure_region: String,

    /// `OpenAI` key for Whisper recognition
    pub openai_key: Option<SecretString>,

    /// Whisper model name
    pub whisper_model: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            stt: SttBackend::default(),
            azure_key: None,
            azure_region: "eastus".to_string(),
            openai_key: None,
            whisper_model: "whisper-1".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the environment and config file
    ///
    /// # Errors
    ///
    /// Returns error if a configured value cannot be parsed
    pub fn load() -> Result<Self> {
        Self::load_with_options(false)
    }

    /// Load configuration with explicit voice disable option
    ///
    /// # Errors
    ///
    /// Returns error if a configured value cannot be parsed
    pub fn load_with_options(disable_voice: bool) -> Result<Self> {
        let fc = file::load_config_file();
        Self::from_sources(fc, |key| std::env::var(key).ok(), disable_voice)
    }

    /// Resolve configuration from a parsed file and an environment lookup
    ///
    /// # Errors
    ///
    /// Returns error if a configured value cannot be parsed
    pub fn from_sources(
        fc: VoicechatConfigFile,
        env: impl Fn(&str) -> Option<String>,
        disable_voice: bool,
    ) -> Result<Self> {
        let language = env("VOICECHAT_LANGUAGE")
            .or(fc.language)
            .map(|s| s.parse::<LanguageMode>())
            .transpose()?
            .unwrap_or_default();

        let defaults = CompletionConfig::default();
        let temperature = match env("VOICECHAT_TEMPERATURE") {
            Some(raw) => raw
                .parse()
                .map_err(|_| Error::Config(format!("invalid temperature: {raw}")))?,
            None => fc.completion.temperature.unwrap_or(defaults.temperature),
        };
        let completion = CompletionConfig {
            api_key: env("OPENROUTER_API_KEY")
                .or(fc.completion.api_key)
                .map(SecretString::from),
            endpoint: env("VOICECHAT_COMPLETION_URL")
                .or(fc.completion.endpoint)
                .unwrap_or(defaults.endpoint),
            model: env("VOICECHAT_MODEL")
                .or(fc.completion.model)
                .unwrap_or(defaults.model),
            temperature,
            timeout_secs: fc.completion.timeout_secs.unwrap_or(defaults.timeout_secs),
        };

        let speech_defaults = SpeechConfig::default();
        let speech = SpeechConfig {
            stt: env("VOICECHAT_STT")
                .or(fc.speech.stt)
                .map(|s| s.parse::<SttBackend>())
                .transpose()?
                .unwrap_or_default(),
            azure_key: env("AZURE_SPEECH_KEY")
                .or(fc.speech.azure_key)
                .map(SecretString::from),
            azure_region: env("AZURE_SPEECH_REGION")
                .or(fc.speech.azure_region)
                .unwrap_or(speech_defaults.azure_region),
            openai_key: env("OPENAI_API_KEY")
                .or(fc.speech.openai_key)
                .map(SecretString::from),
            whisper_model: fc.speech.whisper_model.unwrap_or(speech_defaults.whisper_model),
        };

        let window = ListenWindow::default();
        let listen = ListenWindow {
            start_timeout: fc
                .listen
                .start_timeout_secs
                .map_or(window.start_timeout, Duration::from_secs),
            phrase_limit: fc
                .listen
                .phrase_limit_secs
                .map_or(window.phrase_limit, Duration::from_secs),
        };

        let voice_enabled = !disable_voice && fc.voice.enabled.unwrap_or(true);
        if disable_voice {
            tracing::info!("voice explicitly disabled via --disable-voice");
        }

        let port = match env("VOICECHAT_PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("invalid port: {raw}")))?,
            None => fc.server.port.unwrap_or(DEFAULT_PORT),
        };

        let session_idle = match env("VOICECHAT_SESSION_IDLE_SECS") {
            Some(raw) => raw
                .trim()
                .parse()
                .map(Duration::from_secs)
                .map_err(|_| Error::Config(format!("invalid session idle time: {raw}")))?,
            None => fc
                .server
                .session_idle_secs
                .map_or(DEFAULT_SESSION_IDLE, Duration::from_secs),
        };

        Ok(Self {
            language,
            completion,
            speech,
            listen,
            voice_enabled,
            port,
            session_idle,
        })
    }
}
