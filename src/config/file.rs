//! TOML configuration file loading
//!
//! Supports `~/.config/voicechat/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct VoicechatConfigFile {
    /// Starting language ("urdu" or "english")
    #[serde(default)]
    pub language: Option<String>,

    /// Completion service configuration
    #[serde(default)]
    pub completion: CompletionFileConfig,

    /// Speech service configuration
    #[serde(default)]
    pub speech: SpeechFileConfig,

    /// Microphone listening window
    #[serde(default)]
    pub listen: ListenFileConfig,

    /// Voice input/output toggle
    #[serde(default)]
    pub voice: VoiceFileConfig,

    /// Server/runtime configuration
    #[serde(default)]
    pub server: ServerFileConfig,
}

/// Completion service configuration
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CompletionFileConfig {
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub timeout_secs: Option<u64>,
}

/// Speech recognition and synthesis configuration
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SpeechFileConfig {
    /// Recognizer backend ("azure" or "whisper")
    pub stt: Option<String>,
    pub azure_key: Option<String>,
    pub azure_region: Option<String>,
    pub openai_key: Option<String>,
    pub whisper_model: Option<String>,
}

/// Listening window configuration
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ListenFileConfig {
    pub start_timeout_secs: Option<u64>,
    pub phrase_limit_secs: Option<u64>,
}

/// Voice processing configuration
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct VoiceFileConfig {
    /// Enable voice input/output
    pub enabled: Option<bool>,
}

/// Server/runtime configuration
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ServerFileConfig {
    /// API server port
    pub port: Option<u16>,
    /// Seconds a session may sit idle before it is dropped
    pub session_idle_secs: Option<u64>,
}

/// Load the TOML config file from the standard path
///
/// Returns `VoicechatConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> VoicechatConfigFile {
    config_file_path().map_or_else(VoicechatConfigFile::default, |p| load_config_from(&p))
}

/// Load a TOML config file from an explicit path
pub fn load_config_from(path: &Path) -> VoicechatConfigFile {
    if !path.exists() {
        return VoicechatConfigFile::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                VoicechatConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            VoicechatConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/voicechat/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("voicechat").join("config.toml"))
}
