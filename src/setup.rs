//! Interactive first-run setup wizard (`voicechat setup`)

use std::path::{Path, PathBuf};

use dialoguer::{Confirm, Input, Select};
use secrecy::ExposeSecret;

use crate::config::file::{
    self, CompletionFileConfig, SpeechFileConfig, VoiceFileConfig, VoicechatConfigFile,
};
use crate::config::DEFAULT_MODEL;
use crate::locale::LanguageMode;

/// Run the interactive setup wizard
///
/// # Errors
///
/// Returns error if user input fails or config cannot be written
pub fn run_setup() -> anyhow::Result<()> {
    println!("voicechat setup\n");

    let existing = file::load_config_file();
    let config_path = file::config_file_path()
        .unwrap_or_else(|| PathBuf::from("~/.config/voicechat/config.toml"));

    if config_path.exists() {
        println!("Existing config found at {}\n", config_path.display());
    }

    // 1. Starting language
    let languages = ["Urdu", "English"];
    let default_language = existing
        .language
        .as_deref()
        .and_then(|l| l.parse::<LanguageMode>().ok())
        .unwrap_or_default();
    let language_idx = Select::new()
        .with_prompt("Starting language")
        .items(&languages)
        .default(usize::from(default_language == LanguageMode::English))
        .interact()?;
    let language = LanguageMode::ALL[language_idx];

    // 2. Completion service
    let api_key = prompt_secret(
        "OpenRouter API key (OPENROUTER_API_KEY)",
        existing.completion.api_key.as_deref(),
    )?;

    let model: String = Input::new()
        .with_prompt("Completion model")
        .default(
            existing
                .completion
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        )
        .interact_text()?;

    // 3. Voice
    let voice_enabled = Confirm::new()
        .with_prompt("Enable microphone input and spoken replies?")
        .default(existing.voice.enabled.unwrap_or(true))
        .interact()?;

    let speech = if voice_enabled {
        let azure_key = prompt_secret(
            "Azure Speech key (AZURE_SPEECH_KEY)",
            existing.speech.azure_key.as_deref(),
        )?;
        let azure_region: String = Input::new()
            .with_prompt("Azure Speech region")
            .default(
                existing
                    .speech
                    .azure_region
                    .clone()
                    .unwrap_or_else(|| "eastus".to_string()),
            )
            .interact_text()?;

        SpeechFileConfig {
            azure_key,
            azure_region: Some(azure_region),
            ..existing.speech
        }
    } else {
        existing.speech
    };

    let config_file = VoicechatConfigFile {
        language: Some(language.as_str().to_string()),
        completion: CompletionFileConfig {
            api_key,
            model: Some(model),
            ..existing.completion
        },
        speech,
        listen: existing.listen,
        voice: VoiceFileConfig {
            enabled: Some(voice_enabled),
        },
        server: existing.server,
    };

    write_config(&config_path, &config_file)?;
    println!("\nConfig written to {}", config_path.display());

    // Sanity check the result the same way startup will
    let config = crate::Config::load()?;
    if config
        .completion
        .api_key
        .as_ref()
        .is_none_or(|k| k.expose_secret().is_empty())
    {
        println!("Warning: no completion API key configured; `chat` and `serve` will refuse to start");
    }

    println!("\nSetup complete! Run `voicechat chat` or `voicechat serve` to start.");

    Ok(())
}

/// Ask for a secret, keeping the current value when left blank
fn prompt_secret(label: &str, existing: Option<&str>) -> anyhow::Result<Option<String>> {
    let prompt = existing.map_or_else(
        || label.to_string(),
        |k| format!("{label} (current: {}, leave blank to keep)", mask(k)),
    );

    let input: String = Input::new()
        .with_prompt(&prompt)
        .allow_empty(true)
        .interact_text()?;

    Ok(if input.trim().is_empty() {
        existing.map(str::to_string)
    } else {
        Some(input.trim().to_string())
    })
}

/// Show only the ends of a key
fn mask(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        "****".to_string()
    }
}

/// Serialize and write the config file
fn write_config(path: &Path, config: &VoicechatConfigFile) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    std::fs::write(path, toml::to_string(config)?)?;
    Ok(())
}
