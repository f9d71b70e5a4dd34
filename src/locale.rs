//! Bilingual localization table
//!
//! Every [`LanguageMode`] maps to one immutable [`LocalizationBundle`] holding
//! the UI strings, the synthesis voice and the recognizer locale for that
//! language. [`resolve`] is an exhaustive match, so adding a mode without a
//! bundle does not compile; [`validate`] catches empty values at startup.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Active conversation language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageMode {
    #[default]
    Urdu,
    English,
}

impl LanguageMode {
    /// All supported modes
    pub const ALL: [Self; 2] = [Self::Urdu, Self::English];

    /// The other language
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Urdu => Self::English,
            Self::English => Self::Urdu,
        }
    }

    /// Lowercase name used in config and logs
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Urdu => "urdu",
            Self::English => "english",
        }
    }
}

impl fmt::Display for LanguageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LanguageMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ur" | "urdu" => Ok(Self::Urdu),
            "en" | "english" => Ok(Self::English),
            other => Err(Error::Config(format!("unknown language: {other}"))),
        }
    }
}

/// Strings and engine identifiers for one language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LocalizationBundle {
    /// Synthesis voice name (e.g. "ur-PK-UzmaNeural")
    pub voice: &'static str,
    /// Speech recognition locale (e.g. "ur-PK")
    pub recognizer_locale: &'static str,
    /// System prompt sent with every completion request
    pub system_prompt: &'static str,
    pub microphone_label: &'static str,
    pub text_label: &'static str,
    pub record_label: &'static str,
    pub send_label: &'static str,
    pub input_prompt: &'static str,
    pub processing: &'static str,
    pub ready_to_speak: &'static str,
    pub not_understood: &'static str,
    /// Reply shown when the completion service fails
    pub completion_fallback: &'static str,
    pub continue_label: &'static str,
    pub stop_label: &'static str,
    pub farewell: &'static str,
    /// Label of the button that switches to the other language
    pub switch_language_label: &'static str,
    /// Terminal menu entry that leaves the chat
    pub quit_label: &'static str,
    pub listen_error: &'static str,
    pub audio_error: &'static str,
}

impl LocalizationBundle {
    /// Field names paired with their values
    #[must_use]
    pub const fn entries(&self) -> [(&'static str, &'static str); 19] {
        [
            ("voice", self.voice),
            ("recognizer_locale", self.recognizer_locale),
            ("system_prompt", self.system_prompt),
            ("microphone_label", self.microphone_label),
            ("text_label", self.text_label),
            ("record_label", self.record_label),
            ("send_label", self.send_label),
            ("input_prompt", self.input_prompt),
            ("processing", self.processing),
            ("ready_to_speak", self.ready_to_speak),
            ("not_understood", self.not_understood),
            ("completion_fallback", self.completion_fallback),
            ("continue_label", self.continue_label),
            ("stop_label", self.stop_label),
            ("farewell", self.farewell),
            ("switch_language_label", self.switch_language_label),
            ("quit_label", self.quit_label),
            ("listen_error", self.listen_error),
            ("audio_error", self.audio_error),
        ]
    }

    /// Prefix a listening failure with the localized label
    #[must_use]
    pub fn listen_error_message(&self, detail: &str) -> String {
        format!("{}: {detail}", self.listen_error)
    }

    /// Prefix a speech output failure with the localized label
    #[must_use]
    pub fn audio_error_message(&self, detail: &str) -> String {
        format!("{}: {detail}", self.audio_error)
    }
}

static URDU: LocalizationBundle = LocalizationBundle {
    voice: "ur-PK-UzmaNeural",
    recognizer_locale: "ur-PK",
    system_prompt: "آپ ایک خاتون معاون ہیں جو صرف اردو میں مکمل جواب دیتی ہیں۔",
    microphone_label: "مائیکروفون",
    text_label: "ٹیکسٹ درج کریں",
    record_label: "🎤 ریکارڈ کریں",
    send_label: "بھیجیں",
    input_prompt: "اپنا سوال یہاں ٹائپ کریں:",
    processing: "جواب تیار ہو رہا ہے...",
    ready_to_speak: "بولنے کے لیے تیار...",
    not_understood: "صاف آواز نہیں ملی، براہ کرم دوبارہ کوشش کریں",
    completion_fallback: "معذرت، میں ابھی جواب نہیں دے پا رہی",
    continue_label: "ہاں، اگلا سوال پوچھیں",
    stop_label: "نہیں، بات چیت ختم کریں",
    farewell: "اللہ حافظ! آپ سے بات کر کے خوشی ہوئی۔",
    switch_language_label: "Switch to English",
    quit_label: "باہر نکلیں",
    listen_error: "سننے میں خرابی",
    audio_error: "آواز میں خرابی",
};

static ENGLISH: LocalizationBundle = LocalizationBundle {
    voice: "en-US-JennyNeural",
    recognizer_locale: "en-US",
    system_prompt: "You are a helpful assistant that responds in complete English answers.",
    microphone_label: "Microphone",
    text_label: "Type text",
    record_label: "🎤 Record",
    send_label: "Send",
    input_prompt: "Type your question here:",
    processing: "Generating response...",
    ready_to_speak: "Ready to speak...",
    not_understood: "Audio not understood, please try again",
    completion_fallback: "Sorry, I couldn't process your request right now.",
    continue_label: "Yes, ask another question",
    stop_label: "No, end conversation",
    farewell: "Goodbye! It was nice talking to you.",
    switch_language_label: "اردو میں تبدیل کریں",
    quit_label: "Quit",
    listen_error: "Listening error",
    audio_error: "Audio error",
};

/// Look up the bundle for a language
#[must_use]
pub const fn resolve(mode: LanguageMode) -> &'static LocalizationBundle {
    match mode {
        LanguageMode::Urdu => &URDU,
        LanguageMode::English => &ENGLISH,
    }
}

/// Check that every bundle is fully populated
///
/// # Errors
///
/// Returns `Error::IncompleteBundle` naming the first empty field found
pub fn validate() -> Result<()> {
    for mode in LanguageMode::ALL {
        for (field, value) in resolve(mode).entries() {
            if value.trim().is_empty() {
                return Err(Error::IncompleteBundle {
                    language: mode.as_str(),
                    field,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_bundle_is_complete() {
        validate().unwrap();

        for mode in LanguageMode::ALL {
            for (field, value) in resolve(mode).entries() {
                assert!(!value.trim().is_empty(), "{mode} bundle has empty {field}");
            }
        }
    }

    #[test]
    fn test_toggle_is_involution() {
        for mode in LanguageMode::ALL {
            assert_ne!(mode.toggled(), mode);
            assert_eq!(mode.toggled().toggled(), mode);
        }
    }

    #[test]
    fn test_default_is_urdu() {
        assert_eq!(LanguageMode::default(), LanguageMode::Urdu);
    }

    #[test]
    fn test_parse_language() {
        assert_eq!("ur".parse::<LanguageMode>().unwrap(), LanguageMode::Urdu);
        assert_eq!(" English ".parse::<LanguageMode>().unwrap(), LanguageMode::English);
        assert_eq!("EN".parse::<LanguageMode>().unwrap(), LanguageMode::English);
        assert!("fr".parse::<LanguageMode>().is_err());
    }

    #[test]
    fn test_engine_identifiers_match_language() {
        let urdu = resolve(LanguageMode::Urdu);
        assert_eq!(urdu.recognizer_locale, "ur-PK");
        assert!(urdu.voice.starts_with(urdu.recognizer_locale));

        let english = resolve(LanguageMode::English);
        assert_eq!(english.recognizer_locale, "en-US");
        assert!(english.voice.starts_with(english.recognizer_locale));
    }

    #[test]
    fn test_switch_label_names_other_language() {
        assert_eq!(resolve(LanguageMode::Urdu).switch_language_label, "Switch to English");
        assert_ne!(
            resolve(LanguageMode::English).switch_language_label,
            resolve(LanguageMode::Urdu).switch_language_label
        );
    }

    #[test]
    fn test_quit_label_is_localized() {
        let urdu = resolve(LanguageMode::Urdu).quit_label;
        let english = resolve(LanguageMode::English).quit_label;

        assert_eq!(english, "Quit");
        assert!(!urdu.trim().is_empty());
        assert_ne!(urdu, english);
    }
}
