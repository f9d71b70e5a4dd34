//! Render model for front-ends
//!
//! A [`ChatView`] is everything a front-end needs for one render: the
//! active strings, the chat bubbles, which controls to show, and notices
//! that belong to this render only.

use serde::Serialize;

use crate::conversation::{ChatBubble, ConversationState, Phase};
use crate::locale::{self, LanguageMode, LocalizationBundle};
use crate::turn::{SubmitOutcome, TurnReport};

/// Severity of a transient notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Info,
    Success,
    Warning,
    Error,
}

/// One-shot message shown for a single render
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn new(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Farewell shown after the user ends the conversation
    #[must_use]
    pub fn farewell(bundle: &LocalizationBundle) -> Self {
        Self::new(NoticeKind::Success, bundle.farewell)
    }

    /// Nothing usable was recognized
    #[must_use]
    pub fn not_understood(bundle: &LocalizationBundle) -> Self {
        Self::new(NoticeKind::Warning, bundle.not_understood)
    }

    /// Microphone or recognizer failure
    #[must_use]
    pub fn listen_error(bundle: &LocalizationBundle, detail: &str) -> Self {
        Self::new(NoticeKind::Error, bundle.listen_error_message(detail))
    }

    /// Notices produced by a submitted utterance
    #[must_use]
    pub fn for_outcome(outcome: &SubmitOutcome) -> Vec<Self> {
        match outcome {
            SubmitOutcome::Ignored => Vec::new(),
            SubmitOutcome::Answered(TurnReport { speech_error, .. }) => speech_error
                .iter()
                .map(|e| Self::new(NoticeKind::Error, e.clone()))
                .collect(),
        }
    }
}

/// Everything needed to render a session
#[derive(Debug, Clone, Serialize)]
pub struct ChatView {
    pub language: LanguageMode,
    pub phase: Phase,
    pub awaiting_continue_decision: bool,
    pub strings: &'static LocalizationBundle,
    pub bubbles: Vec<ChatBubble>,
    pub notices: Vec<Notice>,
}

impl ChatView {
    /// Render `state` with no notices
    #[must_use]
    pub fn render(state: &ConversationState) -> Self {
        Self::with_notices(state, Vec::new())
    }

    /// Render `state` with notices for this render only
    #[must_use]
    pub fn with_notices(state: &ConversationState, notices: Vec<Notice>) -> Self {
        Self {
            language: state.language_mode,
            phase: state.phase(),
            awaiting_continue_decision: state.awaiting_continue_decision,
            strings: locale::resolve(state.language_mode),
            bubbles: state.bubbles(),
            notices,
        }
    }
}
