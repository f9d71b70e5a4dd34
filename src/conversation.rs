//! Per-session conversation state
//!
//! A plain record; transitions are made by [`crate::turn::TurnController`].

use std::fmt;

use serde::Serialize;

use crate::locale::LanguageMode;

/// Where the session is in the question/answer cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Ready for a new utterance
    Idle,
    /// Reply delivered, waiting for continue or stop
    AwaitingDecision,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::AwaitingDecision => f.write_str("awaiting a continue decision"),
        }
    }
}

/// Mutable state of one user session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversationState {
    pub current_input: String,
    pub current_output: String,
    pub awaiting_continue_decision: bool,
    pub language_mode: LanguageMode,
}

impl ConversationState {
    /// Fresh idle state in the given language
    #[must_use]
    pub fn new(language_mode: LanguageMode) -> Self {
        Self {
            language_mode,
            ..Self::default()
        }
    }

    /// Current phase derived from the decision flag
    #[must_use]
    pub const fn phase(&self) -> Phase {
        if self.awaiting_continue_decision {
            Phase::AwaitingDecision
        } else {
            Phase::Idle
        }
    }

    /// Chat bubbles to render, user first
    #[must_use]
    pub fn bubbles(&self) -> Vec<ChatBubble> {
        let mut bubbles = Vec::with_capacity(2);
        if !self.current_input.is_empty() {
            bubbles.push(ChatBubble {
                speaker: Speaker::User,
                text: self.current_input.clone(),
            });
        }
        if !self.current_output.is_empty() {
            bubbles.push(ChatBubble {
                speaker: Speaker::Bot,
                text: self.current_output.clone(),
            });
        }
        bubbles
    }
}

/// Who said a bubble's text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Bot,
}

/// One rendered message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatBubble {
    pub speaker: Speaker,
    pub text: String,
}
