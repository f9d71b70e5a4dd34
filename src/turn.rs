//! Turn controller
//!
//! Drives one question/answer cycle over a [`ConversationState`]:
//!
//! ```text
//!            submit_utterance (non-empty)
//!   Idle ─────────────────────────────────▶ AwaitingDecision
//!    ▲  ◀──── continue_conversation ─────────┘   │
//!    │  ◀──── end_conversation (farewell) ───────┘
//!    └──────── toggle_language (from anywhere)
//! ```
//!
//! Adapter failures never escape a turn: a failed completion becomes the
//! localized fallback reply and a failed playback is reported alongside the
//! reply. Only precondition violations are returned as errors.

use std::sync::Arc;

use crate::completion::CompletionClient;
use crate::conversation::{ConversationState, Phase};
use crate::locale::{self, LanguageMode};
use crate::speech::SpeechOutput;
use crate::{Error, Result};

/// Result of one submitted utterance
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Utterance was empty; nothing changed
    Ignored,
    /// Reply produced and spoken (or attempted)
    Answered(TurnReport),
}

/// What happened during an answered turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReport {
    /// Text now in `current_output`
    pub reply: String,
    /// The reply is the fallback because the completion failed
    pub completion_failed: bool,
    /// Localized speech output error, if playback failed
    pub speech_error: Option<String>,
}

/// Orchestrates turns against the completion and speech adapters
pub struct TurnController {
    completion: Arc<dyn CompletionClient>,
    speech: Arc<dyn SpeechOutput>,
}

impl TurnController {
    #[must_use]
    pub fn new(completion: Arc<dyn CompletionClient>, speech: Arc<dyn SpeechOutput>) -> Self {
        Self { completion, speech }
    }

    /// Switch language and drop any turn in progress
    pub fn toggle_language(&self, state: &mut ConversationState) -> LanguageMode {
        state.language_mode = state.language_mode.toggled();
        clear_turn(state);
        tracing::info!(language = %state.language_mode, "language switched");
        state.language_mode
    }

    /// Run a full turn for `raw`
    ///
    /// Empty or whitespace-only input is ignored without touching `state`.
    /// Returns once the reply is in `state` and playback has been attempted.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTransition` if a reply is still awaiting a
    /// continue/stop decision
    pub async fn submit_utterance(
        &self,
        state: &mut ConversationState,
        raw: &str,
    ) -> Result<SubmitOutcome> {
        let utterance = raw.trim();
        if utterance.is_empty() {
            tracing::debug!("empty utterance ignored");
            return Ok(SubmitOutcome::Ignored);
        }
        require_phase(state, Phase::Idle, "submit an utterance")?;

        state.current_input = utterance.to_string();
        let bundle = locale::resolve(state.language_mode);

        let (reply, completion_failed) = match self
            .completion
            .complete(bundle.system_prompt, &state.current_input)
            .await
        {
            Ok(reply) => (reply, false),
            Err(e) => {
                tracing::warn!(error = %e, "completion failed, using fallback reply");
                (bundle.completion_fallback.to_string(), true)
            }
        };
        state.current_output = reply;

        let speech_error = match self.speech.speak(&state.current_output, bundle.voice).await {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!(error = %e, voice = bundle.voice, "speech output failed");
                Some(bundle.audio_error_message(&e.to_string()))
            }
        };

        state.awaiting_continue_decision = true;

        tracing::info!(
            language = %state.language_mode,
            completion_failed,
            spoken = speech_error.is_none(),
            "turn complete"
        );

        Ok(SubmitOutcome::Answered(TurnReport {
            reply: state.current_output.clone(),
            completion_failed,
            speech_error,
        }))
    }

    /// Accept the reply and get ready for another question
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTransition` unless awaiting a decision
    pub fn continue_conversation(&self, state: &mut ConversationState) -> Result<()> {
        require_phase(state, Phase::AwaitingDecision, "continue")?;
        clear_turn(state);
        Ok(())
    }

    /// End the conversation, returning the farewell to show once
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTransition` unless awaiting a decision
    pub fn end_conversation(&self, state: &mut ConversationState) -> Result<&'static str> {
        require_phase(state, Phase::AwaitingDecision, "end the conversation")?;
        clear_turn(state);
        tracing::info!("conversation ended");
        Ok(locale::resolve(state.language_mode).farewell)
    }
}

fn require_phase(state: &ConversationState, expected: Phase, action: &'static str) -> Result<()> {
    let phase = state.phase();
    if phase == expected {
        Ok(())
    } else {
        Err(Error::InvalidTransition { action, phase })
    }
}

fn clear_turn(state: &mut ConversationState) {
    state.current_input.clear();
    state.current_output.clear();
    state.awaiting_continue_decision = false;
}
