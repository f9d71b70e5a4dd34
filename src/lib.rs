//! voicechat - Bilingual (Urdu/English) voice chat front-end
//!
//! A user speaks or types a question in the active language, the question is
//! sent to a chat-completion service with a language-specific system prompt,
//! and the reply is shown and spoken in the matching voice. After each reply
//! the user decides whether to ask another question or end the conversation.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                    Front-ends                        │
//! │        Terminal (chat)   │   HTTP sessions (serve)   │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                 Turn controller                      │
//! │   Idle ⇄ AwaitingDecision  │  Localization bundles   │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                    Adapters                          │
//! │   Completion  │  STT  │  TTS  │  Microphone/Speaker  │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod app;
pub mod completion;
pub mod config;
pub mod conversation;
pub mod error;
pub mod input;
pub mod locale;
pub mod setup;
pub mod speech;
pub mod terminal;
pub mod turn;
pub mod view;
pub mod voice;

pub use app::App;
pub use completion::{ChatCompletionClient, CompletionClient};
pub use config::Config;
pub use conversation::{ChatBubble, ConversationState, Phase, Speaker};
pub use error::{Error, Result};
pub use input::{InputMethod, MicrophoneInput, SpeechRecognizer};
pub use locale::{LanguageMode, LocalizationBundle};
pub use speech::{MutedOutput, SpeakerOutput, SpeechOutput};
pub use turn::{SubmitOutcome, TurnController, TurnReport};
pub use view::{ChatView, Notice, NoticeKind};
