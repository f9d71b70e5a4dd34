//! Shared test utilities

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use voicechat::{CompletionClient, Error, Result, SpeechOutput, SpeechRecognizer};

/// Completion stub that records every request
pub struct ScriptedCompletion {
    reply: Option<String>,
    pub calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedCompletion {
    /// Always answer with `reply`
    #[must_use]
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(reply.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Always fail
    #[must_use]
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            calls: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl CompletionClient for ScriptedCompletion {
    async fn complete(&self, system_prompt: &str, user_message: &str) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((system_prompt.to_string(), user_message.to_string()));
        self.reply
            .clone()
            .ok_or_else(|| Error::Completion("service unavailable".to_string()))
    }
}

/// Speech output stub that records what was spoken
#[derive(Default)]
pub struct RecordingSpeech {
    fail: bool,
    pub spoken: Mutex<Vec<(String, String)>>,
}

impl RecordingSpeech {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    #[must_use]
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            spoken: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl SpeechOutput for RecordingSpeech {
    async fn speak(&self, text: &str, voice: &str) -> Result<()> {
        if self.fail {
            return Err(Error::SpeechOutput("no output device".to_string()));
        }
        self.spoken
            .lock()
            .unwrap()
            .push((text.to_string(), voice.to_string()));
        Ok(())
    }
}

/// Recognizer stub returning a fixed transcript
pub struct FixedRecognizer {
    transcript: Option<&'static str>,
    pub locales: Mutex<Vec<String>>,
}

impl FixedRecognizer {
    #[must_use]
    pub fn hearing(transcript: &'static str) -> Arc<Self> {
        Arc::new(Self {
            transcript: Some(transcript),
            locales: Mutex::new(Vec::new()),
        })
    }

    #[must_use]
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            transcript: None,
            locales: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl SpeechRecognizer for FixedRecognizer {
    async fn recognize(&self, _wav: &[u8], locale: &str) -> Result<String> {
        self.locales.lock().unwrap().push(locale.to_string());
        self.transcript
            .map(str::to_string)
            .ok_or_else(|| Error::Stt("recognizer offline".to_string()))
    }
}
