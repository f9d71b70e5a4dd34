//! Audio and speech services
//!
//! Microphone capture with a bounded listening window, speaker playback,
//! and the hosted STT/TTS clients used by the input and speech adapters.

mod capture;
mod listen;
mod playback;
mod stt;
mod tts;

pub use capture::{AudioCapture, SAMPLE_RATE, samples_to_wav};
pub use listen::{
    ListenOutcome, ListenTimer, ListenWindow, SegmentState, SpeechSegmenter, calculate_energy,
    record_utterance, samples_duration,
};
pub use playback::{AudioPlayback, PLAYBACK_SAMPLE_RATE, decode_mp3};
pub use stt::SpeechToText;
pub use tts::{TextToSpeech, build_ssml};
