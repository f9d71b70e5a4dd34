//! Bounded listening window
//!
//! Energy-based segmentation of microphone audio into one utterance. The
//! window gives up if nobody starts speaking within `start_timeout` and cuts
//! the phrase off after `phrase_limit`.

use std::time::{Duration, Instant};

use super::capture::{AudioCapture, SAMPLE_RATE};
use crate::Result;

/// Minimum RMS energy considered speech
const ENERGY_THRESHOLD: f32 = 0.03;

/// Minimum amount of speech for a usable segment (0.3s at 16kHz)
const MIN_SPEECH_SAMPLES: usize = 4800;

/// Trailing silence that ends a segment (0.5s at 16kHz)
const SILENCE_SAMPLES: usize = 8000;

/// How often the capture buffer is drained
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Timing limits for one recording
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenWindow {
    /// Give up if speech has not started by then
    pub start_timeout: Duration,
    /// Maximum phrase length once speech starts
    pub phrase_limit: Duration,
}

impl Default for ListenWindow {
    fn default() -> Self {
        Self {
            start_timeout: Duration::from_secs(5),
            phrase_limit: Duration::from_secs(10),
        }
    }
}

/// Segmenter progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentState {
    /// No speech yet
    Waiting,
    /// Speech started, accumulating
    Speaking,
    /// Enough speech followed by silence
    Complete,
}

/// Splits a sample stream into a single speech segment
#[derive(Debug)]
pub struct SpeechSegmenter {
    state: SegmentState,
    buffer: Vec<f32>,
    silence_counter: usize,
}

impl Default for SpeechSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeechSegmenter {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: SegmentState::Waiting,
            buffer: Vec::new(),
            silence_counter: 0,
        }
    }

    /// Feed a chunk of samples and return the new state
    pub fn process(&mut self, samples: &[f32]) -> SegmentState {
        let energy = calculate_energy(samples);
        let is_speech = energy > ENERGY_THRESHOLD;

        match self.state {
            SegmentState::Waiting => {
                if is_speech {
                    self.state = SegmentState::Speaking;
                    self.buffer.extend_from_slice(samples);
                    self.silence_counter = 0;
                    tracing::trace!(energy, "speech started");
                }
            }
            SegmentState::Speaking => {
                self.buffer.extend_from_slice(samples);

                if is_speech {
                    self.silence_counter = 0;
                } else {
                    self.silence_counter += samples.len();
                }

                if self.silence_counter > SILENCE_SAMPLES {
                    if self.buffer.len() > MIN_SPEECH_SAMPLES + self.silence_counter {
                        tracing::debug!(samples = self.buffer.len(), "speech segment complete");
                        self.state = SegmentState::Complete;
                    } else {
                        // A click or cough, not speech
                        self.reset();
                    }
                }
            }
            SegmentState::Complete => {}
        }

        self.state
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> SegmentState {
        self.state
    }

    /// Samples accumulated since speech started
    #[must_use]
    pub fn buffer(&self) -> &[f32] {
        &self.buffer
    }

    /// Take the segment, resetting the segmenter
    pub fn take_segment(&mut self) -> Vec<f32> {
        let segment = std::mem::take(&mut self.buffer);
        self.reset();
        segment
    }

    /// Back to waiting for speech
    pub fn reset(&mut self) {
        self.state = SegmentState::Waiting;
        self.buffer.clear();
        self.silence_counter = 0;
    }
}

/// Why a recording stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenOutcome {
    /// Nobody started speaking before the start timeout
    NoSpeech,
    /// Speech ran past the phrase limit and was cut off
    PhraseLimit,
    /// Speech ended on its own
    Complete,
}

/// Applies a `ListenWindow` to successive segmenter states
#[derive(Debug, Clone, Copy)]
pub struct ListenTimer {
    window: ListenWindow,
    opened: Instant,
    speech_started: Option<Instant>,
}

impl ListenTimer {
    #[must_use]
    pub const fn new(window: ListenWindow, opened: Instant) -> Self {
        Self {
            window,
            opened,
            speech_started: None,
        }
    }

    /// When the current run of speech began, if one is in progress
    #[must_use]
    pub const fn speech_started(&self) -> Option<Instant> {
        self.speech_started
    }

    /// Observe the segmenter state at `now`, returning an outcome once
    /// recording should stop
    pub fn step(&mut self, state: SegmentState, now: Instant) -> Option<ListenOutcome> {
        match state {
            SegmentState::Waiting => {
                // A discarded blip does not count toward the phrase limit
                self.speech_started = None;
                (now.saturating_duration_since(self.opened) > self.window.start_timeout)
                    .then_some(ListenOutcome::NoSpeech)
            }
            SegmentState::Speaking => {
                let started = *self.speech_started.get_or_insert(now);
                (now.saturating_duration_since(started) > self.window.phrase_limit)
                    .then_some(ListenOutcome::PhraseLimit)
            }
            SegmentState::Complete => Some(ListenOutcome::Complete),
        }
    }
}

/// Record one utterance from the default microphone
///
/// Blocks for at most `start_timeout + phrase_limit`. Returns `None` when no
/// speech started inside the window.
///
/// # Errors
///
/// Returns error if the microphone cannot be opened
pub fn record_utterance(window: ListenWindow) -> Result<Option<Vec<f32>>> {
    let mut capture = AudioCapture::new()?;
    capture.start()?;

    let mut segmenter = SpeechSegmenter::new();
    let mut timer = ListenTimer::new(window, Instant::now());

    loop {
        std::thread::sleep(POLL_INTERVAL);
        let state = segmenter.process(&capture.take_buffer());

        match timer.step(state, Instant::now()) {
            None => {}
            Some(ListenOutcome::NoSpeech) => {
                tracing::debug!("no speech before start timeout");
                return Ok(None);
            }
            Some(ListenOutcome::PhraseLimit) => {
                tracing::debug!("phrase limit reached");
                return Ok(Some(segmenter.take_segment()));
            }
            Some(ListenOutcome::Complete) => return Ok(Some(segmenter.take_segment())),
        }
    }
}

/// Duration of a sample buffer at the capture rate
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn samples_duration(samples: &[f32]) -> Duration {
    Duration::from_secs_f64(samples.len() as f64 / f64::from(SAMPLE_RATE))
}

/// RMS energy of audio samples
#[allow(clippy::cast_precision_loss)]
pub fn calculate_energy(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}
