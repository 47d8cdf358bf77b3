//! Platform speech engine seams
//!
//! Recognition and synthesis are local platform capabilities with awkward
//! lifecycles: recognition sessions can terminate themselves at any moment,
//! and synthesis queues play at most one utterance. These traits pin down
//! the behavior the [`super::VoiceEngine`] relies on; platform integrations
//! implement them, tests inject scripted ones.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use crate::{Error, Result};

/// A recognized chunk of speech
#[derive(Debug, Clone)]
pub struct TranscriptEvent {
    /// Recognized text
    pub text: String,

    /// Whether the recognizer has committed to this text
    pub is_final: bool,

    /// When the result was produced
    pub timestamp: DateTime<Utc>,
}

impl TranscriptEvent {
    /// Create a transcript event stamped with the current time
    #[must_use]
    pub fn new(text: impl Into<String>, is_final: bool) -> Self {
        Self {
            text: text.into(),
            is_final,
            timestamp: Utc::now(),
        }
    }
}

/// Events emitted by a recognition session, in generation order
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A recognition result
    Transcript(TranscriptEvent),

    /// The session terminated, whether asked to or on its own
    Ended,
}

/// Options for opening a recognition session
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Keep recognizing across utterance boundaries
    pub continuous: bool,

    /// Emit uncommitted interim results
    pub interim_results: bool,

    /// Recognition language tag
    pub language: String,
}

/// Stop handle for an open recognition session
pub trait SessionControl: Send + Sync {
    /// Ask the session to stop; it acknowledges with [`SessionEvent::Ended`]
    fn stop(&self);
}

/// An open recognition session: a stop handle plus its event stream
///
/// A closed event channel is equivalent to an [`SessionEvent::Ended`].
pub struct RecognitionSession {
    /// Stop handle, shareable across tasks
    pub control: Arc<dyn SessionControl>,

    /// Ordered event stream
    pub events: mpsc::UnboundedReceiver<SessionEvent>,
}

/// Platform speech recognition engine
pub trait RecognitionBackend: Send + Sync {
    /// Whether the platform has a recognition engine at all
    fn is_supported(&self) -> bool;

    /// Open a new recognition session
    ///
    /// # Errors
    ///
    /// Returns [`Error::RecognitionUnsupported`] on platforms without an
    /// engine, or [`Error::Voice`] when the engine refuses to start
    fn open_session(&self, options: &SessionOptions) -> Result<RecognitionSession>;
}

/// A synthesis voice advertised by the platform
#[derive(Debug, Clone)]
pub struct VoiceInfo {
    /// Platform voice name
    pub name: String,

    /// Language tag the voice speaks
    pub language: String,
}

/// One utterance handed to the synthesis engine
#[derive(Debug, Clone)]
pub struct Utterance {
    /// Text to speak
    pub text: String,

    /// Resolved voice name; `None` uses the platform default
    pub voice: Option<String>,

    /// Speaking rate multiplier
    pub rate: f32,

    /// Language tag
    pub language: String,
}

/// How an utterance finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeakOutcome {
    /// Played to the end
    Completed,

    /// Preempted by a cancel before finishing
    Interrupted,
}

/// Platform speech synthesis engine
///
/// At most one utterance plays at a time; [`SynthesisBackend::cancel`]
/// interrupts the current one.
#[async_trait]
pub trait SynthesisBackend: Send + Sync {
    /// Whether the platform has a synthesis engine at all
    fn is_supported(&self) -> bool;

    /// Voices the platform advertises
    fn voices(&self) -> Vec<VoiceInfo>;

    /// Interrupt the currently playing utterance, if any
    fn cancel(&self);

    /// Play one utterance to completion or interruption
    ///
    /// # Errors
    ///
    /// Returns [`Error::SynthesisUnsupported`] on platforms without an
    /// engine, or [`Error::Voice`] when playback fails
    async fn speak(&self, utterance: Utterance) -> Result<SpeakOutcome>;
}

/// Recognition backend for platforms without a speech engine
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedRecognition;

impl RecognitionBackend for UnsupportedRecognition {
    fn is_supported(&self) -> bool {
        false
    }

    fn open_session(&self, _options: &SessionOptions) -> Result<RecognitionSession> {
        Err(Error::RecognitionUnsupported)
    }
}

/// Synthesis backend for platforms without a speech engine
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedSynthesis;

#[async_trait]
impl SynthesisBackend for UnsupportedSynthesis {
    fn is_supported(&self) -> bool {
        false
    }

    fn voices(&self) -> Vec<VoiceInfo> {
        Vec::new()
    }

    fn cancel(&self) {}

    async fn speak(&self, _utterance: Utterance) -> Result<SpeakOutcome> {
        Err(Error::SynthesisUnsupported)
    }
}
