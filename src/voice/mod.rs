//! Voice interaction module
//!
//! Owns the single platform speech-recognition session and the single
//! speech-synthesis queue. The platform engines sit behind the
//! [`RecognitionBackend`] and [`SynthesisBackend`] seams; the
//! [`VoiceEngine`] state machine guarantees that global listening and
//! dictation never overlap and that a logically-active listener survives
//! platform-driven session terminations.

mod backend;
mod engine;

pub use backend::{
    RecognitionBackend, RecognitionSession, SessionControl, SessionEvent, SessionOptions,
    SpeakOutcome, SynthesisBackend, TranscriptEvent, UnsupportedRecognition,
    UnsupportedSynthesis, Utterance, VoiceInfo,
};
pub use engine::{VoiceEngine, VoiceState};
