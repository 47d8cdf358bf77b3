//! The voice interaction state machine
//!
//! One engine instance exists per process. It multiplexes three concerns
//! over the platform speech seams: continuous command listening, dictation,
//! and spoken output. The platform recognizer is allowed to terminate its
//! session whenever it likes; the engine tracks "should be listening"
//! separately from "session is open" and restarts terminated sessions for
//! as long as the operator has not asked it to stop.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::config::VoiceConfig;
use crate::voice::backend::{
    RecognitionBackend, SessionControl, SessionEvent, SessionOptions, SpeakOutcome,
    SynthesisBackend, TranscriptEvent, Utterance,
};

/// Logical listening state
///
/// Speaking is an overlay, not a state: an utterance may play while idle,
/// listening, or dictating. See [`VoiceEngine::is_speaking`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    /// No recognition session requested
    Idle,
    /// Continuous command listening
    GlobalListening,
    /// Dictation into a text sink
    Dictating,
}

type TranscriptSink = Arc<dyn Fn(TranscriptEvent) + Send + Sync>;

struct EngineState {
    mode: VoiceState,

    // Whether the operator wants the global listener running. Distinct from
    // mode: survives unsolicited session terminations, cleared by explicit
    // stop and while dictation holds the recognizer.
    global_requested: bool,

    // Bumped on every explicit transition; session tasks carry the value
    // they were spawned under and stand down on mismatch.
    generation: u64,

    global_sink: Option<TranscriptSink>,
    global_control: Option<Arc<dyn SessionControl>>,
    dictation_control: Option<Arc<dyn SessionControl>>,
    resume_after_dictation: bool,
}

/// The voice interaction engine
///
/// Cheap to clone; clones share the same underlying state.
#[derive(Clone)]
pub struct VoiceEngine {
    recognition: Arc<dyn RecognitionBackend>,
    synthesis: Arc<dyn SynthesisBackend>,
    config: VoiceConfig,
    state: Arc<Mutex<EngineState>>,
    utterance_seq: Arc<AtomicU64>,
    speaking: Arc<AtomicBool>,
}

impl VoiceEngine {
    /// Create an engine over the given platform backends
    #[must_use]
    pub fn new(
        recognition: Arc<dyn RecognitionBackend>,
        synthesis: Arc<dyn SynthesisBackend>,
        config: VoiceConfig,
    ) -> Self {
        Self {
            recognition,
            synthesis,
            config,
            state: Arc::new(Mutex::new(EngineState {
                mode: VoiceState::Idle,
                global_requested: false,
                generation: 0,
                global_sink: None,
                global_control: None,
                dictation_control: None,
                resume_after_dictation: false,
            })),
            utterance_seq: Arc::new(AtomicU64::new(0)),
            speaking: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start continuous command listening
    ///
    /// Logged no-op when the platform lacks recognition. Ignored when
    /// already listening. Ends an active dictation first: listening and
    /// dictation never overlap.
    pub fn start_global_listening<F>(&self, on_transcript: F)
    where
        F: Fn(TranscriptEvent) + Send + Sync + 'static,
    {
        if !self.recognition.is_supported() {
            tracing::warn!("speech recognition not supported; global listening unavailable");
            return;
        }

        let sink: TranscriptSink = Arc::new(on_transcript);
        let (generation, displaced) = {
            let mut st = self.state.lock().unwrap();
            if st.mode == VoiceState::GlobalListening {
                tracing::debug!("already listening; ignoring start request");
                return;
            }
            let displaced = if st.mode == VoiceState::Dictating {
                st.resume_after_dictation = false;
                st.dictation_control.take()
            } else {
                None
            };
            st.generation += 1;
            st.mode = VoiceState::GlobalListening;
            st.global_requested = true;
            st.global_sink = Some(Arc::clone(&sink));
            (st.generation, displaced)
        };

        if let Some(control) = displaced {
            control.stop();
        }

        tracing::debug!("global listening started");
        self.spawn_global_session(generation, sink);
    }

    /// Stop continuous command listening
    ///
    /// Session terminations observed after this call do not restart the
    /// listener. Also cancels a pending resume-after-dictation.
    pub fn stop_global_listening(&self) {
        let control = {
            let mut st = self.state.lock().unwrap();
            st.global_requested = false;
            st.resume_after_dictation = false;
            st.global_sink = None;
            let control = st.global_control.take();
            if st.mode == VoiceState::GlobalListening {
                st.mode = VoiceState::Idle;
                st.generation += 1;
            }
            control
        };

        if let Some(control) = control {
            control.stop();
        }
        tracing::debug!("global listening stopped");
    }

    /// Start a dictation session
    ///
    /// Suspends global listening if it is active and resumes it after the
    /// dictation ends. `on_text` receives the full accumulated text
    /// (committed plus current interim) on every recognition result;
    /// `on_end` fires once when the session ends, before any resumed
    /// listening restart.
    pub fn start_dictation<F, E>(&self, on_text: F, on_end: E)
    where
        F: Fn(String) + Send + Sync + 'static,
        E: FnOnce() + Send + 'static,
    {
        if !self.recognition.is_supported() {
            tracing::warn!("speech recognition not supported; dictation unavailable");
            return;
        }

        let (generation, suspended) = {
            let mut st = self.state.lock().unwrap();
            if st.mode == VoiceState::Dictating {
                tracing::debug!("dictation already active; ignoring start request");
                return;
            }
            let was_listening = st.mode == VoiceState::GlobalListening;
            let suspended = st.global_control.take();
            st.resume_after_dictation = was_listening;
            st.global_requested = false;
            st.mode = VoiceState::Dictating;
            st.generation += 1;
            (st.generation, suspended)
        };

        if let Some(control) = suspended {
            control.stop();
            tracing::debug!("global listening suspended for dictation");
        }

        let options = SessionOptions {
            continuous: true,
            interim_results: true,
            language: self.config.language.clone(),
        };
        let session = match self.recognition.open_session(&options) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(error = %e, "failed to open dictation session");
                let resume = {
                    let mut st = self.state.lock().unwrap();
                    if st.generation == generation {
                        st.mode = VoiceState::Idle;
                        std::mem::take(&mut st.resume_after_dictation)
                    } else {
                        false
                    }
                };
                if resume {
                    self.resume_global_listening();
                }
                return;
            }
        };

        {
            let mut st = self.state.lock().unwrap();
            if st.generation != generation {
                session.control.stop();
                return;
            }
            st.dictation_control = Some(Arc::clone(&session.control));
        }

        let engine = self.clone();
        let mut events = session.events;
        tokio::spawn(async move {
            let mut committed = String::new();
            while let Some(event) = events.recv().await {
                match event {
                    SessionEvent::Transcript(t) => {
                        let current =
                            engine.state.lock().unwrap().generation == generation;
                        if !current {
                            continue;
                        }
                        if t.is_final {
                            committed.push_str(&t.text);
                            on_text(committed.clone());
                        } else {
                            on_text(format!("{committed}{}", t.text));
                        }
                    }
                    SessionEvent::Ended => break,
                }
            }

            let resume = {
                let mut st = engine.state.lock().unwrap();
                if st.generation == generation {
                    st.mode = VoiceState::Idle;
                    st.dictation_control = None;
                    std::mem::take(&mut st.resume_after_dictation)
                } else {
                    false
                }
            };

            // End callback is observed before any resumed restart
            on_end();

            if resume {
                engine.resume_global_listening();
                tracing::debug!("global listening resumed after dictation");
            }
        });

        tracing::debug!("dictation started");
    }

    /// Stop the active dictation session
    ///
    /// The session's end callback (and any listening resume) runs on the
    /// backend's end acknowledgement, keeping end-before-resume ordering.
    pub fn stop_dictation(&self) {
        let control = {
            let st = self.state.lock().unwrap();
            if st.mode != VoiceState::Dictating {
                return;
            }
            st.dictation_control.clone()
        };

        if let Some(control) = control {
            control.stop();
        }
    }

    /// Speak one utterance, preempting whatever is currently playing
    ///
    /// Last call wins: a preempted utterance's `on_end` never fires. The
    /// named voice is bound only when the platform advertises it; the
    /// engine falls back to the configured voice, then the platform
    /// default. Logged no-op when the platform lacks synthesis.
    pub fn speak(
        &self,
        text: &str,
        voice_name: Option<&str>,
        on_end: Option<Box<dyn FnOnce() + Send>>,
    ) {
        if !self.synthesis.is_supported() {
            tracing::warn!("speech synthesis not supported; dropping utterance");
            return;
        }

        // Bump before cancelling so the preempted task observes it is stale
        let seq = self.utterance_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.synthesis.cancel();

        let requested = voice_name
            .filter(|name| *name != "default")
            .or(self.config.voice.as_deref());
        let voice = requested.and_then(|name| {
            let found = self
                .synthesis
                .voices()
                .into_iter()
                .find(|v| v.name == name);
            if found.is_none() {
                tracing::debug!(voice = name, "voice not available; using platform default");
            }
            found.map(|v| v.name)
        });

        let utterance = Utterance {
            text: text.to_string(),
            voice,
            rate: self.config.rate,
            language: self.config.language.clone(),
        };

        self.speaking.store(true, Ordering::SeqCst);
        let engine = self.clone();
        tokio::spawn(async move {
            let outcome = engine.synthesis.speak(utterance).await;
            let still_current = engine.utterance_seq.load(Ordering::SeqCst) == seq;
            if still_current {
                engine.speaking.store(false, Ordering::SeqCst);
            }
            match outcome {
                Ok(SpeakOutcome::Completed) if still_current => {
                    if let Some(callback) = on_end {
                        callback();
                    }
                }
                Ok(SpeakOutcome::Completed) => {
                    tracing::debug!("utterance superseded before completion");
                }
                Ok(SpeakOutcome::Interrupted) => {
                    tracing::debug!("utterance interrupted");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "synthesis failed");
                }
            }
        });
    }

    /// Current logical state
    #[must_use]
    pub fn state(&self) -> VoiceState {
        self.state.lock().unwrap().mode
    }

    /// Whether the global command listener is logically active
    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.state.lock().unwrap().global_requested
    }

    /// Whether an utterance is currently playing
    #[must_use]
    pub fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::SeqCst)
    }

    /// Restart global listening with the remembered transcript sink
    fn resume_global_listening(&self) {
        let (generation, sink) = {
            let mut st = self.state.lock().unwrap();
            if st.mode != VoiceState::Idle {
                return;
            }
            let Some(sink) = st.global_sink.clone() else {
                return;
            };
            st.generation += 1;
            st.mode = VoiceState::GlobalListening;
            st.global_requested = true;
            (st.generation, sink)
        };
        self.spawn_global_session(generation, sink);
    }

    /// Run one logical global-listening session, reopening the platform
    /// session every time it terminates without being asked to
    fn spawn_global_session(&self, generation: u64, sink: TranscriptSink) {
        let engine = self.clone();
        tokio::spawn(async move {
            loop {
                let options = SessionOptions {
                    continuous: true,
                    interim_results: false,
                    language: engine.config.language.clone(),
                };
                let session = match engine.recognition.open_session(&options) {
                    Ok(session) => session,
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to open recognition session");
                        let mut st = engine.state.lock().unwrap();
                        if st.generation == generation {
                            st.mode = VoiceState::Idle;
                            st.global_requested = false;
                            st.global_sink = None;
                            st.global_control = None;
                        }
                        return;
                    }
                };

                let mut events = session.events;
                {
                    let mut st = engine.state.lock().unwrap();
                    if st.generation != generation || !st.global_requested {
                        // stopped while the session was opening
                        session.control.stop();
                        return;
                    }
                    st.global_control = Some(Arc::clone(&session.control));
                }

                while let Some(event) = events.recv().await {
                    match event {
                        SessionEvent::Transcript(t) => {
                            let current =
                                engine.state.lock().unwrap().generation == generation;
                            if current {
                                sink(t);
                            }
                        }
                        SessionEvent::Ended => break,
                    }
                }

                let should_restart = {
                    let st = engine.state.lock().unwrap();
                    st.generation == generation && st.global_requested
                };
                if !should_restart {
                    return;
                }
                tracing::debug!("recognition session ended on its own; restarting");
            }
        });
    }
}
