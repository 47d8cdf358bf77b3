//! Shared test doubles for the platform seams
//!
//! Scripted recognition/synthesis engines, media tracks, and a landmark
//! runtime, so the pipeline can be driven without audio or camera hardware.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::{Mutex as AsyncMutex, mpsc, oneshot};

use maitri_gateway::media::{
    AudioTrack, MediaBackend, MediaConstraints, MediaStream, VideoFrame, VideoTrack,
};
use maitri_gateway::voice::{
    RecognitionBackend, RecognitionSession, SessionControl, SessionEvent, SessionOptions,
    SpeakOutcome, SynthesisBackend, TranscriptEvent, Utterance, VoiceInfo,
};
use maitri_gateway::wellness::{FaceMesh, Keypoint, LandmarkModel, ModelConfig, ModelRuntime};
use maitri_gateway::{Error, Result};

/// Let spawned tasks drain their ready work on the current-thread runtime
pub async fn settle() {
    for _ in 0..64 {
        tokio::task::yield_now().await;
    }
}

// --- Recognition ---

/// One session opened by the engine under test
pub struct ScriptedSession {
    pub options: SessionOptions,
    tx: mpsc::UnboundedSender<SessionEvent>,
    stopped: Arc<AtomicBool>,
}

impl ScriptedSession {
    /// Deliver a recognition result
    pub fn push_transcript(&self, text: &str, is_final: bool) {
        let _ = self
            .tx
            .send(SessionEvent::Transcript(TranscriptEvent::new(text, is_final)));
    }

    /// Terminate the session the way the platform does: unasked
    pub fn end(&self) {
        let _ = self.tx.send(SessionEvent::Ended);
    }

    /// Whether the engine asked this session to stop
    pub fn was_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

struct ScriptedControl {
    tx: mpsc::UnboundedSender<SessionEvent>,
    stopped: Arc<AtomicBool>,
}

impl SessionControl for ScriptedControl {
    fn stop(&self) {
        if !self.stopped.swap(true, Ordering::SeqCst) {
            let _ = self.tx.send(SessionEvent::Ended);
        }
    }
}

/// Recognition backend whose sessions are driven by the test
pub struct ScriptedRecognition {
    supported: bool,
    sessions: Mutex<Vec<Arc<ScriptedSession>>>,
}

impl ScriptedRecognition {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            supported: true,
            sessions: Mutex::new(Vec::new()),
        })
    }

    pub fn unsupported() -> Arc<Self> {
        Arc::new(Self {
            supported: false,
            sessions: Mutex::new(Vec::new()),
        })
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    pub fn session(&self, index: usize) -> Arc<ScriptedSession> {
        Arc::clone(&self.sessions.lock().unwrap()[index])
    }

    pub fn last_session(&self) -> Arc<ScriptedSession> {
        Arc::clone(self.sessions.lock().unwrap().last().expect("no session opened"))
    }
}

impl RecognitionBackend for ScriptedRecognition {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn open_session(&self, options: &SessionOptions) -> Result<RecognitionSession> {
        if !self.supported {
            return Err(Error::RecognitionUnsupported);
        }
        let (tx, events) = mpsc::unbounded_channel();
        let stopped = Arc::new(AtomicBool::new(false));
        let session = Arc::new(ScriptedSession {
            options: options.clone(),
            tx: tx.clone(),
            stopped: Arc::clone(&stopped),
        });
        self.sessions.lock().unwrap().push(session);
        Ok(RecognitionSession {
            control: Arc::new(ScriptedControl { tx, stopped }),
            events,
        })
    }
}

// --- Synthesis ---

/// Synthesis backend whose playback the test finishes or interrupts
pub struct ScriptedSynthesis {
    supported: bool,
    voices: Vec<VoiceInfo>,
    spoken: Mutex<Vec<Utterance>>,
    current: Mutex<Option<oneshot::Sender<SpeakOutcome>>>,
}

impl ScriptedSynthesis {
    pub fn new() -> Arc<Self> {
        Self::with_voices(&[])
    }

    pub fn with_voices(names: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            supported: true,
            voices: names
                .iter()
                .map(|name| VoiceInfo {
                    name: (*name).to_string(),
                    language: "en-US".to_string(),
                })
                .collect(),
            spoken: Mutex::new(Vec::new()),
            current: Mutex::new(None),
        })
    }

    pub fn unsupported() -> Arc<Self> {
        Arc::new(Self {
            supported: false,
            voices: Vec::new(),
            spoken: Mutex::new(Vec::new()),
            current: Mutex::new(None),
        })
    }

    /// Every utterance handed to the backend, in order
    pub fn utterances(&self) -> Vec<Utterance> {
        self.spoken.lock().unwrap().clone()
    }

    /// Play the current utterance to completion
    pub fn finish_current(&self) -> bool {
        self.current
            .lock()
            .unwrap()
            .take()
            .is_some_and(|tx| tx.send(SpeakOutcome::Completed).is_ok())
    }
}

#[async_trait]
impl SynthesisBackend for ScriptedSynthesis {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn voices(&self) -> Vec<VoiceInfo> {
        self.voices.clone()
    }

    fn cancel(&self) {
        if let Some(tx) = self.current.lock().unwrap().take() {
            let _ = tx.send(SpeakOutcome::Interrupted);
        }
    }

    async fn speak(&self, utterance: Utterance) -> Result<SpeakOutcome> {
        if !self.supported {
            return Err(Error::SynthesisUnsupported);
        }
        self.spoken.lock().unwrap().push(utterance);
        let (tx, rx) = oneshot::channel();
        *self.current.lock().unwrap() = Some(tx);
        rx.await
            .map_err(|_| Error::Voice("synthesis backend dropped".to_string()))
    }
}

// --- Media ---

/// Microphone track fed by the test
pub struct MockAudioTrack {
    queued: Mutex<Vec<f32>>,
    live: AtomicBool,
    stop_calls: AtomicUsize,
}

impl MockAudioTrack {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            queued: Mutex::new(Vec::new()),
            live: AtomicBool::new(true),
            stop_calls: AtomicUsize::new(0),
        })
    }

    pub fn queue_samples(&self, samples: &[f32]) {
        self.queued.lock().unwrap().extend_from_slice(samples);
    }

    pub fn stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }
}

impl AudioTrack for MockAudioTrack {
    fn read_samples(&self) -> Vec<f32> {
        std::mem::take(&mut *self.queued.lock().unwrap())
    }

    fn stop(&self) {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        self.live.store(false, Ordering::SeqCst);
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }
}

/// Camera track fed by the test
pub struct MockVideoTrack {
    tx: Mutex<Option<mpsc::UnboundedSender<VideoFrame>>>,
    rx: AsyncMutex<mpsc::UnboundedReceiver<VideoFrame>>,
    live: AtomicBool,
    stop_calls: AtomicUsize,
}

impl MockVideoTrack {
    pub fn new() -> Arc<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        Arc::new(Self {
            tx: Mutex::new(Some(tx)),
            rx: AsyncMutex::new(rx),
            live: AtomicBool::new(true),
            stop_calls: AtomicUsize::new(0),
        })
    }

    pub fn push_frame(&self, frame: VideoFrame) {
        if let Some(tx) = self.tx.lock().unwrap().as_ref() {
            let _ = tx.send(frame);
        }
    }

    pub fn stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VideoTrack for MockVideoTrack {
    async fn next_frame(&self) -> Option<VideoFrame> {
        self.rx.lock().await.recv().await
    }

    fn stop(&self) {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        self.live.store(false, Ordering::SeqCst);
        // close the frame channel so pending next_frame calls resolve
        self.tx.lock().unwrap().take();
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }
}

/// Which error a failing media backend reports
#[derive(Debug, Clone, Copy)]
pub enum MediaFailure {
    PermissionDenied,
    DeviceUnavailable,
}

/// Media backend over mock tracks
pub struct MockMediaBackend {
    audio: Arc<MockAudioTrack>,
    video: Arc<MockVideoTrack>,
    failure: Option<MediaFailure>,
    open_calls: AtomicUsize,
}

impl MockMediaBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            audio: MockAudioTrack::new(),
            video: MockVideoTrack::new(),
            failure: None,
            open_calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(failure: MediaFailure) -> Arc<Self> {
        Arc::new(Self {
            audio: MockAudioTrack::new(),
            video: MockVideoTrack::new(),
            failure: Some(failure),
            open_calls: AtomicUsize::new(0),
        })
    }

    pub fn audio(&self) -> Arc<MockAudioTrack> {
        Arc::clone(&self.audio)
    }

    pub fn video(&self) -> Arc<MockVideoTrack> {
        Arc::clone(&self.video)
    }

    pub fn open_calls(&self) -> usize {
        self.open_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaBackend for MockMediaBackend {
    async fn open(&self, _constraints: &MediaConstraints) -> Result<MediaStream> {
        self.open_calls.fetch_add(1, Ordering::SeqCst);
        match self.failure {
            Some(MediaFailure::PermissionDenied) => Err(Error::PermissionDenied(
                "operator denied camera access".to_string(),
            )),
            Some(MediaFailure::DeviceUnavailable) => {
                Err(Error::DeviceUnavailable("camera busy".to_string()))
            }
            None => Ok(MediaStream {
                audio: self.audio(),
                video: self.video(),
            }),
        }
    }
}

// --- Landmark model ---

struct MockModel {
    faces: Arc<Mutex<Vec<FaceMesh>>>,
}

#[async_trait]
impl LandmarkModel for MockModel {
    async fn estimate_faces(&self, _frame: &VideoFrame) -> Result<Vec<FaceMesh>> {
        Ok(self.faces.lock().unwrap().clone())
    }
}

/// Landmark runtime that becomes available after a scripted number of polls
pub struct MockModelRuntime {
    ready_after: u32,
    checks: AtomicU32,
    faces: Arc<Mutex<Vec<FaceMesh>>>,
}

impl MockModelRuntime {
    /// Available on the first poll
    pub fn ready() -> Arc<Self> {
        Self::ready_after(0)
    }

    /// First `polls` availability checks report false
    pub fn ready_after(polls: u32) -> Arc<Self> {
        Arc::new(Self {
            ready_after: polls,
            checks: AtomicU32::new(0),
            faces: Arc::new(Mutex::new(Vec::new())),
        })
    }

    /// Never becomes available
    pub fn never_ready() -> Arc<Self> {
        Self::ready_after(u32::MAX)
    }

    /// Number of availability polls issued so far
    pub fn availability_checks(&self) -> u32 {
        self.checks.load(Ordering::SeqCst)
    }

    /// Faces every inference pass will report
    pub fn set_faces(&self, faces: Vec<FaceMesh>) {
        *self.faces.lock().unwrap() = faces;
    }
}

#[async_trait]
impl ModelRuntime for MockModelRuntime {
    fn is_available(&self) -> bool {
        let checks = self.checks.fetch_add(1, Ordering::SeqCst) + 1;
        checks > self.ready_after
    }

    async fn load(&self, _config: &ModelConfig) -> Result<Arc<dyn LandmarkModel>> {
        Ok(Arc::new(MockModel {
            faces: Arc::clone(&self.faces),
        }))
    }
}

// --- Fixtures ---

/// A minimal decodable frame
pub fn test_frame() -> VideoFrame {
    VideoFrame::new(4, 4, vec![0; 16]).expect("valid frame")
}

/// Face mesh with the four wellness reference keypoints placed as given
pub fn mesh_with(
    brow_left: (f32, f32),
    brow_right: (f32, f32),
    lip_upper_y: f32,
    lip_lower_y: f32,
) -> FaceMesh {
    use maitri_gateway::wellness::{INNER_BROW_LEFT, INNER_BROW_RIGHT, LOWER_LIP, UPPER_LIP};

    let mut keypoints = vec![
        Keypoint {
            x: 0.0,
            y: 0.0,
            z: 0.0
        };
        468
    ];
    keypoints[INNER_BROW_LEFT] = Keypoint {
        x: brow_left.0,
        y: brow_left.1,
        z: 0.0,
    };
    keypoints[INNER_BROW_RIGHT] = Keypoint {
        x: brow_right.0,
        y: brow_right.1,
        z: 0.0,
    };
    keypoints[UPPER_LIP] = Keypoint {
        x: 0.0,
        y: lip_upper_y,
        z: 0.0,
    };
    keypoints[LOWER_LIP] = Keypoint {
        x: 0.0,
        y: lip_lower_y,
        z: 0.0,
    };
    FaceMesh { keypoints }
}
