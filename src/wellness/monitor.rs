//! The wellness inference loop
//!
//! Lifecycle: `Initializing -> {Ready, Error}`; once `Ready` the loop runs
//! one analysis cycle per delivered camera frame until torn down. `Error`
//! is terminal — the monitor never retries on its own; recovery means
//! restarting the gateway.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::WellnessConfig;
use crate::media::{AcquisitionManager, MediaConstraints};
use crate::wellness::analyser::SpectrumAnalyser;
use crate::wellness::model::{ModelConfig, ModelRuntime};
use crate::wellness::score;
use crate::Error;

/// The current (stress, fatigue) estimate
///
/// One logical reading exists at a time; every analysis cycle overwrites
/// the previous one.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct WellnessReading {
    /// Stress score, 0 (calm) to 100
    pub stress: f32,

    /// Fatigue score, 0 (rested) to 100
    pub fatigue: f32,

    /// When the reading was produced
    pub timestamp: DateTime<Utc>,
}

impl WellnessReading {
    fn zero() -> Self {
        Self {
            stress: 0.0,
            fatigue: 0.0,
            timestamp: Utc::now(),
        }
    }
}

/// Monitor lifecycle state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorStatus {
    /// Waiting for the model runtime and devices
    Initializing,

    /// Analysis loop is running
    Ready,

    /// Terminal failure with an operator-facing message
    Error(String),
}

impl std::fmt::Display for MonitorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initializing => write!(f, "initializing"),
            Self::Ready => write!(f, "ready"),
            Self::Error(message) => write!(f, "error: {message}"),
        }
    }
}

/// Continuous biometric wellness monitor
pub struct WellnessMonitor {
    status_rx: watch::Receiver<MonitorStatus>,
    reading_rx: watch::Receiver<WellnessReading>,
    shutdown_tx: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl WellnessMonitor {
    /// Spawn the monitor: initialization begins immediately
    #[must_use]
    pub fn spawn(
        runtime: Arc<dyn ModelRuntime>,
        acquisition: Arc<AcquisitionManager>,
        config: WellnessConfig,
    ) -> Self {
        let (status_tx, status_rx) = watch::channel(MonitorStatus::Initializing);
        let (reading_tx, reading_rx) = watch::channel(WellnessReading::zero());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(run(
            runtime,
            acquisition,
            config,
            status_tx,
            reading_tx,
            shutdown_rx,
        ));

        Self {
            status_rx,
            reading_rx,
            shutdown_tx,
            task: Mutex::new(Some(task)),
        }
    }

    /// Current lifecycle state
    #[must_use]
    pub fn status(&self) -> MonitorStatus {
        self.status_rx.borrow().clone()
    }

    /// Watch lifecycle transitions
    #[must_use]
    pub fn status_stream(&self) -> watch::Receiver<MonitorStatus> {
        self.status_rx.clone()
    }

    /// The latest reading
    #[must_use]
    pub fn latest(&self) -> WellnessReading {
        *self.reading_rx.borrow()
    }

    /// Subscribe to readings (latest-wins single slot)
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<WellnessReading> {
        self.reading_rx.clone()
    }

    /// Tear the monitor down
    ///
    /// Effective before the next analysis cycle. Safe to call repeatedly
    /// and at any lifecycle stage, including mid-initialization.
    pub async fn teardown(&self) {
        let _ = self.shutdown_tx.send(true);
        let task = self.task.lock().unwrap().take();
        if let Some(task) = task {
            let _ = task.await;
        }
    }
}

/// Initialization and analysis loop
async fn run(
    runtime: Arc<dyn ModelRuntime>,
    acquisition: Arc<AcquisitionManager>,
    config: WellnessConfig,
    status: watch::Sender<MonitorStatus>,
    readings: watch::Sender<WellnessReading>,
    mut shutdown: watch::Receiver<bool>,
) {
    if let Err(e) = config.validate() {
        status.send_replace(MonitorStatus::Error(e.to_string()));
        return;
    }

    // The runtime loads on its own schedule; poll with a bounded budget.
    let mut polls = 0u32;
    while !runtime.is_available() {
        polls += 1;
        if polls >= config.model_poll_attempts {
            let e = Error::ModelLoadTimeout { attempts: polls };
            tracing::error!(attempts = polls, "landmark runtime never became ready");
            status.send_replace(MonitorStatus::Error(e.to_string()));
            return;
        }
        tokio::select! {
            biased;
            _ = shutdown.changed() => return,
            () = tokio::time::sleep(config.model_poll_interval()) => {}
        }
    }

    let model = match runtime.load(&ModelConfig::default()).await {
        Ok(model) => model,
        Err(e) => {
            tracing::error!(error = %e, "landmark model load failed");
            status.send_replace(MonitorStatus::Error(e.to_string()));
            return;
        }
    };
    tracing::debug!(polls, "landmark model loaded");

    let constraints = MediaConstraints {
        video_width: config.video_width,
        video_height: config.video_height,
    };
    let handle = match acquisition.acquire(&constraints).await {
        Ok(handle) => handle,
        Err(e) => {
            tracing::error!(error = %e, "device acquisition failed");
            status.send_replace(MonitorStatus::Error(e.to_string()));
            return;
        }
    };

    if *shutdown.borrow() {
        handle.release();
        return;
    }

    let mut analyser = SpectrumAnalyser::new(config.fft_size);
    status.send_replace(MonitorStatus::Ready);
    tracing::info!("wellness monitor ready");

    // One cycle per delivered frame; awaiting the next frame is the
    // schedule, so cycles can never overlap.
    loop {
        let frame = tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            frame = handle.video().next_frame() => frame,
        };
        let Some(frame) = frame else {
            tracing::debug!("video track ended");
            break;
        };

        let stress = match model.estimate_faces(&frame).await {
            Ok(faces) => faces
                .first()
                .map_or(0.0, |mesh| score::stress_from_mesh(mesh, &config)),
            Err(e) => {
                tracing::warn!(error = %e, "landmark inference failed");
                0.0
            }
        };

        analyser.push_samples(&handle.audio().read_samples());
        let fatigue =
            score::fatigue_score(&analyser.frequency_data(), config.audio_reference_level);

        readings.send_replace(WellnessReading {
            stress,
            fatigue,
            timestamp: Utc::now(),
        });
    }

    handle.release();
    tracing::debug!("wellness monitor torn down");
}
