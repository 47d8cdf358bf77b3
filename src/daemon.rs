//! Daemon - the gateway composition root
//!
//! Wires the voice engine, command grammar, wellness monitor, and alert
//! scheduler together. Matched voice commands become navigation events;
//! navigation and wellness events are emitted as JSON lines on stdout for
//! the view layer to consume.

use std::sync::Arc;

use chrono::NaiveTime;
use tokio::sync::mpsc;

use crate::alerts::{AlertScheduler, MissionEvent};
use crate::command::{CommandGrammar, NavigationTarget};
use crate::config::Config;
use crate::media::{AcquisitionManager, MediaBackend};
use crate::voice::{RecognitionBackend, SynthesisBackend, VoiceEngine};
use crate::wellness::{ModelRuntime, MonitorStatus, WellnessMonitor};
use crate::Result;

/// The MAITRI daemon
///
/// All platform seams are injected; the daemon owns the singleton engine
/// and acquisition manager for the process.
pub struct Daemon {
    config: Config,
    engine: VoiceEngine,
    grammar: CommandGrammar,
    acquisition: Arc<AcquisitionManager>,
    model_runtime: Arc<dyn ModelRuntime>,
}

impl Daemon {
    /// Create a daemon over the given platform backends
    #[must_use]
    pub fn new(
        config: Config,
        recognition: Arc<dyn RecognitionBackend>,
        synthesis: Arc<dyn SynthesisBackend>,
        media: Arc<dyn MediaBackend>,
        model_runtime: Arc<dyn ModelRuntime>,
    ) -> Self {
        let engine = VoiceEngine::new(recognition, synthesis, config.voice.clone());
        Self {
            engine,
            grammar: CommandGrammar::default(),
            acquisition: Arc::new(AcquisitionManager::new(media)),
            model_runtime,
            config,
        }
    }

    /// The process-wide voice engine
    #[must_use]
    pub fn engine(&self) -> &VoiceEngine {
        &self.engine
    }

    /// Run the daemon until interrupted
    ///
    /// # Errors
    ///
    /// Returns error if the daemon encounters a fatal error
    pub async fn run(self) -> Result<()> {
        tracing::info!(hotword = %self.grammar.hotword(), "daemon running");

        // Voice commands -> navigation events
        let (nav_tx, mut nav_rx) = mpsc::unbounded_channel::<NavigationTarget>();
        let grammar = self.grammar.clone();
        self.engine.start_global_listening(move |event| {
            if let Some(command) = grammar.parse(&event.text) {
                tracing::info!(command, transcript = %event.text, "voice command matched");
                if let Some(target) = NavigationTarget::from_command(command) {
                    let _ = nav_tx.send(target);
                }
            }
        });

        let monitor = WellnessMonitor::spawn(
            Arc::clone(&self.model_runtime),
            Arc::clone(&self.acquisition),
            self.config.wellness.clone(),
        );

        let scheduler = AlertScheduler::new(self.engine.clone(), self.config.alerts.clone());
        scheduler.schedule(&default_mission_cadence());

        tracing::info!("maitri gateway ready - say \"{}\"", self.grammar.hotword());

        let mut readings = monitor.subscribe();
        let mut status = monitor.status_stream();
        let mut readings_open = true;
        let mut status_open = true;

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("interrupt received; shutting down");
                    break;
                }
                target = nav_rx.recv() => {
                    let Some(target) = target else { break };
                    emit_event(&serde_json::json!({
                        "type": "navigate",
                        "target": target,
                    }));
                }
                changed = readings.changed(), if readings_open => {
                    if changed.is_ok() {
                        let reading = *readings.borrow_and_update();
                        emit_event(&serde_json::json!({
                            "type": "wellness",
                            "reading": reading,
                        }));
                    } else {
                        readings_open = false;
                    }
                }
                changed = status.changed(), if status_open => {
                    if changed.is_ok() {
                        let current = status.borrow_and_update().clone();
                        if let MonitorStatus::Error(ref message) = current {
                            tracing::error!(%message, "wellness monitor failed");
                        }
                        emit_event(&serde_json::json!({
                            "type": "wellness-status",
                            "status": current.to_string(),
                        }));
                    } else {
                        status_open = false;
                    }
                }
            }
        }

        scheduler.cancel_all();
        monitor.teardown().await;
        self.engine.stop_global_listening();
        Ok(())
    }
}

/// The built-in mission cadence
#[must_use]
pub fn default_mission_cadence() -> Vec<MissionEvent> {
    [
        (8, 0, "Morning Briefing"),
        (11, 30, "Systems Check"),
        (14, 0, "EVA Prep"),
        (17, 0, "Geology Survey"),
    ]
    .into_iter()
    .map(|(hour, minute, label)| {
        MissionEvent::new(
            NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default(),
            label,
        )
    })
    .collect()
}

/// Emit one event line on stdout
fn emit_event(value: &serde_json::Value) {
    println!("{value}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cadence_is_ordered() {
        let cadence = default_mission_cadence();
        assert_eq!(cadence.len(), 4);
        assert!(cadence.windows(2).all(|pair| pair[0].time < pair[1].time));
        assert_eq!(cadence[0].label, "Morning Briefing");
    }
}
