//! Mission alert scheduling
//!
//! Turns a mission cadence (clock-time events) into spoken lead-time
//! reminders. Every (event, lead-time) pair still in the future gets one
//! timer; rescheduling aborts all pending timers first so stale reminders
//! never fire.

use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveTime};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::AlertConfig;
use crate::voice::VoiceEngine;

/// One scheduled mission event
#[derive(Debug, Clone)]
pub struct MissionEvent {
    /// Clock time the event starts
    pub time: NaiveTime,

    /// Operator-facing event name
    pub label: String,
}

impl MissionEvent {
    /// Create a mission event
    #[must_use]
    pub fn new(time: NaiveTime, label: impl Into<String>) -> Self {
        Self {
            time,
            label: label.into(),
        }
    }
}

/// Schedules spoken lead-time reminders for mission events
pub struct AlertScheduler {
    engine: VoiceEngine,
    config: AlertConfig,
    alert_tx: watch::Sender<Option<String>>,
    timers: Mutex<Vec<JoinHandle<()>>>,
}

impl AlertScheduler {
    /// Create a scheduler speaking through the given engine
    #[must_use]
    pub fn new(engine: VoiceEngine, config: AlertConfig) -> Self {
        let (alert_tx, _) = watch::channel(None);
        Self {
            engine,
            config,
            alert_tx,
            timers: Mutex::new(Vec::new()),
        }
    }

    /// Replace the schedule
    ///
    /// Aborts every pending timer, then arms one timer per (event,
    /// lead-time) pair whose instant is still in the future.
    pub fn schedule(&self, events: &[MissionEvent]) {
        self.schedule_at(events, Local::now());
    }

    /// Replace the schedule, expanding lead times relative to `now`
    pub fn schedule_at(&self, events: &[MissionEvent], now: DateTime<Local>) {
        self.cancel_all();

        if !self.config.enabled {
            tracing::debug!("mission alerts disabled");
            return;
        }

        let pending = pending_alerts(events, &self.config.lead_times_min, now);
        tracing::debug!(count = pending.len(), "arming mission alerts");

        let mut timers = self.timers.lock().unwrap();
        for alert in pending {
            let engine = self.engine.clone();
            let alert_tx = self.alert_tx.clone();
            let display = self.config.display_duration();
            timers.push(tokio::spawn(async move {
                tokio::time::sleep(alert.delay).await;

                tracing::info!(message = %alert.message, "mission alert");
                alert_tx.send_replace(Some(alert.message.clone()));
                engine.speak(&alert.message, None, None);

                tokio::time::sleep(display).await;
                // Clear only our own message; a newer alert stays up
                alert_tx.send_if_modified(|current| {
                    if current.as_deref() == Some(alert.message.as_str()) {
                        *current = None;
                        true
                    } else {
                        false
                    }
                });
            }));
        }
    }

    /// Abort every pending timer
    pub fn cancel_all(&self) {
        let mut timers = self.timers.lock().unwrap();
        if !timers.is_empty() {
            tracing::debug!(count = timers.len(), "cancelling pending alerts");
        }
        for timer in timers.drain(..) {
            timer.abort();
        }
    }

    /// Watch the currently displayed alert message
    #[must_use]
    pub fn active_alert(&self) -> watch::Receiver<Option<String>> {
        self.alert_tx.subscribe()
    }
}

impl Drop for AlertScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

/// One armed reminder
#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingAlert {
    delay: Duration,
    message: String,
}

/// Expand events into future (event x lead-time) reminders relative to `now`
fn pending_alerts(
    events: &[MissionEvent],
    lead_times_min: &[u32],
    now: DateTime<Local>,
) -> Vec<PendingAlert> {
    let mut pending = Vec::new();

    for event in events {
        let Some(event_at) = now.with_time(event.time).single() else {
            continue;
        };

        for &lead in lead_times_min {
            let alert_at = event_at - chrono::Duration::minutes(i64::from(lead));
            if alert_at <= now {
                continue;
            }
            let delay = (alert_at - now).to_std().unwrap_or_default();
            let unit = if lead == 1 { "minute" } else { "minutes" };
            pending.push(PendingAlert {
                delay,
                message: format!("Upcoming: {} in {lead} {unit}.", event.label),
            });
        }
    }

    pending
}
