//! MAITRI Gateway - multimodal interaction core for an isolated operator
//!
//! This library provides the real-time interaction pipeline for the MAITRI
//! crew assistant:
//! - Voice interaction (global command listening, dictation, synthesis)
//! - Command grammar matching (hotword + navigation phrases)
//! - Device acquisition (the single camera+microphone session)
//! - Wellness inference (continuous stress/fatigue estimation)
//! - Mission alert scheduling (spoken lead-time reminders)
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                    View layer                        │
//! │  navigation  │  transcripts  │  wellness dashboard   │
//! └───────────────────────┬──────────────────────────────┘
//!                         │
//! ┌───────────────────────▼──────────────────────────────┐
//! │                  MAITRI Gateway                      │
//! │  VoiceEngine │ CommandGrammar │ WellnessMonitor │    │
//! │              │ AlertScheduler │ AcquisitionManager   │
//! └───────────────────────┬──────────────────────────────┘
//!                         │
//! ┌───────────────────────▼──────────────────────────────┐
//! │              Platform seams (injected)               │
//! │  recognition │ synthesis │ media devices │ landmarks │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! One operator, one camera, one microphone, one speech engine: the
//! acquisition handle and the synthesis queue are process-wide singletons,
//! constructed explicitly and injected where needed.

pub mod alerts;
pub mod command;
pub mod config;
pub mod daemon;
pub mod error;
pub mod media;
pub mod voice;
pub mod wellness;

pub use command::{CommandGrammar, NavigationTarget};
pub use config::Config;
pub use daemon::Daemon;
pub use error::{Error, Result};
pub use voice::{VoiceEngine, VoiceState};
pub use wellness::{MonitorStatus, WellnessMonitor, WellnessReading};
