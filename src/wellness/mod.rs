//! Wellness inference
//!
//! Turns the live camera+microphone stream into a continuous (stress,
//! fatigue) estimate. The camera channel runs facial-landmark inference per
//! frame (brow furrow and jaw tension); the microphone channel reads the
//! voiced band of the magnitude spectrum. Scores are bounded to [0, 100]
//! and published latest-wins; nothing here keeps history.

mod analyser;
mod model;
mod monitor;
mod score;

pub use analyser::SpectrumAnalyser;
pub use model::{
    FaceMesh, INNER_BROW_LEFT, INNER_BROW_RIGHT, Keypoint, LandmarkModel, LOWER_LIP, ModelConfig,
    ModelRuntime, UPPER_LIP, UnavailableModelRuntime,
};
pub use monitor::{MonitorStatus, WellnessMonitor, WellnessReading};
pub use score::{brow_furrow, fatigue_score, jaw_tension, stress_from_mesh, stress_score};
