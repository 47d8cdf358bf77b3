//! Configuration management for the MAITRI gateway
//!
//! All tuning constants live here rather than in the components that use
//! them. The wellness baselines in particular are empirical values observed
//! on real crews and are expected to be recalibrated per operator.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::{Error, Result};

/// Gateway configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Voice engine configuration
    pub voice: VoiceConfig,

    /// Wellness inference configuration
    pub wellness: WellnessConfig,

    /// Mission alert configuration
    pub alerts: AlertConfig,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)?;
        Ok(config)
    }

    /// Load configuration from the default location, falling back to
    /// built-in defaults when no config file exists
    ///
    /// # Errors
    ///
    /// Returns error if a config file exists but cannot be parsed
    pub fn load_default() -> Result<Self> {
        let Some(path) = default_config_path() else {
            return Ok(Self::default());
        };
        if path.exists() {
            tracing::debug!(path = %path.display(), "loading config file");
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }
}

/// Default config file path (`~/.maitri/config.toml`)
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|dirs| dirs.home_dir().join(".maitri").join("config.toml"))
}

/// Voice engine configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VoiceConfig {
    /// Recognition and synthesis language tag
    pub language: String,

    /// Preferred synthesis voice name; `None` uses the platform default
    pub voice: Option<String>,

    /// Synthesis speaking rate multiplier
    pub rate: f32,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            voice: None,
            rate: 0.9,
        }
    }
}

/// Wellness inference configuration
///
/// The three baselines are magic numbers inherited from crew observation:
/// an inner-eyebrow distance around 30 units reads as relaxed, a lip gap
/// around 5 units reads as a slack jaw, and a healthy voiced spectrum
/// averages around 100 on the 0-255 magnitude scale.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WellnessConfig {
    /// Inner-eyebrow distance considered fully relaxed
    pub brow_relaxed_distance: f32,

    /// Vertical lip gap considered fully relaxed
    pub lip_relaxed_gap: f32,

    /// Average spectrum magnitude of a healthy voice (0-255 scale)
    pub audio_reference_level: f32,

    /// Weight of the brow-furrow channel in the stress score
    pub furrow_weight: f32,

    /// Weight of the jaw-tension channel in the stress score
    pub tension_weight: f32,

    /// Interval between model readiness polls, in milliseconds
    pub model_poll_interval_ms: u64,

    /// Maximum number of readiness polls before giving up
    pub model_poll_attempts: u32,

    /// FFT window size for the audio analyser
    pub fft_size: usize,

    /// Requested capture frame width
    pub video_width: u32,

    /// Requested capture frame height
    pub video_height: u32,
}

impl WellnessConfig {
    /// Interval between model readiness polls
    #[must_use]
    pub const fn model_poll_interval(&self) -> Duration {
        Duration::from_millis(self.model_poll_interval_ms)
    }

    /// Validate weight and baseline sanity
    ///
    /// # Errors
    ///
    /// Returns error if any baseline is non-positive or the FFT size is not
    /// a power of two
    pub fn validate(&self) -> Result<()> {
        if self.brow_relaxed_distance <= 0.0
            || self.lip_relaxed_gap <= 0.0
            || self.audio_reference_level <= 0.0
        {
            return Err(Error::Config(
                "wellness baselines must be positive".to_string(),
            ));
        }
        if !self.fft_size.is_power_of_two() {
            return Err(Error::Config(format!(
                "fft_size must be a power of two, got {}",
                self.fft_size
            )));
        }
        Ok(())
    }
}

impl Default for WellnessConfig {
    fn default() -> Self {
        Self {
            brow_relaxed_distance: 30.0,
            lip_relaxed_gap: 5.0,
            audio_reference_level: 100.0,
            furrow_weight: 0.70,
            tension_weight: 0.30,
            model_poll_interval_ms: 500,
            model_poll_attempts: 10,
            fft_size: 2048,
            video_width: 120,
            video_height: 120,
        }
    }
}

/// Mission alert configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AlertConfig {
    /// Enable spoken mission alerts
    pub enabled: bool,

    /// Lead times before each event, in minutes
    pub lead_times_min: Vec<u32>,

    /// How long a fired alert stays visible, in seconds
    pub display_duration_secs: u64,
}

impl AlertConfig {
    /// How long a fired alert stays visible
    #[must_use]
    pub const fn display_duration(&self) -> Duration {
        Duration::from_secs(self.display_duration_secs)
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            lead_times_min: vec![15, 10, 5, 3, 1],
            display_duration_secs: 7,
        }
    }
}
