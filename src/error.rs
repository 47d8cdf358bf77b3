//! Error types for the MAITRI gateway

use thiserror::Error;

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the MAITRI gateway
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// The platform has no speech recognition engine
    ///
    /// Non-fatal: callers degrade to a logged no-op.
    #[error("speech recognition not supported on this platform")]
    RecognitionUnsupported,

    /// The platform has no speech synthesis engine
    ///
    /// Non-fatal: callers degrade to a logged no-op.
    #[error("speech synthesis not supported on this platform")]
    SynthesisUnsupported,

    /// Camera/microphone access was denied by the operator or platform
    #[error("camera/microphone permission denied: {0}")]
    PermissionDenied(String),

    /// No usable capture device is present or the device is busy
    #[error("capture device unavailable: {0}")]
    DeviceUnavailable(String),

    /// The landmark model runtime never became ready within the poll budget
    #[error("landmark model failed to load after {attempts} attempts")]
    ModelLoadTimeout {
        /// Number of readiness polls issued before giving up
        attempts: u32,
    },

    /// Landmark model error (load or inference)
    #[error("model error: {0}")]
    Model(String),

    /// Audio error
    #[error("audio error: {0}")]
    Audio(String),

    /// Voice engine error
    #[error("voice error: {0}")]
    Voice(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
