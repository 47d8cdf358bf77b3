//! Media device management
//!
//! Owns the combined camera+microphone stream. Acquisition goes through
//! [`AcquisitionManager`] so exactly one device session exists system-wide;
//! the platform capture stack sits behind the [`MediaBackend`] seam.

mod acquisition;
mod backend;
mod capture;

pub use acquisition::{AcquisitionHandle, AcquisitionManager};
pub use backend::{
    AudioTrack, HostMediaBackend, MediaBackend, MediaConstraints, MediaStream, VideoFrame,
    VideoTrack,
};
pub use capture::{MicrophoneTrack, SAMPLE_RATE, samples_to_wav};
