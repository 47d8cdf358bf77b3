//! Platform media backend seam
//!
//! The gateway never talks to capture hardware directly; it asks a
//! [`MediaBackend`] for a combined audio+video stream and works with the
//! returned track handles. Platform integrations implement these traits;
//! tests inject scripted ones.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{Error, Result};

/// Constraints for opening a combined capture stream
#[derive(Debug, Clone)]
pub struct MediaConstraints {
    /// Requested video frame width
    pub video_width: u32,

    /// Requested video frame height
    pub video_height: u32,
}

impl Default for MediaConstraints {
    fn default() -> Self {
        Self {
            video_width: 120,
            video_height: 120,
        }
    }
}

/// A single decoded camera frame (8-bit luma plane)
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// Frame width in pixels
    pub width: u32,

    /// Frame height in pixels
    pub height: u32,

    /// Row-major luma samples, `width * height` bytes
    pub data: Vec<u8>,
}

impl VideoFrame {
    /// Create a frame, validating the buffer size
    ///
    /// # Errors
    ///
    /// Returns error if `data` does not hold exactly `width * height` bytes
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        #[allow(clippy::cast_possible_truncation)]
        let expected = (u64::from(width) * u64::from(height)) as usize;
        if data.len() != expected {
            return Err(Error::Config(format!(
                "frame buffer holds {} bytes, expected {expected}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }
}

/// Live microphone track
pub trait AudioTrack: Send + Sync {
    /// Drain the samples captured since the last call
    fn read_samples(&self) -> Vec<f32>;

    /// Stop capturing; further reads return nothing
    fn stop(&self);

    /// Whether the track is still capturing
    fn is_live(&self) -> bool;
}

/// Live camera track
#[async_trait]
pub trait VideoTrack: Send + Sync {
    /// Wait for the next decodable frame; `None` once the track has stopped
    async fn next_frame(&self) -> Option<VideoFrame>;

    /// Stop capturing; pending and future `next_frame` calls return `None`
    fn stop(&self);

    /// Whether the track is still capturing
    fn is_live(&self) -> bool;
}

/// A combined audio+video stream as returned by a backend
pub struct MediaStream {
    /// Microphone track
    pub audio: Arc<dyn AudioTrack>,

    /// Camera track
    pub video: Arc<dyn VideoTrack>,
}

/// Opens combined capture streams on behalf of the acquisition manager
#[async_trait]
pub trait MediaBackend: Send + Sync {
    /// Open a combined audio+video stream
    ///
    /// # Errors
    ///
    /// Returns [`Error::PermissionDenied`] if the operator or platform
    /// refused device access, [`Error::DeviceUnavailable`] if no usable
    /// device exists or the device is busy
    async fn open(&self, constraints: &MediaConstraints) -> Result<MediaStream>;
}

/// Backend for the host machine: cpal microphone capture, no camera stack
///
/// Camera capture is platform-integration work that lives outside this
/// crate; hosts without one get a `DeviceUnavailable` on open, which the
/// wellness monitor surfaces as its error status.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostMediaBackend;

#[async_trait]
impl MediaBackend for HostMediaBackend {
    async fn open(&self, _constraints: &MediaConstraints) -> Result<MediaStream> {
        // The stream is all-or-nothing: never open the microphone when the
        // camera half cannot be delivered.
        Err(Error::DeviceUnavailable(
            "no camera integration on this host".to_string(),
        ))
    }
}
