//! Device acquisition management
//!
//! Exactly one combined camera+microphone session may exist system-wide.
//! Consumers go through [`AcquisitionManager::acquire`], which reuses the
//! live handle instead of opening a second device session, and release
//! through [`AcquisitionHandle::release`], which stops every track exactly
//! once.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Mutex;

use crate::media::{AudioTrack, MediaBackend, MediaConstraints, MediaStream, VideoTrack};
use crate::Result;

/// Ownership of a live camera+microphone stream
pub struct AcquisitionHandle {
    audio: Arc<dyn AudioTrack>,
    video: Arc<dyn VideoTrack>,
    released: AtomicBool,
}

impl AcquisitionHandle {
    fn new(stream: MediaStream) -> Self {
        Self {
            audio: stream.audio,
            video: stream.video,
            released: AtomicBool::new(false),
        }
    }

    /// The microphone track
    #[must_use]
    pub fn audio(&self) -> &Arc<dyn AudioTrack> {
        &self.audio
    }

    /// The camera track
    #[must_use]
    pub fn video(&self) -> &Arc<dyn VideoTrack> {
        &self.video
    }

    /// Stop every track. Idempotent: the second and later calls are no-ops.
    pub fn release(&self) {
        if self.released.swap(true, Ordering::SeqCst) {
            return;
        }
        self.audio.stop();
        self.video.stop();
        tracing::debug!("acquisition handle released");
    }

    /// Whether the handle has been released
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

impl Drop for AcquisitionHandle {
    fn drop(&mut self) {
        self.release();
    }
}

/// Hands out the single system-wide acquisition handle
pub struct AcquisitionManager {
    backend: Arc<dyn MediaBackend>,
    active: Mutex<Option<Arc<AcquisitionHandle>>>,
}

impl AcquisitionManager {
    /// Create a manager over the given platform backend
    #[must_use]
    pub fn new(backend: Arc<dyn MediaBackend>) -> Self {
        Self {
            backend,
            active: Mutex::new(None),
        }
    }

    /// Acquire the combined stream, reusing the live handle if one exists
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::PermissionDenied`] or
    /// [`crate::Error::DeviceUnavailable`] when the backend cannot deliver
    /// the stream; callers must surface these, not swallow them
    pub async fn acquire(&self, constraints: &MediaConstraints) -> Result<Arc<AcquisitionHandle>> {
        let mut active = self.active.lock().await;

        if let Some(handle) = active.as_ref() {
            if !handle.is_released() {
                tracing::debug!("reusing active acquisition handle");
                return Ok(Arc::clone(handle));
            }
        }

        let stream = self.backend.open(constraints).await?;
        let handle = Arc::new(AcquisitionHandle::new(stream));
        *active = Some(Arc::clone(&handle));

        tracing::debug!(
            width = constraints.video_width,
            height = constraints.video_height,
            "combined stream acquired"
        );
        Ok(handle)
    }
}
