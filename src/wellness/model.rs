//! Facial landmark model seam
//!
//! The landmark detector is an external runtime that loads on its own
//! schedule; the monitor polls for readiness before asking it to load a
//! model. Keypoint indices follow the standard 468-point face mesh
//! topology.

use std::sync::Arc;

use async_trait::async_trait;

use crate::media::VideoFrame;
use crate::Result;

/// Left inner-eyebrow keypoint index
pub const INNER_BROW_LEFT: usize = 55;

/// Right inner-eyebrow keypoint index
pub const INNER_BROW_RIGHT: usize = 285;

/// Upper-lip midline keypoint index
pub const UPPER_LIP: usize = 13;

/// Lower-lip midline keypoint index
pub const LOWER_LIP: usize = 14;

/// One landmark position in frame coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keypoint {
    /// Horizontal position
    pub x: f32,
    /// Vertical position
    pub y: f32,
    /// Depth relative to the mesh origin
    pub z: f32,
}

/// A detected face as a set of mesh keypoints
#[derive(Debug, Clone)]
pub struct FaceMesh {
    /// Keypoints indexed by mesh topology position
    pub keypoints: Vec<Keypoint>,
}

impl FaceMesh {
    /// Look up a keypoint by mesh index
    #[must_use]
    pub fn keypoint(&self, index: usize) -> Option<&Keypoint> {
        self.keypoints.get(index)
    }
}

/// Detection configuration passed at load time
#[derive(Debug, Clone, Copy)]
pub struct ModelConfig {
    /// Maximum number of faces to detect per frame
    pub max_faces: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        // One operator
        Self { max_faces: 1 }
    }
}

/// A loaded landmark model; read-only after load, shared for the process
/// lifetime, never reloaded
#[async_trait]
pub trait LandmarkModel: Send + Sync {
    /// Run one landmark inference pass over a frame
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Model`] when inference itself fails; a frame
    /// with no detectable face is `Ok(vec![])`, not an error
    async fn estimate_faces(&self, frame: &VideoFrame) -> Result<Vec<FaceMesh>>;
}

/// The external model runtime
#[async_trait]
pub trait ModelRuntime: Send + Sync {
    /// Whether the runtime has finished its own initialization
    fn is_available(&self) -> bool;

    /// Load the landmark model once
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Model`] when the model cannot be loaded
    async fn load(&self, config: &ModelConfig) -> Result<Arc<dyn LandmarkModel>>;
}

/// Runtime for hosts without a landmark detector integration
///
/// Never becomes available, so the monitor reports a load timeout through
/// its status instead of pretending to produce readings.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableModelRuntime;

#[async_trait]
impl ModelRuntime for UnavailableModelRuntime {
    fn is_available(&self) -> bool {
        false
    }

    async fn load(&self, _config: &ModelConfig) -> Result<Arc<dyn LandmarkModel>> {
        Err(crate::Error::Model(
            "no landmark runtime on this host".to_string(),
        ))
    }
}
