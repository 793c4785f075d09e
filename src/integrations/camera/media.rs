// src/integrations/camera/media.rs
//
// Browser camera / media-stream collaborator.
//
// A `MediaStream` is owned exclusively by the scan engine for the duration
// of one session.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    User,
    Environment,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CameraConstraints {
    pub facing_mode: FacingMode,
    pub fps: u32,
    pub aspect_ratio: f32,
    /// Fraction of the smaller viewfinder side used for the scan box
    pub scan_box_ratio: f32,
}

impl CameraConstraints {
    /// Rear camera, square frame
    pub fn rear(fps: u32, scan_box_ratio: f32) -> Self {
        Self {
            facing_mode: FacingMode::Environment,
            fps,
            aspect_ratio: 1.0,
            scan_box_ratio,
        }
    }
}

/// One frame the decoder could read
#[derive(Debug, Clone, PartialEq)]
pub struct FrameDecode {
    pub text: String,
    /// Decoder's symbology name, if it reported one
    pub format_name: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackCapabilities {
    pub torch: bool,
}

#[derive(Debug, Clone, Error)]
pub enum CameraError {
    /// getUserMedia-style failure; the message keeps the platform's wording
    /// (e.g. "NotAllowedError: Permission denied")
    #[error("{0}")]
    Acquisition(String),

    #[error("constraint rejected: {0}")]
    Constraint(String),
}

impl CameraError {
    /// True when the platform refused camera access
    pub fn is_permission_denied(&self) -> bool {
        match self {
            CameraError::Acquisition(message) => {
                message.contains("Permission") || message.contains("NotAllowedError")
            }
            CameraError::Constraint(_) => false,
        }
    }
}

#[async_trait]
pub trait CameraDevice: Send + Sync {
    /// Start the camera preview inside `mount_target`
    async fn open(
        &self,
        mount_target: &str,
        constraints: CameraConstraints,
    ) -> Result<Arc<dyn MediaStream>, CameraError>;
}

#[async_trait]
pub trait MediaStream: Send + Sync {
    /// Wait for the next successfully decoded frame. `None` once the stream
    /// has ended.
    async fn next_decode(&self) -> Option<FrameDecode>;

    /// Capability set of the active video track
    fn capabilities(&self) -> TrackCapabilities;

    async fn set_torch(&self, on: bool) -> Result<(), CameraError>;

    /// Release the camera. Must be safe to call more than once.
    async fn stop(&self);
}
