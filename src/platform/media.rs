//! Media device enumeration and stream acquisition.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Kind of a media device reported by enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaDeviceKind {
    VideoInput,
    AudioInput,
}

/// A device entry as reported by the platform.
///
/// Labels are empty until the user has granted camera access at least once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaDeviceInfo {
    pub device_id: String,
    pub group_id: String,
    pub kind: MediaDeviceKind,
    pub label: String,
}

impl MediaDeviceInfo {
    /// Shorthand for a video input device.
    pub fn video_input(device_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            group_id: String::new(),
            kind: MediaDeviceKind::VideoInput,
            label: label.into(),
        }
    }

    pub fn is_video_input(&self) -> bool {
        self.kind == MediaDeviceKind::VideoInput
    }
}

/// Requested facing mode of a camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacingMode {
    /// Pointing away from the user.
    Environment,
    /// Pointing toward the user.
    User,
}

impl fmt::Display for FacingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FacingMode::Environment => write!(f, "environment"),
            FacingMode::User => write!(f, "user"),
        }
    }
}

/// A min/ideal/max constraint on one dimension, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimensionRange {
    pub min: u32,
    pub ideal: u32,
    pub max: u32,
}

/// How the camera itself is chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraTarget {
    /// Prefer (but don't require) a camera with this facing mode.
    IdealFacing(FacingMode),
    /// Exactly this device.
    ExactDevice(String),
}

/// Video part of a stream request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoConstraints {
    pub width: Option<DimensionRange>,
    pub height: Option<DimensionRange>,
    pub target: CameraTarget,
}

/// Parameters for opening a media stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaConstraints {
    pub audio: bool,
    pub video: VideoConstraints,
}

/// Classification of a platform failure while opening a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaErrorKind {
    NotFound,
    Overconstrained,
    NotAllowed,
    Security,
    Abort,
    NotReadable,
    Type,
    Other,
}

/// Failure reported by the platform's media layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind:?}: {message}")]
pub struct MediaError {
    pub kind: MediaErrorKind,
    pub message: String,
}

impl MediaError {
    pub fn new(kind: MediaErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// A single live track of a media stream.
pub trait MediaTrack: Send + Sync {
    fn label(&self) -> String;
    /// Stop delivering data. Stopping twice is a no-op.
    fn stop(&self);
    fn is_live(&self) -> bool;
}

/// An opened media stream.
pub trait MediaStream: Send + Sync {
    fn tracks(&self) -> Vec<Arc<dyn MediaTrack>>;

    /// Stop every track of this stream.
    fn stop_all_tracks(&self) {
        for track in self.tracks() {
            log::debug!("Stopping track '{}'", track.label());
            track.stop();
        }
    }
}

/// Access to the platform's camera devices.
#[async_trait]
pub trait MediaDevices: Send + Sync {
    /// Whether stream acquisition is available at all in this context.
    fn is_supported(&self) -> bool;

    async fn enumerate_devices(&self) -> Result<Vec<MediaDeviceInfo>, MediaError>;

    async fn get_user_media(
        &self,
        constraints: &MediaConstraints,
    ) -> Result<Arc<dyn MediaStream>, MediaError>;
}
