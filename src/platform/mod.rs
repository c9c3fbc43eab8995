//! Host platform abstractions.
//!
//! A session never talks to a camera API directly. The host supplies:
//! - [`MediaDevices`] for enumeration and stream acquisition
//! - [`VideoElement`] for playback, frame capture and media events

mod media;
mod video;

pub use media::{
    CameraTarget, DimensionRange, FacingMode, MediaConstraints, MediaDeviceInfo, MediaDeviceKind,
    MediaDevices, MediaError, MediaErrorKind, MediaStream, MediaTrack, VideoConstraints,
};
pub use video::{Frame, MediaEvent, PlaybackError, VideoElement};
