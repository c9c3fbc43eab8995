//! Opening the selected camera as a media stream.

use std::sync::Arc;

use super::selector::select_camera;
use super::types::{CameraDescriptor, Facing};
use crate::error::{CameraAcquisitionError, NotSupportedReason};
use crate::platform::{
    CameraTarget, DimensionRange, MediaConstraints, MediaDevices, MediaError, MediaErrorKind,
    MediaStream, VideoConstraints,
};

/// Resolution bounds requested from the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSettings {
    pub width: DimensionRange,
    pub height: DimensionRange,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            width: DimensionRange {
                min: 640,
                ideal: 1920,
                max: 1920,
            },
            height: DimensionRange {
                min: 480,
                ideal: 1080,
                max: 1080,
            },
        }
    }
}

/// Build the stream request for a selected camera.
///
/// Cameras without a device id are requested by ideal facing mode, using the
/// caller's preference.
pub fn build_constraints(
    camera: &CameraDescriptor,
    preferred: Facing,
    settings: &StreamSettings,
) -> MediaConstraints {
    let target = if camera.uses_facing_mode() {
        CameraTarget::IdealFacing(preferred.facing_mode())
    } else {
        CameraTarget::ExactDevice(camera.device_id.clone())
    };

    MediaConstraints {
        audio: false,
        video: VideoConstraints {
            width: Some(settings.width),
            height: Some(settings.height),
            target,
        },
    }
}

/// Map a platform failure to the reason reported to callers.
pub fn acquisition_reason(kind: MediaErrorKind) -> NotSupportedReason {
    match kind {
        MediaErrorKind::NotFound | MediaErrorKind::Overconstrained => {
            NotSupportedReason::CameraNotFound
        }
        MediaErrorKind::NotAllowed | MediaErrorKind::Security => {
            NotSupportedReason::CameraNotAllowed
        }
        MediaErrorKind::Abort | MediaErrorKind::NotReadable => {
            NotSupportedReason::CameraNotAvailable
        }
        MediaErrorKind::Type | MediaErrorKind::Other => NotSupportedReason::CameraInUse,
    }
}

impl From<MediaError> for CameraAcquisitionError {
    fn from(e: MediaError) -> Self {
        CameraAcquisitionError::with_message(acquisition_reason(e.kind), e.message)
    }
}

/// A camera stream that was opened successfully.
pub struct OpenedCamera {
    pub camera: CameraDescriptor,
    pub stream: Arc<dyn MediaStream>,
}

impl std::fmt::Debug for OpenedCamera {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenedCamera")
            .field("camera", &self.camera)
            .finish_non_exhaustive()
    }
}

/// Select a camera and open it.
///
/// # Errors
/// * `MediaDevicesNotSupported` - the host cannot open media streams
/// * `CameraNotFound` - no camera was enumerated, or the platform reported none matching
/// * other reasons - mapped from the platform failure by [`acquisition_reason`]
pub async fn open_camera(
    media: &dyn MediaDevices,
    preferred: Facing,
    settings: &StreamSettings,
) -> Result<OpenedCamera, CameraAcquisitionError> {
    if !media.is_supported() {
        return Err(CameraAcquisitionError::new(
            NotSupportedReason::MediaDevicesNotSupported,
        ));
    }

    let camera = select_camera(media, preferred)
        .await?
        .ok_or_else(|| CameraAcquisitionError::new(NotSupportedReason::CameraNotFound))?;

    let constraints = build_constraints(&camera, preferred, settings);
    let stream = media.get_user_media(&constraints).await.map_err(|e| {
        log::warn!("Opening camera '{}' failed: {}", camera.label, e);
        CameraAcquisitionError::from(e)
    })?;

    Ok(OpenedCamera { camera, stream })
}
