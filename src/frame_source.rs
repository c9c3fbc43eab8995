//! Binding of a camera stream or a video file to a video element.

use std::sync::Arc;

use crate::camera::CameraDescriptor;
use crate::platform::{Frame, MediaStream, VideoElement};

/// Where the frames come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    Camera(CameraDescriptor),
    File(String),
}

/// A video element together with the stream it exclusively owns.
///
/// Once released, the element is detached and the source cannot be reused.
pub struct FrameSource {
    video: Option<Arc<dyn VideoElement>>,
    stream: Option<Arc<dyn MediaStream>>,
    kind: SourceKind,
}

impl std::fmt::Debug for FrameSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameSource")
            .field("kind", &self.kind)
            .field("released", &self.is_released())
            .finish_non_exhaustive()
    }
}

impl FrameSource {
    /// Attach a live camera stream. Front cameras get a mirrored preview.
    pub fn from_stream(
        video: Arc<dyn VideoElement>,
        stream: Arc<dyn MediaStream>,
        camera: CameraDescriptor,
    ) -> Self {
        video.set_controls(false);
        video.attach_stream(Arc::clone(&stream));
        if camera.facing == crate::camera::Facing::Front {
            video.set_mirrored(true);
        }
        Self {
            video: Some(video),
            stream: Some(stream),
            kind: SourceKind::Camera(camera),
        }
    }

    /// Attach a video file, rewound to the start.
    pub fn from_path(video: Arc<dyn VideoElement>, path: &str) -> Self {
        video.attach_source(path);
        Self {
            video: Some(video),
            stream: None,
            kind: SourceKind::File(path.to_string()),
        }
    }

    pub fn kind(&self) -> &SourceKind {
        &self.kind
    }

    /// The bound element, or `None` after release.
    pub fn video(&self) -> Option<Arc<dyn VideoElement>> {
        self.video.clone()
    }

    pub fn is_released(&self) -> bool {
        self.video.is_none()
    }

    /// Whether the element is paused. A released source counts as paused.
    pub fn is_paused(&self) -> bool {
        self.video.as_ref().map_or(true, |v| v.is_paused())
    }

    /// Grab the current frame, or `None` after release.
    pub fn capture(&self) -> Option<Frame> {
        self.video.as_ref().map(|v| v.capture_frame())
    }

    /// Stop every track and detach the element.
    ///
    /// Returns `false` if the source was already released.
    pub fn release(&mut self) -> bool {
        let Some(video) = self.video.take() else {
            return false;
        };
        if let Some(stream) = self.stream.take() {
            stream.stop_all_tracks();
            video.detach_stream();
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Facing;
    use crate::platform::{MediaDeviceInfo, MediaStream};
    use crate::sim::{SimulatedStream, SimulatedVideo};

    fn camera(label: &str, facing: Facing) -> CameraDescriptor {
        CameraDescriptor::new(&MediaDeviceInfo::video_input("cam", label), facing)
    }

    #[test]
    fn test_front_camera_is_mirrored() {
        let video = Arc::new(SimulatedVideo::new());
        let stream = Arc::new(SimulatedStream::new("Front Camera"));
        let _source = FrameSource::from_stream(
            video.clone(),
            stream,
            camera("Front Camera", Facing::Front),
        );
        assert!(video.is_mirrored());
        assert!(video.has_stream());
        assert!(!video.controls());
    }

    #[test]
    fn test_release_stops_tracks_once() {
        let video = Arc::new(SimulatedVideo::new());
        let stream = Arc::new(SimulatedStream::new("Back Camera"));
        let mut source = FrameSource::from_stream(
            video.clone(),
            stream.clone(),
            camera("Back Camera", Facing::Back),
        );

        assert!(source.release());
        assert!(source.is_released());
        assert!(!video.has_stream());
        assert!(stream.tracks().iter().all(|t| !t.is_live()));

        assert!(!source.release());
        assert!(source.capture().is_none());
        assert!(source.is_paused());
    }

    #[test]
    fn test_file_source_has_no_stream() {
        let video = Arc::new(SimulatedVideo::new());
        let mut source = FrameSource::from_path(video.clone(), "clip.mp4");
        assert_eq!(source.kind(), &SourceKind::File("clip.mp4".to_string()));
        assert_eq!(video.source().as_deref(), Some("clip.mp4"));
        assert!(source.capture().is_some());
        assert!(source.release());
    }
}
