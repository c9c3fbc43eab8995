//! The video element a session renders into and captures frames from.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::broadcast;

use super::media::MediaStream;

/// A still image captured from the bound video source.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Raw RGBA pixel data, 4 bytes per pixel
    pub data: Vec<u8>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Whether the preview this frame came from is mirrored
    pub mirrored: bool,
    /// Timestamp when frame was captured
    pub timestamp: Instant,
}

/// Media events emitted by a video element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaEvent {
    Play,
    Pause,
    Ended,
}

/// Why `play` did not start playback.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlaybackError {
    /// The platform's autoplay policy requires a user gesture.
    #[error("Autoplay prevented by platform policy")]
    AutoplayPrevented,
    #[error("Playback failed: {0}")]
    Failed(String),
}

/// A video surface bound to a camera stream or a file.
#[async_trait]
pub trait VideoElement: Send + Sync {
    fn attach_stream(&self, stream: Arc<dyn MediaStream>);
    fn detach_stream(&self);
    /// Bind a file or URL and rewind to the start.
    fn attach_source(&self, path: &str);
    fn set_controls(&self, enabled: bool);
    fn set_mirrored(&self, mirrored: bool);
    fn is_paused(&self) -> bool;
    async fn play(&self) -> Result<(), PlaybackError>;
    fn pause(&self);
    fn capture_frame(&self) -> Frame;
    fn subscribe(&self) -> broadcast::Receiver<MediaEvent>;
}
