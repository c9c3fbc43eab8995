//! Error types shared across the crate.
//!
//! Camera acquisition failures reject session creation. Contract violations on
//! the control surface are reported as [`SessionError::InvalidState`]. Autoplay
//! prevention is not an error here; see [`crate::platform::PlaybackError`].

use std::fmt;

/// Why opening the camera feed failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotSupportedReason {
    /// The host has no media-device support in the current context.
    MediaDevicesNotSupported,
    /// No camera with the requested features exists.
    CameraNotFound,
    /// The user (or a security policy) refused camera access.
    CameraNotAllowed,
    /// The camera could not be started, most likely because it is in use.
    CameraInUse,
    /// The camera is unavailable due to an OS or hardware error.
    CameraNotAvailable,
}

impl fmt::Display for NotSupportedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NotSupportedReason::MediaDevicesNotSupported => "MediaDevicesNotSupported",
            NotSupportedReason::CameraNotFound => "CameraNotFound",
            NotSupportedReason::CameraNotAllowed => "CameraNotAllowed",
            NotSupportedReason::CameraInUse => "CameraInUse",
            NotSupportedReason::CameraNotAvailable => "CameraNotAvailable",
        };
        f.write_str(name)
    }
}

/// Raised when a camera stream cannot be opened. Never retried automatically.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Failed to open camera feed ({reason}){}", format_detail(.message))]
pub struct CameraAcquisitionError {
    pub reason: NotSupportedReason,
    pub message: Option<String>,
}

fn format_detail(message: &Option<String>) -> String {
    match message {
        Some(m) if !m.is_empty() => format!(": {}", m),
        _ => String::new(),
    }
}

impl CameraAcquisitionError {
    pub fn new(reason: NotSupportedReason) -> Self {
        Self {
            reason,
            message: None,
        }
    }

    pub fn with_message(reason: NotSupportedReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: Some(message.into()),
        }
    }
}

/// Which precondition of a control operation was violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidStateReason {
    /// The video feed was released; a new session is required.
    Released,
    /// `start` was called while the video element is playing.
    FeedNotPaused,
    /// `resume_recognition` was called while the video element is paused.
    FeedPaused,
}

impl fmt::Display for InvalidStateReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidStateReason::Released => write!(f, "the associated video feed has been released"),
            InvalidStateReason::FeedNotPaused => write!(
                f,
                "the associated video feed is not paused, use resume_recognition instead"
            ),
            InvalidStateReason::FeedPaused => write!(
                f,
                "cannot resume recognition while the video feed is paused, use start or recognize"
            ),
        }
    }
}

/// Failure reported by the external recognizer runner.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Recognizer runner failed: {0}")]
pub struct RecognizerError(pub String);

/// Errors surfaced by the session control surface.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Invalid state: {0}")]
    InvalidState(InvalidStateReason),

    #[error(transparent)]
    Acquisition(#[from] CameraAcquisitionError),

    #[error(transparent)]
    Recognizer(#[from] RecognizerError),

    /// The pending `recognize` call can no longer complete.
    #[error("Recognition aborted before a result was delivered")]
    Aborted,
}

impl SessionError {
    /// Returns the violated precondition if this is an `InvalidState` error.
    pub fn invalid_state_reason(&self) -> Option<InvalidStateReason> {
        match self {
            SessionError::InvalidState(reason) => Some(*reason),
            _ => None,
        }
    }
}
