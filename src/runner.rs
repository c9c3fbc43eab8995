//! The external recognizer collaborator.
//!
//! The runner owns the actual decoding engine. A session only hands it frames
//! and resets; it never disposes the runner.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::error::RecognizerError;
use crate::platform::Frame;

/// Coarse outcome of processing one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameResultState {
    /// Nothing recognized yet.
    Empty,
    /// Partial result; recognition is in progress.
    Uncertain,
    /// A final, usable result is available.
    Valid,
}

impl FrameResultState {
    /// Parse a result name (`empty`, `uncertain`, `valid`), case-insensitive.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "empty" => Some(FrameResultState::Empty),
            "uncertain" => Some(FrameResultState::Uncertain),
            "valid" => Some(FrameResultState::Valid),
            _ => None,
        }
    }
}

impl fmt::Display for FrameResultState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameResultState::Empty => write!(f, "empty"),
            FrameResultState::Uncertain => write!(f, "uncertain"),
            FrameResultState::Valid => write!(f, "valid"),
        }
    }
}

/// Handler the runner may invoke to disarm the session's timeout timer.
pub type ClearTimeoutCallback = Arc<dyn Fn() + Send + Sync>;

/// Frame-processing engine driven by a session.
#[async_trait]
pub trait RecognizerRunner: Send + Sync {
    async fn process_image(&self, frame: Frame) -> Result<FrameResultState, RecognizerError>;

    async fn reset_recognizers(&self, hard_reset: bool) -> Result<(), RecognizerError>;

    async fn set_detection_only_mode(&self, enabled: bool) -> Result<(), RecognizerError>;

    async fn set_camera_preview_mirrored(&self, mirrored: bool) -> Result<(), RecognizerError>;

    /// Install (or clear with `None`) the handler used to disarm the timeout.
    fn set_clear_timeout_callback(&self, handler: Option<ClearTimeoutCallback>);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_state_from_str() {
        assert_eq!(FrameResultState::from_str("empty"), Some(FrameResultState::Empty));
        assert_eq!(
            FrameResultState::from_str(" Uncertain "),
            Some(FrameResultState::Uncertain)
        );
        assert_eq!(FrameResultState::from_str("VALID"), Some(FrameResultState::Valid));
        assert_eq!(FrameResultState::from_str("partial"), None);
    }

    #[test]
    fn test_result_state_display_round_trips_names() {
        for state in [
            FrameResultState::Empty,
            FrameResultState::Uncertain,
            FrameResultState::Valid,
        ] {
            assert_eq!(FrameResultState::from_str(&state.to_string()), Some(state));
        }
    }
}
