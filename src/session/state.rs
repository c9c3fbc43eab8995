//! Session phases and their transitions.
//!
//! A session holds exactly one [`Phase`]. Every control operation and loop
//! event is a pure function from the current phase to the next one; fallible
//! transitions return the violated precondition instead of changing anything.

use std::fmt;

use crate::error::InvalidStateReason;

/// How the capture loop treats a final result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecognitionMode {
    /// Stop and report the first valid result.
    #[default]
    Recognition,
    /// Reset after every valid result and scan indefinitely.
    RecognitionTest,
    /// Like `RecognitionTest`, with the engine in detection-only mode.
    DetectionTest,
}

impl RecognitionMode {
    pub fn is_test(self) -> bool {
        !matches!(self, RecognitionMode::Recognition)
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "recognition" => Some(RecognitionMode::Recognition),
            "recognition-test" => Some(RecognitionMode::RecognitionTest),
            "detection-test" => Some(RecognitionMode::DetectionTest),
            _ => None,
        }
    }
}

impl fmt::Display for RecognitionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecognitionMode::Recognition => write!(f, "recognition"),
            RecognitionMode::RecognitionTest => write!(f, "recognition-test"),
            RecognitionMode::DetectionTest => write!(f, "detection-test"),
        }
    }
}

/// Externally visible session state.
///
/// A pending timeout is reported as `Running`; it surfaces as the result
/// handed to the completion callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running,
    Paused,
    Cancelled,
    Released,
}

/// Internal phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    /// Bound to a source, no recognition loop wanted.
    Idle,
    /// Frames are being processed.
    Running,
    /// Loop stops at the next iteration boundary, no callback.
    Paused,
    /// Loop stops at the next iteration boundary and reports.
    Cancelled,
    /// Timeout elapsed; the next processed frame ends the scan.
    TimedOut,
    /// Source released. Terminal.
    Released,
}

impl Phase {
    pub fn public(self) -> SessionState {
        match self {
            Phase::Idle => SessionState::Idle,
            Phase::Running | Phase::TimedOut => SessionState::Running,
            Phase::Paused => SessionState::Paused,
            Phase::Cancelled => SessionState::Cancelled,
            Phase::Released => SessionState::Released,
        }
    }

    /// Whether the loop should keep processing frames.
    pub fn is_active(self) -> bool {
        matches!(self, Phase::Running | Phase::TimedOut)
    }

    /// Whether the loop must stop and report at its next boundary.
    pub fn stop_requested(self) -> bool {
        matches!(self, Phase::Cancelled | Phase::TimedOut | Phase::Released)
    }

    /// Prepare a new scan. Playback then enters the loop through `resume`.
    pub fn start(self, feed_paused: bool) -> Result<Phase, InvalidStateReason> {
        match self {
            Phase::Released => Err(InvalidStateReason::Released),
            _ if !feed_paused => Err(InvalidStateReason::FeedNotPaused),
            _ => Ok(Phase::Idle),
        }
    }

    pub fn resume(self, feed_paused: bool) -> Result<Phase, InvalidStateReason> {
        match self {
            Phase::Released => Err(InvalidStateReason::Released),
            _ if feed_paused => Err(InvalidStateReason::FeedPaused),
            _ => Ok(Phase::Running),
        }
    }

    pub fn cancel(self) -> Phase {
        match self {
            Phase::Running | Phase::TimedOut | Phase::Paused => Phase::Cancelled,
            other => other,
        }
    }

    pub fn pause(self) -> Phase {
        match self {
            Phase::Running | Phase::TimedOut => Phase::Paused,
            other => other,
        }
    }

    pub fn time_out(self) -> Phase {
        match self {
            Phase::Running => Phase::TimedOut,
            other => other,
        }
    }

    /// The loop reported a result and stopped.
    pub fn complete(self) -> Phase {
        match self {
            Phase::Released => Phase::Released,
            _ => Phase::Idle,
        }
    }

    /// Test modes: the engine was reset after a stop condition.
    pub fn continue_after_reset(self) -> Phase {
        match self {
            Phase::TimedOut => Phase::Running,
            other => other,
        }
    }
}
