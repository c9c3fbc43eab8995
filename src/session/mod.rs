//! Video recognition session.
//!
//! [`VideoRecognizer`] drives a recognizer runner over a video source:
//! - state machine in `state` (single phase, pure transitions)
//! - capture/process loop in `capture_loop`
//! - timeout in `timer`, media event listening in `subscription`

mod capture_loop;
mod recognizer;
mod state;
mod subscription;
mod timer;

pub use recognizer::VideoRecognizer;
pub use state::{RecognitionMode, SessionState};
pub use timer::DEFAULT_RECOGNITION_TIMEOUT;
