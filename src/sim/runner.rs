//! Recognizer runner that replays a scripted sequence of results.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::error::RecognizerError;
use crate::platform::Frame;
use crate::runner::{ClearTimeoutCallback, FrameResultState, RecognizerRunner};

#[derive(Default)]
struct RunnerState {
    script: VecDeque<FrameResultState>,
    /// Result once the script is exhausted
    fallback: Option<FrameResultState>,
    processing_delay: Duration,
    fail_next: Option<String>,
    processed: usize,
    resets: Vec<bool>,
    detection_only: bool,
    mirrored: bool,
    clear_timeout: Option<ClearTimeoutCallback>,
}

/// Returns scripted results, one per processed frame.
#[derive(Default)]
pub struct ScriptedRunner {
    state: Mutex<RunnerState>,
}

impl ScriptedRunner {
    pub fn new(script: impl IntoIterator<Item = FrameResultState>) -> Self {
        Self {
            state: Mutex::new(RunnerState {
                script: script.into_iter().collect(),
                ..Default::default()
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, RunnerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Result returned after the script runs out (default `Empty`).
    pub fn with_fallback(self, fallback: FrameResultState) -> Self {
        self.state().fallback = Some(fallback);
        self
    }

    /// Simulated time spent inside each `process_image` call.
    pub fn with_processing_delay(self, delay: Duration) -> Self {
        self.state().processing_delay = delay;
        self
    }

    /// Append results to the script.
    pub fn push(&self, results: impl IntoIterator<Item = FrameResultState>) {
        self.state().script.extend(results);
    }

    /// Make the next `process_image` call fail.
    pub fn fail_next(&self, message: &str) {
        self.state().fail_next = Some(message.to_string());
    }

    pub fn processed(&self) -> usize {
        self.state().processed
    }

    /// `hard_reset` flag of every reset, in order.
    pub fn resets(&self) -> Vec<bool> {
        self.state().resets.clone()
    }

    pub fn detection_only(&self) -> bool {
        self.state().detection_only
    }

    pub fn mirrored(&self) -> bool {
        self.state().mirrored
    }

    pub fn has_clear_timeout_callback(&self) -> bool {
        self.state().clear_timeout.is_some()
    }

    /// Ask the session to disarm its timeout, as an engine would.
    pub fn request_clear_timeout(&self) {
        let handler = self.state().clear_timeout.clone();
        if let Some(handler) = handler {
            handler();
        }
    }
}

#[async_trait]
impl RecognizerRunner for ScriptedRunner {
    async fn process_image(&self, _frame: Frame) -> Result<FrameResultState, RecognizerError> {
        let delay = self.state().processing_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state();
        if let Some(message) = state.fail_next.take() {
            return Err(RecognizerError(message));
        }
        state.processed += 1;
        let fallback = state.fallback.unwrap_or(FrameResultState::Empty);
        Ok(state.script.pop_front().unwrap_or(fallback))
    }

    async fn reset_recognizers(&self, hard_reset: bool) -> Result<(), RecognizerError> {
        self.state().resets.push(hard_reset);
        Ok(())
    }

    async fn set_detection_only_mode(&self, enabled: bool) -> Result<(), RecognizerError> {
        self.state().detection_only = enabled;
        Ok(())
    }

    async fn set_camera_preview_mirrored(&self, mirrored: bool) -> Result<(), RecognizerError> {
        self.state().mirrored = mirrored;
        Ok(())
    }

    fn set_clear_timeout_callback(&self, handler: Option<ClearTimeoutCallback>) {
        self.state().clear_timeout = handler;
    }
}
