//! The capture/process loop.
//!
//! One task per session at a time: capture a frame, hand it to the runner,
//! interpret the result, then either stop or yield to the scheduler and go
//! again. Frame N+1 is never captured before frame N's result arrived.

use std::sync::{Arc, MutexGuard, Weak};

use super::recognizer::{Core, Shared};
use super::state::{Phase, RecognitionMode};
use crate::error::RecognizerError;
use crate::runner::{FrameResultState, RecognizerRunner};

/// What the loop does after a frame was processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// Report the result and stop.
    Finish,
    /// Test modes: reset the engine and keep scanning.
    ResetAndContinue,
    /// Partial result; make sure the timeout is armed.
    ArmTimeout,
    Continue,
}

/// Decide the next step from a frame result and the phase observed after it.
pub(crate) fn next_step(result: FrameResultState, phase: Phase, mode: RecognitionMode) -> Step {
    let stop = result == FrameResultState::Valid || phase.stop_requested();
    if stop {
        let cancelled = matches!(phase, Phase::Cancelled | Phase::Released);
        if !mode.is_test() || cancelled {
            Step::Finish
        } else {
            Step::ResetAndContinue
        }
    } else if result == FrameResultState::Uncertain {
        Step::ArmTimeout
    } else {
        Step::Continue
    }
}

/// Spawn the loop unless one is already alive or the phase doesn't want one.
pub(super) fn ensure_loop(shared: &Arc<Shared>, core: &mut Core) {
    if core.phase.is_active() && !core.loop_alive {
        core.loop_alive = true;
        tokio::spawn(run_capture_loop(
            Arc::downgrade(shared),
            Arc::clone(&shared.runner),
        ));
    }
}

/// The loop only holds the session weakly; once the last handle is dropped
/// it stops at the next upgrade.
async fn run_capture_loop(session: Weak<Shared>, runner: Arc<dyn RecognizerRunner>) {
    log::debug!("Capture loop started");
    let mut last_result = FrameResultState::Empty;

    loop {
        let (frame, reset) = {
            let Some(shared) = session.upgrade() else {
                log::debug!("Session dropped, capture loop stopped");
                return;
            };
            let mut core = shared.lock();
            let phase = core.phase;
            match phase {
                Phase::Cancelled | Phase::Released => {
                    finish(&shared, core, Ok(last_result));
                    return;
                }
                Phase::Paused | Phase::Idle => {
                    core.loop_alive = false;
                    log::debug!("Capture loop stopped before capturing, phase {:?}", phase);
                    return;
                }
                Phase::Running | Phase::TimedOut => {}
            }
            let reset = std::mem::take(&mut core.pending_reset);
            let frame = core.source.capture();
            match frame {
                Some(frame) => (frame, reset),
                None => {
                    finish(&shared, core, Ok(last_result));
                    return;
                }
            }
        };

        if reset {
            if let Err(e) = runner.reset_recognizers(true).await {
                finish_if_alive(&session, Err(e));
                return;
            }
        }

        let result = match runner.process_image(frame).await {
            Ok(result) => result,
            Err(e) => {
                finish_if_alive(&session, Err(e));
                return;
            }
        };
        last_result = result;

        let step = {
            let Some(shared) = session.upgrade() else {
                log::debug!("Session dropped, capture loop stopped");
                return;
            };
            let mut core = shared.lock();
            let step = next_step(result, core.phase, core.mode);
            match step {
                Step::Finish => {
                    finish(&shared, core, Ok(result));
                    return;
                }
                Step::ArmTimeout if !core.timer.is_armed() => arm_timeout(&shared, &mut core),
                _ => {}
            }
            step
        };

        if step == Step::ResetAndContinue {
            log::debug!("Test mode stop on {} result, resetting recognizers", result);
            if let Err(e) = runner.reset_recognizers(true).await {
                finish_if_alive(&session, Err(e));
                return;
            }
            let Some(shared) = session.upgrade() else {
                return;
            };
            let mut core = shared.lock();
            core.timer.disarm();
            core.phase = core.phase.continue_after_reset();
        }

        {
            let Some(shared) = session.upgrade() else {
                return;
            };
            let mut core = shared.lock();
            if matches!(core.phase, Phase::Paused | Phase::Idle) {
                core.loop_alive = false;
                log::debug!("Capture loop paused");
                return;
            }
        }

        tokio::task::yield_now().await;
    }
}

fn finish_if_alive(session: &Weak<Shared>, outcome: Result<FrameResultState, RecognizerError>) {
    if let Some(shared) = session.upgrade() {
        finish(&shared, shared.lock(), outcome);
    }
}

fn arm_timeout(shared: &Arc<Shared>, core: &mut Core) {
    let weak = Arc::downgrade(shared);
    let after = core.timeout;
    log::debug!("First non-empty result, timeout armed for {:?}", after);
    core.timer.arm(after, move |generation| {
        if let Some(shared) = weak.upgrade() {
            let mut core = shared.lock();
            if core.timer.take_fired(generation) {
                core.phase = core.phase.time_out();
                log::info!("Recognition timed out after {:?}", after);
            }
        }
    });
}

/// Stop the loop and hand the outcome to the completion callback.
///
/// The callback runs without the lock held, so it may call back into the
/// session. It is kept for later scans unless the session was released or a
/// new one was installed meanwhile.
fn finish(
    shared: &Shared,
    mut core: MutexGuard<'_, Core>,
    outcome: Result<FrameResultState, RecognizerError>,
) {
    core.timer.disarm();
    core.phase = core.phase.complete();
    core.loop_alive = false;
    core.pending_reset = false;
    let released = core.phase == Phase::Released;
    let completion = core.completion.take();
    drop(core);

    match &outcome {
        Ok(result) => log::info!("Recognition finished with {} result", result),
        Err(e) => log::error!("Recognition stopped: {}", e),
    }

    if let Some(mut on_done) = completion {
        on_done(outcome);
        if !released {
            let mut core = shared.lock();
            if core.completion.is_none() && core.phase != Phase::Released {
                core.completion = Some(on_done);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use FrameResultState::*;

    #[test]
    fn test_valid_finishes_in_recognition_mode() {
        assert_eq!(
            next_step(Valid, Phase::Running, RecognitionMode::Recognition),
            Step::Finish
        );
    }

    #[test]
    fn test_valid_resets_in_test_modes() {
        for mode in [RecognitionMode::RecognitionTest, RecognitionMode::DetectionTest] {
            assert_eq!(next_step(Valid, Phase::Running, mode), Step::ResetAndContinue);
            assert_eq!(next_step(Uncertain, Phase::TimedOut, mode), Step::ResetAndContinue);
        }
    }

    #[test]
    fn test_cancel_finishes_in_every_mode() {
        for mode in [
            RecognitionMode::Recognition,
            RecognitionMode::RecognitionTest,
            RecognitionMode::DetectionTest,
        ] {
            assert_eq!(next_step(Empty, Phase::Cancelled, mode), Step::Finish);
            assert_eq!(next_step(Valid, Phase::Cancelled, mode), Step::Finish);
            assert_eq!(next_step(Empty, Phase::Released, mode), Step::Finish);
        }
    }

    #[test]
    fn test_timeout_finishes_in_recognition_mode() {
        assert_eq!(
            next_step(Empty, Phase::TimedOut, RecognitionMode::Recognition),
            Step::Finish
        );
    }

    #[test]
    fn test_uncertain_arms_timeout() {
        assert_eq!(
            next_step(Uncertain, Phase::Running, RecognitionMode::Recognition),
            Step::ArmTimeout
        );
        assert_eq!(
            next_step(Uncertain, Phase::Paused, RecognitionMode::Recognition),
            Step::ArmTimeout
        );
    }

    #[test]
    fn test_empty_continues() {
        assert_eq!(
            next_step(Empty, Phase::Running, RecognitionMode::Recognition),
            Step::Continue
        );
        assert_eq!(
            next_step(Empty, Phase::Running, RecognitionMode::DetectionTest),
            Step::Continue
        );
    }
}
