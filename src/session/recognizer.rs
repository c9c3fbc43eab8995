//! The public recognition session.

use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;
use tokio::sync::oneshot;

use super::capture_loop::ensure_loop;
use super::state::{Phase, RecognitionMode, SessionState};
use super::subscription::MediaSubscription;
use super::timer::TimeoutTimer;
use crate::camera::{open_camera, Facing, StreamSettings};
use crate::error::{InvalidStateReason, RecognizerError, SessionError};
use crate::frame_source::{FrameSource, SourceKind};
use crate::platform::{MediaDevices, MediaEvent, PlaybackError, VideoElement};
use crate::runner::{ClearTimeoutCallback, FrameResultState, RecognizerRunner};

/// Completion handler as stored by the session.
pub(super) type Completion = Box<dyn FnMut(Result<FrameResultState, RecognizerError>) + Send>;

/// Everything guarded by the session lock.
pub(super) struct Core {
    pub(super) phase: Phase,
    pub(super) mode: RecognitionMode,
    pub(super) source: FrameSource,
    pub(super) timeout: Duration,
    pub(super) timer: TimeoutTimer,
    pub(super) completion: Option<Completion>,
    /// Hard reset to run before the next frame
    pub(super) pending_reset: bool,
    pub(super) loop_alive: bool,
    /// Playback controls were handed to the user after autoplay was blocked
    pub(super) controls_exposed: bool,
    pub(super) subscription: Option<MediaSubscription>,
}

pub(super) struct Shared {
    core: Mutex<Core>,
    pub(super) runner: Arc<dyn RecognizerRunner>,
}

impl Shared {
    pub(super) fn lock(&self) -> MutexGuard<'_, Core> {
        self.core.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn cancel(&self) {
        let mut core = self.lock();
        core.phase = core.phase.cancel();
        if core.timer.disarm() {
            log::debug!("Timeout disarmed by cancellation");
        }
    }

    fn pause_recognition(&self) {
        let mut core = self.lock();
        core.phase = core.phase.pause();
    }

    fn pause_video_feed(&self) -> Result<(), SessionError> {
        let video = {
            let mut core = self.lock();
            let video = core
                .source
                .video()
                .ok_or(SessionError::InvalidState(InvalidStateReason::Released))?;
            core.phase = core.phase.pause();
            video
        };
        video.pause();
        Ok(())
    }

    fn resume(self: &Arc<Self>, reset_recognizers: bool) -> Result<(), SessionError> {
        let mut core = self.lock();
        let feed_paused = core.source.is_paused();
        core.phase = core
            .phase
            .resume(feed_paused)
            .map_err(SessionError::InvalidState)?;
        core.timer.disarm();
        if reset_recognizers {
            core.pending_reset = true;
        }
        ensure_loop(self, &mut core);
        Ok(())
    }

    fn release(&self) {
        let (completion, subscription) = {
            let mut core = self.lock();
            if core.phase == Phase::Released {
                return;
            }
            if core.loop_alive {
                log::debug!("Releasing while recognition is active, the loop reports a cancellation");
            }
            core.source.release();
            core.timer.disarm();
            core.phase = Phase::Released;
            core.controls_exposed = false;
            core.pending_reset = false;
            // A live loop reports the implicit cancellation itself
            let completion = if core.loop_alive {
                None
            } else {
                core.completion.take()
            };
            (completion, core.subscription.take())
        };
        self.runner.set_clear_timeout_callback(None);
        drop(subscription);
        drop(completion);
        log::info!("Video feed released");
    }

    fn handle_media_event(self: &Arc<Self>, event: MediaEvent) {
        let controls_exposed = self.lock().controls_exposed;
        match event {
            MediaEvent::Ended => {
                log::debug!("Video source ended, cancelling recognition");
                self.cancel();
            }
            MediaEvent::Play if controls_exposed => {
                if let Err(e) = self.resume(true) {
                    log::warn!("Ignoring play event: {}", e);
                }
            }
            MediaEvent::Pause if controls_exposed => self.cancel(),
            _ => {}
        }
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        let core = self.core.get_mut().unwrap_or_else(|e| e.into_inner());
        if core.source.release() {
            self.runner.set_clear_timeout_callback(None);
            log::debug!("Session dropped without release, camera stream stopped");
        }
    }
}

/// A resumable scanning session over a camera stream or a video file.
///
/// The session exclusively owns the opened stream. It must be released with
/// [`release_video_feed`](Self::release_video_feed) once scanning is over;
/// dropping the last handle also stops the stream. The recognizer runner is
/// shared and never disposed by the session.
///
/// All operations must be called from within a Tokio runtime.
#[derive(Clone)]
pub struct VideoRecognizer {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for VideoRecognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let core = self.shared.lock();
        f.debug_struct("VideoRecognizer")
            .field("phase", &core.phase)
            .field("mode", &core.mode)
            .field("source", &core.source)
            .finish_non_exhaustive()
    }
}

impl VideoRecognizer {
    /// Open a camera and bind it to `video`.
    ///
    /// The preference is obeyed only if there is a choice: a device with only
    /// a front camera opens the front camera regardless.
    ///
    /// # Errors
    /// * `SessionError::Acquisition` - the camera could not be opened
    /// * `SessionError::Recognizer` - the runner rejected the mirroring setting
    pub async fn from_camera_stream(
        media: &dyn MediaDevices,
        video: Arc<dyn VideoElement>,
        runner: Arc<dyn RecognizerRunner>,
        preferred: Facing,
        settings: &StreamSettings,
    ) -> Result<Self, SessionError> {
        let opened = open_camera(media, preferred, settings).await?;
        let mirrored = opened.camera.facing == Facing::Front;
        log::info!("Opened camera {}", opened.camera);

        let source = FrameSource::from_stream(video, opened.stream, opened.camera);
        if let Err(e) = runner.set_camera_preview_mirrored(mirrored).await {
            let mut source = source;
            source.release();
            return Err(e.into());
        }
        Ok(Self::bind(source, runner))
    }

    /// Bind a video file to `video`. Recognition is cancelled when the file ends.
    pub async fn from_video_path(
        path: &str,
        video: Arc<dyn VideoElement>,
        runner: Arc<dyn RecognizerRunner>,
    ) -> Self {
        log::info!("Binding video file {}", path);
        Self::bind(FrameSource::from_path(video, path), runner)
    }

    fn bind(source: FrameSource, runner: Arc<dyn RecognizerRunner>) -> Self {
        let events = source.video().map(|v| v.subscribe());
        let shared = Arc::new(Shared {
            core: Mutex::new(Core {
                phase: Phase::Idle,
                mode: RecognitionMode::default(),
                source,
                timeout: super::DEFAULT_RECOGNITION_TIMEOUT,
                timer: TimeoutTimer::new(),
                completion: None,
                pending_reset: false,
                loop_alive: false,
                controls_exposed: false,
                subscription: None,
            }),
            runner,
        });

        if let Some(events) = events {
            let weak = Arc::downgrade(&shared);
            let subscription = MediaSubscription::spawn(events, move |event| {
                if let Some(shared) = weak.upgrade() {
                    shared.handle_media_event(event);
                }
            });
            shared.lock().subscription = Some(subscription);
        }

        Self { shared }
    }

    /// Current externally visible state.
    pub fn state(&self) -> SessionState {
        self.shared.lock().phase.public()
    }

    pub fn recognition_mode(&self) -> RecognitionMode {
        self.shared.lock().mode
    }

    pub fn source_kind(&self) -> SourceKind {
        self.shared.lock().source.kind().clone()
    }

    /// The runner this session feeds, e.g. for reconfiguring it from a callback.
    pub fn recognizer_runner(&self) -> Arc<dyn RecognizerRunner> {
        Arc::clone(&self.shared.runner)
    }

    /// Choose how valid results are handled and switch detection-only mode accordingly.
    pub async fn set_video_recognition_mode(
        &self,
        mode: RecognitionMode,
    ) -> Result<(), SessionError> {
        self.shared.lock().mode = mode;
        self.shared
            .runner
            .set_detection_only_mode(mode == RecognitionMode::DetectionTest)
            .await?;
        log::info!("Video recognition mode set to {}", mode);
        Ok(())
    }

    /// Start playback and the recognition loop.
    ///
    /// `on_done` is invoked each time a scan finishes: on a valid result, on
    /// cancellation, or on timeout (`timeout` after the first non-empty
    /// result). After it returns the loop is stopped; resume it with
    /// [`resume_recognition`](Self::resume_recognition) or pause the feed.
    ///
    /// If the platform blocks autoplay, playback controls are exposed and the
    /// loop starts once the user presses play.
    ///
    /// # Errors
    /// * `InvalidState(Released)` - the feed was released
    /// * `InvalidState(FeedNotPaused)` - the feed is playing; use `resume_recognition`
    pub async fn start<F>(&self, mut on_done: F, timeout: Duration) -> Result<(), SessionError>
    where
        F: FnMut(FrameResultState) + Send + 'static,
    {
        self.start_with(
            Box::new(move |outcome| match outcome {
                Ok(result) => on_done(result),
                Err(e) => log::error!("Scan ended without a result: {}", e),
            }),
            timeout,
        )
        .await
    }

    async fn start_with(&self, completion: Completion, timeout: Duration) -> Result<(), SessionError> {
        let video = {
            let mut core = self.shared.lock();
            let feed_paused = core.source.is_paused();
            core.phase = core
                .phase
                .start(feed_paused)
                .map_err(SessionError::InvalidState)?;
            core.timer.disarm();
            core.timeout = timeout;
            core.completion = Some(completion);
            core.source
                .video()
                .ok_or(SessionError::InvalidState(InvalidStateReason::Released))?
        };

        let weak = Arc::downgrade(&self.shared);
        let clear_timeout: ClearTimeoutCallback = Arc::new(move || {
            if let Some(shared) = weak.upgrade() {
                if shared.lock().timer.disarm() {
                    log::debug!("Timeout disarmed by recognizer");
                }
            }
        });
        self.shared
            .runner
            .set_clear_timeout_callback(Some(clear_timeout));

        log::info!("Starting recognition (timeout {:?})", timeout);
        match video.play().await {
            Ok(()) => self.shared.resume(true),
            Err(e) => {
                match e {
                    PlaybackError::AutoplayPrevented => {
                        log::warn!("Autoplay prevented, waiting for the user to start playback")
                    }
                    PlaybackError::Failed(ref msg) => {
                        log::warn!("Playback failed ({}), waiting for the user to start playback", msg)
                    }
                }
                self.shared.lock().controls_exposed = true;
                video.set_controls(true);
                Ok(())
            }
        }
    }

    /// Run one scan and resolve with its result.
    ///
    /// When the scan finishes the video feed is paused but not released.
    ///
    /// # Errors
    /// * `InvalidState` - same preconditions as [`start`](Self::start)
    /// * `Recognizer` - the runner failed while processing a frame
    /// * `Aborted` - the session was released before the scan finished
    pub async fn recognize(&self, timeout: Duration) -> Result<FrameResultState, SessionError> {
        let (tx, rx) = oneshot::channel();
        let mut tx = Some(tx);
        let weak: Weak<Shared> = Arc::downgrade(&self.shared);

        self.start_with(
            Box::new(move |outcome| {
                if let Some(shared) = weak.upgrade() {
                    if let Err(e) = shared.pause_video_feed() {
                        log::debug!("Could not pause feed after scan: {}", e);
                    }
                }
                if let Some(tx) = tx.take() {
                    let _ = tx.send(outcome);
                }
            }),
            timeout,
        )
        .await?;

        match rx.await {
            Ok(outcome) => Ok(outcome?),
            Err(_) => Err(SessionError::Aborted),
        }
    }

    /// Ask the loop to stop and report at its next iteration boundary.
    ///
    /// A frame already being processed completes first. Idempotent.
    pub fn cancel_recognition(&self) {
        self.shared.cancel();
    }

    /// Stop recognizing frames while the feed keeps playing. No callback is
    /// invoked unless a frame in flight yields a final result.
    pub fn pause_recognition(&self) {
        self.shared.pause_recognition();
    }

    /// Pause recognition and playback. Start again with `start` or `recognize`.
    pub fn pause_video_feed(&self) -> Result<(), SessionError> {
        self.shared.pause_video_feed()
    }

    /// Resume recognition on a playing feed, optionally hard-resetting the
    /// runner before the next frame.
    ///
    /// # Errors
    /// * `InvalidState(Released)` - the feed was released
    /// * `InvalidState(FeedPaused)` - the feed is paused; use `start` or `recognize`
    pub fn resume_recognition(&self, reset_recognizers: bool) -> Result<(), SessionError> {
        self.shared.resume(reset_recognizers)
    }

    /// Pass-through to the runner's reset.
    pub async fn reset_recognizers(&self, hard_reset: bool) -> Result<(), SessionError> {
        self.shared.runner.reset_recognizers(hard_reset).await?;
        Ok(())
    }

    /// Stop all tracks and detach the feed. Active recognition is cancelled
    /// first. Idempotent; the session cannot be started again afterwards.
    pub fn release_video_feed(&self) {
        self.shared.release();
    }
}
