//! In-memory video element.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tokio::sync::broadcast;

use crate::platform::{
    Frame, MediaEvent, MediaStream, MediaTrack, PlaybackError, VideoElement,
};

const FRAME_WIDTH: u32 = 4;
const FRAME_HEIGHT: u32 = 4;

/// A live track that just records whether it was stopped.
#[derive(Debug)]
pub struct SimulatedTrack {
    label: String,
    live: Mutex<bool>,
}

impl MediaTrack for SimulatedTrack {
    fn label(&self) -> String {
        self.label.clone()
    }

    fn stop(&self) {
        if let Ok(mut live) = self.live.lock() {
            *live = false;
        }
    }

    fn is_live(&self) -> bool {
        self.live.lock().map(|l| *l).unwrap_or(false)
    }
}

/// A single-track camera stream.
#[derive(Debug)]
pub struct SimulatedStream {
    track: Arc<SimulatedTrack>,
}

impl SimulatedStream {
    pub fn new(label: &str) -> Self {
        Self {
            track: Arc::new(SimulatedTrack {
                label: label.to_string(),
                live: Mutex::new(true),
            }),
        }
    }

    pub fn is_live(&self) -> bool {
        self.track.is_live()
    }
}

impl MediaStream for SimulatedStream {
    fn tracks(&self) -> Vec<Arc<dyn MediaTrack>> {
        vec![self.track.clone() as Arc<dyn MediaTrack>]
    }
}

#[derive(Default)]
struct VideoState {
    paused: bool,
    controls: bool,
    mirrored: bool,
    autoplay_blocked: bool,
    stream: Option<Arc<dyn MediaStream>>,
    source: Option<String>,
    frames_captured: u64,
}

/// Video element double. Starts paused; events go to every subscriber.
pub struct SimulatedVideo {
    state: Mutex<VideoState>,
    events: broadcast::Sender<MediaEvent>,
}

impl Default for SimulatedVideo {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedVideo {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            state: Mutex::new(VideoState {
                paused: true,
                ..Default::default()
            }),
            events,
        }
    }

    fn state(&self) -> MutexGuard<'_, VideoState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn emit(&self, event: MediaEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    /// Make `play` fail as if a user gesture were required.
    pub fn block_autoplay(&self, blocked: bool) {
        self.state().autoplay_blocked = blocked;
    }

    /// The user pressed play on the exposed controls.
    pub fn user_play(&self) {
        self.state().paused = false;
        self.emit(MediaEvent::Play);
    }

    /// The user (or the platform) paused playback.
    pub fn user_pause(&self) {
        self.state().paused = true;
        self.emit(MediaEvent::Pause);
    }

    /// Playback of a file source reached its end.
    pub fn end(&self) {
        self.state().paused = true;
        self.emit(MediaEvent::Pause);
        self.emit(MediaEvent::Ended);
    }

    pub fn controls(&self) -> bool {
        self.state().controls
    }

    pub fn is_mirrored(&self) -> bool {
        self.state().mirrored
    }

    pub fn has_stream(&self) -> bool {
        self.state().stream.is_some()
    }

    pub fn source(&self) -> Option<String> {
        self.state().source.clone()
    }

    pub fn frames_captured(&self) -> u64 {
        self.state().frames_captured
    }
}

#[async_trait]
impl VideoElement for SimulatedVideo {
    fn attach_stream(&self, stream: Arc<dyn MediaStream>) {
        self.state().stream = Some(stream);
    }

    fn detach_stream(&self) {
        self.state().stream = None;
    }

    fn attach_source(&self, path: &str) {
        self.state().source = Some(path.to_string());
    }

    fn set_controls(&self, enabled: bool) {
        self.state().controls = enabled;
    }

    fn set_mirrored(&self, mirrored: bool) {
        self.state().mirrored = mirrored;
    }

    fn is_paused(&self) -> bool {
        self.state().paused
    }

    async fn play(&self) -> Result<(), PlaybackError> {
        {
            let mut state = self.state();
            if state.autoplay_blocked {
                return Err(PlaybackError::AutoplayPrevented);
            }
            state.paused = false;
        }
        self.emit(MediaEvent::Play);
        Ok(())
    }

    fn pause(&self) {
        let was_playing = {
            let mut state = self.state();
            let was_playing = !state.paused;
            state.paused = true;
            was_playing
        };
        if was_playing {
            self.emit(MediaEvent::Pause);
        }
    }

    fn capture_frame(&self) -> Frame {
        let mut state = self.state();
        state.frames_captured += 1;
        let shade = (state.frames_captured % 256) as u8;
        Frame {
            data: vec![shade; (FRAME_WIDTH * FRAME_HEIGHT * 4) as usize],
            width: FRAME_WIDTH,
            height: FRAME_HEIGHT,
            mirrored: state.mirrored,
            timestamp: Instant::now(),
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<MediaEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_play_and_pause_emit_events() {
        let video = SimulatedVideo::new();
        let mut events = video.subscribe();
        assert!(video.is_paused());

        video.play().await.unwrap();
        assert!(!video.is_paused());
        video.pause();
        assert!(video.is_paused());

        assert_eq!(events.recv().await.unwrap(), MediaEvent::Play);
        assert_eq!(events.recv().await.unwrap(), MediaEvent::Pause);
    }

    #[tokio::test]
    async fn test_blocked_autoplay() {
        let video = SimulatedVideo::new();
        video.block_autoplay(true);
        assert_eq!(video.play().await, Err(PlaybackError::AutoplayPrevented));
        assert!(video.is_paused());
    }

    #[test]
    fn test_capture_counts_frames() {
        let video = SimulatedVideo::new();
        let frame = video.capture_frame();
        assert_eq!(frame.data.len(), 64);
        assert_eq!(video.frames_captured(), 1);
    }
}
