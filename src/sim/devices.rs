//! In-memory media devices.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};

use super::video::SimulatedStream;
use crate::platform::{
    CameraTarget, MediaConstraints, MediaDeviceInfo, MediaDevices, MediaError, MediaErrorKind,
    MediaStream,
};

#[derive(Default)]
struct DevicesState {
    devices: Vec<MediaDeviceInfo>,
    /// Labels stay hidden until a stream has been opened once
    labels_hidden: bool,
    unsupported: bool,
    failure: Option<MediaError>,
    requests: Vec<MediaConstraints>,
    streams: Vec<Arc<SimulatedStream>>,
}

/// Media device double with a fixed device list.
#[derive(Default)]
pub struct SimulatedDevices {
    state: Mutex<DevicesState>,
}

impl SimulatedDevices {
    pub fn new(devices: Vec<MediaDeviceInfo>) -> Self {
        Self {
            state: Mutex::new(DevicesState {
                devices,
                ..Default::default()
            }),
        }
    }

    /// Video inputs with the given labels and ids `cam-0`, `cam-1`, ...
    pub fn with_labels(labels: &[&str]) -> Self {
        Self::new(
            labels
                .iter()
                .enumerate()
                .map(|(i, label)| MediaDeviceInfo::video_input(format!("cam-{}", i), *label))
                .collect(),
        )
    }

    fn state(&self) -> MutexGuard<'_, DevicesState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Report empty labels until the first stream is granted.
    pub fn hide_labels_until_granted(self) -> Self {
        self.state().labels_hidden = true;
        self
    }

    pub fn set_unsupported(&self, unsupported: bool) {
        self.state().unsupported = unsupported;
    }

    /// Make every subsequent `get_user_media` fail.
    pub fn fail_with(&self, error: MediaError) {
        self.state().failure = Some(error);
    }

    /// Every constraint set passed to `get_user_media`, in order.
    pub fn requests(&self) -> Vec<MediaConstraints> {
        self.state().requests.clone()
    }

    /// Every stream handed out, in order.
    pub fn streams(&self) -> Vec<Arc<SimulatedStream>> {
        self.state().streams.clone()
    }
}

#[async_trait]
impl MediaDevices for SimulatedDevices {
    fn is_supported(&self) -> bool {
        !self.state().unsupported
    }

    async fn enumerate_devices(&self) -> Result<Vec<MediaDeviceInfo>, MediaError> {
        let state = self.state();
        Ok(state
            .devices
            .iter()
            .map(|d| {
                let mut d = d.clone();
                if state.labels_hidden {
                    d.label.clear();
                }
                d
            })
            .collect())
    }

    async fn get_user_media(
        &self,
        constraints: &MediaConstraints,
    ) -> Result<Arc<dyn MediaStream>, MediaError> {
        let mut state = self.state();
        state.requests.push(constraints.clone());

        if let Some(error) = state.failure.clone() {
            return Err(error);
        }

        let device = match &constraints.video.target {
            CameraTarget::ExactDevice(id) => state.devices.iter().find(|d| &d.device_id == id),
            CameraTarget::IdealFacing(_) => {
                state.devices.iter().find(|d| d.is_video_input())
            }
        };
        let Some(device) = device else {
            return Err(MediaError::new(
                MediaErrorKind::NotFound,
                "Requested device not found",
            ));
        };

        let stream = Arc::new(SimulatedStream::new(&device.label));
        state.labels_hidden = false;
        state.streams.push(Arc::clone(&stream));
        Ok(stream)
    }
}
