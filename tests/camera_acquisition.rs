//! Integration tests for camera selection and acquisition.
//!
//! These verify:
//! - Back/front classification and megapixel preference across real-world labels
//! - Label unlock when the platform hides labels before permission
//! - Platform failures mapped to acquisition reasons

use scan_session::camera::{open_camera, select_camera, Facing, StreamSettings};
use scan_session::error::{NotSupportedReason, SessionError};
use scan_session::platform::{
    CameraTarget, FacingMode, MediaDeviceInfo, MediaDeviceKind, MediaError, MediaErrorKind,
};
use scan_session::runner::FrameResultState;
use scan_session::session::VideoRecognizer;
use scan_session::sim::{ScriptedRunner, SimulatedDevices, SimulatedVideo};
use std::sync::Arc;

async fn open_session(
    devices: &SimulatedDevices,
    preferred: Facing,
) -> (Result<VideoRecognizer, SessionError>, Arc<SimulatedVideo>, Arc<ScriptedRunner>) {
    let video = Arc::new(SimulatedVideo::new());
    let runner = Arc::new(ScriptedRunner::new([FrameResultState::Valid]));
    let result = VideoRecognizer::from_camera_stream(
        devices,
        video.clone(),
        runner.clone(),
        preferred,
        &StreamSettings::default(),
    )
    .await;
    (result, video, runner)
}

fn acquisition_reason(err: SessionError) -> NotSupportedReason {
    match err {
        SessionError::Acquisition(e) => e.reason,
        other => panic!("Expected acquisition error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_android_quad_camera_picks_highest_resolution_back() {
    let devices = SimulatedDevices::with_labels(&[
        "camera2 1, facing front",
        "camera2 0, facing back 12MP",
        "camera2 2, facing back 48MP",
        "camera2 3, facing back 2MP",
    ]);
    let camera = select_camera(&devices, Facing::Back).await.unwrap().unwrap();
    assert_eq!(camera.device_id, "cam-2");
    assert_eq!(camera.facing, Facing::Back);
}

#[tokio::test]
async fn test_localized_labels_are_classified() {
    let devices = SimulatedDevices::with_labels(&["Frontkamera", "Rückkamera"]);
    let back = select_camera(&devices, Facing::Back).await.unwrap().unwrap();
    assert_eq!(back.label, "Rückkamera");
    let front = select_camera(&devices, Facing::Front).await.unwrap().unwrap();
    assert_eq!(front.label, "Frontkamera");
}

#[tokio::test]
async fn test_hidden_labels_are_unlocked_with_throwaway_stream() {
    let devices =
        SimulatedDevices::with_labels(&["Front Camera", "Back Camera"]).hide_labels_until_granted();
    let (result, _video, _runner) = open_session(&devices, Facing::Back).await;
    let recognizer = result.unwrap();

    let requests = devices.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(
        requests[0].video.target,
        CameraTarget::IdealFacing(FacingMode::Environment)
    );
    assert_eq!(
        requests[1].video.target,
        CameraTarget::ExactDevice("cam-1".to_string())
    );

    let streams = devices.streams();
    assert!(!streams[0].is_live(), "unlock stream must be stopped");
    assert!(streams[1].is_live());

    recognizer.release_video_feed();
    assert!(!streams[1].is_live());
}

#[tokio::test]
async fn test_visible_labels_open_once() {
    let devices = SimulatedDevices::with_labels(&["Back Camera"]);
    let (result, _video, _runner) = open_session(&devices, Facing::Back).await;
    result.unwrap().release_video_feed();
    assert_eq!(devices.requests().len(), 1);
    assert!(!devices.requests()[0].audio);
}

#[tokio::test]
async fn test_front_camera_is_mirrored() {
    let devices = SimulatedDevices::with_labels(&["Back Camera", "Front Camera"]);
    let (result, video, runner) = open_session(&devices, Facing::Front).await;
    let recognizer = result.unwrap();
    assert!(video.is_mirrored());
    assert!(runner.mirrored());
    assert!(!video.controls());
    recognizer.release_video_feed();
}

#[tokio::test]
async fn test_front_only_device_ignores_back_preference() {
    let devices = SimulatedDevices::with_labels(&["FaceTime HD Camera (Built-in) front"]);
    let (result, video, runner) = open_session(&devices, Facing::Back).await;
    let recognizer = result.unwrap();
    assert!(video.is_mirrored());
    assert!(runner.mirrored());
    recognizer.release_video_feed();
}

#[tokio::test]
async fn test_back_camera_is_not_mirrored() {
    let devices = SimulatedDevices::with_labels(&["Back Camera", "Front Camera"]);
    let (result, video, runner) = open_session(&devices, Facing::Back).await;
    let recognizer = result.unwrap();
    assert!(!video.is_mirrored());
    assert!(!runner.mirrored());
    assert!(video.has_stream());
    recognizer.release_video_feed();
}

#[tokio::test]
async fn test_no_cameras_is_camera_not_found() {
    let devices = SimulatedDevices::new(vec![MediaDeviceInfo {
        device_id: "mic".to_string(),
        group_id: String::new(),
        kind: MediaDeviceKind::AudioInput,
        label: "Built-in Microphone".to_string(),
    }]);
    let (result, _video, _runner) = open_session(&devices, Facing::Back).await;
    assert_eq!(
        acquisition_reason(result.unwrap_err()),
        NotSupportedReason::CameraNotFound
    );
    assert!(devices.requests().is_empty());
}

#[tokio::test]
async fn test_unsupported_host() {
    let devices = SimulatedDevices::with_labels(&["Back Camera"]);
    devices.set_unsupported(true);
    let (result, _video, _runner) = open_session(&devices, Facing::Back).await;
    assert_eq!(
        acquisition_reason(result.unwrap_err()),
        NotSupportedReason::MediaDevicesNotSupported
    );
}

#[tokio::test]
async fn test_platform_failures_are_mapped() {
    let cases = [
        (MediaErrorKind::NotAllowed, NotSupportedReason::CameraNotAllowed),
        (MediaErrorKind::Security, NotSupportedReason::CameraNotAllowed),
        (MediaErrorKind::NotFound, NotSupportedReason::CameraNotFound),
        (MediaErrorKind::Overconstrained, NotSupportedReason::CameraNotFound),
        (MediaErrorKind::NotReadable, NotSupportedReason::CameraNotAvailable),
        (MediaErrorKind::Abort, NotSupportedReason::CameraNotAvailable),
        (MediaErrorKind::Other, NotSupportedReason::CameraInUse),
    ];
    for (kind, expected) in cases {
        let devices = SimulatedDevices::with_labels(&["Back Camera"]);
        devices.fail_with(MediaError::new(kind, "denied by host"));
        let (result, _video, _runner) = open_session(&devices, Facing::Back).await;
        let err = result.unwrap_err();
        assert!(err.to_string().contains("denied by host"), "{}", err);
        assert_eq!(acquisition_reason(err), expected, "{:?}", kind);
    }
}

#[tokio::test]
async fn test_open_camera_uses_requested_resolution() {
    let devices = SimulatedDevices::with_labels(&["Back Camera"]);
    let settings = StreamSettings::default();
    let opened = open_camera(&devices, Facing::Back, &settings).await.unwrap();
    assert_eq!(opened.camera.device_id, "cam-0");

    let request = &devices.requests()[0];
    assert_eq!(request.video.width, Some(settings.width));
    assert_eq!(request.video.height, Some(settings.height));
}
