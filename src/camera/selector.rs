//! Camera selection by label heuristics.
//!
//! Platforms don't report which way a camera points, so the label is matched
//! against a fixed multilingual list of "back camera" keywords. The heuristic
//! is locale-dependent; [`choose_camera`] keeps it pure so it can be tested and
//! swapped independently of device enumeration.

use regex::Regex;
use std::cmp::Ordering;
use std::sync::OnceLock;

use super::types::{CameraDescriptor, Facing};
use crate::platform::{
    CameraTarget, MediaConstraints, MediaDeviceInfo, MediaDevices, MediaError, VideoConstraints,
};

/// Label fragments identifying back-facing cameras, lowercase.
pub const BACK_CAMERA_KEYWORDS: &[&str] = &[
    "rear",
    "back",
    "rück",
    "arrière",
    "trasera",
    "trás",
    "traseira",
    "posteriore",
    "后面",
    "後面",
    "背面",
    "后置",
    "後置",
    "背置",
    "задней",
    "الخلفية",
    "후",
    "arka",
    "achterzijde",
    "หลัง",
    "baksidan",
    "bagside",
    "sau",
    "bak",
    "tylny",
    "takakamera",
    "belakang",
    "אחורית",
    "πίσω",
    "spate",
    "hátsó",
    "zadní",
    "darrere",
    "zadná",
    "задня",
    "stražnja",
    "बैक",
];

/// Whether a device label names a back-facing camera.
pub fn is_back_camera_label(label: &str) -> bool {
    let lowercase = label.to_lowercase();
    BACK_CAMERA_KEYWORDS
        .iter()
        .any(|keyword| lowercase.contains(keyword))
}

fn megapixel_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)\b([0-9]+)MP?\b").expect("valid megapixel pattern"))
}

/// Extract the megapixel hint from a label such as `"Back Camera (12MP)"`.
pub fn parse_megapixels(label: &str) -> Option<u64> {
    megapixel_pattern()
        .captures(label)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Approximates a locale-aware ordering: case-insensitive first, raw text as tiebreak.
fn compare_labels(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Pick the best camera out of already-enumerated devices.
///
/// Non-video devices are ignored. Returns `None` if there is no video input.
pub fn choose_camera(devices: &[MediaDeviceInfo], preferred: Facing) -> Option<CameraDescriptor> {
    let mut front = Vec::new();
    let mut back = Vec::new();

    for device in devices.iter().filter(|d| d.is_video_input()) {
        if is_back_camera_label(&device.label) {
            back.push(CameraDescriptor::new(device, Facing::Back));
        } else {
            front.push(CameraDescriptor::new(device, Facing::Front));
        }
    }

    let mut pool = match preferred {
        Facing::Front if !front.is_empty() => front,
        Facing::Back if !back.is_empty() => back,
        _ if !back.is_empty() => back,
        _ => front,
    };
    if pool.is_empty() {
        return None;
    }

    pool.sort_by(|a, b| compare_labels(&a.label, &b.label));

    // Only trust megapixel hints if every candidate carries one
    let resolutions: Option<Vec<u64>> = pool.iter().map(|c| parse_megapixels(&c.label)).collect();
    let index = match resolutions {
        Some(values) => {
            let mut best = 0;
            for (i, value) in values.iter().enumerate() {
                if *value >= values[best] {
                    best = i;
                }
            }
            best
        }
        None => 0,
    };

    Some(pool.swap_remove(index))
}

/// Enumerate the platform's cameras and pick the best one.
///
/// If every video input reports an empty label, access has not been granted
/// yet: a throwaway environment-facing stream is opened to unlock the labels
/// and stopped right after the second enumeration.
pub async fn select_camera(
    media: &dyn MediaDevices,
    preferred: Facing,
) -> Result<Option<CameraDescriptor>, MediaError> {
    let mut devices = media.enumerate_devices().await?;

    let mut video_inputs = devices.iter().filter(|d| d.is_video_input()).peekable();
    let needs_unlock =
        video_inputs.peek().is_some() && video_inputs.all(|d| d.label.is_empty());

    if needs_unlock {
        log::debug!("Camera labels are empty, opening a stream to unlock them");
        let constraints = MediaConstraints {
            audio: false,
            video: VideoConstraints {
                width: None,
                height: None,
                target: CameraTarget::IdealFacing(Facing::Back.facing_mode()),
            },
        };
        let stream = media.get_user_media(&constraints).await?;
        let enumerated = media.enumerate_devices().await;
        stream.stop_all_tracks();
        devices = enumerated?;
    }

    let selected = choose_camera(&devices, preferred);
    match &selected {
        Some(camera) => log::info!("Selected camera {} (preferred {})", camera, preferred),
        None => log::warn!("No video input devices available"),
    }
    Ok(selected)
}
