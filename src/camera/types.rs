//! Camera types and data structures.

use std::fmt;

use crate::platform::{FacingMode, MediaDeviceInfo};

/// Which way a camera points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    /// Toward the user (selfie camera)
    Front,
    /// Away from the user
    #[default]
    Back,
}

impl Facing {
    /// The facing-mode hint used when no concrete device id is known.
    pub fn facing_mode(self) -> FacingMode {
        match self {
            Facing::Front => FacingMode::User,
            Facing::Back => FacingMode::Environment,
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "front" | "user" => Some(Facing::Front),
            "back" | "rear" | "environment" => Some(Facing::Back),
            _ => None,
        }
    }
}

impl fmt::Display for Facing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Facing::Front => write!(f, "front"),
            Facing::Back => write!(f, "back"),
        }
    }
}

/// A classified camera, ready to be opened.
///
/// An empty `device_id` means the camera must be requested by facing mode
/// rather than by exact id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDescriptor {
    pub device_id: String,
    pub group_id: String,
    pub facing: Facing,
    pub label: String,
}

impl CameraDescriptor {
    pub fn new(info: &MediaDeviceInfo, facing: Facing) -> Self {
        Self {
            device_id: info.device_id.clone(),
            group_id: info.group_id.clone(),
            facing,
            label: info.label.clone(),
        }
    }

    /// Whether the camera has to be requested through a facing-mode hint.
    pub fn uses_facing_mode(&self) -> bool {
        self.device_id.is_empty()
    }
}

impl fmt::Display for CameraDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.device_id.is_empty() {
            write!(f, "{} ({})", self.label, self.facing)
        } else {
            write!(f, "[{}] {} ({})", self.device_id, self.label, self.facing)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facing_default_is_back() {
        assert_eq!(Facing::default(), Facing::Back);
    }

    #[test]
    fn test_facing_mode_mapping() {
        assert_eq!(Facing::Back.facing_mode(), FacingMode::Environment);
        assert_eq!(Facing::Front.facing_mode(), FacingMode::User);
    }

    #[test]
    fn test_facing_from_str() {
        assert_eq!(Facing::from_str("front"), Some(Facing::Front));
        assert_eq!(Facing::from_str("Environment"), Some(Facing::Back));
        assert_eq!(Facing::from_str("side"), None);
    }

    #[test]
    fn test_descriptor_display() {
        let info = MediaDeviceInfo::video_input("cam-1", "Back Camera");
        let camera = CameraDescriptor::new(&info, Facing::Back);
        assert_eq!(format!("{}", camera), "[cam-1] Back Camera (back)");
        assert!(!camera.uses_facing_mode());
    }

    #[test]
    fn test_empty_device_id_uses_facing_mode() {
        let info = MediaDeviceInfo::video_input("", "");
        let camera = CameraDescriptor::new(&info, Facing::Front);
        assert!(camera.uses_facing_mode());
    }
}
