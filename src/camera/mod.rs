//! Camera selection and acquisition.
//!
//! This module provides:
//! - Label-based classification and selection via [`choose_camera`] / [`select_camera`]
//! - Stream acquisition via [`open_camera`]
//! - Descriptors via [`CameraDescriptor`] and [`Facing`]

mod acquire;
mod selector;
mod types;

pub use acquire::{acquisition_reason, build_constraints, open_camera, OpenedCamera, StreamSettings};
pub use selector::{
    choose_camera, is_back_camera_label, parse_megapixels, select_camera, BACK_CAMERA_KEYWORDS,
};
pub use types::{CameraDescriptor, Facing};
