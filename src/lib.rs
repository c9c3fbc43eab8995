//! scan-session library crate.
//!
//! Camera selection, stream acquisition and the resumable recognition
//! session that feeds video frames to a recognizer runner. The host platform
//! (camera API, video playback) is supplied through the traits in [`platform`];
//! [`sim`] provides in-memory implementations.

pub mod camera;
pub mod config;
pub mod error;
pub mod frame_source;
pub mod platform;
pub mod runner;
pub mod session;
pub mod sim;
