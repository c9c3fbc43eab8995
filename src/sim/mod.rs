//! In-memory host platform and recognizer.
//!
//! Used by the `simulate` subcommand and by tests to drive a full session
//! without camera hardware:
//! - [`SimulatedDevices`] for enumeration and stream acquisition
//! - [`SimulatedVideo`] for playback and media events
//! - [`ScriptedRunner`] for a replayed sequence of frame results

mod devices;
mod runner;
mod video;

pub use devices::SimulatedDevices;
pub use runner::ScriptedRunner;
pub use video::{SimulatedStream, SimulatedTrack, SimulatedVideo};
