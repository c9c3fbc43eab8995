//! CLI enum types for camera facing and recognition mode options.

use clap::ValueEnum;

use scan_session::camera::Facing;
use scan_session::session::RecognitionMode;

/// Preferred camera facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum FacingArg {
    #[default]
    Back,
    Front,
}

impl From<FacingArg> for Facing {
    fn from(f: FacingArg) -> Self {
        match f {
            FacingArg::Back => Facing::Back,
            FacingArg::Front => Facing::Front,
        }
    }
}

/// How valid results are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ModeArg {
    #[default]
    Recognition,
    RecognitionTest,
    DetectionTest,
}

impl From<ModeArg> for RecognitionMode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Recognition => RecognitionMode::Recognition,
            ModeArg::RecognitionTest => RecognitionMode::RecognitionTest,
            ModeArg::DetectionTest => RecognitionMode::DetectionTest,
        }
    }
}
