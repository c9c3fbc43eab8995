//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::enums::{FacingArg, ModeArg};

/// Drive a camera recognition session against a simulated host
#[derive(Parser, Debug)]
#[command(name = "scan-session")]
#[command(version, about = "Camera recognition session orchestration", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Config file path
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Pick a camera from a list of device labels
    SelectCamera {
        /// Device labels as reported by the platform
        #[arg(required = true)]
        labels: Vec<String>,

        /// Preferred facing (defaults to the config file)
        #[arg(long)]
        prefer: Option<FacingArg>,
    },
    /// Run a full session over a scripted sequence of frame results
    Simulate {
        /// Comma-separated results: empty, uncertain, valid
        #[arg(long, short, default_value = "empty,uncertain,valid")]
        results: String,

        /// Result returned once the script is exhausted
        #[arg(long, default_value = "empty")]
        then: String,

        /// Recognition mode (defaults to the config file)
        #[arg(long, short)]
        mode: Option<ModeArg>,

        /// Timeout after the first non-empty result, in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Simulated processing time per frame, in milliseconds
        #[arg(long, default_value = "30")]
        frame_ms: u64,

        /// Camera labels of the simulated device
        #[arg(long = "camera", default_values_t = [String::from("Back Camera"), String::from("Front Camera")])]
        cameras: Vec<String>,

        /// Preferred facing (defaults to the config file)
        #[arg(long)]
        prefer: Option<FacingArg>,

        /// Block autoplay so playback starts only after a simulated user gesture
        #[arg(long)]
        block_autoplay: bool,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
}
