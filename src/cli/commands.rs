//! Subcommand handlers for select-camera, simulate and config actions.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use super::args::ConfigAction;
use scan_session::camera::{choose_camera, Facing, StreamSettings};
use scan_session::config::{Config, ConfigError};
use scan_session::error::SessionError;
use scan_session::platform::MediaDeviceInfo;
use scan_session::runner::FrameResultState;
use scan_session::session::{RecognitionMode, VideoRecognizer};
use scan_session::sim::{ScriptedRunner, SimulatedDevices, SimulatedVideo};

/// Errors surfaced by subcommands.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("Invalid frame result '{0}'. Expected empty, uncertain or valid")]
    InvalidResult(String),
    #[error("Failed to install Ctrl+C handler: {0}")]
    CtrlC(#[from] ctrlc::Error),
    #[error("Config file already exists: {0}")]
    ConfigExists(String),
    #[error("Session ended without reporting a result")]
    NoResult,
}

/// Options for a simulated scanning session.
#[derive(Debug, Clone)]
pub struct SimulateOptions {
    pub results: Vec<FrameResultState>,
    pub then: FrameResultState,
    pub mode: RecognitionMode,
    pub timeout: Duration,
    pub frame_time: Duration,
    pub cameras: Vec<String>,
    pub preferred: Facing,
    pub settings: StreamSettings,
    pub block_autoplay: bool,
}

/// Parse a comma-separated list of frame results.
pub fn parse_results(s: &str) -> Result<Vec<FrameResultState>, CommandError> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(parse_result)
        .collect()
}

pub fn parse_result(s: &str) -> Result<FrameResultState, CommandError> {
    FrameResultState::from_str(s.trim()).ok_or_else(|| CommandError::InvalidResult(s.to_string()))
}

/// Pick a camera from the given labels and print the choice.
pub fn select_camera(labels: &[String], preferred: Facing) {
    let devices: Vec<MediaDeviceInfo> = labels
        .iter()
        .enumerate()
        .map(|(i, label)| MediaDeviceInfo::video_input(format!("cam-{}", i), label.as_str()))
        .collect();

    match choose_camera(&devices, preferred) {
        Some(camera) => {
            println!("Selected camera:");
            println!("  {}", camera);
            if camera.facing != preferred {
                println!();
                println!("No {} camera available, fell back to {}.", preferred, camera.facing);
            }
        }
        None => {
            println!("No cameras found.");
        }
    }
}

/// Run one scan over simulated hardware and print the result.
///
/// Ctrl+C cancels the scan; the result seen so far is still reported.
pub async fn simulate(options: SimulateOptions) -> Result<FrameResultState, CommandError> {
    let labels: Vec<&str> = options.cameras.iter().map(String::as_str).collect();
    let devices = SimulatedDevices::with_labels(&labels);
    let video = Arc::new(SimulatedVideo::new());
    video.block_autoplay(options.block_autoplay);
    let runner = Arc::new(
        ScriptedRunner::new(options.results.clone())
            .with_fallback(options.then)
            .with_processing_delay(options.frame_time),
    );

    let recognizer = VideoRecognizer::from_camera_stream(
        &devices,
        video.clone(),
        runner.clone(),
        options.preferred,
        &options.settings,
    )
    .await?;
    recognizer.set_video_recognition_mode(options.mode).await?;

    let handle = recognizer.clone();
    ctrlc::set_handler(move || {
        eprintln!("\nReceived Ctrl+C, cancelling scan...");
        handle.cancel_recognition();
    })?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    recognizer
        .start(
            move |result| {
                let _ = tx.send(result);
            },
            options.timeout,
        )
        .await?;

    if video.controls() {
        println!("Autoplay was blocked; pressing play on the exposed controls.");
        video.user_play();
    }

    let outcome = rx.recv().await;
    if let Err(e) = recognizer.pause_video_feed() {
        log::debug!("Feed already released: {}", e);
    }
    recognizer.release_video_feed();

    let result = outcome.ok_or(CommandError::NoResult)?;
    println!("Scan finished: {}", result);
    println!("  Frames processed: {}", runner.processed());
    println!("  Hard resets: {}", runner.resets().iter().filter(|h| **h).count());
    Ok(result)
}

/// Handle config subcommand actions.
pub fn handle_config_action(action: ConfigAction, path: &Path) -> Result<(), CommandError> {
    match action {
        ConfigAction::Show => {
            let config = Config::load(Some(path))?;
            println!("Current configuration:");
            println!("  Preferred camera: {}", config.preferred_facing()?);
            println!(
                "  Width: {}..{} (ideal {})",
                config.camera.width.min, config.camera.width.max, config.camera.width.ideal
            );
            println!(
                "  Height: {}..{} (ideal {})",
                config.camera.height.min, config.camera.height.max, config.camera.height.ideal
            );
            println!("  Timeout: {} ms", config.recognition.timeout_ms);
            println!("  Mode: {}", config.recognition_mode()?);
            println!();

            if path.exists() {
                println!("Config file: {} (exists)", path.display());
            } else {
                println!("Config file: {} (not found)", path.display());
            }
            Ok(())
        }
        ConfigAction::Init => {
            if path.exists() {
                return Err(CommandError::ConfigExists(path.display().to_string()));
            }
            Config::default().save(path)?;
            println!("Created config file: {}", path.display());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_results() {
        let results = parse_results("empty, uncertain,,valid").unwrap();
        assert_eq!(
            results,
            vec![
                FrameResultState::Empty,
                FrameResultState::Uncertain,
                FrameResultState::Valid
            ]
        );
    }

    #[test]
    fn test_parse_results_rejects_unknown() {
        let err = parse_results("empty,maybe").unwrap_err();
        assert!(matches!(err, CommandError::InvalidResult(ref s) if s == "maybe"));
    }

    #[test]
    fn test_config_init_then_show() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        handle_config_action(ConfigAction::Init, &path).unwrap();
        assert!(path.exists());
        handle_config_action(ConfigAction::Show, &path).unwrap();

        let err = handle_config_action(ConfigAction::Init, &path).unwrap_err();
        assert!(matches!(err, CommandError::ConfigExists(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulate_reports_valid_result() {
        let options = SimulateOptions {
            results: vec![FrameResultState::Empty, FrameResultState::Valid],
            then: FrameResultState::Empty,
            mode: RecognitionMode::Recognition,
            timeout: Duration::from_secs(30),
            frame_time: Duration::from_millis(10),
            cameras: vec!["Back Camera".to_string()],
            preferred: Facing::Back,
            settings: StreamSettings::default(),
            block_autoplay: true,
        };
        let result = simulate(options).await.unwrap();
        assert_eq!(result, FrameResultState::Valid);
    }
}
