//! Configuration file handling for scan-session.
//!
//! Loads configuration from `<config dir>/scan-session/config.toml` or a custom path.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::camera::{Facing, StreamSettings};
use crate::platform::DimensionRange;
use crate::session::RecognitionMode;

/// Configuration file structure for scan-session.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub recognition: RecognitionConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct CameraConfig {
    /// "back" or "front"
    #[serde(default = "default_facing")]
    pub preferred: String,
    #[serde(default = "default_width")]
    pub width: RangeConfig,
    #[serde(default = "default_height")]
    pub height: RangeConfig,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            preferred: default_facing(),
            width: default_width(),
            height: default_height(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub struct RangeConfig {
    pub min: u32,
    pub ideal: u32,
    pub max: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct RecognitionConfig {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// "recognition", "recognition-test" or "detection-test"
    #[serde(default = "default_mode")]
    pub mode: String,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            mode: default_mode(),
        }
    }
}

fn default_facing() -> String {
    "back".to_string()
}

fn default_width() -> RangeConfig {
    let w = StreamSettings::default().width;
    RangeConfig {
        min: w.min,
        ideal: w.ideal,
        max: w.max,
    }
}

fn default_height() -> RangeConfig {
    let h = StreamSettings::default().height;
    RangeConfig {
        min: h.min,
        ideal: h.ideal,
        max: h.max,
    }
}

fn default_timeout_ms() -> u64 {
    crate::session::DEFAULT_RECOGNITION_TIMEOUT.as_millis() as u64
}

fn default_mode() -> String {
    "recognition".to_string()
}

impl From<RangeConfig> for DimensionRange {
    fn from(r: RangeConfig) -> Self {
        DimensionRange {
            min: r.min,
            ideal: r.ideal,
            max: r.max,
        }
    }
}

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io {
                path: path.clone(),
                source: e,
            })?;
            let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
                path: path.clone(),
                source: e,
            })?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Write this configuration as TOML, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.preferred_facing()?;
        self.recognition_mode()?;
        for (name, range) in [("width", self.camera.width), ("height", self.camera.height)] {
            if !(range.min <= range.ideal && range.ideal <= range.max) {
                return Err(ConfigError::Invalid(format!(
                    "camera.{} must satisfy min <= ideal <= max, got {}/{}/{}",
                    name, range.min, range.ideal, range.max
                )));
            }
        }
        if self.recognition.timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "recognition.timeout_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn preferred_facing(&self) -> Result<Facing, ConfigError> {
        Facing::from_str(&self.camera.preferred).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "camera.preferred must be 'back' or 'front', got '{}'",
                self.camera.preferred
            ))
        })
    }

    pub fn recognition_mode(&self) -> Result<RecognitionMode, ConfigError> {
        RecognitionMode::from_str(&self.recognition.mode).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "recognition.mode must be recognition, recognition-test or detection-test, got '{}'",
                self.recognition.mode
            ))
        })
    }

    pub fn stream_settings(&self) -> StreamSettings {
        StreamSettings {
            width: self.camera.width.into(),
            height: self.camera.height.into(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.recognition.timeout_ms)
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("scan-session").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/scan-session/config.toml")
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("nope.toml"))).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.preferred_facing().unwrap(), Facing::Back);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.stream_settings(), StreamSettings::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[camera]\npreferred = \"front\"\n\n[recognition]\ntimeout_ms = 5000").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.preferred_facing().unwrap(), Facing::Front);
        assert_eq!(config.timeout(), Duration::from_millis(5000));
        assert_eq!(config.recognition_mode().unwrap(), RecognitionMode::Recognition);
        assert_eq!(config.camera.width.ideal, 1920);
    }

    #[test]
    fn test_invalid_facing_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[camera]\npreferred = \"sideways\"").unwrap();
        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_bad_range_rejected() {
        let mut config = Config::default();
        config.camera.height = RangeConfig {
            min: 1080,
            ideal: 480,
            max: 1080,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_toml_reports_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[camera\npreferred = ").unwrap();
        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.recognition.mode = "detection-test".to_string();
        config.save(&path).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.recognition_mode().unwrap(), RecognitionMode::DetectionTest);
    }
}
