//! Configuration management for the PTZ face tracker

use crate::{
    constants::{
        CAPTURE_HEIGHT, CAPTURE_WIDTH, DEFAULT_DEVICE, DEFAULT_PAN_RANGE, DEFAULT_TILT_RANGE, PREVIEW_HEIGHT,
        PREVIEW_WIDTH,
    },
    presets::{default_presets_path, PresetStore},
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Capture device configuration
    pub camera: CameraConfig,

    /// Face detection configuration
    pub detection: DetectionConfig,

    /// Tracking configuration
    pub tracking: TrackingConfig,

    /// Preview window configuration
    pub preview: PreviewConfig,

    /// Preset storage configuration
    pub presets: PresetsConfig,
}

/// Capture device configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Video device node, also used for `v4l2-ctl`
    pub device: String,

    /// Requested capture width
    pub width: i32,

    /// Requested capture height
    pub height: i32,
}

/// Face detection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Path to the frontal-face Haar cascade XML
    pub cascade_path: PathBuf,
}

/// Tracking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Pan units per unit of normalized offset
    pub pan_range: i32,

    /// Tilt units per unit of normalized offset
    pub tilt_range: i32,

    /// Start with tracking enabled
    pub start_enabled: bool,
}

/// Preview window configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Window title
    pub window_title: String,

    /// Preview width
    pub width: i32,

    /// Preview height
    pub height: i32,
}

/// Preset storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PresetsConfig {
    /// Presets file; defaults to `~/.config/meet2ui/presets.json`
    pub path: Option<PathBuf>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device: DEFAULT_DEVICE.to_string(),
            width: CAPTURE_WIDTH,
            height: CAPTURE_HEIGHT,
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            cascade_path: PathBuf::from("/usr/share/opencv4/haarcascades/haarcascade_frontalface_default.xml"),
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            pan_range: DEFAULT_PAN_RANGE,
            tilt_range: DEFAULT_TILT_RANGE,
            start_enabled: false,
        }
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            window_title: "Meet2UI".to_string(),
            width: PREVIEW_WIDTH,
            height: PREVIEW_HEIGHT,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Preset store at the configured or default location
    #[must_use]
    pub fn preset_store(&self) -> PresetStore {
        PresetStore::new(self.presets.path.clone().unwrap_or_else(default_presets_path))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.camera.device.trim().is_empty() {
            return Err(Error::ConfigError("Camera device must not be empty".to_string()));
        }
        if self.camera.width <= 0 || self.camera.height <= 0 {
            return Err(Error::ConfigError(format!(
                "Capture size must be positive, got {}x{}",
                self.camera.width, self.camera.height
            )));
        }

        if self.tracking.pan_range <= 0 || self.tracking.tilt_range <= 0 {
            return Err(Error::ConfigError(
                "Pan and tilt ranges must be greater than 0".to_string(),
            ));
        }

        if self.preview.width <= 0 || self.preview.height <= 0 {
            return Err(Error::ConfigError(format!(
                "Preview size must be positive, got {}x{}",
                self.preview.width, self.preview.height
            )));
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# PTZ Face Tracker Configuration

# Capture device
camera:
  device: "/dev/video0"
  width: 640
  height: 360

# Face detection
detection:
  cascade_path: "/usr/share/opencv4/haarcascades/haarcascade_frontalface_default.xml"

# Tracking
tracking:
  pan_range: 36000
  tilt_range: 36000
  start_enabled: false

# Preview window
preview:
  window_title: "Meet2UI"
  width: 320
  height: 180

# Presets file (omit for ~/.config/meet2ui/presets.json)
presets: {}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_config_parses() {
        let config = Config::from_yaml(EXAMPLE_CONFIG).unwrap();
        assert_eq!(config.camera.device, "/dev/video0");
        assert_eq!(config.tracking.pan_range, 36_000);
        assert!(!config.tracking.start_enabled);
        assert!(config.presets.path.is_none());
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = Config::from_yaml("tracking:\n  tilt_range: 18000\n").unwrap();
        assert_eq!(config.tracking.tilt_range, 18_000);
        assert_eq!(config.tracking.pan_range, 36_000);
        assert_eq!(config.camera.width, 640);
        assert_eq!(config.preview.window_title, "Meet2UI");
    }

    #[test]
    fn test_validate_rejects_bad_ranges() {
        let mut config = Config::default();
        config.tracking.pan_range = 0;
        assert!(matches!(config.validate(), Err(Error::ConfigError(_))));

        let mut config = Config::default();
        config.preview.height = -1;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.camera.device = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(matches!(Config::from_yaml("camera: [1, 2"), Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_file_round_trip() {
        let path = std::env::temp_dir().join(format!("ptz-config-{}.yaml", std::process::id()));
        let mut config = Config::default();
        config.camera.device = "/dev/video3".to_string();
        config.tracking.start_enabled = true;

        config.to_file(&path).unwrap();
        let loaded = Config::from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded.camera.device, "/dev/video3");
        assert!(loaded.tracking.start_enabled);
        assert_eq!(loaded.detection.cascade_path, config.detection.cascade_path);
    }

    #[test]
    fn test_preset_store_path_override() {
        let config = Config::from_yaml("presets:\n  path: /tmp/ptz-presets.json\n").unwrap();
        assert_eq!(config.preset_store().path(), Path::new("/tmp/ptz-presets.json"));
    }
}
