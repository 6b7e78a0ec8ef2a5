//! Runtime configuration, loaded from JSON or assembled from CLI flags

use std::fs;
use std::path::{Path, PathBuf};

use chromacloud_algorithms::{AspectMode, SceneOptions, DEFAULT_WINDOW_HEIGHT, DEFAULT_WINDOW_WIDTH};
use chromacloud_core::{Error, Result};
use serde::Deserialize;

/// Everything one pipeline run needs
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VisualizerConfig {
    pub image_path: PathBuf,
    /// Resize factor applied before building the grids; 1.0 keeps native size
    pub scale_factor: f32,
    pub window_width: u32,
    pub window_height: u32,
    pub aspect_mode: AspectMode,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            image_path: PathBuf::new(),
            scale_factor: 1.0,
            window_width: DEFAULT_WINDOW_WIDTH,
            window_height: DEFAULT_WINDOW_HEIGHT,
            aspect_mode: AspectMode::Manual,
        }
    }
}

impl VisualizerConfig {
    /// Default configuration for one image
    pub fn for_image(image_path: impl Into<PathBuf>) -> Self {
        Self {
            image_path: image_path.into(),
            ..Self::default()
        }
    }

    /// Display options handed to scene assembly
    pub fn scene_options(&self) -> SceneOptions {
        SceneOptions {
            window_width: self.window_width,
            window_height: self.window_height,
            aspect_mode: self.aspect_mode,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.image_path.as_os_str().is_empty() {
            return Err(Error::Config("no image path given".to_string()));
        }
        if !self.scale_factor.is_finite() || self.scale_factor <= 0.0 {
            return Err(Error::Config(format!(
                "scale_factor must be finite and positive, got {}",
                self.scale_factor
            )));
        }
        self.scene_options().validate()
    }
}

/// Values given explicitly on the command line; `None` keeps the config value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub image_path: Option<PathBuf>,
    pub scale_factor: Option<f32>,
    pub window_width: Option<u32>,
    pub window_height: Option<u32>,
    pub aspect_mode: Option<AspectMode>,
}

impl ConfigOverrides {
    pub fn apply(self, mut config: VisualizerConfig) -> VisualizerConfig {
        if let Some(path) = self.image_path {
            config.image_path = path;
        }
        if let Some(scale) = self.scale_factor {
            config.scale_factor = scale;
        }
        if let Some(width) = self.window_width {
            config.window_width = width;
        }
        if let Some(height) = self.window_height {
            config.window_height = height;
        }
        if let Some(mode) = self.aspect_mode {
            config.aspect_mode = mode;
        }
        config
    }
}

/// Read a JSON config file. Missing keys take their defaults.
pub fn load_config(path: &Path) -> Result<VisualizerConfig> {
    let contents = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read config {}: {e}", path.display())))?;
    parse_config(&contents)
        .map_err(|e| Error::Config(format!("Failed to parse config {}: {e}", path.display())))
}

fn parse_config(contents: &str) -> std::result::Result<VisualizerConfig, serde_json::Error> {
    serde_json::from_str(contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_take_defaults() {
        let config = parse_config(r#"{ "image_path": "photo.jpg" }"#).unwrap();
        assert_eq!(config, VisualizerConfig::for_image("photo.jpg"));
        assert_eq!(config.window_width, 1600);
        assert_eq!(config.window_height, 1200);
        assert_eq!(config.scale_factor, 1.0);
        assert_eq!(config.aspect_mode, AspectMode::Manual);
    }

    #[test]
    fn test_all_keys() {
        let config = parse_config(
            r#"{
                "image_path": "a.png",
                "scale_factor": 0.25,
                "window_width": 800,
                "window_height": 600,
                "aspect_mode": "auto"
            }"#,
        )
        .unwrap();
        assert_eq!(config.scale_factor, 0.25);
        assert_eq!(config.window_width, 800);
        assert_eq!(config.window_height, 600);
        assert_eq!(config.aspect_mode, AspectMode::Auto);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(parse_config(r#"{ "image_path": "a.png", "scale": 2 }"#).is_err());
        assert!(parse_config(r#"{ "aspect_mode": "sideways" }"#).is_err());
    }

    #[test]
    fn test_validate() {
        assert!(matches!(VisualizerConfig::default().validate(), Err(Error::Config(_))));

        let mut config = VisualizerConfig::for_image("a.png");
        config.scale_factor = 0.0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
        config.scale_factor = f32::NAN;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = VisualizerConfig::for_image("a.png");
        config.window_height = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let path = std::env::temp_dir().join("chromacloud_no_such_config.json");
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("Failed to read config")));
    }
}
