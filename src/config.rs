//! Configuration management for Markcard
//!
//! Handles loading, saving, and managing render configuration.
//! Configuration is persisted as JSON under the platform config directory.

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application identifier following reverse-DNS convention
pub const APP_ID: &str = "com.markcard.Markcard";

/// Default canvas width in logical pixels
pub const DEFAULT_CANVAS_WIDTH: f32 = 375.0;

/// Default canvas height in logical pixels (70% of a typical viewport)
pub const DEFAULT_CANVAS_HEIGHT: f32 = 470.0;

/// Default device pixel ratio
pub const DEFAULT_PIXEL_RATIO: f32 = 2.0;

/// Minimum canvas dimension the renderer will accept
pub const MIN_CANVAS_DIMENSION: f32 = 1.0;

/// Maximum source text size per field (in bytes) - 256KB
pub const MAX_SOURCE_SIZE: u64 = 256 * 1024;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Canvas sizing configuration
    pub canvas: CanvasConfig,

    /// Render configuration
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            canvas: CanvasConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

/// Canvas sizing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasConfig {
    /// Surface width in logical pixels
    pub width: f32,

    /// Surface height in logical pixels
    pub height: f32,

    /// Device pixel ratio applied once at session start
    pub pixel_ratio: f32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_CANVAS_WIDTH,
            height: DEFAULT_CANVAS_HEIGHT,
            pixel_ratio: DEFAULT_PIXEL_RATIO,
        }
    }
}

/// Render configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Name of the active theme
    pub theme: String,

    /// Whether to stamp the watermark onto rendered cards
    pub watermark: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            theme: "default".to_string(),
            watermark: false,
        }
    }
}

impl Config {
    /// Load configuration from the config directory or return defaults
    pub fn load() -> ConfigResult<Self> {
        let path = Self::config_file()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::LoadError(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save configuration to the config directory
    pub fn save(&self) -> ConfigResult<()> {
        let path = Self::config_file()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::SaveError(e.to_string()))?;
        }

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SaveError(e.to_string()))?;
        std::fs::write(&path, contents).map_err(|e| ConfigError::SaveError(e.to_string()))
    }

    /// Get the configuration directory path
    pub fn config_dir() -> ConfigResult<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_ID))
            .ok_or(ConfigError::DirectoryError)
    }

    /// Get the configuration file path
    pub fn config_file() -> ConfigResult<PathBuf> {
        Self::config_dir().map(|p| p.join("config.json"))
    }
}
