//! Session configuration
//!
//! Loaded from JSON. Every field has a default, so `{}` is a valid file.

use crate::render::{Rgba, StrokeStyle};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionConfig {
    /// Outline color, `#rrggbb` or `#rrggbbaa`
    pub highlight_color: Rgba,
    /// Outline width in pixels
    pub line_width: f32,
    /// Display frames per second when the host has no frame callback
    pub frame_rate: f64,
    /// Where playback restarts before the tracker is seeded
    pub seek_position_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            highlight_color: Rgba::YELLOW,
            line_width: 2.0,
            frame_rate: 60.0,
            seek_position_ms: 0,
        }
    }
}

impl SessionConfig {
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_json(&content)?;
        tracing::debug!("Loaded session config from {:?}", path);
        Ok(config)
    }

    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.stroke_style()?;
        if !self.frame_rate.is_finite() || self.frame_rate <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "frameRate must be positive, got {}",
                self.frame_rate
            )));
        }
        Ok(())
    }

    pub fn stroke_style(&self) -> ConfigResult<StrokeStyle> {
        StrokeStyle::new(self.highlight_color, self.line_width).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn seek_position(&self) -> Duration {
        Duration::from_millis(self.seek_position_ms)
    }
}
