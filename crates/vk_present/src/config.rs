//! Presentation configuration
//!
//! Construction-time settings for windows and the frame ring, with builder
//! methods, validation, and TOML file loading. The frames-in-flight bound is
//! threaded explicitly from here through the window and into anything that
//! sizes pools from it; there is no hidden global.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration loading and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Reading the configuration file failed
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing the configuration file failed
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration contents are invalid
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Window construction parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Window width in logical (screen) units
    pub width: u32,
    /// Window height in logical (screen) units
    pub height: u32,
    /// Window title
    pub title: String,
    /// Whether the user may resize the window
    pub resizable: bool,
    /// Whether the swapchain carries a depth attachment
    pub needs_depth: bool,
    /// Whether the depth attachment must include a stencil component
    /// (implies a depth/stencil attachment even if `needs_depth` is unset)
    pub needs_stencil: bool,
}

impl WindowConfig {
    /// Create a window configuration with the given title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            width: 800,
            height: 600,
            title: title.into(),
            resizable: true,
            needs_depth: false,
            needs_stencil: false,
        }
    }

    /// Set the initial window size
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Enable or disable user resizing
    pub fn with_resizable(mut self, resizable: bool) -> Self {
        self.resizable = resizable;
        self
    }

    /// Request a depth attachment
    pub fn with_depth(mut self, enabled: bool) -> Self {
        self.needs_depth = enabled;
        self
    }

    /// Request a stencil component on the depth attachment
    pub fn with_stencil(mut self, enabled: bool) -> Self {
        self.needs_stencil = enabled;
        self
    }

    /// Validate the window parameters
    pub fn validate(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err("Window dimensions must be nonzero".to_string());
        }

        if self.title.is_empty() {
            return Err("Window title cannot be empty".to_string());
        }

        Ok(())
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self::new("vk_present application")
    }
}

/// Presentation layer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenterConfig {
    /// Maximum frames the CPU may have in flight
    ///
    /// Bounds CPU/GPU divergence and sizes the frame ring; raising it trades
    /// latency for throughput. Any pool whose capacity derives from frame
    /// count must use this same value.
    pub max_frames_in_flight: usize,
    /// Window construction parameters
    pub window: WindowConfig,
}

impl PresenterConfig {
    /// Create a configuration with the default frame bound
    pub fn new(window: WindowConfig) -> Self {
        Self {
            max_frames_in_flight: 2,
            window,
        }
    }

    /// Set the maximum frames in flight
    pub fn with_max_frames_in_flight(mut self, frames: usize) -> Self {
        self.max_frames_in_flight = frames;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_frames_in_flight == 0 {
            return Err("Max frames in flight must be at least 1".to_string());
        }

        if self.max_frames_in_flight > 8 {
            return Err(
                "Max frames in flight should not exceed 8 for latency reasons".to_string(),
            );
        }

        self.window.validate()?;

        Ok(())
    }

    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    /// Load and validate a configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

impl Default for PresenterConfig {
    fn default() -> Self {
        Self::new(WindowConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = PresenterConfig::default();
        assert_eq!(config.max_frames_in_flight, 2);
        assert_eq!((config.window.width, config.window.height), (800, 600));
        assert!(!config.window.needs_depth);
        assert!(!config.window.needs_stencil);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn frame_bound_is_validated() {
        let config = PresenterConfig::default().with_max_frames_in_flight(0);
        assert!(config.validate().is_err());

        let config = PresenterConfig::default().with_max_frames_in_flight(9);
        assert!(config.validate().is_err());

        for frames in 1..=8 {
            let config = PresenterConfig::default().with_max_frames_in_flight(frames);
            assert!(config.validate().is_ok());
        }
    }

    #[test]
    fn zero_extent_window_is_rejected() {
        let config = PresenterConfig::new(WindowConfig::new("test").with_size(0, 600));
        assert!(config.validate().is_err());
    }

    #[test]
    fn builder_sets_depth_and_stencil() {
        let window = WindowConfig::new("deferred")
            .with_size(1280, 720)
            .with_depth(true)
            .with_stencil(true)
            .with_resizable(false);

        assert!(window.needs_depth);
        assert!(window.needs_stencil);
        assert!(!window.resizable);
        assert_eq!((window.width, window.height), (1280, 720));
    }

    #[test]
    fn parses_from_toml() {
        let text = r#"
            max_frames_in_flight = 3

            [window]
            width = 1024
            height = 768
            title = "viewer"
            resizable = true
            needs_depth = true
            needs_stencil = false
        "#;

        let config = PresenterConfig::from_toml_str(text).unwrap();
        assert_eq!(config.max_frames_in_flight, 3);
        assert_eq!(config.window.title, "viewer");
        assert!(config.window.needs_depth);
    }

    #[test]
    fn invalid_toml_values_are_rejected() {
        let text = r#"
            max_frames_in_flight = 0

            [window]
            width = 1024
            height = 768
            title = "viewer"
            resizable = true
            needs_depth = false
            needs_stencil = false
        "#;

        assert!(matches!(
            PresenterConfig::from_toml_str(text),
            Err(ConfigError::Invalid(_))
        ));
    }
}
