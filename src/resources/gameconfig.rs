//! Game configuration resource.
//!
//! Manages settings loaded from an INI configuration file. Provides defaults
//! for safe startup and methods to load/save configuration.
//!
//! # Configuration File Format
//!
//! ```ini
//! [window]
//! width = 800
//! height = 600
//! target_fps = 60
//!
//! [transition]
//! duration = 0.3
//! easing = expo_in_out
//! properties = {"alpha": 0}
//! ```
//!
//! The `[transition]` section is turned into
//! [`TransitionOptions`](crate::resources::transition::TransitionOptions);
//! absent keys leave the controller's settings untouched.

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::{info, warn};
use std::path::PathBuf;

use crate::components::tween::Easing;
use crate::resources::transition::{PropertyMap, TransitionOptions};

/// Default safe values for startup
const DEFAULT_WINDOW_WIDTH: u32 = 800;
const DEFAULT_WINDOW_HEIGHT: u32 = 600;
const DEFAULT_TARGET_FPS: u32 = 60;
const DEFAULT_CONFIG_PATH: &str = "./config.ini";

/// Game configuration resource.
#[derive(Resource, Debug, Clone)]
pub struct GameConfig {
    /// Window (and viewport) width in pixels.
    pub window_width: u32,
    /// Window (and viewport) height in pixels.
    pub window_height: u32,
    /// Target frames per second.
    pub target_fps: u32,
    /// Overrides for the transition settings.
    pub transition: TransitionOptions,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GameConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            window_width: DEFAULT_WINDOW_WIDTH,
            window_height: DEFAULT_WINDOW_HEIGHT,
            target_fps: DEFAULT_TARGET_FPS,
            transition: TransitionOptions::default(),
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current (default) values. Malformed
    /// transition values are skipped with a warning.
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;

        // [window] section
        if let Some(width) = config.getuint("window", "width").ok().flatten() {
            self.window_width = window_dimension(width);
        }
        if let Some(height) = config.getuint("window", "height").ok().flatten() {
            self.window_height = window_dimension(height);
        }
        if let Some(fps) = config.getuint("window", "target_fps").ok().flatten() {
            self.target_fps = u32::try_from(fps).unwrap_or(u32::MAX);
        }

        // [transition] section
        if let Some(duration) = config.getfloat("transition", "duration").ok().flatten() {
            self.transition.duration = Some(duration as f32);
        }
        if let Some(name) = config.get("transition", "easing") {
            match name.parse::<Easing>() {
                Ok(easing) => self.transition.easing = Some(easing),
                Err(e) => warn!("Ignoring [transition] easing: {}", e),
            }
        }
        if let Some(json) = config.get("transition", "properties") {
            match serde_json::from_str::<PropertyMap>(&json) {
                Ok(properties) => self.transition.properties = Some(properties),
                Err(e) => warn!("Ignoring [transition] properties: {}", e),
            }
        }

        info!(
            "Loaded config: {}x{} window, fps={}, transition={:?}",
            self.window_width, self.window_height, self.target_fps, self.transition
        );

        Ok(())
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist. Only transition overrides that
    /// are set are written.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new();

        config.set("window", "width", Some(self.window_width.to_string()));
        config.set("window", "height", Some(self.window_height.to_string()));
        config.set("window", "target_fps", Some(self.target_fps.to_string()));

        if let Some(duration) = self.transition.duration {
            config.set("transition", "duration", Some(duration.to_string()));
        }
        if let Some(easing) = self.transition.easing {
            config.set("transition", "easing", Some(easing.to_string()));
        }
        if let Some(properties) = &self.transition.properties {
            let json = serde_json::to_string(properties)
                .map_err(|e| format!("Failed to encode transition properties: {}", e))?;
            config.set("transition", "properties", Some(json));
        }

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }

    /// Get the window size, at least 1x1.
    pub fn window_size(&self) -> (u32, u32) {
        (
            window_dimension(self.window_width as u64),
            window_dimension(self.window_height as u64),
        )
    }
}

/// Window sizes are kept within `1..=i32::MAX` so they fit raylib's `i32`.
fn window_dimension(value: u64) -> u32 {
    value.clamp(1, i32::MAX as u64) as u32
}
