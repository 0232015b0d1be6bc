use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use walkthrough_input::KeyBindings;

/// Per-frame motion constants. There is no delta-time scaling: every tick
/// moves by `speed` and turns by the turn rate regardless of frame timing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    /// World units per frame.
    pub speed: f32,
    /// Radians per frame. Defaults to `speed / π` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turn_rate: Option<f32>,
    /// A probe hit strictly closer than this cancels the frame's movement.
    pub clearance: f32,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            speed: 0.1,
            turn_rate: None,
            clearance: 0.1,
        }
    }
}

impl NavConfig {
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_turn_rate(mut self, turn_rate: f32) -> Self {
        self.turn_rate = Some(turn_rate);
        self
    }

    pub fn with_clearance(mut self, clearance: f32) -> Self {
        self.clearance = clearance;
        self
    }

    /// Effective turn rate in radians per frame.
    pub fn turn_rate(&self) -> f32 {
        self.turn_rate.unwrap_or(self.speed / std::f32::consts::PI)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let check = |field: &'static str, value: f32| {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid { field, value })
            }
        };
        check("speed", self.speed)?;
        check("turn_rate", self.turn_rate())?;
        check("clearance", self.clearance)
    }
}

/// Errors from loading settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("settings parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("`{field}` must be finite and non-negative, got {value}")]
    Invalid { field: &'static str, value: f32 },
}

/// Settings file contents:
///
/// ```yaml
/// navigation:
///   speed: 0.1
///   clearance: 0.1
/// bindings:
///   w: forward
///   ArrowLeft: turn-left
/// ```
///
/// A `bindings` table replaces the default bindings entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub navigation: NavConfig,
    pub bindings: KeyBindings,
}

impl Settings {
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_yaml::from_str(text)?;
        settings.navigation.validate()?;
        Ok(settings)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_yaml(&text)?;
        tracing::info!(
            path = %path.display(),
            speed = settings.navigation.speed,
            turn_rate = settings.navigation.turn_rate(),
            clearance = settings.navigation.clearance,
            bindings = settings.bindings.len(),
            "settings loaded"
        );
        Ok(settings)
    }
}
