//! Engine settings loaded from TOML
//!
//! Stored in ~/.config/tetrs-engine/settings.toml (or platform equivalent).
//! Settings are read once at process start and shared read-only by every
//! state the engine produces.

use crate::piece::Position;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading, validating or saving settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("could not determine config directory")]
    NoConfigDir,
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Engine settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Play-field dimensions
    pub grid: GridSettings,
    /// Pixel dimensions of the render surfaces
    pub viewport: ViewportSettings,
    /// Tick cadence and the level/speed curve
    pub timing: TimingSettings,
    /// Spawn points and the initial id/seed stream
    pub spawn: SpawnSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    pub width: i32,
    pub height: i32,
    /// Hidden rows above row 0
    pub buffer_rows: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportSettings {
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub preview_width: f32,
    pub preview_height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingSettings {
    /// Host cadence between two Tick actions
    pub tick_rate_ms: u64,
    /// Tick modulus at level 0
    pub initial_speed: u64,
    /// How much the modulus shrinks per level
    pub speed_step: u64,
    /// Lowest modulus the curve may reach
    pub min_speed: u64,
    /// Cleared rows needed per level
    pub lines_per_level: u32,
    /// Grace fall steps after ground contact
    pub land_delay: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnSettings {
    /// Center of a freshly promoted current shape
    pub current: Position,
    /// Center of the preview shape on the preview surface
    pub preview: Position,
    /// Center of the held shape on the store surface
    pub store: Position,
    pub initial_blocks_count: u64,
    pub initial_preview_seed: u64,
    pub initial_current_seed: u64,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            width: 10,
            height: 20,
            buffer_rows: 2,
        }
    }
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            canvas_width: 200.0,
            canvas_height: 400.0,
            preview_width: 160.0,
            preview_height: 80.0,
        }
    }
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            tick_rate_ms: 10,
            initial_speed: 150,
            speed_step: 20,
            min_speed: 10,
            lines_per_level: 5,
            land_delay: 2,
        }
    }
}

impl Default for SpawnSettings {
    fn default() -> Self {
        Self {
            current: Position::new(4, -1),
            preview: Position::new(3, 2),
            store: Position::new(3, 2),
            initial_blocks_count: 8,
            initial_preview_seed: 0,
            initial_current_seed: 4,
        }
    }
}

impl Settings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "tetrs", "tetrs-engine")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the default settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("settings.toml"))
    }

    /// Load settings from the default location, falling back to defaults
    /// when no file exists there
    pub fn load() -> Result<Self, SettingsError> {
        match Self::settings_path() {
            Some(path) if path.exists() => Self::from_path(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load and validate settings from an explicit file
    pub fn from_path(path: &Path) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Settings =
            toml::from_str(&contents).map_err(|source| SettingsError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to the default location
    pub fn save(&self) -> Result<PathBuf, SettingsError> {
        let dir = Self::config_dir().ok_or(SettingsError::NoConfigDir)?;
        fs::create_dir_all(&dir).map_err(|source| SettingsError::Io {
            path: dir.clone(),
            source,
        })?;

        let path = dir.join("settings.toml");
        let contents = toml::to_string_pretty(self)?;
        fs::write(&path, contents).map_err(|source| SettingsError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> SettingsError {
            SettingsError::Invalid {
                field,
                reason: reason.into(),
            }
        }

        if self.grid.width < 4 {
            return Err(invalid("grid.width", "must be at least 4 columns"));
        }
        if self.grid.height < 4 {
            return Err(invalid("grid.height", "must be at least 4 rows"));
        }
        if self.grid.buffer_rows < 1 {
            return Err(invalid("grid.buffer_rows", "needs at least one hidden row"));
        }
        if self.timing.min_speed == 0 {
            return Err(invalid("timing.min_speed", "must be positive"));
        }
        if self.timing.min_speed > self.timing.initial_speed {
            return Err(invalid(
                "timing.min_speed",
                format!("exceeds initial_speed {}", self.timing.initial_speed),
            ));
        }
        if self.timing.lines_per_level == 0 {
            return Err(invalid("timing.lines_per_level", "must be positive"));
        }
        if self.viewport.canvas_width <= 0.0 || self.viewport.canvas_height <= 0.0 {
            return Err(invalid("viewport", "canvas dimensions must be positive"));
        }
        Ok(())
    }

    /// Pixel width and height of a single block
    pub fn block_size(&self) -> (f32, f32) {
        (
            self.viewport.canvas_width / self.grid.width as f32,
            self.viewport.canvas_height / self.grid.height as f32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.block_size(), (20.0, 20.0));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [timing]
            initial_speed = 200

            [spawn]
            current = { x = 5, y = -1 }
            "#,
        )
        .unwrap();
        assert_eq!(settings.timing.initial_speed, 200);
        assert_eq!(settings.timing.speed_step, 20);
        assert_eq!(settings.spawn.current, Position::new(5, -1));
        assert_eq!(settings.grid, GridSettings::default());
    }

    #[test]
    fn test_toml_round_trip() {
        let settings = Settings::default();
        let text = toml::to_string_pretty(&settings).unwrap();
        let back: Settings = toml::from_str(&text).unwrap();
        assert_eq!(settings, back);
    }

    #[test]
    fn test_rejects_zero_speed_floor() {
        let mut settings = Settings::default();
        settings.timing.min_speed = 0;
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::Invalid {
                field: "timing.min_speed",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_narrow_grid() {
        let mut settings = Settings::default();
        settings.grid.width = 3;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_from_missing_path_is_io_error() {
        let err = Settings::from_path(Path::new("/nonexistent/tetrs/settings.toml")).unwrap_err();
        assert!(matches!(err, SettingsError::Io { .. }));
    }
}
