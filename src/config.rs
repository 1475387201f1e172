use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

const DOCUMENTATION: &str = r#"# Sketch Studio settings. Formatting and comments are not preserved when
# the application rewrites this file.
#
# `api_key_env` names the environment variable holding the generation API key;
# the key itself is never stored here.

"#;

/// `<preference dir>/sketch_studio`
#[must_use]
pub fn preferences_dir() -> Option<PathBuf> {
    let mut base_dir = dirs::preference_dir()?;
    base_dir.push(env!("CARGO_PKG_NAME"));
    Some(base_dir)
}

/// `<data dir>/sketch_studio`
#[must_use]
pub fn data_dir() -> Option<PathBuf> {
    let mut base_dir = dirs::data_dir()?;
    base_dir.push(env!("CARGO_PKG_NAME"));
    Some(base_dir)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub model: String,
    /// Model for prompt variations and grammar checks
    pub text_model: String,
    pub api_endpoint: String,
    pub api_key_env: String,
    pub snap_to_grid: bool,
    pub snap_to_objects: bool,
    pub perspective_line_count: usize,
    pub perspective_spread: f32,
    pub show_guides: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            canvas_width: 1024,
            canvas_height: 768,
            model: "gemini-2.5-flash-image".to_string(),
            text_model: "gemini-2.5-flash".to_string(),
            api_endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key_env: "API_KEY".to_string(),
            snap_to_grid: true,
            snap_to_objects: true,
            perspective_line_count: 8,
            perspective_spread: 1.5,
            show_guides: true,
        }
    }
}

impl AppConfig {
    const FILENAME: &'static str = "config.toml";

    pub fn default_path() -> Option<PathBuf> {
        preferences_dir().map(|dir| dir.join(Self::FILENAME))
    }

    pub fn from_toml(text: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn to_toml(&self) -> ConfigResult<String> {
        Ok(DOCUMENTATION.to_owned() + &toml::ser::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> ConfigResult<Self> {
        Self::from_toml(&std::fs::read_to_string(path)?)
    }

    /// Reads the config at the default location, falling back to defaults
    #[must_use]
    pub fn load_or_default() -> Self {
        let Some(path) = Self::default_path() else {
            log::warn!("No preferences directory, using default settings");
            return Self::default();
        };
        match Self::load(&path) {
            Ok(config) => config,
            Err(ConfigError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(err) => {
                log::warn!("Could not read {}: {err}; using defaults", path.display());
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn save(&self) -> ConfigResult<()> {
        let path = Self::default_path().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&path)?;
        log::info!("Saved settings to {}", path.display());
        Ok(())
    }
}
