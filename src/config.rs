//! Configuration file support for envi-view.
//!
//! Preferences are read from a JSON file in the user's config directory. A
//! missing or broken file is never fatal: defaults are used instead.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_RGB_WAVELENGTHS, DEFAULT_WINDOW_SIZE};

/// Verbosity of the `log` output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    /// Problems that do not stop the run, such as ignored header entries
    #[default]
    Warn,
    /// File access and export progress
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Config files with a higher version are rejected.
pub const CONFIG_VERSION: u32 = 1;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub version: u32,

    #[serde(default)]
    pub preferences: UserPreferences,

    #[serde(default)]
    pub viewer: ViewerConfig,
}

/// User preferences section of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    /// Log verbosity level (`RUST_LOG` overrides it)
    #[serde(default)]
    pub log_level: LogLevel,

    /// Wait for Enter before exiting after a message
    #[serde(default = "default_pause_on_exit")]
    pub pause_on_exit: bool,
}

fn default_pause_on_exit() -> bool {
    true
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            pause_on_exit: default_pause_on_exit(),
        }
    }
}

/// Viewer section of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Wavelengths (nm) shown as red, green and blue in the preview
    #[serde(default = "default_rgb_wavelengths")]
    pub rgb_wavelengths: [f64; 3],

    /// Initial window size in logical pixels
    #[serde(default = "default_window_size")]
    pub window_size: [f32; 2],
}

fn default_rgb_wavelengths() -> [f64; 3] {
    DEFAULT_RGB_WAVELENGTHS
}

fn default_window_size() -> [f32; 2] {
    DEFAULT_WINDOW_SIZE
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            rgb_wavelengths: default_rgb_wavelengths(),
            window_size: default_window_size(),
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            preferences: UserPreferences::default(),
            viewer: ViewerConfig::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        Ok(config)
    }

    /// File name inside the `envi-view` config directory.
    pub fn default_filename() -> &'static str {
        "envi-view-config.json"
    }

    /// `<config dir>/envi-view/envi-view-config.json`, falling back to
    /// `~/.config` when the platform has no config directory.
    pub fn default_path() -> Option<std::path::PathBuf> {
        dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .map(|dir| dir.join("envi-view").join(Self::default_filename()))
    }

    /// Load configuration from `path`.
    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load the config file if there is a readable one.
    ///
    /// Runs before the logger is installed, so problems go to stderr.
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            return None;
        }

        match Self::load_from(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                eprintln!("Ignoring config file {:?}: {}", path, e);
                None
            }
        }
    }

    /// Save configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = self.to_json()?;
        std::fs::write(path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Why a config file could not be used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Configuration version {file_version} is not supported (latest is {supported_version})")]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    #[error("Could not access configuration: {0}")]
    IoError(#[from] std::io::Error),
}
