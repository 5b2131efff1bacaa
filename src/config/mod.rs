//! Configuration file management
//!
//! Loads TOML configuration files and provides bridge settings.
//! Default config path: ~/.config/seatbridge/config.toml

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::WHEEL_DELTA;

/// Bridge settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Event delivery settings
    pub dispatch: DispatchConfig,
    /// Text input (IME) settings
    pub ime: ImeConfig,
    /// Pointer settings
    pub pointer: PointerConfig,
}

/// Event delivery settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Queue events emitted before the outbound channel is bound
    /// (false = drop them) and flush them in order on binding
    pub buffer_before_bind: bool,
    /// Most events held while waiting for the channel; later ones are
    /// dropped until it is bound
    pub max_buffered: usize,
    /// Name of the delivery thread
    pub thread_name: String,
}

/// What to do when the IME delivers text with no window to tag it with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingWindowPolicy {
    /// Fatal: protocol and local state are out of sync
    Abort,
    /// Log and drop the text
    Ignore,
}

impl Default for MissingWindowPolicy {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            MissingWindowPolicy::Abort
        } else {
            MissingWindowPolicy::Ignore
        }
    }
}

/// Text input (IME) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImeConfig {
    /// Create a text-input client when the compositor offers one
    pub enabled: bool,
    /// "abort" | "ignore"
    pub missing_window: MissingWindowPolicy,
}

/// Pointer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PointerConfig {
    /// Offset reported per scroll step
    pub wheel_delta: i32,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            buffer_before_bind: false,
            max_buffered: 1024,
            thread_name: "seatbridge-ipc".to_string(),
        }
    }
}

impl Default for ImeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            missing_window: MissingWindowPolicy::default(),
        }
    }
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            wheel_delta: WHEEL_DELTA,
        }
    }
}

impl Config {
    /// System-wide config path
    const SYSTEM_CONFIG_PATH: &'static str = "/etc/seatbridge/config.toml";

    /// Get the path that would be used for loading config
    /// Returns None if using built-in defaults
    pub fn config_path() -> Option<PathBuf> {
        // 1. SEATBRIDGE_CONFIG environment variable
        if let Ok(path) = std::env::var("SEATBRIDGE_CONFIG") {
            let p = Path::new(&path);
            if p.exists() {
                return Some(p.to_path_buf());
            }
        }

        // 2. User config: ~/.config/seatbridge/config.toml
        if let Some(config_path) = default_config_path() {
            if config_path.exists() {
                return Some(config_path);
            }
        }

        // 3. System config: /etc/seatbridge/config.toml
        let system_config = Path::new(Self::SYSTEM_CONFIG_PATH);
        if system_config.exists() {
            return Some(system_config.to_path_buf());
        }

        None
    }

    /// Load configuration with priority:
    /// 1. SEATBRIDGE_CONFIG environment variable
    /// 2. ~/.config/seatbridge/config.toml (user config)
    /// 3. /etc/seatbridge/config.toml (system config)
    /// 4. Built-in defaults
    pub fn load() -> Self {
        if let Some(path) = Self::config_path() {
            match Self::load_from_file(&path) {
                Ok(config) => {
                    info!("Loaded config: {}", path.display());
                    return config;
                }
                Err(e) => {
                    warn!("Failed to load config {}: {:#}", path.display(), e);
                }
            }
        }
        info!("Using built-in default config");
        Self::default()
    }

    /// Load settings from specified path
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        if config.pointer.wheel_delta <= 0 {
            anyhow::bail!(
                "pointer.wheel_delta must be positive (got {})",
                config.pointer.wheel_delta
            );
        }
        Ok(config)
    }
}

/// Get default config file path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("seatbridge").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(!config.dispatch.buffer_before_bind);
        assert_eq!(config.dispatch.max_buffered, 1024);
        assert_eq!(config.dispatch.thread_name, "seatbridge-ipc");
        assert!(config.ime.enabled);
        assert_eq!(config.pointer.wheel_delta, 120);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::parse(
            r#"
            [dispatch]
            buffer_before_bind = true

            [ime]
            missing_window = "ignore"
            "#,
        )
        .unwrap();
        assert!(config.dispatch.buffer_before_bind);
        assert_eq!(config.dispatch.thread_name, "seatbridge-ipc");
        assert!(config.ime.enabled);
        assert_eq!(config.ime.missing_window, MissingWindowPolicy::Ignore);
        assert_eq!(config.pointer.wheel_delta, 120);
    }

    #[test]
    fn test_empty_file() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.pointer.wheel_delta, 120);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(Config::parse("[ime]\nmissing_window = \"explode\"\n").is_err());
        assert!(Config::parse("[pointer]\nwheel_delta = 0\n").is_err());
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = Config::load_from_file(Path::new("/nonexistent/seatbridge.toml")).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to read config file"));
    }

    #[test]
    fn test_default_config_path() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("seatbridge/config.toml"));
        }
    }
}
