//! Client configuration.
//!
//! Settings are read once at startup from a JSON file. Every field has a default, so the file
//! may set only what it needs, and a missing file means all defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "CHALICE_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Chalice".to_string(),
            width: 1280,
            height: 720,
            fullscreen: false,
            vsync: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub window: WindowConfig,
    pub asset_path: PathBuf,
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            asset_path: PathBuf::from(chalice_core::asset::DEFAULT_MODEL_PATH),
            log_level: "info".to_string(),
        }
    }
}

impl ClientConfig {
    pub fn from_json(s: &str) -> Result<Self, String> {
        serde_json::from_str(s).map_err(|e| e.to_string())
    }

    /// The config file to read: `$CHALICE_CONFIG`, else `chalice/config.json` in the user's
    /// config directory.
    pub fn default_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|dir| dir.join("chalice").join("config.json"))
    }

    /// Reads the config at `path`. A missing file yields the defaults; an unreadable or
    /// malformed one is reported and also yields the defaults.
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(config) => {
                    log::info!("Loaded config from {}", path.display());
                    config
                }
                Err(err) => {
                    log::warn!("Ignoring malformed config {}: {}", path.display(), err);
                    Self::default()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(err) => {
                log::warn!("Could not read config {}: {}", path.display(), err);
                Self::default()
            }
        }
    }

    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// The configured log level, falling back to `info` for unknown names.
    pub fn level_filter(&self) -> log::LevelFilter {
        self.log_level
            .parse()
            .unwrap_or(log::LevelFilter::Info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.window.height, 720);
        assert!(!config.window.fullscreen);
        assert_eq!(
            config.asset_path,
            PathBuf::from("assets/chalice-transformed.glb")
        );
        assert_eq!(config.level_filter(), log::LevelFilter::Info);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config =
            ClientConfig::from_json(r#"{ "window": { "width": 640 }, "log_level": "debug" }"#)
                .unwrap();
        assert_eq!(config.window.width, 640);
        assert_eq!(config.window.height, 720);
        assert_eq!(config.window.title, "Chalice");
        assert_eq!(config.level_filter(), log::LevelFilter::Debug);
    }

    #[test]
    fn test_unknown_level_falls_back() {
        let config = ClientConfig {
            log_level: "chatty".to_string(),
            ..ClientConfig::default()
        };
        assert_eq!(config.level_filter(), log::LevelFilter::Info);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(ClientConfig::from_json("{ window: 3").is_err());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = ClientConfig::load_from(Path::new("/definitely/not/here/config.json"));
        assert_eq!(config, ClientConfig::default());
    }
}
