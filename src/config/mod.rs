//! Client configuration.
//!
//! `ClientSettings` is read once at startup from `config/settings.json`.
//! Only connection and window settings live here; session state (assets,
//! parameters, results) is never persisted.
//!
//! # Resolution order
//!
//! 1. Built-in defaults
//! 2. `config/settings.json` (missing file is fine, broken file falls back to defaults)
//! 3. `SCANCAM_BACKEND_URL` environment variable overrides `backend_url`

use std::path::Path;

use crate::error::ConfigError;

/// Default location of the settings file, relative to the working directory
pub const SETTINGS_PATH: &str = "config/settings.json";

/// Environment override for the backend origin
pub const BACKEND_URL_ENV: &str = "SCANCAM_BACKEND_URL";

/// Startup settings for the desktop client
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Origin of the analysis backend (no trailing slash needed)
    pub backend_url: String,
    pub window_width: f32,
    pub window_height: f32,
    /// Lower the log level to Debug
    pub debug_logging: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        ClientSettings {
            backend_url: "http://127.0.0.1:8000".to_string(),
            window_width: 1200.0,
            window_height: 800.0,
            debug_logging: false,
        }
    }
}

impl ClientSettings {
    pub fn log_level(&self) -> log::LevelFilter {
        if self.debug_logging {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        }
    }
}

/// Loader for `ClientSettings`
pub struct SettingsManager;

impl SettingsManager {
    /// Load settings from `config/settings.json` and apply the environment override.
    ///
    /// ERROR HANDLING: a malformed file logs a warning and yields defaults
    /// instead of aborting startup.
    pub fn load() -> ClientSettings {
        let mut settings = match Self::load_from(Path::new(SETTINGS_PATH)) {
            Ok(settings) => settings,
            Err(e) => {
                eprintln!("[Config] [WARNING] Failed to read {}, falling back to defaults: {}", SETTINGS_PATH, e);
                ClientSettings::default()
            }
        };
        Self::apply_env_override(&mut settings, std::env::var(BACKEND_URL_ENV).ok());
        settings
    }

    /// Parse a settings file. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<ClientSettings, ConfigError> {
        if !path.exists() {
            return Ok(ClientSettings::default());
        }
        let content = std::fs::read_to_string(path)?;
        let settings = serde_json::from_str::<ClientSettings>(&content)?;
        Ok(settings)
    }

    fn apply_env_override(settings: &mut ClientSettings, value: Option<String>) {
        if let Some(url) = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
            eprintln!("[Config] Backend URL overridden by {}: {}", BACKEND_URL_ENV, url);
            settings.backend_url = url;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = ClientSettings::default();
        assert_eq!(s.backend_url, "http://127.0.0.1:8000");
        assert_eq!(s.log_level(), log::LevelFilter::Info);
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let s = SettingsManager::load_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(s, ClientSettings::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"backend_url":"http://10.0.0.2:9000","debug_logging":true}"#).unwrap();

        let s = SettingsManager::load_from(&path).unwrap();
        assert_eq!(s.backend_url, "http://10.0.0.2:9000");
        assert_eq!(s.window_width, 1200.0);
        assert_eq!(s.log_level(), log::LevelFilter::Debug);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            SettingsManager::load_from(&path),
            Err(ConfigError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_env_override() {
        let mut s = ClientSettings::default();
        SettingsManager::apply_env_override(&mut s, Some("  ".to_string()));
        assert_eq!(s.backend_url, "http://127.0.0.1:8000");

        SettingsManager::apply_env_override(&mut s, Some("http://gpu-box:8000".to_string()));
        assert_eq!(s.backend_url, "http://gpu-box:8000");
    }
}
