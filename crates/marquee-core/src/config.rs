use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::MarqueeError;

const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

/// Environment variable holding the upstream TMDB credential.
///
/// Only the proxy reads it; it is never written to the config file.
pub const API_KEY_ENV: &str = "TMDB_API_KEY";

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub proxy: ProxyConfig,
    pub client: ClientConfig,
}

/// Settings for the `marquee-proxy` server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Socket address the proxy listens on.
    pub bind: String,
    /// Base URL of the upstream movie metadata API.
    pub upstream_url: String,
    /// Language tag forwarded upstream.
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL the client uses to reach the proxy routes.
    pub proxy_url: String,
}

impl AppConfig {
    /// Load config: user file (if exists) merged over built-in defaults.
    pub fn load() -> Result<Self, MarqueeError> {
        let user_path = Self::config_path();
        if user_path.exists() {
            Self::from_path(&user_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse a config file; sections missing from it keep their defaults.
    pub fn from_path(path: &Path) -> Result<Self, MarqueeError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| MarqueeError::Config(e.to_string()))?;
        toml::from_str(&content).map_err(|e| MarqueeError::Config(e.to_string()))
    }

    /// Save current config to the user config file.
    pub fn save(&self) -> Result<(), MarqueeError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), MarqueeError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| MarqueeError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Path to user config file (XDG on Linux, AppData on Windows).
    pub fn config_path() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Path to the database file holding persisted favorites.
    pub fn db_path() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.data_dir().join("marquee.db"))
            .unwrap_or_else(|| PathBuf::from("marquee.db"))
    }

    /// Ensure the data directory exists and return the DB path.
    pub fn ensure_db_path() -> Result<PathBuf, MarqueeError> {
        let path = Self::db_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(path)
    }

    /// Directory for rolling log files.
    pub fn log_dir() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.data_dir().join("logs"))
            .unwrap_or_else(|| PathBuf::from("logs"))
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "marquee")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("built-in default config is valid TOML")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config = AppConfig::default();
        assert_eq!(config.proxy.bind, "127.0.0.1:3000");
        assert_eq!(config.proxy.upstream_url, "https://api.themoviedb.org/3");
        assert_eq!(config.proxy.language, "en-US");
        assert_eq!(config.client.proxy_url, "http://127.0.0.1:3000/api/tmdb");
    }

    #[test]
    fn test_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config.proxy.bind = "0.0.0.0:8080".into();
        config.save_to(&path).unwrap();

        let loaded = AppConfig::from_path(&path).unwrap();
        assert_eq!(loaded.proxy.bind, "0.0.0.0:8080");
        assert_eq!(loaded.client.proxy_url, config.client.proxy_url);
    }

    #[test]
    fn test_missing_section_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[client]\nproxy_url = \"http://example.test/api/tmdb\"\n").unwrap();

        let loaded = AppConfig::from_path(&path).unwrap();
        assert_eq!(loaded.client.proxy_url, "http://example.test/api/tmdb");
        assert_eq!(loaded.proxy.language, "en-US");
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not = [valid").unwrap();

        assert!(matches!(
            AppConfig::from_path(&path),
            Err(MarqueeError::Config(_))
        ));
    }
}
