use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::model::Coordinates;

pub const DEFAULT_WEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_API_KEY_ENV: &str = "OPENWEATHER_API_KEY";
pub const DEFAULT_GEONAMES_BASE_URL: &str = "http://api.geonames.org";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Weather provider settings. The key itself never lives in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherSettings {
    pub base_url: String,

    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_WEATHER_BASE_URL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeonamesSettings {
    pub base_url: String,
    pub username: String,
}

impl Default for GeonamesSettings {
    fn default() -> Self {
        Self { base_url: DEFAULT_GEONAMES_BASE_URL.to_string(), username: String::new() }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// request_timeout_secs = 15
///
/// [weather]
/// api_key_env = "OPENWEATHER_API_KEY"
///
/// [geonames]
/// username = "demo"
///
/// [location]
/// latitude = 51.5
/// longitude = -0.12
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub request_timeout_secs: u64,
    pub weather: WeatherSettings,
    pub geonames: GeonamesSettings,

    /// Fixed position for hosts without a location service.
    pub location: Option<Coordinates>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            weather: WeatherSettings::default(),
            geonames: GeonamesSettings::default(),
            location: None,
        }
    }
}

impl Config {
    /// Per-request timeout applied to every gateway call.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Read the weather API key from the configured environment variable.
    ///
    /// A missing key is not an error here; the provider rejects the request
    /// and the failure shows up as a weather error.
    pub fn weather_api_key(&self) -> String {
        std::env::var(&self.weather.api_key_env).unwrap_or_default()
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Failed to parse configuration TOML")
    }

    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(path)
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "vane", "vane")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let cfg = Config::from_toml("").expect("empty config must parse");
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.weather.base_url, DEFAULT_WEATHER_BASE_URL);
        assert_eq!(cfg.request_timeout(), Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS));
        assert!(cfg.location.is_none());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = Config::from_toml(
            r#"
            request_timeout_secs = 3

            [geonames]
            username = "alice"

            [location]
            latitude = 51.5
            longitude = -0.12
            "#,
        )
        .expect("config must parse");

        assert_eq!(cfg.request_timeout(), Duration::from_secs(3));
        assert_eq!(cfg.geonames.username, "alice");
        assert_eq!(cfg.geonames.base_url, DEFAULT_GEONAMES_BASE_URL);
        assert_eq!(cfg.weather.api_key_env, DEFAULT_API_KEY_ENV);
        assert_eq!(cfg.location, Some(Coordinates::new(51.5, -0.12)));
    }

    #[test]
    fn zero_timeout_is_clamped() {
        let cfg = Config { request_timeout_secs: 0, ..Config::default() };
        assert_eq!(cfg.request_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn missing_api_key_env_yields_empty_key() {
        let mut cfg = Config::default();
        cfg.weather.api_key_env = "VANE_TEST_KEY_THAT_IS_NEVER_SET".into();
        assert_eq!(cfg.weather_api_key(), "");
    }

    #[test]
    fn toml_roundtrip_preserves_location() {
        let cfg = Config { location: Some(Coordinates::new(48.85, 2.35)), ..Config::default() };
        let text = toml::to_string_pretty(&cfg).expect("serialize");
        let back = Config::from_toml(&text).expect("parse");
        assert_eq!(back, cfg);
    }
}
