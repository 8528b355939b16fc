use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::source::{SourceKind, live::DEFAULT_TIMEOUT, mock::DEFAULT_MOCK_DELAY};

/// Environment variable that overrides the stored live API key.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

pub const DEFAULT_CITY: &str = "London";

/// Settings for the OpenWeather-backed source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveConfig {
    pub api_key: String,

    /// Overrides the OpenWeather current-weather URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// Settings for the offline demo source.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MockConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_ms: Option<u64>,
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// default_source = "live"
/// default_city = "Paris"
///
/// [live]
/// api_key = "..."
/// timeout_secs = 5
///
/// [mock]
/// delay_ms = 250
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// "mock" or "live"; mock when absent.
    pub default_source: Option<String>,

    /// City looked up on start-up.
    pub default_city: Option<String>,

    pub live: Option<LiveConfig>,

    #[serde(default)]
    pub mock: MockConfig,

    /// Key taken from `OPENWEATHER_API_KEY`; never written back to disk.
    #[serde(skip)]
    env_api_key: Option<String>,
}

impl Config {
    /// Return the default source as a strongly-typed SourceKind.
    pub fn source_kind(&self) -> Result<SourceKind> {
        match self.default_source.as_deref() {
            Some(s) => SourceKind::try_from(s),
            None => Ok(SourceKind::default()),
        }
    }

    pub fn set_default_source(&mut self, kind: SourceKind) {
        self.default_source = Some(kind.as_str().to_string());
    }

    pub fn default_city(&self) -> &str {
        self.default_city.as_deref().filter(|c| !c.trim().is_empty()).unwrap_or(DEFAULT_CITY)
    }

    /// Set/replace the live API key; makes live the default if nothing else is.
    /// Blank keys are ignored.
    pub fn upsert_live_api_key(&mut self, api_key: String) {
        let api_key = api_key.trim().to_string();
        if api_key.is_empty() {
            return;
        }

        match self.live.as_mut() {
            Some(live) => live.api_key = api_key,
            None => {
                self.live = Some(LiveConfig { api_key, endpoint: None, timeout_secs: None });
            }
        }

        if self.default_source.is_none() {
            self.set_default_source(SourceKind::Live);
        }
    }

    /// The environment key if set, otherwise the stored one.
    pub fn live_api_key(&self) -> Option<&str> {
        self.env_api_key
            .as_deref()
            .or_else(|| self.live.as_ref().map(|live| live.api_key.as_str()))
            .filter(|key| !key.is_empty())
    }

    pub fn live_endpoint(&self) -> Option<&str> {
        self.live.as_ref().and_then(|live| live.endpoint.as_deref())
    }

    pub fn live_timeout(&self) -> Duration {
        self.live
            .as_ref()
            .and_then(|live| live.timeout_secs)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT)
    }

    pub fn mock_delay(&self) -> Duration {
        self.mock.delay_ms.map(Duration::from_millis).unwrap_or(DEFAULT_MOCK_DELAY)
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    /// `OPENWEATHER_API_KEY` wins over the stored key.
    pub fn load() -> Result<Self> {
        let mut cfg = Self::load_from(&Self::config_file_path()?)?;
        cfg.set_env_api_key(std::env::var(API_KEY_ENV).ok());
        Ok(cfg)
    }

    /// Read the file at `path` as-is, without environment overrides.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    fn set_env_api_key(&mut self, key: Option<String>) {
        self.env_api_key = key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty());
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-lookup", "weather-lookup")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_mock_and_london() {
        let cfg = Config::default();

        assert_eq!(cfg.source_kind().unwrap(), SourceKind::Mock);
        assert_eq!(cfg.default_city(), "London");
        assert_eq!(cfg.mock_delay(), Duration::from_millis(1000));
        assert_eq!(cfg.live_timeout(), Duration::from_secs(10));
        assert!(cfg.live_api_key().is_none());
    }

    #[test]
    fn unknown_default_source_errors() {
        let cfg = Config { default_source: Some("carrier-pigeon".into()), ..Config::default() };
        let err = cfg.source_kind().unwrap_err();

        assert!(err.to_string().contains("Unknown data source"));
    }

    #[test]
    fn upsert_sets_key_and_default_source() {
        let mut cfg = Config::default();

        cfg.upsert_live_api_key("OPEN_KEY".into());

        assert_eq!(cfg.source_kind().unwrap(), SourceKind::Live);
        assert_eq!(cfg.live_api_key(), Some("OPEN_KEY"));
    }

    #[test]
    fn upsert_does_not_override_existing_default() {
        let mut cfg = Config::default();
        cfg.set_default_source(SourceKind::Mock);

        cfg.upsert_live_api_key("OPEN_KEY".into());

        assert_eq!(cfg.source_kind().unwrap(), SourceKind::Mock);
        assert_eq!(cfg.live_api_key(), Some("OPEN_KEY"));
    }

    #[test]
    fn env_key_overrides_stored_key() {
        let mut cfg = Config::default();
        cfg.upsert_live_api_key("FILE_KEY".into());

        cfg.set_env_api_key(Some("ENV_KEY".into()));
        assert_eq!(cfg.live_api_key(), Some("ENV_KEY"));

        cfg.set_env_api_key(Some("  ".into()));
        assert_eq!(cfg.live_api_key(), Some("FILE_KEY"));

        cfg.set_env_api_key(None);
        assert_eq!(cfg.live_api_key(), Some("FILE_KEY"));
    }

    #[test]
    fn env_key_alone_enables_live_without_touching_live_table() {
        let mut cfg = Config::default();
        cfg.set_env_api_key(Some("ENV_KEY".into()));

        assert_eq!(cfg.live_api_key(), Some("ENV_KEY"));
        assert!(cfg.live.is_none());
    }

    #[test]
    fn env_key_is_never_saved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weather-lookup").join("config.toml");

        let mut cfg = Config::load_from(&path).unwrap();
        cfg.set_env_api_key(Some("SECRET_FROM_ENV".into()));
        cfg.mock.delay_ms = Some(250);
        cfg.save_to(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(!text.contains("SECRET_FROM_ENV"), "env key leaked into {text}");

        let back = Config::load_from(&path).unwrap();
        assert!(back.live_api_key().is_none());
        assert_eq!(back.mock_delay(), Duration::from_millis(250));
    }

    #[test]
    fn env_key_does_not_replace_stored_key_on_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut cfg = Config::default();
        cfg.upsert_live_api_key("FILE_KEY".into());
        cfg.set_env_api_key(Some("SECRET_FROM_ENV".into()));
        cfg.save_to(&path).unwrap();

        let back = Config::load_from(&path).unwrap();
        assert_eq!(back.live_api_key(), Some("FILE_KEY"));
    }

    #[test]
    fn blank_api_key_is_ignored() {
        let mut cfg = Config::default();

        cfg.upsert_live_api_key("   ".into());

        assert!(cfg.live.is_none());
        assert!(cfg.default_source.is_none());
        assert_eq!(cfg.source_kind().unwrap(), SourceKind::Mock);
    }

    #[test]
    fn blank_default_city_falls_back() {
        let cfg = Config { default_city: Some("   ".into()), ..Config::default() };
        assert_eq!(cfg.default_city(), "London");
    }

    #[test]
    fn parses_toml_layout() {
        let cfg: Config = toml::from_str(
            r#"
            default_source = "live"
            default_city = "Paris"

            [live]
            api_key = "abc"
            endpoint = "http://localhost:9000/weather"
            timeout_secs = 3

            [mock]
            delay_ms = 250
            "#,
        )
        .expect("config should parse");

        assert_eq!(cfg.source_kind().unwrap(), SourceKind::Live);
        assert_eq!(cfg.default_city(), "Paris");
        assert_eq!(cfg.live_endpoint(), Some("http://localhost:9000/weather"));
        assert_eq!(cfg.live_timeout(), Duration::from_secs(3));
        assert_eq!(cfg.mock_delay(), Duration::from_millis(250));
    }

    #[test]
    fn save_format_roundtrips() {
        let mut cfg = Config::default();
        cfg.upsert_live_api_key("KEY".into());
        cfg.default_city = Some("Tokyo".into());

        let text = toml::to_string_pretty(&cfg).unwrap();
        let back: Config = toml::from_str(&text).unwrap();

        assert_eq!(back.live_api_key(), Some("KEY"));
        assert_eq!(back.default_city(), "Tokyo");
    }
}
