use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::{api::DEFAULT_BASE_URL, model::Coordinates};

/// Environment variable that overrides the configured API key.
pub const API_KEY_ENV: &str = "WEATHERWAY_API_KEY";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
///
/// [location]
/// latitude = 52.52
/// longitude = 13.405
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub api_key: Option<String>,

    /// Overrides the provider endpoint; mostly useful for testing.
    pub base_url: Option<String>,

    /// Location used when none is given on the command line.
    pub location: Option<Coordinates>,

    /// Where the response cache lives. Defaults to the platform cache dir.
    pub cache_dir: Option<PathBuf>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
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

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weatherway", "weather-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// API key from the environment, falling back to the config file.
    pub fn resolve_api_key(&self) -> Result<String> {
        self.resolve_api_key_with(std::env::var(API_KEY_ENV).ok())
    }

    fn resolve_api_key_with(&self, from_env: Option<String>) -> Result<String> {
        from_env
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.api_key.clone())
            .ok_or_else(|| {
                anyhow!(
                    "No API key configured.\n\
                     Hint: run `weather configure` or set {API_KEY_ENV}."
                )
            })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_errors_when_not_set() {
        let cfg = Config::default();
        let err = cfg.resolve_api_key_with(None).unwrap_err();

        assert!(err.to_string().contains("No API key configured"));
        assert!(err.to_string().contains("weather configure"));
    }

    #[test]
    fn env_key_overrides_file_key() {
        let cfg = Config {
            api_key: Some("FILE_KEY".into()),
            ..Config::default()
        };

        assert_eq!(cfg.resolve_api_key_with(Some("ENV_KEY".into())).unwrap(), "ENV_KEY");
        assert_eq!(cfg.resolve_api_key_with(None).unwrap(), "FILE_KEY");
        assert_eq!(cfg.resolve_api_key_with(Some("  ".into())).unwrap(), "FILE_KEY");
    }

    #[test]
    fn base_url_defaults_to_provider() {
        assert_eq!(Config::default().base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn parses_full_toml() {
        let cfg = Config::from_toml(
            r#"
            api_key = "KEY"
            base_url = "http://localhost:9000/timeline/"
            cache_dir = "/tmp/weather"

            [location]
            latitude = 52.52
            longitude = 13.405
            "#,
        )
        .unwrap();

        assert_eq!(cfg.api_key.as_deref(), Some("KEY"));
        assert_eq!(cfg.base_url(), "http://localhost:9000/timeline/");
        assert_eq!(cfg.location, Some(Coordinates::new(52.52, 13.405)));
        assert_eq!(cfg.cache_dir, Some(PathBuf::from("/tmp/weather")));
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn toml_survives_serialization() {
        let cfg = Config {
            api_key: Some("KEY".into()),
            location: Some(Coordinates::new(-1.25, 36.8)),
            ..Config::default()
        };

        let text = toml::to_string_pretty(&cfg).unwrap();
        assert_eq!(Config::from_toml(&text).unwrap(), cfg);
    }
}
