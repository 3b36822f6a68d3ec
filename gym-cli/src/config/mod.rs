use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory (~/.gym-cli/)
pub const HOME_ENV: &str = "GYM_CLI_HOME";
/// Environment variable overriding the backend base URL
pub const BASE_URL_ENV: &str = "GYM_BASE_URL";
/// Environment variable holding the RapidAPI key for ExerciseDB
pub const EXERCISEDB_KEY_ENV: &str = "EXERCISEDB_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub exercise_db: ExerciseDbConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseDbConfig {
    #[serde(default = "default_exercise_db_url")]
    pub base_url: String,

    #[serde(default = "default_exercise_db_host")]
    pub api_host: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_cookie_days")]
    pub cookie_max_age_days: i64,

    #[serde(default = "default_true")]
    pub cookie_secure: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_true")]
    pub color: bool,

    #[serde(default = "default_date_format")]
    pub date_format: String,
}

// Default value functions
fn default_base_url() -> String {
    "https://gym-app-b.onrender.com".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_exercise_db_url() -> String {
    "https://exercisedb.p.rapidapi.com".to_string()
}

fn default_exercise_db_host() -> String {
    "exercisedb.p.rapidapi.com".to_string()
}

fn default_page_size() -> usize {
    12
}

fn default_cookie_days() -> i64 {
    7
}

fn default_true() -> bool {
    true
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            exercise_db: ExerciseDbConfig::default(),
            session: SessionConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for ExerciseDbConfig {
    fn default() -> Self {
        Self {
            base_url: default_exercise_db_url(),
            api_host: default_exercise_db_host(),
            api_key: String::new(),
            page_size: default_page_size(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_max_age_days: default_cookie_days(),
            cookie_secure: default_true(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            color: default_true(),
            date_format: default_date_format(),
        }
    }
}

impl Config {
    /// Get data directory path (~/.gym-cli/, or $GYM_CLI_HOME)
    pub fn config_dir() -> Result<PathBuf> {
        if let Ok(dir) = std::env::var(HOME_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(".gym-cli"))
    }

    /// Get config file path (~/.gym-cli/config.toml)
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration from an explicit file, falling back to the default
    /// location. Environment overrides are applied last.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let config_file = match path {
            Some(path) => path.to_path_buf(),
            None => Self::config_file()?,
        };

        let mut config = if config_file.exists() {
            let contents =
                fs::read_to_string(&config_file).context("Failed to read config file")?;
            toml::from_str(&contents).context("Failed to parse config file")?
        } else {
            tracing::info!("Config file not found, using defaults");
            Self::default()
        };

        config.apply_env();
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            if !url.trim().is_empty() {
                self.api.base_url = url;
            }
        }

        if let Ok(key) = std::env::var(EXERCISEDB_KEY_ENV) {
            if !key.trim().is_empty() {
                self.exercise_db.api_key = key;
            }
        }
    }

    /// Backend root with the versioned API prefix, e.g. `https://host/api/v1`
    pub fn api_root(&self) -> String {
        format!("{}/api/v1", self.api.base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "https://gym-app-b.onrender.com");
        assert_eq!(config.api.timeout_seconds, 30);
        assert_eq!(config.exercise_db.page_size, 12);
        assert_eq!(config.session.cookie_max_age_days, 7);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let serialized = toml::to_string(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();

        assert_eq!(config.api.base_url, deserialized.api.base_url);
        assert_eq!(config.exercise_db.api_host, deserialized.exercise_db.api_host);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str("[api]\nbase_url = \"http://localhost:5000\"\n").unwrap();
        assert_eq!(config.api.base_url, "http://localhost:5000");
        assert_eq!(config.api.timeout_seconds, 30);
        assert!(config.session.cookie_secure);
    }

    #[test]
    fn test_api_root_strips_trailing_slash() {
        let mut config = Config::default();
        config.api.base_url = "http://localhost:5000/".to_string();
        assert_eq!(config.api_root(), "http://localhost:5000/api/v1");
    }

    #[test]
    fn test_save_and_load_explicit_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.exercise_db.page_size = 24;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.exercise_db.page_size, 24);
    }
}
