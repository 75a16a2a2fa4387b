use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::error::ConfigError;

const DEFAULT_BASE_URL: &str = "http://api.weatherapi.com/v1";

/// Where the HTTP server binds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "localhost".to_string(), port: 8080 }
    }
}

/// Location of the SQLite history database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: PathBuf::from("./weather.db") }
    }
}

/// Credentials and endpoints for WeatherAPI.com.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherApiConfig {
    pub api_key: String,
    pub base_url: String,
    /// Overrides `{base_url}/search.json` when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_url: Option<String>,
    /// Overrides `{base_url}/current.json` when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for WeatherApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            search_url: None,
            current_url: None,
            timeout_secs: 10,
        }
    }
}

impl WeatherApiConfig {
    pub fn search_url(&self) -> String {
        self.search_url
            .clone()
            .unwrap_or_else(|| format!("{}/search.json", self.base_url.trim_end_matches('/')))
    }

    pub fn current_url(&self) -> String {
        self.current_url
            .clone()
            .unwrap_or_else(|| format!("{}/current.json", self.base_url.trim_end_matches('/')))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Top-level configuration.
///
/// Example TOML:
/// ```toml
/// [server]
/// host = "0.0.0.0"
/// port = 8080
///
/// [database]
/// path = "./weather.db"
///
/// [weather]
/// api_key = "..."
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub weather: WeatherApiConfig,
}

impl Config {
    /// Defaults, then the config file, then process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let mut cfg = Self::load_file()?;
        cfg.apply_env(|key| std::env::var(key).ok())?;
        Ok(cfg)
    }

    /// Load the config file, or return defaults if it doesn't exist yet.
    pub fn load_file() -> Result<Self, ConfigError> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(path)
    }

    pub fn load_from(path: PathBuf) -> Result<Self, ConfigError> {
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(source) => return Err(ConfigError::Read { path, source }),
        };

        toml::from_str(&contents).map_err(|source| ConfigError::Parse { path, source })
    }

    /// Override fields from environment variables. `lookup` abstracts `std::env::var` so tests
    /// don't have to mutate the process environment. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(host) = get("HOST") {
            self.server.host = host;
        }
        if let Some(port) = get("PORT") {
            self.server.port = port.parse().map_err(|_| ConfigError::InvalidPort(port))?;
        }
        if let Some(path) = get("DB_PATH") {
            self.database.path = PathBuf::from(path);
        }
        if let Some(key) = get("WEATHERAPI_KEY") {
            self.weather.api_key = key;
        }
        if let Some(base) = get("WEATHERAPI_BASE_URL") {
            self.weather.base_url = base;
        }
        if let Some(url) = get("WEATHERAPI_SEARCH_URL") {
            self.weather.search_url = Some(url);
        }
        if let Some(url) = get("WEATHERAPI_CURRENT_URL") {
            self.weather.current_url = Some(url);
        }

        Ok(())
    }

    /// Refuse to start without an API key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.weather.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(())
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.weather.api_key = api_key;
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let toml = toml::to_string_pretty(self)?;

        fs::write(path, toml).map_err(|source| ConfigError::Write { path: path.to_path_buf(), source })
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf, ConfigError> {
        let dirs = ProjectDirs::from("dev", "weather-task", "weather-dashboard")
            .ok_or(ConfigError::NoConfigDir)?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
