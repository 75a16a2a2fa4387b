//! Error types shared by the provider client, the history store and configuration loading.

use std::path::PathBuf;

/// Failure talking to the weather provider.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    /// The caller passed an empty search query.
    #[error("city name must not be empty")]
    EmptyQuery,

    /// The request never produced a response (connect error, timeout, body read failure).
    #[error("failed to reach weather provider: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("API request failed with status: {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The provider body was not the JSON shape we expect.
    #[error("failed to parse weather provider response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The search step returned no candidates.
    #[error("city not found: {0}")]
    CityNotFound(String),
}

/// Failure reading or writing the history table.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to open database {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: sqlx::Error,
    },

    #[error("database query failed: {0}")]
    Query(#[from] sqlx::Error),

    #[error("history store is closed")]
    Closed,
}

/// Startup-time configuration problems. All of them are fatal.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(
        "WEATHERAPI_KEY is required.\n\
         Hint: export WEATHERAPI_KEY or run `weather-dashboard configure`."
    )]
    MissingApiKey,

    #[error("could not determine platform config directory")]
    NoConfigDir,

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize configuration to TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid port '{0}'")]
    InvalidPort(String),
}
