//! Core library for the weather dashboard.
//!
//! This crate defines:
//! - Configuration loading (file, environment) and validation
//! - The weather provider abstraction and its WeatherAPI.com client
//! - The SQLite-backed lookup history
//! - Shared domain models and input validators
//!
//! It is used by `weather-dashboard`, but can also be reused by other binaries or services.

pub mod conditions;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod store;
pub mod validation;

pub use config::{Config, DatabaseConfig, ServerConfig, WeatherApiConfig};
pub use error::{ConfigError, StoreError, WeatherError};
pub use model::{CitySearchResult, ErrorBody, HISTORY_LIMIT, WeatherRecord};
pub use provider::{WeatherApiClient, WeatherSource};
pub use store::{HistoryStore, SqliteHistoryStore};
