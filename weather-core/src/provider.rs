use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::WeatherError,
    model::{CitySearchResult, WeatherRecord},
};

pub mod weatherapi;

pub use weatherapi::WeatherApiClient;

/// A source of current weather observations.
///
/// The HTTP handlers only depend on this trait, so tests can swap in a double.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    /// Candidate locations for a free-text name, in provider order.
    /// An empty vector means "no match", not an error.
    async fn search_city(&self, name: &str) -> Result<Vec<CitySearchResult>, WeatherError>;

    /// Current conditions at `lat,lon`. Both are passed through to the provider as given.
    async fn current_by_coordinates(
        &self,
        lat: &str,
        lon: &str,
    ) -> Result<WeatherRecord, WeatherError>;

    /// Search, then fetch current conditions for the first candidate.
    async fn current_by_city(&self, name: &str) -> Result<WeatherRecord, WeatherError> {
        let results = self.search_city(name).await?;

        let first = results
            .first()
            .ok_or_else(|| WeatherError::CityNotFound(name.to_string()))?;

        let (lat, lon) = (first.lat.to_string(), first.lon.to_string());
        self.current_by_coordinates(&lat, &lon).await
    }
}
