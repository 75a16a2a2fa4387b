use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use tracing::debug;

use crate::{
    config::WeatherApiConfig,
    error::WeatherError,
    model::{CitySearchResult, WeatherRecord},
};

use super::WeatherSource;

/// Client for the WeatherAPI.com `search.json` and `current.json` endpoints.
#[derive(Debug, Clone)]
pub struct WeatherApiClient {
    api_key: String,
    search_url: String,
    current_url: String,
    http: Client,
}

impl WeatherApiClient {
    /// Every request made through this client is bounded by `config.timeout()`.
    pub fn new(config: &WeatherApiConfig) -> Result<Self, WeatherError> {
        let http = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            api_key: config.api_key.clone(),
            search_url: config.search_url(),
            current_url: config.current_url(),
            http,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, q: &str) -> Result<T, WeatherError> {
        debug!(url, q, "calling weather provider");

        let res = self
            .http
            .get(url)
            .query(&[("key", self.api_key.as_str()), ("q", q)])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(WeatherError::Status { status, body: truncate_body(&body) });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl WeatherSource for WeatherApiClient {
    async fn search_city(&self, name: &str) -> Result<Vec<CitySearchResult>, WeatherError> {
        if name.is_empty() {
            return Err(WeatherError::EmptyQuery);
        }

        self.get_json(&self.search_url, name).await
    }

    async fn current_by_coordinates(
        &self,
        lat: &str,
        lon: &str,
    ) -> Result<WeatherRecord, WeatherError> {
        let q = format!("{lat},{lon}");
        let parsed: WaCurrentResponse = self.get_json(&self.current_url, &q).await?;

        Ok(parsed.into_record())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WaLocation {
    name: String,
    region: String,
    country: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WaCondition {
    text: String,
    icon: String,
    code: i64,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
    #[serde(default)]
    condition: WaCondition,
    humidity: i64,
}

#[derive(Debug, Deserialize)]
struct WaCurrentResponse {
    location: WaLocation,
    current: WaCurrent,
}

impl WaCurrentResponse {
    /// The observation time is when we asked, not the provider's local time.
    fn into_record(self) -> WeatherRecord {
        WeatherRecord {
            id: 0,
            city: self.location.name,
            country: self.location.country,
            state: self.location.region,
            temperature: self.current.temp_c,
            description: self.current.condition.text,
            humidity: self.current.humidity,
            icon: absolute_icon_url(&self.current.condition.icon),
            condition_code: self.current.condition.code,
            timestamp: Utc::now(),
        }
    }
}

/// WeatherAPI returns protocol-relative icon paths like `//cdn.weatherapi.com/...`.
fn absolute_icon_url(icon: &str) -> String {
    if icon.is_empty() || icon.contains("://") {
        icon.to_string()
    } else {
        format!("https:{icon}")
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
