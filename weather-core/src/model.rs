use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of entries served by the history endpoint.
pub const HISTORY_LIMIT: i64 = 3;

/// A point-in-time observation for one location.
///
/// `id` stays 0 until the history store assigns one on insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub id: i64,
    pub city: String,
    pub country: String,
    pub state: String,
    pub temperature: f64,
    pub description: String,
    pub humidity: i64,
    pub icon: String,
    pub condition_code: i64,
    pub timestamp: DateTime<Utc>,
}

/// Candidate location returned by the provider's search endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitySearchResult {
    pub name: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub country: String,
    pub lat: f64,
    pub lon: f64,
}

/// JSON envelope for every error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self { error: message.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn weather_record_serializes_with_public_field_names() {
        let record = WeatherRecord {
            id: 7,
            city: "London".into(),
            country: "United Kingdom".into(),
            state: "City of London, Greater London".into(),
            temperature: 15.5,
            description: "Partly cloudy".into(),
            humidity: 65,
            icon: "https://cdn.example/icon.png".into(),
            condition_code: 1003,
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        };

        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["id"], 7);
        assert_eq!(value["city"], "London");
        assert_eq!(value["state"], "City of London, Greater London");
        assert_eq!(value["temperature"], 15.5);
        assert_eq!(value["humidity"], 65);
        assert_eq!(value["condition_code"], 1003);
        assert_eq!(value["timestamp"], "2024-05-01T12:00:00Z");
    }

    #[test]
    fn search_result_tolerates_missing_region_and_country() {
        let parsed: Vec<CitySearchResult> =
            serde_json::from_str(r#"[{"name":"Atlantis","lat":1.5,"lon":-2.25}]"#).unwrap();

        assert_eq!(parsed[0].name, "Atlantis");
        assert!(parsed[0].region.is_empty());
        assert!(parsed[0].country.is_empty());
        assert_eq!(parsed[0].lon, -2.25);
    }

    #[test]
    fn error_body_shape() {
        let body = serde_json::to_string(&ErrorBody::new("city not found: Nowhere")).unwrap();
        assert_eq!(body, r#"{"error":"city not found: Nowhere"}"#);
    }
}
