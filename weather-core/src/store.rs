//! Durable history of weather lookups.
//!
//! One table, `weather_data`, created on first open and never altered afterwards. Rows are only
//! ever inserted and read back newest first.

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    Row,
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow},
};
use tracing::debug;

use crate::{error::StoreError, model::WeatherRecord};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS weather_data (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        city TEXT NOT NULL,
        country TEXT,
        state TEXT,
        temperature REAL NOT NULL,
        description TEXT NOT NULL,
        humidity INTEGER NOT NULL,
        icon TEXT,
        condition_code INTEGER,
        timestamp DATETIME DEFAULT CURRENT_TIMESTAMP
    )
"#;

const INSERT: &str = r#"
    INSERT INTO weather_data
        (city, country, state, temperature, description, humidity, icon, condition_code, timestamp)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

const SELECT_RECENT: &str = r#"
    SELECT id, city, country, state, temperature, description, humidity, icon, condition_code, timestamp
    FROM weather_data
    ORDER BY timestamp DESC, id ASC
    LIMIT ?
"#;

/// Persistence for looked-up weather records.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Insert one record and return the id the store assigned. `record.id` is ignored.
    async fn save(&self, record: &WeatherRecord) -> Result<i64, StoreError>;

    /// Up to `limit` records, newest first; equal timestamps come back in insertion order.
    async fn recent_history(&self, limit: i64) -> Result<Vec<WeatherRecord>, StoreError>;

    /// Release the underlying connections. Calling it again is a no-op.
    async fn close(&self) -> Result<(), StoreError>;
}

/// SQLite-backed [`HistoryStore`].
///
/// The pool is safe to share between concurrent requests; each insert is a single statement.
#[derive(Debug, Clone)]
pub struct SqliteHistoryStore {
    pool: SqlitePool,
}

impl SqliteHistoryStore {
    /// Open (creating if missing) the database file at `path` and ensure the schema exists.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let options = SqliteConnectOptions::new().filename(path).create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|source| StoreError::Open { path: path.to_path_buf(), source })?;

        Self::init(pool).await
    }

    /// Private in-memory database, mostly for tests.
    ///
    /// Every SQLite connection gets its own `:memory:` database, so the pool is pinned to a single
    /// connection that is never reaped.
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::new().in_memory(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|source| StoreError::Open { path: ":memory:".into(), source })?;

        Self::init(pool).await
    }

    async fn init(pool: SqlitePool) -> Result<Self, StoreError> {
        sqlx::query(CREATE_TABLE).execute(&pool).await?;
        Ok(Self { pool })
    }

    /// Get the connection pool (for advanced usage).
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn parse_row(row: SqliteRow) -> Result<WeatherRecord, StoreError> {
        Ok(WeatherRecord {
            id: row.try_get("id")?,
            city: row.try_get("city")?,
            country: row.try_get::<Option<String>, _>("country")?.unwrap_or_default(),
            state: row.try_get::<Option<String>, _>("state")?.unwrap_or_default(),
            temperature: row.try_get("temperature")?,
            description: row.try_get("description")?,
            humidity: row.try_get("humidity")?,
            icon: row.try_get::<Option<String>, _>("icon")?.unwrap_or_default(),
            condition_code: row.try_get::<Option<i64>, _>("condition_code")?.unwrap_or_default(),
            timestamp: row.try_get::<DateTime<Utc>, _>("timestamp")?,
        })
    }

    fn check_open(&self) -> Result<(), StoreError> {
        if self.pool.is_closed() {
            return Err(StoreError::Closed);
        }
        Ok(())
    }
}

#[async_trait]
impl HistoryStore for SqliteHistoryStore {
    async fn save(&self, record: &WeatherRecord) -> Result<i64, StoreError> {
        self.check_open()?;

        let result = sqlx::query(INSERT)
            .bind(&record.city)
            .bind(&record.country)
            .bind(&record.state)
            .bind(record.temperature)
            .bind(&record.description)
            .bind(record.humidity)
            .bind(&record.icon)
            .bind(record.condition_code)
            .bind(record.timestamp)
            .execute(&self.pool)
            .await?;

        let id = result.last_insert_rowid();
        debug!(id, city = %record.city, "saved weather record");
        Ok(id)
    }

    async fn recent_history(&self, limit: i64) -> Result<Vec<WeatherRecord>, StoreError> {
        self.check_open()?;

        let rows = sqlx::query(SELECT_RECENT).bind(limit).fetch_all(&self.pool).await?;

        rows.into_iter().map(Self::parse_row).collect()
    }

    async fn close(&self) -> Result<(), StoreError> {
        // SqlitePool::close is idempotent and waits for checked-out connections.
        self.pool.close().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use std::sync::Arc;

    fn record(city: &str, timestamp: DateTime<Utc>) -> WeatherRecord {
        WeatherRecord {
            id: 0,
            city: city.into(),
            country: "Country".into(),
            state: "State".into(),
            temperature: 21.25,
            description: "Sunny".into(),
            humidity: 40,
            icon: "https://cdn.example/sun.png".into(),
            condition_code: 1000,
            timestamp,
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap() + Duration::seconds(secs)
    }

    #[tokio::test]
    async fn save_then_read_back_newest() {
        let store = SqliteHistoryStore::open_in_memory().await.unwrap();
        let saved = record("London", at(0));

        let id = store.save(&saved).await.unwrap();
        let history = store.recent_history(1).await.unwrap();

        assert!(id > 0);
        assert_eq!(history, vec![WeatherRecord { id, ..saved }]);
    }

    #[tokio::test]
    async fn ids_increase_monotonically() {
        let store = SqliteHistoryStore::open_in_memory().await.unwrap();

        let first = store.save(&record("A", at(0))).await.unwrap();
        let second = store.save(&record("B", at(0))).await.unwrap();

        assert!(second > first);
    }

    #[tokio::test]
    async fn history_is_newest_first_and_bounded() {
        let store = SqliteHistoryStore::open_in_memory().await.unwrap();
        for (i, city) in ["Oslo", "Rome", "Lima", "Kyiv", "Pune"].iter().enumerate() {
            store.save(&record(city, at(i as i64 * 60))).await.unwrap();
        }

        let history = store.recent_history(3).await.unwrap();

        let cities: Vec<_> = history.iter().map(|r| r.city.as_str()).collect();
        assert_eq!(cities, ["Pune", "Kyiv", "Lima"]);
        assert!(history.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
    }

    #[tokio::test]
    async fn timestamp_order_wins_over_insertion_order() {
        let store = SqliteHistoryStore::open_in_memory().await.unwrap();
        store.save(&record("Later", at(120))).await.unwrap();
        store.save(&record("Earlier", at(0))).await.unwrap();

        let history = store.recent_history(10).await.unwrap();

        assert_eq!(history[0].city, "Later");
        assert_eq!(history[1].city, "Earlier");
    }

    #[tokio::test]
    async fn equal_timestamps_fall_back_to_id_ascending() {
        let store = SqliteHistoryStore::open_in_memory().await.unwrap();
        let a = store.save(&record("First", at(0))).await.unwrap();
        let b = store.save(&record("Second", at(0))).await.unwrap();

        let history = store.recent_history(10).await.unwrap();

        assert_eq!(history.iter().map(|r| r.id).collect::<Vec<_>>(), vec![a, b]);
    }

    #[tokio::test]
    async fn empty_store_returns_empty_history() {
        let store = SqliteHistoryStore::open_in_memory().await.unwrap();
        assert!(store.recent_history(3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn null_optional_columns_read_back_as_empty() {
        let store = SqliteHistoryStore::open_in_memory().await.unwrap();
        sqlx::query(
            "INSERT INTO weather_data (city, temperature, description, humidity) \
             VALUES ('Bare', 1.0, 'Fog', 99)",
        )
        .execute(store.pool())
        .await
        .unwrap();

        let history = store.recent_history(1).await.unwrap();

        assert_eq!(history[0].city, "Bare");
        assert!(history[0].country.is_empty());
        assert!(history[0].icon.is_empty());
        assert_eq!(history[0].condition_code, 0);
    }

    #[tokio::test]
    async fn close_is_idempotent_and_blocks_further_use() {
        let store = SqliteHistoryStore::open_in_memory().await.unwrap();

        store.close().await.unwrap();
        store.close().await.unwrap();

        assert!(matches!(store.save(&record("X", at(0))).await, Err(StoreError::Closed)));
        assert!(matches!(store.recent_history(3).await, Err(StoreError::Closed)));
    }

    #[tokio::test]
    async fn file_store_keeps_rows_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weather.db");

        let store = SqliteHistoryStore::open(&path).await.unwrap();
        store.save(&record("Berlin", at(0))).await.unwrap();
        store.close().await.unwrap();

        let reopened = SqliteHistoryStore::open(&path).await.unwrap();
        let history = reopened.recent_history(3).await.unwrap();

        assert_eq!(history.len(), 1);
        assert_eq!(history[0].city, "Berlin");
        reopened.close().await.unwrap();
    }

    #[tokio::test]
    async fn open_fails_for_unreachable_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("weather.db");

        let err = SqliteHistoryStore::open(&path).await.unwrap_err();

        assert!(matches!(err, StoreError::Open { .. }));
    }

    #[tokio::test]
    async fn concurrent_saves_all_land() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(SqliteHistoryStore::open(dir.path().join("w.db")).await.unwrap());

        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.save(&record(&format!("c{i}"), at(i))).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let history = store.recent_history(100).await.unwrap();
        assert_eq!(history.len(), 8);
        store.close().await.unwrap();
    }
}
