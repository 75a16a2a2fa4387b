use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::info;
use weather_core::{
    Config, HistoryStore, SqliteHistoryStore, WeatherApiClient, WeatherRecord, WeatherSource,
    conditions::describe_condition,
    validation::{is_valid_city_name, sanitize_city_name},
};

use crate::{
    logging::{LogFormat, init_tracing},
    routes::{AppState, router},
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-dashboard", version, about = "Weather dashboard")]
pub struct Cli {
    /// Log line format.
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the web dashboard.
    Serve {
        /// Interface to bind; overrides HOST and the config file.
        #[arg(long)]
        host: Option<String>,

        /// Port to bind; overrides PORT and the config file.
        #[arg(long)]
        port: Option<u16>,

        /// History database file; overrides DB_PATH and the config file.
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Store the WeatherAPI.com key in the config file.
    Configure,

    /// Print current weather for a city once, without recording it.
    Lookup {
        /// City name, e.g. "London" or "new york".
        city: String,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        init_tracing(self.log_format);

        match self.command {
            Command::Serve { host, port, db } => {
                let mut config = Config::load()?;
                if let Some(host) = host {
                    config.server.host = host;
                }
                if let Some(port) = port {
                    config.server.port = port;
                }
                if let Some(db) = db {
                    config.database.path = db;
                }
                serve(config).await
            }
            Command::Configure => configure(),
            Command::Lookup { city } => lookup(&city).await,
        }
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    config.validate()?;

    let store = Arc::new(
        SqliteHistoryStore::open(&config.database.path)
            .await
            .context("Failed to open history database")?,
    );
    let weather = Arc::new(
        WeatherApiClient::new(&config.weather).context("Failed to build weather API client")?,
    );

    let state = AppState::new(weather, store.clone());
    let address = config.server_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;

    info!(%address, db = %config.database.path.display(), "server starting");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("server stopped, closing history database");
    store.close().await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load_file()?;

    let api_key = inquire::Password::new("WeatherAPI.com API key:")
        .without_confirmation()
        .with_display_mode(inquire::PasswordDisplayMode::Masked)
        .prompt()
        .context("Failed to read API key")?;

    config.set_api_key(api_key.trim().to_string());
    config.validate()?;
    let path = config.save()?;

    println!("Saved configuration to {}", path.display());
    Ok(())
}

async fn lookup(city: &str) -> anyhow::Result<()> {
    if !is_valid_city_name(city) {
        anyhow::bail!(
            "'{city}' is not a valid city name (letters, spaces, hyphens and apostrophes only)"
        );
    }

    let config = Config::load()?;
    config.validate()?;

    let client = WeatherApiClient::new(&config.weather)?;
    let record = client.current_by_city(&sanitize_city_name(city)).await?;

    println!("{}", format_record(&record));
    Ok(())
}

fn format_record(record: &WeatherRecord) -> String {
    let location = [record.state.as_str(), record.country.as_str()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

    let description = if record.description.is_empty() {
        describe_condition(record.condition_code)
    } else {
        record.description.as_str()
    };

    let mut out = record.city.clone();
    if !location.is_empty() {
        out.push_str(&format!(" ({location})"));
    }
    out.push_str(&format!(
        "\n  {:.1}°C, {description}\n  Humidity: {}%\n  Updated: {}",
        record.temperature,
        record.humidity,
        record.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
    ));
    out
}
