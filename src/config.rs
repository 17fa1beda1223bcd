//! Application configuration loaded from environment variables.

use std::path::PathBuf;

use serde::Deserialize;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Persistence ===
    /// SQLite connection URL (e.g. `sqlite://countries.db`).
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Maximum number of pooled database connections.
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    // === External APIs ===
    /// Country registry endpoint.
    #[serde(default = "default_countries_api_url")]
    pub countries_api_url: String,

    /// USD exchange-rate endpoint.
    #[serde(default = "default_exchange_rates_api_url")]
    pub exchange_rates_api_url: String,

    /// Per-request timeout for external API calls, in seconds.
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    // === Summary image ===
    /// Directory the summary PNG is written to.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Preferred TrueType font for the summary card. Falls back to common
    /// system font locations when unset or missing.
    #[serde(default)]
    pub font_path: Option<PathBuf>,

    // === Server Configuration ===
    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,
}

fn default_database_url() -> String {
    "sqlite://countries.db".to_string()
}

fn default_db_max_connections() -> u32 {
    10
}

fn default_countries_api_url() -> String {
    "https://restcountries.com/v2/all?fields=name,capital,region,population,flag,currencies"
        .to_string()
}

fn default_exchange_rates_api_url() -> String {
    "https://open.er-api.com/v6/latest/USD".to_string()
}

fn default_http_timeout_secs() -> u64 {
    30
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("cache")
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.database_url.is_empty() {
            return Err("DATABASE_URL must not be empty".to_string());
        }

        if self.db_max_connections == 0 {
            return Err("DB_MAX_CONNECTIONS must be at least 1".to_string());
        }

        if self.http_timeout_secs == 0 {
            return Err("HTTP_TIMEOUT_SECS must be at least 1".to_string());
        }

        for (name, url) in [
            ("COUNTRIES_API_URL", &self.countries_api_url),
            ("EXCHANGE_RATES_API_URL", &self.exchange_rates_api_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(format!("{} must be an http(s) URL", name));
            }
        }

        Ok(())
    }
}
