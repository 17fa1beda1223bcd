//! External API client for the country registry and exchange-rate feeds.
//!
//! One GET per dataset, bounded timeout, no retries: a single failed call
//! aborts the refresh cycle and surfaces as a 503 to the caller.

pub mod types;

use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::config::Config;
use crate::error::{FetchCause, FetchError};

pub use types::{RateTable, RawCountry, RawCurrency};

/// Shared client for the two upstream JSON APIs.
#[derive(Debug, Clone)]
pub struct ExternalClient {
    /// Underlying HTTP client, built once and reused.
    http: reqwest::Client,
    /// Country registry endpoint.
    countries_url: String,
    /// Exchange-rate endpoint.
    rates_url: String,
}

impl ExternalClient {
    /// Build the client from config with the configured per-request timeout.
    pub fn new(config: &Config) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.http_timeout_secs))
            .tcp_keepalive(std::time::Duration::from_secs(30))
            .build()
            .expect("failed to create HTTP client");

        Self {
            http,
            countries_url: config.countries_api_url.clone(),
            rates_url: config.exchange_rates_api_url.clone(),
        }
    }

    /// Fetch the country registry.
    #[instrument(skip(self))]
    pub async fn fetch_countries(&self) -> Result<Vec<RawCountry>, FetchError> {
        let countries: Vec<RawCountry> = self.get_json(&self.countries_url).await?;
        debug!(count = countries.len(), "fetched countries");
        Ok(countries)
    }

    /// Fetch the USD exchange-rate table.
    #[instrument(skip(self))]
    pub async fn fetch_rates(&self) -> Result<RateTable, FetchError> {
        let table: RateTable = self.get_json(&self.rates_url).await?;
        debug!(count = table.rates.len(), "fetched exchange rates");
        Ok(table)
    }

    /// GET a URL, require 2xx, decode the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let origin = origin_of(url);

        let response = self.http.get(url).send().await.map_err(|e| FetchError {
            origin: origin.clone(),
            cause: FetchCause::Transport(e),
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError {
                origin,
                cause: FetchCause::Status { status, body },
            });
        }

        response.json::<T>().await.map_err(|e| FetchError {
            origin,
            cause: FetchCause::Decode(e),
        })
    }
}

/// Host part of a URL, used to tag fetch errors with their upstream.
fn origin_of(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_string))
        .unwrap_or_else(|| url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_extracts_host() {
        assert_eq!(
            origin_of("https://restcountries.com/v2/all?fields=name"),
            "restcountries.com"
        );
        assert_eq!(
            origin_of("https://open.er-api.com/v6/latest/USD"),
            "open.er-api.com"
        );
    }

    #[test]
    fn origin_falls_back_to_raw_input() {
        assert_eq!(origin_of("not a url"), "not a url");
    }
}
