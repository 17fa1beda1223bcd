//! Decoded shapes of the two upstream API responses.

use std::collections::HashMap;

use serde::Deserialize;

/// One country as returned by the REST Countries v2 endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCountry {
    /// Country name; the identity key for upserts.
    pub name: String,
    /// Capital city.
    #[serde(default)]
    pub capital: Option<String>,
    /// Geographic region.
    #[serde(default)]
    pub region: Option<String>,
    /// Population count.
    #[serde(default)]
    pub population: u64,
    /// Flag image URL.
    #[serde(default)]
    pub flag: Option<String>,
    /// Currencies in use; only the first one is considered.
    #[serde(default)]
    pub currencies: Vec<RawCurrency>,
}

impl RawCountry {
    /// ISO code of the country's first listed currency, if any.
    pub fn first_currency_code(&self) -> Option<&str> {
        self.currencies
            .first()
            .and_then(|currency| currency.code.as_deref())
    }
}

/// A currency entry inside a [`RawCountry`].
#[derive(Debug, Clone, Deserialize)]
pub struct RawCurrency {
    /// ISO 4217 code (e.g. "USD"); occasionally absent upstream.
    #[serde(default)]
    pub code: Option<String>,
}

/// USD exchange-rate table from open.er-api.com.
#[derive(Debug, Clone, Deserialize)]
pub struct RateTable {
    /// Currency code → units per USD.
    pub rates: HashMap<String, f64>,
}

impl RateTable {
    /// Look up the rate for a currency code, exact match.
    pub fn rate(&self, code: &str) -> Option<f64> {
        self.rates.get(code).copied()
    }
}
