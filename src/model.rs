//! Persisted entities and their wire shapes.

use serde::Serialize;
use time::OffsetDateTime;

use crate::utils::serialize_timestamp;

/// A country row as persisted and served.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Country {
    /// Storage identity, preserved across refresh updates.
    pub id: i64,
    /// Country name; unique case-insensitively.
    pub name: String,
    /// Capital city.
    pub capital: Option<String>,
    /// Geographic region.
    pub region: Option<String>,
    /// Population count.
    pub population: i64,
    /// First listed ISO currency code.
    pub currency_code: Option<String>,
    /// Units per USD at refresh time.
    pub exchange_rate: Option<f64>,
    /// Synthetic estimated GDP. See the `gdp` module for the policy.
    pub estimated_gdp: Option<f64>,
    /// Flag image URL.
    pub flag_url: Option<String>,
    /// When this row was last written by a refresh.
    #[serde(serialize_with = "serialize_timestamp")]
    pub last_refreshed_at: OffsetDateTime,
}

/// A processed country ready for the upsert engine. Identity and the shared
/// batch timestamp are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewCountry {
    /// Country name; the upsert key after lowercasing.
    pub name: String,
    /// Capital city.
    pub capital: Option<String>,
    /// Geographic region.
    pub region: Option<String>,
    /// Population count.
    pub population: i64,
    /// First listed ISO currency code.
    pub currency_code: Option<String>,
    /// Units per USD.
    pub exchange_rate: Option<f64>,
    /// Synthetic estimated GDP.
    pub estimated_gdp: Option<f64>,
    /// Flag image URL.
    pub flag_url: Option<String>,
}

/// The singleton refresh-status record.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RefreshStatus {
    /// Countries written by the most recent refresh.
    pub total_countries: i64,
    /// When that refresh committed.
    #[serde(serialize_with = "serialize_timestamp")]
    pub last_refreshed_at: OffsetDateTime,
}

impl RefreshStatus {
    /// The "never refreshed" status: zero count, epoch timestamp.
    pub fn zero() -> Self {
        Self {
            total_countries: 0,
            last_refreshed_at: OffsetDateTime::UNIX_EPOCH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_status_serializes_epoch() {
        let rendered = serde_json::to_value(RefreshStatus::zero()).unwrap();
        assert_eq!(
            rendered,
            serde_json::json!({
                "total_countries": 0,
                "last_refreshed_at": "1970-01-01T00:00:00Z",
            })
        );
    }

    #[test]
    fn country_serializes_nullable_fields_as_null() {
        let country = Country {
            id: 1,
            name: "Atlantis".to_string(),
            capital: None,
            region: None,
            population: 1000,
            currency_code: None,
            exchange_rate: None,
            estimated_gdp: Some(0.0),
            flag_url: None,
            last_refreshed_at: OffsetDateTime::UNIX_EPOCH,
        };

        let rendered = serde_json::to_value(&country).unwrap();
        assert_eq!(rendered["currency_code"], serde_json::Value::Null);
        assert_eq!(rendered["exchange_rate"], serde_json::Value::Null);
        assert_eq!(rendered["estimated_gdp"], serde_json::json!(0.0));
        assert_eq!(rendered["last_refreshed_at"], "1970-01-01T00:00:00Z");
    }
}
