//! The singleton refresh-status row.

use sqlx::SqlitePool;

use crate::error::StoreError;
use crate::model::RefreshStatus;
use crate::utils::parse_timestamp;

/// Read access to the `refresh_status` single-row table. The row is written
/// only by the upsert engine, inside the refresh transaction.
#[derive(Debug, Clone)]
pub struct StatusStore {
    pool: SqlitePool,
}

impl StatusStore {
    /// Create a store sharing the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Fetch the current status. "Never refreshed" is a valid state and
    /// comes back as a zero status, not an error.
    pub async fn get(&self) -> Result<RefreshStatus, StoreError> {
        let row: Option<(i64, String)> =
            sqlx::query_as("SELECT total_countries, last_refreshed_at FROM refresh_status WHERE id = 1")
                .fetch_optional(&self.pool)
                .await?;

        match row {
            None => Ok(RefreshStatus::zero()),
            Some((total_countries, raw)) => {
                let last_refreshed_at =
                    parse_timestamp(&raw).map_err(|cause| StoreError::Timestamp {
                        value: raw.clone(),
                        cause,
                    })?;
                Ok(RefreshStatus {
                    total_countries,
                    last_refreshed_at,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewCountry;
    use crate::store::{test_pool, CountryStore};
    use crate::utils::now_utc_second;
    use time::OffsetDateTime;

    #[tokio::test]
    async fn missing_row_reads_as_zero_status() {
        let pool = test_pool().await;
        let status = StatusStore::new(pool).get().await.unwrap();

        assert_eq!(status.total_countries, 0);
        assert_eq!(status.last_refreshed_at, OffsetDateTime::UNIX_EPOCH);
    }

    #[tokio::test]
    async fn refresh_writes_the_singleton_row() {
        let pool = test_pool().await;
        let countries = CountryStore::new(pool.clone());
        let status = StatusStore::new(pool);

        let batch = vec![
            NewCountry {
                name: "France".to_string(),
                capital: None,
                region: None,
                population: 1,
                currency_code: None,
                exchange_rate: None,
                estimated_gdp: Some(0.0),
                flag_url: None,
            },
            NewCountry {
                name: "Spain".to_string(),
                capital: None,
                region: None,
                population: 1,
                currency_code: None,
                exchange_rate: None,
                estimated_gdp: Some(0.0),
                flag_url: None,
            },
        ];

        let ts = now_utc_second();
        countries.apply_refresh(&batch, ts).await.unwrap();

        let current = status.get().await.unwrap();
        assert_eq!(current.total_countries, 2);
        assert_eq!(current.last_refreshed_at, ts);

        // A later, smaller refresh overwrites rather than accumulates.
        let ts2 = now_utc_second();
        countries.apply_refresh(&batch[..1], ts2).await.unwrap();
        let current = status.get().await.unwrap();
        assert_eq!(current.total_countries, 1);
    }
}
