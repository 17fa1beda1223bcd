//! Country table: transactional refresh upserts and read-side queries.

use sqlx::SqlitePool;
use time::OffsetDateTime;
use tracing::instrument;

use crate::error::StoreError;
use crate::model::{Country, NewCountry};
use crate::utils::{format_timestamp, parse_timestamp};

const SELECT_COLUMNS: &str = "SELECT id, name, capital, region, population, currency_code, \
     exchange_rate, estimated_gdp, flag_url, last_refreshed_at FROM countries";

/// Sort order for `GET /countries`. Unrecognized values silently fall back
/// to the default, matching the query contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Name ascending (default).
    #[default]
    NameAsc,
    /// Name descending.
    NameDesc,
    /// Estimated GDP ascending.
    GdpAsc,
    /// Estimated GDP descending.
    GdpDesc,
    /// Population ascending.
    PopulationAsc,
    /// Population descending.
    PopulationDesc,
}

impl SortKey {
    /// Parse a query parameter; anything unknown becomes [`SortKey::NameAsc`].
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("name_desc") => SortKey::NameDesc,
            Some("gdp_asc") => SortKey::GdpAsc,
            Some("gdp_desc") => SortKey::GdpDesc,
            Some("population_asc") => SortKey::PopulationAsc,
            Some("population_desc") => SortKey::PopulationDesc,
            _ => SortKey::NameAsc,
        }
    }

    fn order_clause(self) -> &'static str {
        match self {
            SortKey::NameAsc => "name ASC",
            SortKey::NameDesc => "name DESC",
            SortKey::GdpAsc => "estimated_gdp ASC",
            SortKey::GdpDesc => "estimated_gdp DESC",
            SortKey::PopulationAsc => "population ASC",
            SortKey::PopulationDesc => "population DESC",
        }
    }
}

/// Optional filters and ordering for [`CountryStore::list`].
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    /// Case-insensitive region equality filter.
    pub region: Option<String>,
    /// Case-insensitive currency-code equality filter.
    pub currency: Option<String>,
    /// Result ordering.
    pub sort: SortKey,
}

/// Data access for the country table.
#[derive(Debug, Clone)]
pub struct CountryStore {
    pool: SqlitePool,
}

/// Raw row shape; timestamps are stored as text and parsed on the way out.
#[derive(sqlx::FromRow)]
struct CountryRow {
    id: i64,
    name: String,
    capital: Option<String>,
    region: Option<String>,
    population: i64,
    currency_code: Option<String>,
    exchange_rate: Option<f64>,
    estimated_gdp: Option<f64>,
    flag_url: Option<String>,
    last_refreshed_at: String,
}

impl CountryRow {
    fn into_country(self) -> Result<Country, StoreError> {
        let last_refreshed_at =
            parse_timestamp(&self.last_refreshed_at).map_err(|cause| StoreError::Timestamp {
                value: self.last_refreshed_at.clone(),
                cause,
            })?;

        Ok(Country {
            id: self.id,
            name: self.name,
            capital: self.capital,
            region: self.region,
            population: self.population,
            currency_code: self.currency_code,
            exchange_rate: self.exchange_rate,
            estimated_gdp: self.estimated_gdp,
            flag_url: self.flag_url,
            last_refreshed_at,
        })
    }
}

impl CountryStore {
    /// Create a store sharing the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Apply one refresh batch atomically.
    ///
    /// Every country is matched against existing rows by its lowercased name:
    /// misses insert, hits overwrite all fields while keeping the row id.
    /// The singleton status row is written in the same transaction, and the
    /// whole batch shares one timestamp. Any failure rolls everything back.
    #[instrument(skip(self, batch), fields(batch_size = batch.len()))]
    pub async fn apply_refresh(
        &self,
        batch: &[NewCountry],
        refreshed_at: OffsetDateTime,
    ) -> Result<(i64, OffsetDateTime), StoreError> {
        let stamp = format_timestamp(refreshed_at).map_err(StoreError::TimestampFormat)?;

        let mut tx = self.pool.begin().await.map_err(StoreError::Begin)?;

        for country in batch {
            let name_key = country.name.to_lowercase();

            let existing: Option<(i64,)> =
                sqlx::query_as("SELECT id FROM countries WHERE name_key = ?1")
                    .bind(&name_key)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(|cause| StoreError::Lookup {
                        name: country.name.clone(),
                        cause,
                    })?;

            match existing {
                None => {
                    sqlx::query(
                        "INSERT INTO countries (name, name_key, capital, region, population, \
                         currency_code, exchange_rate, estimated_gdp, flag_url, last_refreshed_at) \
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                    )
                    .bind(&country.name)
                    .bind(&name_key)
                    .bind(&country.capital)
                    .bind(&country.region)
                    .bind(country.population)
                    .bind(&country.currency_code)
                    .bind(country.exchange_rate)
                    .bind(country.estimated_gdp)
                    .bind(&country.flag_url)
                    .bind(&stamp)
                    .execute(&mut *tx)
                    .await
                    .map_err(|cause| StoreError::Insert {
                        name: country.name.clone(),
                        cause,
                    })?;
                }
                Some((id,)) => {
                    sqlx::query(
                        "UPDATE countries SET name = ?1, name_key = ?2, capital = ?3, \
                         region = ?4, population = ?5, currency_code = ?6, exchange_rate = ?7, \
                         estimated_gdp = ?8, flag_url = ?9, last_refreshed_at = ?10 \
                         WHERE id = ?11",
                    )
                    .bind(&country.name)
                    .bind(&name_key)
                    .bind(&country.capital)
                    .bind(&country.region)
                    .bind(country.population)
                    .bind(&country.currency_code)
                    .bind(country.exchange_rate)
                    .bind(country.estimated_gdp)
                    .bind(&country.flag_url)
                    .bind(&stamp)
                    .bind(id)
                    .execute(&mut *tx)
                    .await
                    .map_err(|cause| StoreError::Update {
                        name: country.name.clone(),
                        cause,
                    })?;
                }
            }
        }

        let total = batch.len() as i64;

        sqlx::query(
            "INSERT INTO refresh_status (id, total_countries, last_refreshed_at) \
             VALUES (1, ?1, ?2) \
             ON CONFLICT(id) DO UPDATE SET \
             total_countries = excluded.total_countries, \
             last_refreshed_at = excluded.last_refreshed_at",
        )
        .bind(total)
        .bind(&stamp)
        .execute(&mut *tx)
        .await
        .map_err(StoreError::Status)?;

        tx.commit().await.map_err(StoreError::Commit)?;

        Ok((total, refreshed_at))
    }

    /// List countries with optional case-insensitive filters and ordering.
    pub async fn list(&self, filter: &ListFilter) -> Result<Vec<Country>, StoreError> {
        let mut sql = String::from(SELECT_COLUMNS);

        let mut clauses = Vec::new();
        if filter.region.is_some() {
            clauses.push("LOWER(region) = ?");
        }
        if filter.currency.is_some() {
            clauses.push("LOWER(currency_code) = ?");
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY ");
        sql.push_str(filter.sort.order_clause());

        let mut query = sqlx::query_as::<_, CountryRow>(&sql);
        if let Some(region) = &filter.region {
            query = query.bind(region.to_lowercase());
        }
        if let Some(currency) = &filter.currency {
            query = query.bind(currency.to_lowercase());
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.into_iter().map(CountryRow::into_country).collect()
    }

    /// Look up a single country by name, case-insensitively.
    pub async fn get_by_name(&self, name: &str) -> Result<Option<Country>, StoreError> {
        let sql = format!("{} WHERE name_key = ?1", SELECT_COLUMNS);
        let row = sqlx::query_as::<_, CountryRow>(&sql)
            .bind(name.to_lowercase())
            .fetch_optional(&self.pool)
            .await?;

        row.map(CountryRow::into_country).transpose()
    }

    /// Delete a country by name, case-insensitively. Returns `false` when no
    /// row matched, which callers report as a distinct not-found condition.
    pub async fn delete(&self, name: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM countries WHERE name_key = ?1")
            .bind(name.to_lowercase())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Top `n` countries by estimated GDP, descending, nulls last.
    pub async fn top_by_gdp(&self, n: i64) -> Result<Vec<Country>, StoreError> {
        let sql = format!(
            "{} ORDER BY estimated_gdp DESC NULLS LAST LIMIT ?1",
            SELECT_COLUMNS
        );
        let rows = sqlx::query_as::<_, CountryRow>(&sql)
            .bind(n)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(CountryRow::into_country).collect()
    }
}
