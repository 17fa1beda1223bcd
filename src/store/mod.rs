//! SQLite-backed persistence: pool bootstrap, schema, upsert engine and
//! read-side queries.

pub mod countries;
pub mod status;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::config::Config;

pub use countries::{CountryStore, ListFilter, SortKey};
pub use status::StatusStore;

/// Embedded schema, applied idempotently at startup.
const SCHEMA: &str = include_str!("schema.sql");

/// Open the connection pool and apply the schema.
pub async fn connect(config: &Config) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect_with(options)
        .await?;

    migrate(&pool).await?;

    tracing::info!(url = %config.database_url, "database connected");
    Ok(pool)
}

/// Apply the embedded schema statement by statement. A prepared statement
/// holds exactly one SQL statement, so the file is split on `;`.
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for statement in schema_statements(SCHEMA) {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

fn schema_statements(schema: &str) -> Vec<&str> {
    schema
        .split(';')
        .filter_map(|statement| {
            let trimmed = statement.trim();
            if trimmed.is_empty() {
                return None;
            }
            let has_sql = trimmed.lines().any(|line| {
                let line = line.trim();
                !line.is_empty() && !line.starts_with("--")
            });
            has_sql.then_some(trimmed)
        })
        .collect()
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    migrate(&pool).await.expect("schema applies");
    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_splits_into_statements() {
        let statements = schema_statements(SCHEMA);
        assert_eq!(statements.len(), 4);
        assert!(statements[0].contains("CREATE TABLE IF NOT EXISTS countries"));
        assert!(statements[3].contains("refresh_status"));
    }

    #[test]
    fn comment_only_chunks_are_dropped() {
        let statements = schema_statements("-- nothing here\n;\nCREATE TABLE t (x INTEGER);");
        assert_eq!(statements.len(), 1);
    }

    #[tokio::test]
    async fn migrate_is_idempotent() {
        let pool = test_pool().await;
        migrate(&pool).await.expect("second run succeeds");
    }
}
