//! HTTP API handlers.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::config::Config;
use crate::error::ServiceError;
use crate::fetch::ExternalClient;
use crate::model::{Country, RefreshStatus};
use crate::refresh;
use crate::store::{CountryStore, ListFilter, SortKey, StatusStore};
use crate::summary::SummaryRenderer;
use crate::utils::format_timestamp;

/// Application state shared with handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Country table access.
    pub countries: CountryStore,
    /// Status row access.
    pub status: StatusStore,
    /// External API client.
    pub fetcher: ExternalClient,
    /// Summary card renderer.
    pub renderer: Arc<SummaryRenderer>,
}

impl AppState {
    /// Wire up all components around one shared pool.
    pub fn new(pool: SqlitePool, config: &Config) -> Self {
        Self {
            countries: CountryStore::new(pool.clone()),
            status: StatusStore::new(pool),
            fetcher: ExternalClient::new(config),
            renderer: Arc::new(SummaryRenderer::new(config)),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: &'static str,
}

/// Response for a successful refresh.
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// Human-readable confirmation.
    pub message: &'static str,
    /// Countries written in this cycle.
    pub total_countries: i64,
    /// Shared batch timestamp.
    pub last_refreshed_at: String,
}

/// Response for a successful delete.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Human-readable confirmation.
    pub message: &'static str,
}

/// Query parameters accepted by the list endpoint.
#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
    /// Case-insensitive region filter.
    pub region: Option<String>,
    /// Case-insensitive currency filter.
    pub currency: Option<String>,
    /// Sort key; unknown values fall back to name_asc.
    pub sort: Option<String>,
}

/// Health check handler - always returns 200.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

/// POST /countries/refresh - run the full fetch+upsert cycle.
pub async fn refresh_countries(
    State(state): State<AppState>,
) -> Result<Json<RefreshResponse>, ServiceError> {
    let outcome = refresh::run_refresh(&state.fetcher, &state.countries, &state.renderer).await?;

    Ok(Json(RefreshResponse {
        message: "Countries refreshed successfully",
        total_countries: outcome.total,
        last_refreshed_at: format_timestamp(outcome.refreshed_at)?,
    }))
}

/// GET /countries - list with optional filters and sorting.
pub async fn list_countries(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Country>>, ServiceError> {
    let filter = ListFilter {
        region: params.region,
        currency: params.currency,
        sort: SortKey::parse(params.sort.as_deref()),
    };

    let countries = state.countries.list(&filter).await?;
    Ok(Json(countries))
}

/// GET /countries/:name - single lookup, case-insensitive.
pub async fn get_country(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Country>, ServiceError> {
    match state.countries.get_by_name(&name).await? {
        Some(country) => Ok(Json(country)),
        None => Err(ServiceError::NotFound {
            resource: "Country",
        }),
    }
}

/// DELETE /countries/:name - delete, case-insensitive; 404 when no row matched.
pub async fn delete_country(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<MessageResponse>, ServiceError> {
    if state.countries.delete(&name).await? {
        Ok(Json(MessageResponse {
            message: "Country deleted successfully",
        }))
    } else {
        Err(ServiceError::NotFound {
            resource: "Country",
        })
    }
}

/// GET /status - the singleton status row; always 200.
pub async fn get_status(
    State(state): State<AppState>,
) -> Result<Json<RefreshStatus>, ServiceError> {
    Ok(Json(state.status.get().await?))
}

/// GET /countries/image - serve the generated summary PNG.
pub async fn summary_image(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let path = state.renderer.image_path();

    match tokio::fs::read(&path).await {
        Ok(bytes) => Ok((
            StatusCode::OK,
            [(header::CONTENT_TYPE, "image/png")],
            bytes,
        )),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(ServiceError::NotFound {
            resource: "Summary image",
        }),
        Err(err) => Err(err.into()),
    }
}
