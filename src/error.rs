//! Unified error types and their HTTP mapping.
//!
//! The taxonomy is deliberately small: external fetch failures surface as
//! 503, missing rows as 404, everything else as a generic 500. Internal
//! detail is logged, never sent to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Unified error type for the service.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// External API fetch error.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A requested row does not exist.
    #[error("{resource} not found")]
    NotFound {
        /// Human-readable resource name ("Country", "Summary image", ...).
        resource: &'static str,
    },

    /// Persistence error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Raw database error outside the store's wrapped paths.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Summary image rendering error.
    #[error("summary image error: {0}")]
    Summary(#[from] SummaryError),

    /// Timestamp formatting error.
    #[error("time formatting error: {0}")]
    TimeFormat(#[from] time::error::Format),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, ServiceError>;

/// External API fetch failure, tagged with the upstream it came from.
#[derive(Error, Debug)]
#[error("{origin} API failed: {cause}")]
pub struct FetchError {
    /// Upstream host ("restcountries.com", "open.er-api.com").
    pub origin: String,
    /// What went wrong.
    #[source]
    pub cause: FetchCause,
}

/// The three ways an external fetch can fail. No retries: any of these
/// aborts the whole refresh cycle.
#[derive(Error, Debug)]
pub enum FetchCause {
    /// Transport-level failure (DNS, connect, timeout).
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// Upstream answered with a non-2xx status.
    #[error("unexpected status {status}: {body}")]
    Status {
        /// HTTP status returned by the upstream.
        status: StatusCode,
        /// Response body, captured for the log.
        body: String,
    },

    /// Body could not be decoded into the expected JSON shape.
    #[error("decode error: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Persistence errors, each naming the country or step that failed.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Transaction could not be opened.
    #[error("failed to begin transaction: {0}")]
    Begin(#[source] sqlx::Error),

    /// Existing-row lookup failed for a country.
    #[error("failed to look up country {name}: {cause}")]
    Lookup {
        /// Country being refreshed.
        name: String,
        /// Underlying database error.
        #[source]
        cause: sqlx::Error,
    },

    /// Insert failed for a country.
    #[error("failed to insert country {name}: {cause}")]
    Insert {
        /// Country being refreshed.
        name: String,
        /// Underlying database error.
        #[source]
        cause: sqlx::Error,
    },

    /// Update failed for a country.
    #[error("failed to update country {name}: {cause}")]
    Update {
        /// Country being refreshed.
        name: String,
        /// Underlying database error.
        #[source]
        cause: sqlx::Error,
    },

    /// The singleton status row could not be written.
    #[error("failed to write refresh status: {0}")]
    Status(#[source] sqlx::Error),

    /// Commit failed.
    #[error("failed to commit refresh: {0}")]
    Commit(#[source] sqlx::Error),

    /// Read-side query failed.
    #[error("query failed: {0}")]
    Query(#[from] sqlx::Error),

    /// A stored timestamp did not round-trip.
    #[error("invalid stored timestamp {value}: {cause}")]
    Timestamp {
        /// The offending column value.
        value: String,
        /// Parse failure.
        #[source]
        cause: time::error::Parse,
    },

    /// A timestamp could not be rendered for storage.
    #[error("failed to format timestamp: {0}")]
    TimestampFormat(#[source] time::error::Format),
}

/// Summary card rendering errors. Always best-effort: the refresh pipeline
/// logs these and reports success regardless.
#[derive(Error, Debug)]
pub enum SummaryError {
    /// No usable TrueType font on this host.
    #[error("no usable font found; set FONT_PATH or install DejaVu Sans")]
    FontUnavailable,

    /// A font file existed but could not be parsed.
    #[error("failed to parse font {path}")]
    FontInvalid {
        /// Path of the rejected font file.
        path: String,
    },

    /// Cache directory could not be created.
    #[error("failed to create cache directory {path}: {cause}")]
    CacheDir {
        /// Directory that failed.
        path: String,
        /// Underlying IO error.
        #[source]
        cause: std::io::Error,
    },

    /// PNG encode/write failure.
    #[error("failed to write summary image: {0}")]
    Write(#[from] image::ImageError),
}

/// Wire shape for error responses: `{"error": "...", "details": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Short, client-safe message.
    pub error: String,
    /// Optional extra context, also client-safe.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ServiceError::Fetch(err) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorBody {
                    error: "External data source unavailable".to_string(),
                    details: Some(format!("Could not fetch data from {}", err.origin)),
                },
            ),
            ServiceError::NotFound { resource } => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    error: format!("{} not found", resource),
                    details: None,
                },
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    error: "Internal server error".to_string(),
                    details: None,
                },
            ),
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "internal server error");
        } else {
            tracing::warn!(error = %self, status = %status, "request failed");
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_errors_map_to_503() {
        let err = ServiceError::Fetch(FetchError {
            origin: "restcountries.com".to_string(),
            cause: FetchCause::Status {
                status: StatusCode::BAD_GATEWAY,
                body: "upstream down".to_string(),
            },
        });

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn not_found_maps_to_404() {
        let err = ServiceError::NotFound { resource: "Country" };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn store_errors_map_to_500() {
        let err = ServiceError::Store(StoreError::Begin(sqlx::Error::PoolClosed));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn fetch_error_names_the_upstream() {
        let err = FetchError {
            origin: "open.er-api.com".to_string(),
            cause: FetchCause::Status {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: String::new(),
            },
        };
        assert!(err.to_string().contains("open.er-api.com"));
    }
}
