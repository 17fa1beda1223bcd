//! HTTP API route definitions.

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{
    delete_country, get_country, get_status, health, list_countries, refresh_countries,
    summary_image, AppState,
};

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/countries/refresh", axum::routing::post(refresh_countries))
        .route("/countries", get(list_countries))
        // Static route first; axum prefers it over the capture below.
        .route("/countries/image", get(summary_image))
        .route("/countries/:name", get(get_country).delete(delete_country))
        .route("/status", get(get_status))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
