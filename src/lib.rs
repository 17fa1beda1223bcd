//! Country data aggregation service.
//!
//! This service pulls the public country registry and USD exchange rates on
//! demand, joins the two datasets by currency code, derives a synthetic
//! "estimated GDP" per country, and persists the whole batch atomically.
//! Reads, deletes, status and a rendered PNG summary card are exposed over
//! HTTP.
//!
//! # Refresh cycle
//!
//! ```text
//! POST /countries/refresh
//!   ├─ GET restcountries.com  (names, capitals, populations, currencies)
//!   ├─ GET open.er-api.com    (USD exchange rates)
//!   ├─ join by currency code, estimate GDP per country
//!   ├─ one transaction: upsert every country + the status row
//!   └─ best-effort: re-render cache/summary.png
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types and HTTP error mapping
//! - [`fetch`]: External API client (countries + exchange rates)
//! - [`gdp`]: Estimated-GDP computation
//! - [`model`]: Persisted entities and wire shapes
//! - [`store`]: SQLite-backed upsert engine, queries and status row
//! - [`refresh`]: The fetch → estimate → upsert pipeline
//! - [`summary`]: PNG summary card rendering
//! - [`api`]: HTTP routes and handlers
//! - [`metrics`]: Refresh counters and latency histograms
//! - [`utils`]: Timestamp formatting and shutdown handling

pub mod api;
pub mod config;
pub mod error;
pub mod fetch;
pub mod gdp;
pub mod metrics;
pub mod model;
pub mod refresh;
pub mod store;
pub mod summary;
pub mod utils;

pub use config::Config;
pub use error::{Result, ServiceError};
