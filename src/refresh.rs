//! The refresh pipeline: fetch both datasets, join them, estimate GDP and
//! hand the batch to the upsert engine. Runs synchronously inside the
//! triggering request and blocks until the transaction commits.

use std::time::Instant;

use rand::Rng;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::error::ServiceError;
use crate::fetch::{ExternalClient, RateTable, RawCountry};
use crate::gdp;
use crate::metrics;
use crate::model::NewCountry;
use crate::store::CountryStore;
use crate::summary::{SummaryRenderer, TOP_COUNT};
use crate::utils::now_utc_second;

/// What a successful refresh reports back.
#[derive(Debug, Clone, Copy)]
pub struct RefreshOutcome {
    /// Countries written in this cycle.
    pub total: i64,
    /// Shared batch timestamp.
    pub refreshed_at: OffsetDateTime,
}

/// Run one full refresh cycle.
///
/// Either external fetch failing aborts the cycle before anything is
/// written. The upsert is all-or-nothing; only the summary image is
/// best-effort.
pub async fn run_refresh(
    fetcher: &ExternalClient,
    countries: &CountryStore,
    renderer: &SummaryRenderer,
) -> Result<RefreshOutcome, ServiceError> {
    let started = Instant::now();

    let raw = match fetcher.fetch_countries().await {
        Ok(raw) => raw,
        Err(err) => {
            metrics::inc_fetch_failures(&err.origin);
            metrics::inc_refresh_failures();
            return Err(err.into());
        }
    };
    info!(count = raw.len(), "fetched countries from external API");

    let rates = match fetcher.fetch_rates().await {
        Ok(rates) => rates,
        Err(err) => {
            metrics::inc_fetch_failures(&err.origin);
            metrics::inc_refresh_failures();
            return Err(err.into());
        }
    };
    info!(count = rates.rates.len(), "fetched exchange rates from external API");

    let batch = {
        let mut rng = rand::thread_rng();
        build_batch(raw, &rates, &mut rng)
    };

    let refreshed_at = now_utc_second();
    let (total, refreshed_at) = match countries.apply_refresh(&batch, refreshed_at).await {
        Ok(result) => result,
        Err(err) => {
            metrics::inc_refresh_failures();
            return Err(err.into());
        }
    };

    metrics::inc_refresh_cycles();
    metrics::record_refresh_duration(started);
    info!(total, "countries refreshed");

    // Best-effort: a failed render never fails the refresh.
    match countries.top_by_gdp(TOP_COUNT as i64).await {
        Ok(top) => {
            if let Err(err) = renderer.generate(total, &top, refreshed_at) {
                warn!(error = %err, "failed to generate summary image");
            }
        }
        Err(err) => warn!(error = %err, "failed to fetch top countries for summary image"),
    }

    Ok(RefreshOutcome {
        total,
        refreshed_at,
    })
}

/// Join fetched countries against the rate table, drawing a fresh GDP
/// multiplier per country.
pub fn build_batch(
    raw: Vec<RawCountry>,
    rates: &RateTable,
    rng: &mut impl Rng,
) -> Vec<NewCountry> {
    raw.into_iter()
        .map(|country| {
            let estimate = gdp::estimate(
                country.population,
                country.first_currency_code(),
                &rates.rates,
                rng,
            );

            NewCountry {
                name: country.name,
                capital: country.capital,
                region: country.region,
                population: country.population.min(i64::MAX as u64) as i64,
                currency_code: estimate.currency_code,
                exchange_rate: estimate.exchange_rate,
                estimated_gdp: estimate.estimated_gdp,
                flag_url: country.flag,
            }
        })
        .collect()
}
