//! Estimated-GDP computation.
//!
//! The metric is synthetic and deliberately non-deterministic:
//! `population × U(1000, 2000) ÷ exchange_rate`, with the multiplier drawn
//! fresh per country on every refresh. The random source is injected so
//! tests can seed it; assertions should bound the result, not pin it.

use std::collections::HashMap;

use rand::Rng;

/// Lower bound of the random multiplier, inclusive.
pub const MULTIPLIER_MIN: u64 = 1000;
/// Upper bound of the random multiplier, inclusive.
pub const MULTIPLIER_MAX: u64 = 2000;

/// Outcome of joining one country against the exchange-rate table.
#[derive(Debug, Clone, PartialEq)]
pub struct GdpEstimate {
    /// Currency code carried through from the country record.
    pub currency_code: Option<String>,
    /// Rate from the table, when the code matched.
    pub exchange_rate: Option<f64>,
    /// The derived metric. `Some(0.0)` for currency-less countries,
    /// `None` when the currency had no rate.
    pub estimated_gdp: Option<f64>,
}

/// Join a country's population and first currency against the rate table.
///
/// Three cases, in order:
/// - currency and rate both present: rate kept, GDP computed;
/// - currency present, rate missing: code kept, rate and GDP null;
/// - no currency: everything null except GDP, which is exactly 0.0.
pub fn estimate(
    population: u64,
    currency_code: Option<&str>,
    rates: &HashMap<String, f64>,
    rng: &mut impl Rng,
) -> GdpEstimate {
    match currency_code {
        Some(code) => match rates.get(code) {
            Some(&rate) => {
                let multiplier = rng.gen_range(MULTIPLIER_MIN..=MULTIPLIER_MAX);
                GdpEstimate {
                    currency_code: Some(code.to_string()),
                    exchange_rate: Some(rate),
                    estimated_gdp: Some(population as f64 * multiplier as f64 / rate),
                }
            }
            None => GdpEstimate {
                currency_code: Some(code.to_string()),
                exchange_rate: None,
                estimated_gdp: None,
            },
        },
        None => GdpEstimate {
            currency_code: None,
            exchange_rate: None,
            estimated_gdp: Some(0.0),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rates() -> HashMap<String, f64> {
        HashMap::from([("USD".to_string(), 1.0), ("NGN".to_string(), 1600.0)])
    }

    #[test]
    fn matched_currency_keeps_exact_rate_and_bounds_gdp() {
        let mut rng = StdRng::seed_from_u64(7);
        let population = 5_000_000;

        let estimate = estimate(population, Some("NGN"), &rates(), &mut rng);

        assert_eq!(estimate.currency_code.as_deref(), Some("NGN"));
        assert_eq!(estimate.exchange_rate, Some(1600.0));

        let gdp = estimate.estimated_gdp.unwrap();
        let lower = population as f64 * MULTIPLIER_MIN as f64 / 1600.0;
        let upper = population as f64 * MULTIPLIER_MAX as f64 / 1600.0;
        assert!(gdp > 0.0);
        assert!((lower..=upper).contains(&gdp), "gdp {} outside [{}, {}]", gdp, lower, upper);
    }

    #[test]
    fn missing_rate_nulls_rate_and_gdp_but_keeps_code() {
        let mut rng = StdRng::seed_from_u64(7);
        let estimate = estimate(1_000, Some("XYZ"), &rates(), &mut rng);

        assert_eq!(estimate.currency_code.as_deref(), Some("XYZ"));
        assert_eq!(estimate.exchange_rate, None);
        assert_eq!(estimate.estimated_gdp, None);
    }

    #[test]
    fn no_currency_yields_exact_zero_gdp() {
        let mut rng = StdRng::seed_from_u64(7);
        let estimate = estimate(1_000, None, &rates(), &mut rng);

        assert_eq!(estimate.currency_code, None);
        assert_eq!(estimate.exchange_rate, None);
        assert_eq!(estimate.estimated_gdp, Some(0.0));
    }

    #[test]
    fn multiplier_is_redrawn_per_country() {
        // Ten draws from the same RNG cannot all land on the same multiplier.
        let mut rng = StdRng::seed_from_u64(42);
        let draws: Vec<Option<f64>> = (0..10)
            .map(|_| estimate(1_000_000, Some("USD"), &rates(), &mut rng).estimated_gdp)
            .collect();
        assert!(draws.iter().any(|gdp| *gdp != draws[0]));
    }

    #[test]
    fn zero_population_yields_zero_gdp_when_rate_matches() {
        let mut rng = StdRng::seed_from_u64(7);
        let estimate = estimate(0, Some("USD"), &rates(), &mut rng);
        assert_eq!(estimate.estimated_gdp, Some(0.0));
        assert_eq!(estimate.exchange_rate, Some(1.0));
    }
}
