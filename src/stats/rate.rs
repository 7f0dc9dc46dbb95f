//! Crime rate and its bounded color scale.

use serde::Serialize;
use statrs::statistics::{Data, OrderStatistics};

/// Percentile used as the scale's upper bound when none is configured.
pub const SCALE_PERCENTILE: usize = 95;

/// Facts per 100 inhabitants.
///
/// `None` for an absent or zero population; never infinite or NaN.
pub fn crime_rate(facts: u64, population: Option<f64>) -> Option<f64> {
    let population = population.filter(|p| p.is_finite() && *p > 0.0)?;
    let rate = facts as f64 / population * 100.0;
    rate.is_finite().then_some(rate)
}

/// Linear scale from `min` to `max` used by the rate map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RateScale {
    pub min: f64,
    pub max: f64,
}

/// A rate placed on a [`RateScale`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScaledRate {
    pub rate: Option<f64>,
    /// Position in `[0, 1]`; `None` for a missing rate.
    pub position: Option<f64>,
    /// The rate was above the scale and was drawn at the upper bound.
    pub clamped: bool,
}

impl RateScale {
    /// Scale with a configured upper bound.
    pub fn fixed(max: f64) -> Self {
        let max = if max.is_finite() && max > 0.0 { max } else { 1.0 };
        Self { min: 0.0, max }
    }

    /// Scale whose upper bound is the 95th percentile of the finite rates,
    /// falling back to the maximum, then to 1.
    pub fn from_rates(rates: &[f64]) -> Self {
        let finite: Vec<f64> = rates
            .iter()
            .copied()
            .filter(|r| r.is_finite() && *r >= 0.0)
            .collect();
        if finite.is_empty() {
            return Self::fixed(1.0);
        }

        let observed_max = finite.iter().copied().fold(0.0_f64, f64::max);
        let percentile = Data::new(finite).percentile(SCALE_PERCENTILE);

        let max = if percentile.is_finite() && percentile > 0.0 {
            percentile
        } else {
            observed_max
        };
        Self::fixed(max)
    }

    pub fn place(&self, rate: Option<f64>) -> ScaledRate {
        let Some(rate) = rate.filter(|r| r.is_finite()) else {
            return ScaledRate {
                rate: None,
                position: None,
                clamped: false,
            };
        };

        let span = self.max - self.min;
        let clamped = rate > self.max;
        let position = ((rate - self.min) / span).clamp(0.0, 1.0);

        ScaledRate {
            rate: Some(rate),
            position: Some(position),
            clamped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rate_is_percentage_of_population() {
        assert_relative_eq!(crime_rate(5, Some(1000.0)).unwrap(), 0.5);
        assert_relative_eq!(crime_rate(0, Some(10.0)).unwrap(), 0.0);
    }

    #[test]
    fn zero_or_missing_population_is_missing() {
        assert_eq!(crime_rate(12, Some(0.0)), None);
        assert_eq!(crime_rate(12, None), None);
        assert_eq!(crime_rate(12, Some(f64::NAN)), None);
    }

    #[test]
    fn out_of_range_rates_are_clamped_and_flagged() {
        let scale = RateScale::fixed(0.6);
        let inside = scale.place(Some(0.3));
        assert_relative_eq!(inside.position.unwrap(), 0.5);
        assert!(!inside.clamped);

        let spike = scale.place(Some(12.0));
        assert_eq!(spike.position, Some(1.0));
        assert!(spike.clamped);
        assert_eq!(spike.rate, Some(12.0));
    }

    #[test]
    fn missing_rate_has_no_position() {
        let scale = RateScale::fixed(2.0);
        let missing = scale.place(None);
        assert_eq!(missing.position, None);
        assert!(!missing.clamped);
    }

    #[test]
    fn scale_bound_comes_from_data() {
        let scale = RateScale::from_rates(&[0.1, 0.2, 0.3, f64::INFINITY]);
        assert!(scale.max > 0.0);
        assert!(scale.max <= 0.3 + 1e-12);

        assert_eq!(RateScale::from_rates(&[]).max, 1.0);
        assert_eq!(RateScale::from_rates(&[0.0, 0.0]).max, 1.0);
        assert_eq!(RateScale::fixed(-1.0).max, 1.0);
    }
}
