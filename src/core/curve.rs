use crate::core::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A zero-rate term structure with linear interpolation and continuous
/// compounding.
///
/// Rates between pillars are interpolated linearly; outside the pillar range
/// the nearest boundary rate is used (flat extrapolation). The pillar vectors
/// are fixed at construction: every transform returns a new curve.
///
/// # Examples
///
/// ```
/// use hedging_engine::core::curve::YieldCurve;
///
/// let curve = YieldCurve::new(vec![1.0, 2.0, 5.0], vec![0.02, 0.025, 0.03]).unwrap();
/// assert!((curve.rate(1.5) - 0.0225).abs() < 1e-12);
/// assert_eq!(curve.rate(30.0), 0.03);
///
/// let up = curve.shift_parallel(0.01);
/// assert!((up.rate(1.0) - 0.03).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CurveRecord")]
pub struct YieldCurve {
    times: Vec<f64>,
    rates: Vec<f64>,
}

#[derive(Deserialize)]
struct CurveRecord {
    times: Vec<f64>,
    rates: Vec<f64>,
}

impl TryFrom<CurveRecord> for YieldCurve {
    type Error = ValidationError;

    fn try_from(record: CurveRecord) -> Result<Self, Self::Error> {
        YieldCurve::new(record.times, record.rates)
    }
}

impl YieldCurve {
    /// Build a curve from pillar times (strictly ascending) and rates.
    pub fn new(times: Vec<f64>, rates: Vec<f64>) -> Result<Self, ValidationError> {
        if times.len() != rates.len() {
            return Err(ValidationError::LengthMismatch {
                times: times.len(),
                rates: rates.len(),
            });
        }
        if times.is_empty() {
            return Err(ValidationError::EmptyCurve);
        }
        if times.iter().any(|t| !t.is_finite()) {
            return Err(ValidationError::NonFinite { field: "times" });
        }
        if rates.iter().any(|r| !r.is_finite()) {
            return Err(ValidationError::NonFinite { field: "rates" });
        }
        if let Some(index) = times.windows(2).position(|w| w[0] >= w[1]) {
            return Err(ValidationError::TimesNotAscending { index: index + 1 });
        }
        Ok(Self { times, rates })
    }

    /// Annual zero rate at time `t`.
    pub fn rate(&self, t: f64) -> f64 {
        let last = self.times.len() - 1;
        if t <= self.times[0] {
            return self.rates[0];
        }
        if t >= self.times[last] {
            return self.rates[last];
        }
        // First pillar strictly after t; lies in 1..=last given the checks above.
        let i = self.times.partition_point(|&x| x <= t);
        let (t0, t1) = (self.times[i - 1], self.times[i]);
        let (r0, r1) = (self.rates[i - 1], self.rates[i]);
        r0 + (t - t0) / (t1 - t0) * (r1 - r0)
    }

    /// Continuously-compounded discount factor `exp(-r(t) * t)`.
    pub fn discount_factor(&self, t: f64) -> f64 {
        (-self.rate(t) * t).exp()
    }

    /// A new curve with every rate moved by `delta` (0.0001 = 1bp).
    #[must_use]
    pub fn shift_parallel(&self, delta: f64) -> YieldCurve {
        YieldCurve {
            times: self.times.clone(),
            rates: self.rates.iter().map(|r| r + delta).collect(),
        }
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn rates(&self) -> &[f64] {
        &self.rates
    }

    /// Number of pillars.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

impl fmt::Display for YieldCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pillars: Vec<String> = self
            .times
            .iter()
            .zip(&self.rates)
            .map(|(t, r)| format!("{}Y={:.3}%", t, r * 100.0))
            .collect();
        write!(f, "YieldCurve[{}]", pillars.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample_curve() -> YieldCurve {
        YieldCurve::new(vec![1.0, 2.0, 5.0], vec![0.02, 0.025, 0.03]).unwrap()
    }

    #[test]
    fn test_mismatched_lengths_rejected() {
        assert_eq!(
            YieldCurve::new(vec![1.0, 2.0, 5.0], vec![0.02, 0.025]),
            Err(ValidationError::LengthMismatch { times: 3, rates: 2 })
        );
    }

    #[test]
    fn test_non_ascending_rejected() {
        assert_eq!(
            YieldCurve::new(vec![1.0, 5.0, 2.0], vec![0.02, 0.03, 0.025]),
            Err(ValidationError::TimesNotAscending { index: 2 })
        );
        assert!(YieldCurve::new(vec![1.0, 1.0], vec![0.02, 0.03]).is_err());
    }

    #[test]
    fn test_empty_rejected() {
        assert_eq!(
            YieldCurve::new(vec![], vec![]),
            Err(ValidationError::EmptyCurve)
        );
    }

    #[test]
    fn test_interpolation_at_pillars() {
        let curve = sample_curve();
        assert_eq!(curve.rate(1.0), 0.02);
        assert_eq!(curve.rate(2.0), 0.025);
        assert_eq!(curve.rate(5.0), 0.03);
    }

    #[test]
    fn test_interpolation_between_pillars() {
        let curve = sample_curve();
        assert_relative_eq!(curve.rate(1.5), 0.0225, epsilon = 1e-12);
        assert_relative_eq!(curve.rate(3.5), 0.0275, epsilon = 1e-12);
    }

    #[test]
    fn test_flat_extrapolation() {
        let curve = sample_curve();
        assert_eq!(curve.rate(0.25), 0.02);
        assert_eq!(curve.rate(0.0), 0.02);
        assert_eq!(curve.rate(40.0), 0.03);
    }

    #[test]
    fn test_single_pillar_is_flat() {
        let curve = YieldCurve::new(vec![3.0], vec![0.04]).unwrap();
        assert_eq!(curve.rate(0.5), 0.04);
        assert_eq!(curve.rate(10.0), 0.04);
    }

    #[test]
    fn test_discount_factor() {
        let curve = sample_curve();
        assert_eq!(curve.discount_factor(0.0), 1.0);
        assert_relative_eq!(curve.discount_factor(1.0), (-0.02f64).exp(), epsilon = 1e-15);
        assert!(curve.discount_factor(5.0) < curve.discount_factor(1.0));
    }

    #[test]
    fn test_parallel_shift_returns_new_curve() {
        let curve = sample_curve();
        let shifted = curve.shift_parallel(0.01);
        assert_relative_eq!(shifted.rate(1.0), 0.03, epsilon = 1e-12);
        assert_relative_eq!(shifted.rate(2.0), 0.035, epsilon = 1e-12);
        assert_relative_eq!(shifted.rate(5.0), 0.04, epsilon = 1e-12);
        assert_eq!(shifted.times(), curve.times());
        // Original untouched
        assert_eq!(curve.rate(1.0), 0.02);
    }

    #[test]
    fn test_json_validation() {
        let curve: YieldCurve =
            serde_json::from_str(r#"{"times": [1, 2], "rates": [0.01, 0.02]}"#).unwrap();
        assert_eq!(curve.len(), 2);
        assert!(serde_json::from_str::<YieldCurve>(r#"{"times": [2, 1], "rates": [0.01, 0.02]}"#)
            .is_err());
    }
}
