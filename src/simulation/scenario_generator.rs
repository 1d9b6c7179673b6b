//! Random hedging scenarios for stress runs and benchmarks.
//!
//! Liabilities fall on distinct whole years and most bonds mature on whole
//! years too, so cash-flow matching usually has something to work with.

use crate::core::bond::Bond;
use crate::core::curve::YieldCurve;
use crate::core::error::ValidationError;
use crate::core::liability::Liability;
use crate::core::scenario::Scenario;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Curve pillars used by generated scenarios.
const CURVE_TIMES: [f64; 7] = [0.5, 1.0, 2.0, 5.0, 10.0, 20.0, 30.0];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Number of liabilities, capped at one per whole year of the horizon.
    pub liability_count: usize,
    pub bond_count: usize,
    /// Latest liability date in whole years.
    pub horizon_years: u32,
    pub min_liability: f64,
    pub max_liability: f64,
    /// Short end of the curve.
    pub base_rate: f64,
    /// Extra yield at the 30Y pillar over the short end.
    pub max_term_premium: f64,
    pub face_value: f64,
    /// Fixed seed for reproducible scenarios; fresh entropy when absent.
    pub seed: Option<u64>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            liability_count: 5,
            bond_count: 8,
            horizon_years: 10,
            min_liability: 100_000.0,
            max_liability: 5_000_000.0,
            base_rate: 0.02,
            max_term_premium: 0.02,
            face_value: 1000.0,
            seed: None,
        }
    }
}

/// Generate a random scenario.
///
/// Fails only when the configuration itself produces invalid values, e.g. a
/// non-positive face value or liability amount.
pub fn generate_random_scenario(config: &ScenarioConfig) -> Result<Scenario, ValidationError> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    // Upward-sloping curve with a little noise per pillar.
    let premium = rng.gen_range(0.0_f64..=config.max_term_premium.max(0.0));
    let rates = CURVE_TIMES
        .iter()
        .map(|&t| {
            let slope = premium * (t / 30.0).sqrt();
            let noise = rng.gen_range(-0.001_f64..0.001);
            (config.base_rate + slope + noise).max(0.0)
        })
        .collect();
    let curve = YieldCurve::new(CURVE_TIMES.to_vec(), rates)?;

    let mut years: Vec<u32> = (1..=config.horizon_years).collect();
    years.shuffle(&mut rng);
    years.truncate(config.liability_count);
    years.sort_unstable();

    let liabilities = years
        .into_iter()
        .map(|year| {
            let amount = if config.max_liability > config.min_liability {
                rng.gen_range(config.min_liability..config.max_liability)
            } else {
                config.min_liability
            };
            Liability::new(f64::from(year), amount.round())
        })
        .collect::<Result<Vec<_>, _>>()?;

    let longest = config.horizon_years.max(1) + 2;
    let bonds = (0..config.bond_count)
        .map(|i| {
            // Every fourth bond gets a half-year stub.
            let whole = rng.gen_range(1..=longest);
            let maturity = if i % 4 == 3 {
                f64::from(whole) - 0.5
            } else {
                f64::from(whole)
            };
            let coupon = (rng.gen_range(0.0_f64..0.06) * 400.0).round() / 400.0;
            Bond::new(maturity, coupon, config.face_value)
        })
        .collect::<Result<Vec<_>, _>>()?;

    log::debug!(
        "generated scenario: {} liabilities, {} bonds, curve {}",
        liabilities.len(),
        bonds.len(),
        curve
    );
    Ok(Scenario::new(liabilities, bonds, curve))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_scenario_shape() {
        let config = ScenarioConfig {
            liability_count: 4,
            bond_count: 6,
            seed: Some(7),
            ..Default::default()
        };
        let scenario = generate_random_scenario(&config).unwrap();

        assert_eq!(scenario.liabilities.len(), 4);
        assert_eq!(scenario.bonds.len(), 6);
        assert!(scenario.horizon() <= config.horizon_years as f64);
        let times: Vec<f64> = scenario.liabilities.iter().map(|l| l.time_years()).collect();
        assert!(times.windows(2).all(|w| w[0] < w[1]));
        assert!(scenario.curve.rates().iter().all(|r| *r >= 0.0));
    }

    #[test]
    fn test_seed_is_reproducible() {
        let config = ScenarioConfig {
            seed: Some(42),
            ..Default::default()
        };
        let a = generate_random_scenario(&config).unwrap();
        let b = generate_random_scenario(&config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_liability_count_capped_by_horizon() {
        let config = ScenarioConfig {
            liability_count: 50,
            horizon_years: 3,
            seed: Some(1),
            ..Default::default()
        };
        let scenario = generate_random_scenario(&config).unwrap();
        assert_eq!(scenario.liabilities.len(), 3);
    }

    #[test]
    fn test_generated_scenario_can_be_hedged() {
        use crate::optimization::HedgingOptimizer;

        let config = ScenarioConfig {
            seed: Some(2024),
            ..Default::default()
        };
        let scenario = generate_random_scenario(&config).unwrap();
        let result = HedgingOptimizer::from_scenario(&scenario).build_initial_portfolio();
        assert!(result.success);
        assert!((result.portfolio_pv - result.liability_pv).abs() <= 1e-6 * result.liability_pv);
    }
}
