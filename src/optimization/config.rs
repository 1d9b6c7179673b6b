use crate::solvers::simplex::SimplexConfig;
use crate::solvers::sqp::SqpConfig;
use serde::{Deserialize, Serialize};

/// What each row of the cash-flow matching LP must cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageTarget {
    /// Every liability date must receive at least the total of all liability
    /// amounts. Heavily over-collateralized but robust to any payment order.
    #[default]
    AggregateLiabilities,
    /// Each liability date must receive at least the liabilities due on it.
    PerDate,
}

/// Tunables shared by all strategies. Missing fields in a JSON config fall
/// back to these defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Width in years of the maturity buckets used by the initial heuristic.
    pub bucket_width: f64,
    /// Quantities at or below this are left out of `bond_allocations`.
    pub allocation_threshold: f64,
    pub coverage_target: CoverageTarget,
    pub sqp: SqpConfig,
    pub simplex: SimplexConfig,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            bucket_width: 2.0,
            allocation_threshold: 0.01,
            coverage_target: CoverageTarget::default(),
            sqp: SqpConfig::default(),
            simplex: SimplexConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: OptimizerConfig =
            serde_json::from_str(r#"{ "coverage_target": "per_date", "sqp": { "max_iterations": 50 } }"#)
                .unwrap();
        assert_eq!(config.coverage_target, CoverageTarget::PerDate);
        assert_eq!(config.sqp.max_iterations, 50);
        assert_eq!(config.sqp.tolerance, SqpConfig::default().tolerance);
        assert_eq!(config.bucket_width, 2.0);
        assert_eq!(config.simplex, SimplexConfig::default());
    }
}
