use crate::core::bond::Bond;
use crate::core::curve::YieldCurve;
use crate::core::liability::Liability;
use crate::core::scenario::Scenario;
use crate::optimization::bucketing::initial_portfolio;
use crate::optimization::cashflow::match_cash_flows;
use crate::optimization::config::OptimizerConfig;
use crate::optimization::duration::match_duration;
use crate::optimization::error::HedgingError;
use crate::optimization::result::{HedgeResult, Strategy};

/// Runs the hedging strategies against one borrowed market snapshot.
///
/// # Examples
///
/// ```
/// use hedging_engine::prelude::*;
///
/// let liabilities = vec![Liability::new(1.0, 1_000_000.0).unwrap()];
/// let bonds = vec![Bond::new(1.0, 0.0, 1000.0).unwrap()];
/// let curve = YieldCurve::new(vec![1.0, 5.0], vec![0.02, 0.03]).unwrap();
///
/// let optimizer = HedgingOptimizer::new(&liabilities, &bonds, &curve);
/// let result = optimizer.cash_flow_matching();
/// assert!(result.success);
/// assert!((result.quantities[0] - 1000.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct HedgingOptimizer<'a> {
    liabilities: &'a [Liability],
    bonds: &'a [Bond],
    curve: &'a YieldCurve,
    config: OptimizerConfig,
}

impl<'a> HedgingOptimizer<'a> {
    pub fn new(liabilities: &'a [Liability], bonds: &'a [Bond], curve: &'a YieldCurve) -> Self {
        Self {
            liabilities,
            bonds,
            curve,
            config: OptimizerConfig::default(),
        }
    }

    pub fn from_scenario(scenario: &'a Scenario) -> Self {
        Self::new(&scenario.liabilities, &scenario.bonds, &scenario.curve)
    }

    #[must_use]
    pub fn with_config(mut self, config: OptimizerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    pub fn build_initial_portfolio(&self) -> HedgeResult {
        initial_portfolio(self.liabilities, self.bonds, self.curve, &self.config)
    }

    pub fn duration_matching(&self) -> Result<HedgeResult, HedgingError> {
        match_duration(self.liabilities, self.bonds, self.curve, &self.config)
    }

    pub fn cash_flow_matching(&self) -> HedgeResult {
        match_cash_flows(self.liabilities, self.bonds, self.curve, &self.config)
    }

    /// Dispatch on `strategy`.
    pub fn run(&self, strategy: Strategy) -> Result<HedgeResult, HedgingError> {
        match strategy {
            Strategy::MaturityBucketing => Ok(self.build_initial_portfolio()),
            Strategy::DurationMatching => self.duration_matching(),
            Strategy::CashFlowMatching => Ok(self.cash_flow_matching()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::config::CoverageTarget;

    fn scenario() -> Scenario {
        Scenario::new(
            vec![
                Liability::new(1.0, 1_000_000.0).unwrap(),
                Liability::new(5.0, 2_000_000.0).unwrap(),
            ],
            vec![
                Bond::new(1.0, 0.02, 1000.0).unwrap(),
                Bond::new(5.0, 0.035, 1000.0).unwrap(),
            ],
            YieldCurve::new(vec![1.0, 2.0, 5.0, 10.0], vec![0.02, 0.025, 0.03, 0.035]).unwrap(),
        )
    }

    #[test]
    fn test_run_dispatches_every_strategy() {
        let scenario = scenario();
        let optimizer = HedgingOptimizer::from_scenario(&scenario);
        for strategy in Strategy::ALL {
            let result = optimizer.run(strategy).unwrap();
            assert_eq!(result.strategy, strategy);
            assert_eq!(result.quantities.len(), scenario.bonds.len());
        }
    }

    #[test]
    fn test_config_reaches_strategies() {
        let scenario = scenario();
        let aggregate = HedgingOptimizer::from_scenario(&scenario).cash_flow_matching();
        let per_date = HedgingOptimizer::from_scenario(&scenario)
            .with_config(OptimizerConfig {
                coverage_target: CoverageTarget::PerDate,
                ..Default::default()
            })
            .cash_flow_matching();

        assert!(aggregate.success && per_date.success);
        assert!(per_date.total_cost.unwrap() < aggregate.total_cost.unwrap());
    }
}
