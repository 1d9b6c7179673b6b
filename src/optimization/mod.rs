//! Hedging strategies: the maturity-bucketing baseline, duration matching
//! and cash-flow matching.
//!
//! The free functions run a strategy with [`OptimizerConfig::default`];
//! use [`HedgingOptimizer`] to run them with a custom configuration.

pub mod bucketing;
pub mod cashflow;
pub mod config;
pub mod duration;
pub mod error;
pub mod optimizer;
pub mod result;

pub use config::{CoverageTarget, OptimizerConfig};
pub use error::HedgingError;
pub use optimizer::HedgingOptimizer;
pub use result::{BondAllocation, HedgeResult, Strategy};

use crate::core::bond::Bond;
use crate::core::curve::YieldCurve;
use crate::core::liability::Liability;

pub fn build_initial_portfolio(
    liabilities: &[Liability],
    bonds: &[Bond],
    curve: &YieldCurve,
) -> HedgeResult {
    bucketing::initial_portfolio(liabilities, bonds, curve, &OptimizerConfig::default())
}

pub fn duration_matching(
    liabilities: &[Liability],
    bonds: &[Bond],
    curve: &YieldCurve,
) -> Result<HedgeResult, HedgingError> {
    duration::match_duration(liabilities, bonds, curve, &OptimizerConfig::default())
}

pub fn cash_flow_matching(
    liabilities: &[Liability],
    bonds: &[Bond],
    curve: &YieldCurve,
) -> HedgeResult {
    cashflow::match_cash_flows(liabilities, bonds, curve, &OptimizerConfig::default())
}
