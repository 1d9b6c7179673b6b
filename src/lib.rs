//! # hedging-engine
//!
//! Liability hedging with fixed-rate coupon bonds.
//!
//! Given a schedule of future liabilities, a universe of bonds and a
//! zero-rate curve, this engine builds bond portfolios that hedge the
//! liabilities' interest-rate risk, either by matching their present value
//! and duration or by covering their payment dates at least cost.
//!
//! ## Architecture
//!
//! - **core**: Validated inputs: liabilities, bonds, the yield curve, scenarios
//! - **pricing**: Bond cashflow schedules, present value and duration
//! - **solvers**: SQP for smooth constrained problems, simplex for LPs
//! - **optimization**: Maturity bucketing, duration matching, cash-flow matching
//! - **simulation**: Rate sensitivity, portfolio comparison, random scenarios

pub mod core;
pub mod optimization;
pub mod pricing;
pub mod simulation;
pub mod solvers;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::core::bond::Bond;
    pub use crate::core::curve::YieldCurve;
    pub use crate::core::error::ValidationError;
    pub use crate::core::liability::Liability;
    pub use crate::core::scenario::Scenario;
    pub use crate::optimization::{
        build_initial_portfolio, cash_flow_matching, duration_matching, CoverageTarget,
        HedgeResult, HedgingError, HedgingOptimizer, OptimizerConfig, Strategy,
    };
    pub use crate::pricing::cashflows::{cashflows, Cashflow};
    pub use crate::pricing::valuation::{bond_present_value, duration, present_value};
}
