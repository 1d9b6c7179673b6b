//! Cash-flow matching as a linear program.
//!
//! Every distinct liability date is a coverage row: the bonds' own payments
//! landing on exactly that date must add up to at least the required amount.
//! Among covering portfolios the cheapest one, valued off the curve, wins.

use crate::core::bond::Bond;
use crate::core::curve::YieldCurve;
use crate::core::liability::{total_amount, Liability};
use crate::optimization::config::{CoverageTarget, OptimizerConfig};
use crate::optimization::result::{allocations, HedgeResult, Strategy};
use crate::pricing::cashflows::cashflows;
use crate::pricing::valuation::{
    bond_metrics, holdings_duration, holdings_present_value, liability_duration,
    liability_present_value,
};
use crate::solvers::simplex::{LinearProgram, Relation};
use serde::{Deserialize, Serialize};

/// The constraint system `A x ≥ b` of the matching LP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageGrid {
    /// Distinct liability dates, ascending.
    pub times: Vec<f64>,
    /// `b`: cash required on each date.
    pub required: Vec<f64>,
    /// `A`: one row per date, one column per bond.
    pub coefficients: Vec<Vec<f64>>,
}

impl CoverageGrid {
    /// Cash the portfolio delivers on each grid date.
    pub fn coverage(&self, quantities: &[f64]) -> Vec<f64> {
        self.coefficients
            .iter()
            .map(|row| row.iter().zip(quantities).map(|(a, q)| a * q).sum())
            .collect()
    }

    /// Largest shortfall `b_t − (A x)_t`, or zero if every date is covered.
    pub fn max_shortfall(&self, quantities: &[f64]) -> f64 {
        self.coverage(quantities)
            .iter()
            .zip(&self.required)
            .map(|(have, need)| need - have)
            .fold(0.0, f64::max)
    }
}

pub fn build_coverage_grid(
    liabilities: &[Liability],
    bonds: &[Bond],
    target: CoverageTarget,
) -> CoverageGrid {
    let mut times: Vec<f64> = liabilities.iter().map(Liability::time_years).collect();
    times.sort_by(f64::total_cmp);
    times.dedup();

    let aggregate = total_amount(liabilities);
    let required = times
        .iter()
        .map(|&t| match target {
            CoverageTarget::AggregateLiabilities => aggregate,
            CoverageTarget::PerDate => liabilities
                .iter()
                .filter(|l| l.time_years() == t)
                .map(Liability::amount)
                .sum(),
        })
        .collect();

    let mut coefficients = vec![vec![0.0; bonds.len()]; times.len()];
    for (j, bond) in bonds.iter().enumerate() {
        for cf in cashflows(bond) {
            if let Ok(row) = times.binary_search_by(|t| t.total_cmp(&cf.time)) {
                coefficients[row][j] += cf.amount;
            }
        }
    }

    CoverageGrid {
        times,
        required,
        coefficients,
    }
}

/// Cheapest long-only portfolio covering every liability date.
///
/// Infeasible, unbounded or truncated programs give `success = false`, zero
/// quantities, a total cost of zero and no allocations.
pub fn match_cash_flows(
    liabilities: &[Liability],
    bonds: &[Bond],
    curve: &YieldCurve,
    config: &OptimizerConfig,
) -> HedgeResult {
    let metrics = bond_metrics(bonds, curve);
    let grid = build_coverage_grid(liabilities, bonds, config.coverage_target);

    let mut program = LinearProgram::new(metrics.iter().map(|m| m.present_value).collect());
    for (row, &need) in grid.coefficients.iter().zip(&grid.required) {
        program.add_constraint(row.clone(), Relation::GreaterEq, need);
    }
    let solution = program.solve(&config.simplex);

    let liability_pv = liability_present_value(liabilities, curve);
    let liability_duration = liability_duration(liabilities, curve);

    if !solution.is_optimal() {
        log::warn!("Cash flow matching optimization failed: {}", solution.status);
        return HedgeResult {
            strategy: Strategy::CashFlowMatching,
            quantities: vec![0.0; bonds.len()],
            success: false,
            message: solution.status.to_string(),
            liability_pv,
            liability_duration,
            portfolio_pv: 0.0,
            portfolio_duration: 0.0,
            bond_allocations: Vec::new(),
            total_cost: Some(0.0),
        };
    }

    log::debug!(
        "cash flow matching: {} dates, cost {:.2} after {} pivots",
        grid.times.len(),
        solution.objective_value,
        solution.iterations
    );
    HedgeResult {
        strategy: Strategy::CashFlowMatching,
        bond_allocations: allocations(bonds, &solution.x, config.allocation_threshold),
        portfolio_pv: holdings_present_value(&metrics, &solution.x),
        portfolio_duration: holdings_duration(&metrics, &solution.x),
        quantities: solution.x,
        success: true,
        message: solution.status.to_string(),
        liability_pv,
        liability_duration,
        total_cost: Some(solution.objective_value),
    }
}
