//! Duration matching: the least-concentrated long-only portfolio whose PV
//! and duration equal those of the liabilities.
//!
//! ```text
//! min   Σ x_i²
//! s.t.  (Σ x_i P_i − L) / L = 0
//!       Σ x_i P_i D_i / Σ x_i P_i − D_L = 0
//!       x ≥ 0
//! ```
//!
//! `P_i` and `D_i` are the bond PVs and modified durations, `L` and `D_L`
//! the liability PV and duration. The PV constraint is scaled by `L` so
//! both residuals are of order one.

use crate::core::bond::Bond;
use crate::core::curve::YieldCurve;
use crate::core::liability::Liability;
use crate::optimization::config::OptimizerConfig;
use crate::optimization::error::HedgingError;
use crate::optimization::result::{allocations, HedgeResult, Strategy};
use crate::pricing::valuation::{
    bond_metrics, holdings_duration, holdings_present_value, liability_duration,
    liability_present_value, BondMetrics,
};
use crate::solvers::sqp::{self, ConstrainedProblem};
use nalgebra::{DMatrix, DVector};

/// The duration-matching program over precomputed bond metrics.
#[derive(Debug, Clone)]
pub struct DurationMatchingProblem {
    present_values: DVector<f64>,
    durations: DVector<f64>,
    liability_pv: f64,
    liability_duration: f64,
}

impl DurationMatchingProblem {
    pub fn new(metrics: &[BondMetrics], liability_pv: f64, liability_duration: f64) -> Self {
        Self {
            present_values: DVector::from_iterator(
                metrics.len(),
                metrics.iter().map(|m| m.present_value),
            ),
            durations: DVector::from_iterator(metrics.len(), metrics.iter().map(|m| m.duration)),
            liability_pv,
            liability_duration,
        }
    }

    /// Equal units of every bond, scaled to the liability PV.
    pub fn initial_guess(&self) -> Vec<f64> {
        let total: f64 = self.present_values.sum();
        let level = if total > 0.0 {
            self.liability_pv / total
        } else {
            0.0
        };
        vec![level; self.present_values.len()]
    }

    /// `(Σ x P, Σ x P D)`
    fn moments(&self, x: &DVector<f64>) -> (f64, f64) {
        let pv = x.dot(&self.present_values);
        let weighted = x.component_mul(&self.present_values).dot(&self.durations);
        (pv, weighted)
    }
}

impl ConstrainedProblem for DurationMatchingProblem {
    fn dimension(&self) -> usize {
        self.present_values.len()
    }

    fn objective(&self, x: &DVector<f64>) -> f64 {
        x.norm_squared()
    }

    fn gradient(&self, x: &DVector<f64>) -> DVector<f64> {
        x * 2.0
    }

    fn constraints(&self, x: &DVector<f64>) -> DVector<f64> {
        let (pv, weighted) = self.moments(x);
        let pv_residual = (pv - self.liability_pv) / self.liability_pv;
        let duration_residual = if pv == 0.0 {
            0.0
        } else {
            weighted / pv - self.liability_duration
        };
        DVector::from_vec(vec![pv_residual, duration_residual])
    }

    fn jacobian(&self, x: &DVector<f64>) -> DMatrix<f64> {
        let n = self.dimension();
        let (pv, weighted) = self.moments(x);
        let mut jacobian = DMatrix::zeros(2, n);
        for i in 0..n {
            let p = self.present_values[i];
            jacobian[(0, i)] = p / self.liability_pv;
            if pv != 0.0 {
                jacobian[(1, i)] = p * (self.durations[i] - weighted / pv) / pv;
            }
        }
        jacobian
    }
}

/// Solve the duration-matching program.
///
/// Fails up front only when the liabilities are worth nothing. A solver
/// that does not converge is reported through `success = false`: the
/// quantities hold the last iterate, the portfolio PV and duration are zero
/// and no allocations are listed.
pub fn match_duration(
    liabilities: &[Liability],
    bonds: &[Bond],
    curve: &YieldCurve,
    config: &OptimizerConfig,
) -> Result<HedgeResult, HedgingError> {
    let target_pv = liability_present_value(liabilities, curve);
    if target_pv == 0.0 {
        return Err(HedgingError::ZeroLiabilityValue);
    }
    let target_duration = liability_duration(liabilities, curve);

    let metrics = bond_metrics(bonds, curve);
    let problem = DurationMatchingProblem::new(&metrics, target_pv, target_duration);
    let outcome = sqp::minimize(&problem, &problem.initial_guess(), &config.sqp);

    let success = outcome.converged();
    let (portfolio_pv, portfolio_duration, bond_allocations) = if success {
        (
            holdings_present_value(&metrics, &outcome.x),
            holdings_duration(&metrics, &outcome.x),
            allocations(bonds, &outcome.x, config.allocation_threshold),
        )
    } else {
        log::warn!("Duration matching optimization failed: {}", outcome.status);
        (0.0, 0.0, Vec::new())
    };
    log::debug!(
        "duration matching: {} after {} iterations, residual {:.3e}",
        outcome.status,
        outcome.iterations,
        outcome.constraint_violation
    );

    Ok(HedgeResult {
        strategy: Strategy::DurationMatching,
        quantities: outcome.x,
        success,
        message: outcome.status.to_string(),
        liability_pv: target_pv,
        liability_duration: target_duration,
        portfolio_pv,
        portfolio_duration,
        bond_allocations,
        total_cost: None,
    })
}
