//! Parallel-shift sensitivity of a hedge.
//!
//! A held portfolio and the liabilities are revalued under a set of parallel
//! curve shifts. A good hedge moves with the liabilities, so its tracking
//! error (asset PV change minus liability PV change, both relative to the
//! unshifted values) stays close to zero.

use crate::core::bond::Bond;
use crate::core::curve::YieldCurve;
use crate::core::liability::Liability;
use crate::pricing::valuation::{liability_present_value, portfolio_present_value};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensitivityPoint {
    /// Parallel shift applied to every curve rate, as a decimal.
    pub shift: f64,
    pub liability_pv: f64,
    pub asset_pv: f64,
    /// `asset_pv / liability_pv`, or 1 when the liabilities are worth nothing.
    pub hedge_ratio: f64,
    pub tracking_error: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityReport {
    pub base_liability_pv: f64,
    pub base_asset_pv: f64,
    pub points: Vec<SensitivityPoint>,
}

impl SensitivityReport {
    /// Hedge ratio on the unshifted curve.
    pub fn initial_hedge_ratio(&self) -> f64 {
        if self.base_liability_pv == 0.0 {
            return 1.0;
        }
        self.base_asset_pv / self.base_liability_pv
    }

    pub fn max_abs_tracking_error(&self) -> f64 {
        self.points
            .iter()
            .map(|p| p.tracking_error.abs())
            .fold(0.0, f64::max)
    }

    pub fn mean_abs_tracking_error(&self) -> f64 {
        if self.points.is_empty() {
            return 0.0;
        }
        self.points.iter().map(|p| p.tracking_error.abs()).sum::<f64>() / self.points.len() as f64
    }

    /// Population standard deviation of the tracking errors.
    pub fn tracking_error_std(&self) -> f64 {
        std_dev(self.points.iter().map(|p| p.tracking_error))
    }

    /// `1 − σ(tracking error) / σ(liability change)`: the share of the
    /// liabilities' rate risk the hedge removes.
    pub fn risk_reduction(&self) -> f64 {
        if self.base_liability_pv == 0.0 {
            return 0.0;
        }
        let liability_std = std_dev(
            self.points
                .iter()
                .map(|p| p.liability_pv / self.base_liability_pv - 1.0),
        );
        if liability_std == 0.0 {
            return 0.0;
        }
        1.0 - self.tracking_error_std() / liability_std
    }
}

impl fmt::Display for SensitivityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Sensitivity Analysis ===")?;
        writeln!(f, "Base Liability PV:   {:.2}", self.base_liability_pv)?;
        writeln!(f, "Base Asset PV:       {:.2}", self.base_asset_pv)?;
        writeln!(f, "Initial Hedge Ratio: {:.4}", self.initial_hedge_ratio())?;

        writeln!(f, "\n  Shift(bp)   Liability PV       Asset PV   Ratio  Tracking")?;
        for p in &self.points {
            writeln!(
                f,
                "  {:>9.0} {:>14.2} {:>14.2} {:>7.4} {:>8.3}%",
                p.shift * 10_000.0,
                p.liability_pv,
                p.asset_pv,
                p.hedge_ratio,
                p.tracking_error * 100.0
            )?;
        }

        writeln!(f, "\nTracking Error:")?;
        writeln!(f, "  Max Absolute:  {:.3}%", self.max_abs_tracking_error() * 100.0)?;
        writeln!(f, "  Mean Absolute: {:.3}%", self.mean_abs_tracking_error() * 100.0)?;
        writeln!(f, "  Std Dev:       {:.3}%", self.tracking_error_std() * 100.0)?;
        writeln!(f, "Risk Reduction:  {:.1}%", self.risk_reduction() * 100.0)?;
        Ok(())
    }
}

fn std_dev(values: impl Iterator<Item = f64> + Clone) -> f64 {
    let n = values.clone().count();
    if n == 0 {
        return 0.0;
    }
    let mean = values.clone().sum::<f64>() / n as f64;
    let variance = values.map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
    variance.sqrt()
}

/// `count` evenly spaced points from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            (0..count).map(|i| start + step * i as f64).collect()
        }
    }
}

/// Nine shifts from −200bp to +200bp.
pub fn default_shifts() -> Vec<f64> {
    linspace(-0.02, 0.02, 9)
}

/// Revalue `quantities` of `bonds` and the liabilities under each shift.
///
/// When the portfolio is worth nothing on the base curve its relative change
/// is taken as zero, so the tracking error is minus the liability change.
pub fn sensitivity_analysis(
    liabilities: &[Liability],
    bonds: &[Bond],
    quantities: &[f64],
    curve: &YieldCurve,
    shifts: &[f64],
) -> SensitivityReport {
    let base_liability_pv = liability_present_value(liabilities, curve);
    let base_asset_pv = portfolio_present_value(bonds, quantities, curve);

    let points = shifts
        .iter()
        .map(|&shift| {
            let shifted = curve.shift_parallel(shift);
            let liability_pv = liability_present_value(liabilities, &shifted);
            let asset_pv = portfolio_present_value(bonds, quantities, &shifted);

            if base_liability_pv == 0.0 {
                return SensitivityPoint {
                    shift,
                    liability_pv,
                    asset_pv,
                    hedge_ratio: 1.0,
                    tracking_error: 0.0,
                };
            }
            let hedge_ratio = if liability_pv == 0.0 {
                1.0
            } else {
                asset_pv / liability_pv
            };
            let liability_change = (liability_pv - base_liability_pv) / base_liability_pv;
            let asset_change = if base_asset_pv == 0.0 {
                0.0
            } else {
                (asset_pv - base_asset_pv) / base_asset_pv
            };
            SensitivityPoint {
                shift,
                liability_pv,
                asset_pv,
                hedge_ratio,
                tracking_error: asset_change - liability_change,
            }
        })
        .collect();

    SensitivityReport {
        base_liability_pv,
        base_asset_pv,
        points,
    }
}
