//! Present value and duration under a [`YieldCurve`].
//!
//! Bond duration here is a *modified* duration computed with a shortcut:
//! the Macaulay duration is divided by `1 + r(maturity / 2)`, the curve rate
//! at half the bond's life, rather than by one plus a solved
//! yield-to-maturity. The hedging strategies only compare durations across
//! bonds priced off the same curve, which this approximation serves well
//! enough, and it keeps valuation free of root-finding.
//!
//! Liability durations are plain Macaulay durations.

use crate::core::bond::Bond;
use crate::core::curve::YieldCurve;
use crate::core::liability::Liability;
use crate::pricing::cashflows::{cashflows, Cashflow};
use serde::{Deserialize, Serialize};

/// Discounted sum of a cashflow stream.
pub fn present_value<I>(cashflows: I, curve: &YieldCurve) -> f64
where
    I: IntoIterator<Item = Cashflow>,
{
    cashflows
        .into_iter()
        .map(|cf| cf.amount * curve.discount_factor(cf.time))
        .sum()
}

/// PV-weighted average payment time. Zero when the stream has no value.
pub fn macaulay_duration<I>(cashflows: I, curve: &YieldCurve) -> f64
where
    I: IntoIterator<Item = Cashflow>,
{
    let (pv, weighted_time) = cashflows
        .into_iter()
        .fold((0.0, 0.0), |(pv, weighted), cf| {
            let discounted = cf.amount * curve.discount_factor(cf.time);
            (pv + discounted, weighted + cf.time * discounted)
        });
    if pv == 0.0 {
        return 0.0;
    }
    weighted_time / pv
}

pub fn bond_present_value(bond: &Bond, curve: &YieldCurve) -> f64 {
    present_value(cashflows(bond), curve)
}

/// Modified duration of a bond (see the module docs for the yield used).
pub fn duration(bond: &Bond, curve: &YieldCurve) -> f64 {
    let macaulay = macaulay_duration(cashflows(bond), curve);
    if macaulay == 0.0 {
        return 0.0;
    }
    let representative_yield = curve.rate(bond.maturity_years() / 2.0);
    macaulay / (1.0 + representative_yield)
}

pub fn liability_present_value(liabilities: &[Liability], curve: &YieldCurve) -> f64 {
    present_value(liabilities.iter().map(Liability::cashflow), curve)
}

pub fn liability_duration(liabilities: &[Liability], curve: &YieldCurve) -> f64 {
    macaulay_duration(liabilities.iter().map(Liability::cashflow), curve)
}

/// Per-unit valuation of one bond, computed once per optimization run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BondMetrics {
    pub present_value: f64,
    /// Modified duration.
    pub duration: f64,
}

impl BondMetrics {
    pub fn of(bond: &Bond, curve: &YieldCurve) -> Self {
        Self {
            present_value: bond_present_value(bond, curve),
            duration: duration(bond, curve),
        }
    }
}

/// Metrics for every bond in the universe, in order.
pub fn bond_metrics(bonds: &[Bond], curve: &YieldCurve) -> Vec<BondMetrics> {
    bonds.iter().map(|b| BondMetrics::of(b, curve)).collect()
}

/// `Σ quantity_i * PV_i` over precomputed metrics.
pub fn holdings_present_value(metrics: &[BondMetrics], quantities: &[f64]) -> f64 {
    metrics
        .iter()
        .zip(quantities)
        .map(|(m, q)| q * m.present_value)
        .sum()
}

/// PV-weighted duration of the positive holdings. Zero for an empty or
/// worthless portfolio.
pub fn holdings_duration(metrics: &[BondMetrics], quantities: &[f64]) -> f64 {
    let pv = holdings_present_value(metrics, quantities);
    if pv <= 0.0 {
        return 0.0;
    }
    metrics
        .iter()
        .zip(quantities)
        .filter(|(_, q)| **q > 0.0)
        .map(|(m, q)| q * m.present_value * m.duration)
        .sum::<f64>()
        / pv
}

/// PV of holding `quantities[i]` units of `bonds[i]`.
pub fn portfolio_present_value(bonds: &[Bond], quantities: &[f64], curve: &YieldCurve) -> f64 {
    bonds
        .iter()
        .zip(quantities)
        .map(|(bond, q)| q * bond_present_value(bond, curve))
        .sum()
}

/// PV-weighted modified duration of a bond portfolio.
pub fn portfolio_duration(bonds: &[Bond], quantities: &[f64], curve: &YieldCurve) -> f64 {
    holdings_duration(&bond_metrics(bonds, curve), quantities)
}
