//! Naive maturity-bucketing portfolio, the baseline the optimizers are
//! compared against.

use crate::core::bond::Bond;
use crate::core::curve::YieldCurve;
use crate::core::liability::Liability;
use crate::optimization::config::OptimizerConfig;
use crate::optimization::result::{allocations, HedgeResult, Strategy};
use crate::pricing::valuation::{
    bond_metrics, holdings_duration, holdings_present_value, liability_duration,
    liability_present_value,
};
use std::collections::BTreeMap;

/// Index of the `width`-year bucket containing `t`.
fn bucket_of(t: f64, width: f64) -> i64 {
    (t / width).floor() as i64
}

/// Spread each liability bucket's PV over the bonds maturing in or next to
/// that bucket, then rescale so the whole portfolio is worth exactly the
/// liability PV. Buckets with no nearby bond draw on the whole universe.
///
/// Always reports success; with no bonds, or bonds worth nothing, the
/// quantities stay at zero.
pub fn initial_portfolio(
    liabilities: &[Liability],
    bonds: &[Bond],
    curve: &YieldCurve,
    config: &OptimizerConfig,
) -> HedgeResult {
    let width = config.bucket_width;
    let metrics = bond_metrics(bonds, curve);
    let target_pv = liability_present_value(liabilities, curve);

    let mut bucket_pvs: BTreeMap<i64, f64> = BTreeMap::new();
    for liability in liabilities {
        let pv = liability.amount() * curve.discount_factor(liability.time_years());
        *bucket_pvs
            .entry(bucket_of(liability.time_years(), width))
            .or_insert(0.0) += pv;
    }

    let mut quantities = vec![0.0; bonds.len()];
    for (&bucket, &bucket_pv) in &bucket_pvs {
        let mut candidates: Vec<usize> = bonds
            .iter()
            .enumerate()
            .filter(|(_, bond)| (bucket_of(bond.maturity_years(), width) - bucket).abs() <= 1)
            .map(|(i, _)| i)
            .collect();
        if candidates.is_empty() {
            candidates = (0..bonds.len()).collect();
        }

        let candidate_pv: f64 = candidates.iter().map(|&i| metrics[i].present_value).sum();
        if candidate_pv <= 0.0 {
            continue;
        }
        for &i in &candidates {
            let unit_pv = metrics[i].present_value;
            if unit_pv > 0.0 {
                quantities[i] += (bucket_pv * unit_pv / candidate_pv) / unit_pv;
            }
        }
    }

    let raw_pv = holdings_present_value(&metrics, &quantities);
    if raw_pv > 0.0 {
        let scale = target_pv / raw_pv;
        for q in &mut quantities {
            *q *= scale;
        }
    }

    let portfolio_pv = holdings_present_value(&metrics, &quantities);
    let portfolio_duration = holdings_duration(&metrics, &quantities);
    log::debug!(
        "maturity bucketing: {} buckets, portfolio PV {:.2} vs liability PV {:.2}",
        bucket_pvs.len(),
        portfolio_pv,
        target_pv
    );

    HedgeResult {
        strategy: Strategy::MaturityBucketing,
        bond_allocations: allocations(bonds, &quantities, config.allocation_threshold),
        quantities,
        success: true,
        message: "initial portfolio built by maturity bucketing".to_string(),
        liability_pv: target_pv,
        liability_duration: liability_duration(liabilities, curve),
        portfolio_pv,
        portfolio_duration,
        total_cost: None,
    }
}
