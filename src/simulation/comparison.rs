use crate::core::bond::Bond;
use crate::core::curve::YieldCurve;
use crate::core::liability::Liability;
use crate::pricing::cashflows::{cashflows, Cashflow};
use crate::pricing::valuation::{
    bond_metrics, holdings_duration, holdings_present_value, liability_duration,
    liability_present_value,
};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioMetrics {
    pub present_value: f64,
    pub duration: f64,
}

/// An initial and an optimized portfolio measured against the same
/// liability targets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioComparison {
    pub liability_pv: f64,
    pub liability_duration: f64,
    pub initial: PortfolioMetrics,
    pub optimized: PortfolioMetrics,
}

impl PortfolioComparison {
    pub fn new(
        liabilities: &[Liability],
        bonds: &[Bond],
        initial_quantities: &[f64],
        optimized_quantities: &[f64],
        curve: &YieldCurve,
    ) -> Self {
        let metrics = bond_metrics(bonds, curve);
        let measure = |quantities: &[f64]| PortfolioMetrics {
            present_value: holdings_present_value(&metrics, quantities),
            duration: holdings_duration(&metrics, quantities),
        };
        Self {
            liability_pv: liability_present_value(liabilities, curve),
            liability_duration: liability_duration(liabilities, curve),
            initial: measure(initial_quantities),
            optimized: measure(optimized_quantities),
        }
    }

    /// Absolute PV mismatch as a percentage of the liability PV.
    pub fn pv_error_percent(&self, portfolio: &PortfolioMetrics) -> f64 {
        if self.liability_pv == 0.0 {
            return 0.0;
        }
        (portfolio.present_value - self.liability_pv).abs() / self.liability_pv * 100.0
    }

    /// Absolute duration mismatch in years.
    pub fn duration_error(&self, portfolio: &PortfolioMetrics) -> f64 {
        (portfolio.duration - self.liability_duration).abs()
    }

    /// Percentage reduction of the PV error. `None` if the initial portfolio
    /// already had none.
    pub fn pv_improvement(&self) -> Option<f64> {
        improvement(
            self.pv_error_percent(&self.initial),
            self.pv_error_percent(&self.optimized),
        )
    }

    pub fn duration_improvement(&self) -> Option<f64> {
        improvement(
            self.duration_error(&self.initial),
            self.duration_error(&self.optimized),
        )
    }
}

fn improvement(initial: f64, optimized: f64) -> Option<f64> {
    (initial > 0.0).then(|| (initial - optimized) / initial * 100.0)
}

impl fmt::Display for PortfolioComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Portfolio Comparison ===")?;
        writeln!(f, "                  Initial       Optimized     Target")?;
        writeln!(
            f,
            "Present Value:    {:<13.2} {:<13.2} {:.2}",
            self.initial.present_value, self.optimized.present_value, self.liability_pv
        )?;
        writeln!(
            f,
            "Duration:         {:<13.4} {:<13.4} {:.4}",
            self.initial.duration, self.optimized.duration, self.liability_duration
        )?;
        writeln!(
            f,
            "PV Error (%):     {:<13.4} {:.4}",
            self.pv_error_percent(&self.initial),
            self.pv_error_percent(&self.optimized)
        )?;
        writeln!(
            f,
            "Duration Error:   {:<13.4} {:.4}",
            self.duration_error(&self.initial),
            self.duration_error(&self.optimized)
        )?;
        if let Some(pct) = self.duration_improvement() {
            writeln!(f, "Duration Improvement: {:.0}%", pct)?;
        }
        Ok(())
    }
}

/// Liability amounts summed per payment date, ascending.
pub fn liability_profile(liabilities: &[Liability]) -> Vec<Cashflow> {
    aggregate(liabilities.iter().map(Liability::cashflow).collect())
}

/// Cash delivered by holding `quantities[i]` units of `bonds[i]`, summed per
/// payment date, ascending. Zero holdings contribute nothing.
pub fn cashflow_profile(bonds: &[Bond], quantities: &[f64]) -> Vec<Cashflow> {
    let flows = bonds
        .iter()
        .zip(quantities)
        .filter(|(_, q)| **q != 0.0)
        .flat_map(|(bond, &q)| cashflows(bond).map(move |cf| Cashflow::new(cf.time, cf.amount * q)))
        .collect();
    aggregate(flows)
}

fn aggregate(mut flows: Vec<Cashflow>) -> Vec<Cashflow> {
    flows.sort_by(|a, b| a.time.total_cmp(&b.time));
    let mut merged: Vec<Cashflow> = Vec::with_capacity(flows.len());
    for cf in flows {
        match merged.last_mut() {
            Some(last) if last.time == cf.time => last.amount += cf.amount,
            _ => merged.push(cf),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::{build_initial_portfolio, duration_matching};

    fn curve() -> YieldCurve {
        YieldCurve::new(vec![1.0, 2.0, 5.0, 10.0], vec![0.02, 0.025, 0.03, 0.035]).unwrap()
    }

    #[test]
    fn test_profiles_aggregate_by_date() {
        let liabilities = vec![
            Liability::new(2.0, 100.0).unwrap(),
            Liability::new(1.0, 50.0).unwrap(),
            Liability::new(2.0, 25.0).unwrap(),
        ];
        assert_eq!(
            liability_profile(&liabilities),
            vec![Cashflow::new(1.0, 50.0), Cashflow::new(2.0, 125.0)]
        );

        let bonds = vec![
            Bond::new(2.0, 0.05, 100.0).unwrap(),
            Bond::new(1.0, 0.0, 100.0).unwrap(),
            Bond::new(3.0, 0.1, 100.0).unwrap(),
        ];
        let profile = cashflow_profile(&bonds, &[2.0, 1.0, 0.0]);
        assert_eq!(
            profile,
            vec![Cashflow::new(1.0, 110.0), Cashflow::new(2.0, 210.0)]
        );
    }

    #[test]
    fn test_optimized_beats_initial_on_duration() {
        let curve = curve();
        let liabilities = vec![
            Liability::new(1.0, 1_000_000.0).unwrap(),
            Liability::new(5.0, 2_000_000.0).unwrap(),
        ];
        let bonds = vec![
            Bond::new(2.0, 0.03, 1000.0).unwrap(),
            Bond::new(5.0, 0.035, 1000.0).unwrap(),
            Bond::new(10.0, 0.04, 1000.0).unwrap(),
        ];
        let initial = build_initial_portfolio(&liabilities, &bonds, &curve);
        let optimized = duration_matching(&liabilities, &bonds, &curve).unwrap();
        assert!(optimized.success, "{}", optimized.message);

        let comparison = PortfolioComparison::new(
            &liabilities,
            &bonds,
            &initial.quantities,
            &optimized.quantities,
            &curve,
        );
        assert!(comparison.duration_error(&comparison.optimized) < 1e-2);
        assert!(
            comparison.duration_error(&comparison.optimized)
                <= comparison.duration_error(&comparison.initial)
        );
        assert!(comparison.pv_error_percent(&comparison.optimized) < 1e-2);
        assert!(comparison.to_string().contains("Portfolio Comparison"));
    }

    #[test]
    fn test_improvement_needs_initial_error() {
        assert_eq!(improvement(0.0, 0.0), None);
        assert_eq!(improvement(2.0, 0.5), Some(75.0));
    }
}
