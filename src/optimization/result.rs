use crate::core::bond::Bond;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which hedging strategy produced a [`HedgeResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    MaturityBucketing,
    DurationMatching,
    CashFlowMatching,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [
        Strategy::MaturityBucketing,
        Strategy::DurationMatching,
        Strategy::CashFlowMatching,
    ];
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::MaturityBucketing => "Maturity Bucketing",
            Strategy::DurationMatching => "Duration Matching",
            Strategy::CashFlowMatching => "Cash Flow Matching",
        };
        f.write_str(name)
    }
}

/// A bond held in a meaningful quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BondAllocation {
    pub bond: Bond,
    pub quantity: f64,
}

/// Outcome of one hedging strategy.
///
/// `quantities` is always indexed like the bond universe passed in.
/// `bond_allocations` is the readable subset above the allocation threshold,
/// and is empty whenever `success` is false.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HedgeResult {
    pub strategy: Strategy,
    pub quantities: Vec<f64>,
    pub success: bool,
    pub message: String,
    pub liability_pv: f64,
    pub liability_duration: f64,
    pub portfolio_pv: f64,
    pub portfolio_duration: f64,
    pub bond_allocations: Vec<BondAllocation>,
    /// Objective value of the cash-flow matching LP.
    pub total_cost: Option<f64>,
}

impl HedgeResult {
    /// Portfolio PV minus liability PV.
    pub fn pv_error(&self) -> f64 {
        self.portfolio_pv - self.liability_pv
    }

    /// PV mismatch as a percentage of the liability PV.
    pub fn pv_error_percent(&self) -> f64 {
        if self.liability_pv == 0.0 {
            return 0.0;
        }
        self.pv_error() / self.liability_pv * 100.0
    }

    /// Portfolio duration minus liability duration, in years.
    pub fn duration_error(&self) -> f64 {
        self.portfolio_duration - self.liability_duration
    }

    /// Face value bought across all allocations.
    pub fn total_face_invested(&self) -> f64 {
        self.bond_allocations
            .iter()
            .map(|a| a.quantity * a.bond.face_value())
            .sum()
    }
}

impl fmt::Display for HedgeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== {} ===", self.strategy)?;
        writeln!(f, "Success:            {}", self.success)?;
        writeln!(f, "Message:            {}", self.message)?;
        writeln!(f, "Liability PV:       {:.2}", self.liability_pv)?;
        writeln!(f, "Liability Duration: {:.4}", self.liability_duration)?;
        writeln!(f, "Portfolio PV:       {:.2}", self.portfolio_pv)?;
        writeln!(f, "Portfolio Duration: {:.4}", self.portfolio_duration)?;
        writeln!(f, "PV Error:           {:.4}%", self.pv_error_percent())?;
        writeln!(f, "Duration Error:     {:.4}Y", self.duration_error())?;
        if let Some(cost) = self.total_cost {
            writeln!(f, "Total Cost:         {:.2}", cost)?;
        }

        if !self.bond_allocations.is_empty() {
            writeln!(f, "\nAllocations:")?;
            for allocation in &self.bond_allocations {
                writeln!(f, "  {}: {:.2} units", allocation.bond, allocation.quantity)?;
            }
        }
        Ok(())
    }
}

/// Pair each bond with its quantity, keeping those strictly above `threshold`.
pub(crate) fn allocations(
    bonds: &[Bond],
    quantities: &[f64],
    threshold: f64,
) -> Vec<BondAllocation> {
    bonds
        .iter()
        .zip(quantities)
        .filter(|(_, q)| **q > threshold)
        .map(|(bond, q)| BondAllocation {
            bond: *bond,
            quantity: *q,
        })
        .collect()
}
