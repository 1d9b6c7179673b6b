use crate::core::error::ValidationError;
use crate::pricing::cashflows::Cashflow;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single future cash outflow the hedge portfolio must fund.
///
/// Liabilities are immutable once created. For valuation purposes each one
/// behaves like a single-cashflow instrument paying `amount` at `time_years`.
///
/// # Examples
///
/// ```
/// use hedging_engine::core::liability::Liability;
///
/// let claim = Liability::new(5.0, 2_000_000.0).unwrap();
/// assert_eq!(claim.time_years(), 5.0);
/// assert!(Liability::new(-1.0, 100.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LiabilityRecord")]
pub struct Liability {
    /// Years until the payment falls due. Always positive.
    time_years: f64,
    /// Amount paid. Always positive.
    amount: f64,
}

#[derive(Deserialize)]
struct LiabilityRecord {
    time_years: f64,
    amount: f64,
}

impl TryFrom<LiabilityRecord> for Liability {
    type Error = ValidationError;

    fn try_from(record: LiabilityRecord) -> Result<Self, Self::Error> {
        Liability::new(record.time_years, record.amount)
    }
}

impl Liability {
    /// Create a liability, rejecting non-positive or non-finite fields.
    pub fn new(time_years: f64, amount: f64) -> Result<Self, ValidationError> {
        if !time_years.is_finite() {
            return Err(ValidationError::NonFinite { field: "time_years" });
        }
        if !amount.is_finite() {
            return Err(ValidationError::NonFinite { field: "amount" });
        }
        if time_years <= 0.0 {
            return Err(ValidationError::NonPositiveLiabilityTime(time_years));
        }
        if amount <= 0.0 {
            return Err(ValidationError::NonPositiveLiabilityAmount(amount));
        }
        Ok(Self { time_years, amount })
    }

    pub fn time_years(&self) -> f64 {
        self.time_years
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// The liability viewed as a one-payment schedule.
    pub fn cashflow(&self) -> Cashflow {
        Cashflow::new(self.time_years, self.amount)
    }
}

impl fmt::Display for Liability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Liability(t={}Y, amount={:.0})", self.time_years, self.amount)
    }
}

/// Total undiscounted amount across a liability schedule.
pub fn total_amount(liabilities: &[Liability]) -> f64 {
    liabilities.iter().map(Liability::amount).sum()
}
