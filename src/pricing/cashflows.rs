use crate::core::bond::Bond;
use serde::{Deserialize, Serialize};

/// A single dated payment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cashflow {
    /// Payment time in years from today.
    pub time: f64,
    pub amount: f64,
}

impl Cashflow {
    pub fn new(time: f64, amount: f64) -> Self {
        Self { time, amount }
    }
}

/// The payment schedule of a bond, produced lazily.
///
/// Coupons are annual. A bond with maturity under one year pays a single
/// prorated coupon plus principal at maturity. For a fractional maturity
/// the payment that would fall on `floor(maturity)` is replaced by one
/// final payment at the exact maturity carrying a prorated coupon and the
/// principal, so every schedule has exactly one principal repayment and
/// nothing after maturity.
///
/// The schedule is an ordinary iterator; clone it (or call [`cashflows`]
/// again) to walk it a second time.
///
/// # Examples
///
/// ```
/// use hedging_engine::core::bond::Bond;
/// use hedging_engine::pricing::cashflows::cashflows;
///
/// let bond = Bond::new(2.5, 0.04, 100.0).unwrap();
/// let schedule: Vec<_> = cashflows(&bond).map(|cf| (cf.time, cf.amount)).collect();
/// assert_eq!(schedule, vec![(1.0, 4.0), (2.5, 102.0)]);
/// ```
#[derive(Debug, Clone)]
pub struct CashflowSchedule {
    coupon: f64,
    next_year: u32,
    /// Number of coupon-only payments before the final one.
    regular_payments: u32,
    final_payment: Option<Cashflow>,
}

/// Generate the payment schedule of `bond`.
pub fn cashflows(bond: &Bond) -> CashflowSchedule {
    let maturity = bond.maturity_years();
    let face = bond.face_value();
    let coupon = bond.annual_coupon();

    let (regular_payments, final_amount) = if maturity < 1.0 {
        (0, face * (1.0 + bond.coupon_rate() * maturity))
    } else {
        let whole = maturity.floor();
        let fraction = maturity - whole;
        let final_coupon = if fraction == 0.0 {
            coupon
        } else {
            coupon * fraction
        };
        (whole as u32 - 1, final_coupon + face)
    };

    CashflowSchedule {
        coupon,
        next_year: 1,
        regular_payments,
        final_payment: Some(Cashflow::new(maturity, final_amount)),
    }
}

impl Iterator for CashflowSchedule {
    type Item = Cashflow;

    fn next(&mut self) -> Option<Cashflow> {
        if self.next_year <= self.regular_payments {
            let cf = Cashflow::new(f64::from(self.next_year), self.coupon);
            self.next_year += 1;
            return Some(cf);
        }
        self.final_payment.take()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let regular = (self.regular_payments + 1).saturating_sub(self.next_year) as usize;
        let remaining = regular + usize::from(self.final_payment.is_some());
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for CashflowSchedule {}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn schedule(maturity: f64, coupon: f64, face: f64) -> Vec<Cashflow> {
        cashflows(&Bond::new(maturity, coupon, face).unwrap()).collect()
    }

    #[test]
    fn test_integer_maturity() {
        let cfs = schedule(3.0, 0.05, 1000.0);
        assert_eq!(
            cfs,
            vec![
                Cashflow::new(1.0, 50.0),
                Cashflow::new(2.0, 50.0),
                Cashflow::new(3.0, 1050.0),
            ]
        );
    }

    #[test]
    fn test_one_year_bond() {
        assert_eq!(schedule(1.0, 0.03, 1000.0), vec![Cashflow::new(1.0, 1030.0)]);
    }

    #[test]
    fn test_short_bond_single_prorated_payment() {
        let cfs = schedule(0.5, 0.04, 1000.0);
        assert_eq!(cfs.len(), 1);
        assert_eq!(cfs[0].time, 0.5);
        assert_relative_eq!(cfs[0].amount, 1020.0, epsilon = 1e-9);
    }

    #[test]
    fn test_fractional_maturity_replaces_last_whole_year() {
        let cfs = schedule(3.25, 0.08, 1000.0);
        assert_eq!(cfs.len(), 3);
        assert_eq!(cfs[0], Cashflow::new(1.0, 80.0));
        assert_eq!(cfs[1], Cashflow::new(2.0, 80.0));
        assert_eq!(cfs[2].time, 3.25);
        assert_relative_eq!(cfs[2].amount, 1020.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_coupon() {
        assert_eq!(schedule(4.0, 0.0, 100.0).last(), Some(&Cashflow::new(4.0, 100.0)));
    }

    #[test]
    fn test_schedule_is_restartable() {
        let bond = Bond::new(5.0, 0.035, 1000.0).unwrap();
        let first = cashflows(&bond);
        let again = first.clone();
        assert_eq!(first.len(), 5);
        assert_eq!(first.collect::<Vec<_>>(), again.collect::<Vec<_>>());
    }

    #[test]
    fn test_size_hint_tracks_progress() {
        let mut cfs = cashflows(&Bond::new(3.0, 0.05, 100.0).unwrap());
        assert_eq!(cfs.len(), 3);
        cfs.next();
        assert_eq!(cfs.len(), 2);
        cfs.next();
        cfs.next();
        assert_eq!(cfs.len(), 0);
        assert_eq!(cfs.next(), None);
    }
}
