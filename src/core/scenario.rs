use crate::core::bond::Bond;
use crate::core::curve::YieldCurve;
use crate::core::liability::Liability;
use serde::{Deserialize, Serialize};

/// One static market snapshot: the liabilities to hedge, the bonds that may
/// be bought, and the curve used to discount both.
///
/// This is the unit the CLI reads from disk. Deserialization validates every
/// liability, bond, and the curve through their constructors.
///
/// ```json
/// {
///   "liabilities": [{ "time_years": 1, "amount": 1000000 }],
///   "bonds": [{ "maturity_years": 2, "coupon_rate": 0.03, "face_value": 1000 }],
///   "curve": { "times": [1, 2, 5, 10], "rates": [0.02, 0.025, 0.03, 0.035] }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub liabilities: Vec<Liability>,
    pub bonds: Vec<Bond>,
    pub curve: YieldCurve,
}

impl Scenario {
    pub fn new(liabilities: Vec<Liability>, bonds: Vec<Bond>, curve: YieldCurve) -> Self {
        Self {
            liabilities,
            bonds,
            curve,
        }
    }

    /// Latest liability date, or 0 for an empty schedule.
    pub fn horizon(&self) -> f64 {
        self.liabilities
            .iter()
            .map(Liability::time_years)
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_from_json() {
        let json = r#"{
            "liabilities": [
                { "time_years": 1, "amount": 1000000 },
                { "time_years": 5, "amount": 2000000 }
            ],
            "bonds": [
                { "maturity_years": 2, "coupon_rate": 0.03, "face_value": 1000 },
                { "maturity_years": 5, "coupon_rate": 0.035, "face_value": 1000 }
            ],
            "curve": { "times": [1, 2, 5, 10], "rates": [0.02, 0.025, 0.03, 0.035] }
        }"#;

        let scenario: Scenario = serde_json::from_str(json).unwrap();
        assert_eq!(scenario.liabilities.len(), 2);
        assert_eq!(scenario.bonds.len(), 2);
        assert_eq!(scenario.curve.len(), 4);
        assert_eq!(scenario.horizon(), 5.0);
    }

    #[test]
    fn test_scenario_rejects_invalid_member() {
        let json = r#"{
            "liabilities": [{ "time_years": 1, "amount": -5 }],
            "bonds": [],
            "curve": { "times": [1], "rates": [0.02] }
        }"#;
        assert!(serde_json::from_str::<Scenario>(json).is_err());
    }
}
