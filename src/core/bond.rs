use crate::core::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A fixed-rate coupon bond paying `coupon_rate * face_value` once a year
/// and `face_value` at maturity.
///
/// `price` is carried for reference only. Valuation always uses the PV
/// implied by the yield curve.
///
/// # Examples
///
/// ```
/// use hedging_engine::core::bond::Bond;
///
/// let bond = Bond::new(5.0, 0.035, 1000.0).unwrap();
/// assert_eq!(bond.price(), None);
///
/// let quoted = bond.with_price(980.0).unwrap();
/// assert_eq!(quoted.price(), Some(980.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BondRecord")]
pub struct Bond {
    maturity_years: f64,
    coupon_rate: f64,
    face_value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    price: Option<f64>,
}

#[derive(Deserialize)]
struct BondRecord {
    maturity_years: f64,
    coupon_rate: f64,
    face_value: f64,
    #[serde(default)]
    price: Option<f64>,
}

impl TryFrom<BondRecord> for Bond {
    type Error = ValidationError;

    fn try_from(record: BondRecord) -> Result<Self, Self::Error> {
        let bond = Bond::new(record.maturity_years, record.coupon_rate, record.face_value)?;
        match record.price {
            Some(price) => bond.with_price(price),
            None => Ok(bond),
        }
    }
}

impl Bond {
    /// Create a bond without a quoted price.
    pub fn new(
        maturity_years: f64,
        coupon_rate: f64,
        face_value: f64,
    ) -> Result<Self, ValidationError> {
        for (field, value) in [
            ("maturity_years", maturity_years),
            ("coupon_rate", coupon_rate),
            ("face_value", face_value),
        ] {
            if !value.is_finite() {
                return Err(ValidationError::NonFinite { field });
            }
        }
        if maturity_years <= 0.0 {
            return Err(ValidationError::NonPositiveMaturity(maturity_years));
        }
        if coupon_rate < 0.0 {
            return Err(ValidationError::NegativeCouponRate(coupon_rate));
        }
        if face_value <= 0.0 {
            return Err(ValidationError::NonPositiveFaceValue(face_value));
        }
        Ok(Self {
            maturity_years,
            coupon_rate,
            face_value,
            price: None,
        })
    }

    /// Attach a market price.
    pub fn with_price(mut self, price: f64) -> Result<Self, ValidationError> {
        if !price.is_finite() {
            return Err(ValidationError::NonFinite { field: "price" });
        }
        if price <= 0.0 {
            return Err(ValidationError::NonPositivePrice(price));
        }
        self.price = Some(price);
        Ok(self)
    }

    pub fn maturity_years(&self) -> f64 {
        self.maturity_years
    }

    pub fn coupon_rate(&self) -> f64 {
        self.coupon_rate
    }

    pub fn face_value(&self) -> f64 {
        self.face_value
    }

    pub fn price(&self) -> Option<f64> {
        self.price
    }

    /// Full annual coupon amount.
    pub fn annual_coupon(&self) -> f64 {
        self.face_value * self.coupon_rate
    }
}

impl fmt::Display for Bond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Bond({}Y, {:.1}%, FV={:.0})",
            self.maturity_years,
            self.coupon_rate * 100.0,
            self.face_value
        )
    }
}
