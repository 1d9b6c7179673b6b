use thiserror::Error;

/// Errors raised when constructing the engine's value types.
///
/// Every constructor validates its fields up front, so a value that exists
/// is known to satisfy its invariants and the valuation code never has to
/// re-check them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("liability time must be positive, got {0}")]
    NonPositiveLiabilityTime(f64),
    #[error("liability amount must be positive, got {0}")]
    NonPositiveLiabilityAmount(f64),
    #[error("bond maturity must be positive, got {0}")]
    NonPositiveMaturity(f64),
    #[error("coupon rate must be non-negative, got {0}")]
    NegativeCouponRate(f64),
    #[error("face value must be positive, got {0}")]
    NonPositiveFaceValue(f64),
    #[error("bond price must be positive, got {0}")]
    NonPositivePrice(f64),
    #[error("yield curve needs at least one point")]
    EmptyCurve,
    #[error("yield curve times and rates differ in length: {times} vs {rates}")]
    LengthMismatch { times: usize, rates: usize },
    #[error("yield curve times must be strictly ascending (index {index})")]
    TimesNotAscending { index: usize },
    #[error("non-finite value in {field}")]
    NonFinite { field: &'static str },
}
