use thiserror::Error;

/// Preconditions a hedging strategy cannot work around.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HedgingError {
    /// Duration matching normalizes by the liability value, so a schedule
    /// worth nothing today has no meaningful target.
    #[error("liability present value is zero; nothing to hedge")]
    ZeroLiabilityValue,
}
