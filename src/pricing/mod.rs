pub mod cashflows;
pub mod valuation;
