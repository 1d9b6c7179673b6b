//! Numerical back-ends for the hedging strategies.

pub mod simplex;
pub mod sqp;
