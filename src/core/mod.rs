pub mod bond;
pub mod curve;
pub mod error;
pub mod liability;
pub mod scenario;
