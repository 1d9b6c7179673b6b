//! Analysis around a computed hedge: rate sensitivity, portfolio comparison
//! and random scenario generation.

pub mod comparison;
pub mod scenario_generator;
pub mod sensitivity;
