//! Fundamental types for the validator-group election engine.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! account addresses, epochs, randomness seeds and the fixed-point fraction used for
//! thresholds and unit/value conversion.

pub mod address;
pub mod epoch;
pub mod error;
pub mod fixed;
pub mod seed;

pub use address::Address;
pub use epoch::Epoch;
pub use error::TypesError;
pub use fixed::{cmp_ratios, mul_div_ceil, mul_div_floor, Fraction, FIXED1};
pub use seed::Seed;
