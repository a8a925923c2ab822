//! Hashing primitives for the election engine.
//!
//! - **Blake2b-256** for chaining randomness seeds through the validator shuffle

pub mod hash;

pub use hash::{blake2b_256, blake2b_256_multi, next_seed};
