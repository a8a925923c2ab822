//! Nullable randomness: deterministic per-epoch seeds.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};
use valelect_crypto::blake2b_256_multi;
use valelect_election::{RandomnessError, RandomnessSource};
use valelect_types::{Epoch, Seed};

/// A deterministic randomness source for testing.
///
/// The seed for an epoch is `blake2b(base || epoch)`, so the same base always
/// yields the same sequence.
pub struct NullRandomness {
    base: [u8; 32],
    constant: bool,
    withheld: Mutex<HashSet<Epoch>>,
}

impl NullRandomness {
    pub fn new(base: [u8; 32]) -> Self {
        Self {
            base,
            constant: false,
            withheld: Mutex::new(HashSet::new()),
        }
    }

    /// Return `seed` for every epoch.
    pub fn constant(seed: Seed) -> Self {
        Self {
            base: *seed.as_bytes(),
            constant: true,
            withheld: Mutex::new(HashSet::new()),
        }
    }

    /// Make `seed_for(epoch)` fail.
    pub fn withhold(&self, epoch: Epoch) {
        self.withheld
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(epoch);
    }
}

impl RandomnessSource for NullRandomness {
    fn seed_for(&self, epoch: Epoch) -> Result<Seed, RandomnessError> {
        let withheld = self
            .withheld
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&epoch);
        if withheld {
            return Err(RandomnessError::Unavailable(epoch));
        }
        if self.constant {
            return Ok(Seed::new(self.base));
        }
        Ok(Seed::new(blake2b_256_multi(&[
            &self.base,
            &epoch.number().to_be_bytes(),
        ])))
    }
}
