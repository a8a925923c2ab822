//! Epoch counter.
//!
//! Epochs are advanced by an external collaborator; the engine never derives
//! them from wall-clock time.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An epoch number.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Epoch(u64);

impl Epoch {
    pub const GENESIS: Self = Self(0);

    pub fn new(number: u64) -> Self {
        Self(number)
    }

    pub fn number(&self) -> u64 {
        self.0
    }

    /// The following epoch (saturating at `u64::MAX`).
    pub fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Whether at least one full epoch boundary separates `self` from `now`.
    pub fn has_passed(&self, now: Epoch) -> bool {
        self.0 < now.0
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "epoch {}", self.0)
    }
}

impl From<u64> for Epoch {
    fn from(n: u64) -> Self {
        Self(n)
    }
}
