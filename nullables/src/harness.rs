//! A full set of nullable collaborators with a fixed role table.

use std::sync::Arc;
use valelect_election::{Collaborators, StaticAuthorization};
use valelect_types::{Address, Seed};

use crate::{NullEpochs, NullGroupRegistry, NullRandomness, NullStakeLedger};

/// Owner of the election parameters.
pub const OWNER: Address = Address::repeat_byte(0xA1);
/// Caller allowed to force-decrement votes.
pub const STAKE_AUTHORITY: Address = Address::repeat_byte(0xA2);
/// Caller allowed to change group eligibility.
pub const VALIDATOR_REGISTRY: Address = Address::repeat_byte(0xA3);
/// Caller allowed to distribute epoch rewards.
pub const EPOCH_PROCESSOR: Address = Address::repeat_byte(0xA4);

/// Handles to every nullable collaborator.
pub struct NullHarness {
    pub stake: Arc<NullStakeLedger>,
    pub registry: Arc<NullGroupRegistry>,
    pub randomness: Arc<NullRandomness>,
    pub epochs: Arc<NullEpochs>,
    pub auth: StaticAuthorization,
}

impl NullHarness {
    /// Empty stake and registry, epoch 0, a zero randomness base.
    pub fn new() -> Self {
        Self::with_seed(Seed::ZERO)
    }

    pub fn with_seed(seed: Seed) -> Self {
        Self {
            stake: Arc::new(NullStakeLedger::new()),
            registry: Arc::new(NullGroupRegistry::new()),
            randomness: Arc::new(NullRandomness::new(*seed.as_bytes())),
            epochs: Arc::new(NullEpochs::new(0)),
            auth: StaticAuthorization {
                owner: OWNER,
                stake_authority: STAKE_AUTHORITY,
                validator_registry: VALIDATOR_REGISTRY,
                epoch_processor: EPOCH_PROCESSOR,
            },
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            stake: self.stake.clone(),
            registry: self.registry.clone(),
            randomness: self.randomness.clone(),
            epochs: self.epochs.clone(),
            auth: Arc::new(self.auth.clone()),
        }
    }
}

impl Default for NullHarness {
    fn default() -> Self {
        Self::new()
    }
}
