//! External collaborators the election engine depends on.
//!
//! All collaborators are injected at construction as trait objects; the engine
//! never looks them up by name. Calls are synchronous and a failure aborts the
//! enclosing engine operation without any state change.

use std::sync::Arc;
use thiserror::Error;
use valelect_types::{Address, Epoch, Seed};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StakeError {
    #[error("insufficient nonvoting balance for {account}: need {needed}, have {available}")]
    InsufficientNonvoting {
        account: Address,
        needed: u128,
        available: u128,
    },

    #[error("unknown stake account {0}")]
    UnknownAccount(Address),

    #[error("stake ledger overflow")]
    Overflow,

    #[error("stake ledger unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("group {0} not found")]
    GroupNotFound(Address),

    #[error("signing key {0} is not associated with an account")]
    UnknownSigner(Address),

    #[error("group registry unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RandomnessError {
    #[error("no randomness available for {0}")]
    Unavailable(Epoch),
}

/// Locked stake backing every vote.
///
/// Voting moves value out of an account's nonvoting balance; revoking moves it back.
pub trait StakeLedger: Send + Sync {
    fn decrement_nonvoting_balance(&self, account: &Address, value: u128) -> Result<(), StakeError>;

    fn increment_nonvoting_balance(&self, account: &Address, value: u128) -> Result<(), StakeError>;

    /// Total stake locked across all accounts.
    fn total_locked(&self) -> Result<u128, StakeError>;

    fn nonvoting_balance(&self, account: &Address) -> Result<u128, StakeError>;
}

/// Validator groups, their members and signer identities.
pub trait GroupRegistry: Send + Sync {
    fn is_validator_group(&self, group: &Address) -> Result<bool, RegistryError>;

    /// Members of a group in election priority order.
    fn members(&self, group: &Address) -> Result<Vec<Address>, RegistryError>;

    fn num_registered_validators(&self) -> Result<usize, RegistryError>;

    /// Map a signing key (the caller of a voting operation) to its account.
    fn resolve_signing_key_to_account(&self, key: &Address) -> Result<Address, RegistryError>;
}

/// Per-epoch randomness used to order the elected validator set.
pub trait RandomnessSource: Send + Sync {
    fn seed_for(&self, epoch: Epoch) -> Result<Seed, RandomnessError>;
}

/// The externally advanced epoch counter.
pub trait EpochSource: Send + Sync {
    fn current_epoch(&self) -> Epoch;
}

/// Role checks for restricted entry points.
pub trait Authorization: Send + Sync {
    /// May change election parameters.
    fn is_owner(&self, caller: &Address) -> bool;

    /// May force-decrement votes of slashed accounts.
    fn is_stake_authority(&self, caller: &Address) -> bool;

    /// May mark groups eligible or ineligible.
    fn is_validator_registry(&self, caller: &Address) -> bool;

    /// May distribute epoch rewards.
    fn is_epoch_processor(&self, caller: &Address) -> bool;
}

/// A fixed role table.
#[derive(Clone, Debug)]
pub struct StaticAuthorization {
    pub owner: Address,
    pub stake_authority: Address,
    pub validator_registry: Address,
    pub epoch_processor: Address,
}

impl Authorization for StaticAuthorization {
    fn is_owner(&self, caller: &Address) -> bool {
        *caller == self.owner
    }

    fn is_stake_authority(&self, caller: &Address) -> bool {
        *caller == self.stake_authority
    }

    fn is_validator_registry(&self, caller: &Address) -> bool {
        *caller == self.validator_registry
    }

    fn is_epoch_processor(&self, caller: &Address) -> bool {
        *caller == self.epoch_processor
    }
}

/// Handles to every collaborator, supplied when constructing an [`crate::Election`].
#[derive(Clone)]
pub struct Collaborators {
    pub stake: Arc<dyn StakeLedger>,
    pub registry: Arc<dyn GroupRegistry>,
    pub randomness: Arc<dyn RandomnessSource>,
    pub epochs: Arc<dyn EpochSource>,
    pub auth: Arc<dyn Authorization>,
}
