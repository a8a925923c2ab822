//! Validator-group vote accounting and election engine.
//!
//! Accounts lock stake elsewhere and commit it to validator groups here:
//! - Votes start **pending** and can be activated once an epoch boundary has passed.
//! - **Active** votes are held as units of a per-group pool, so epoch rewards are
//!   distributed to every active voter by growing the pool instead of iterating voters.
//! - Eligible groups are kept in a descending ranking updated through caller-supplied
//!   neighbour hints.
//! - Validator seats are apportioned with a highest-averages method over the ranking.
//! - The stake authority can force-decrement an account's votes across groups when
//!   its stake is slashed.
//!
//! ## Module overview
//!
//! - [`ordering`]: Hint-verified descending index over eligible groups.
//! - [`units`]: Value/unit conversion for active votes.
//! - [`ledger`]: Per-account and per-group pending/active balances.
//! - [`state`]: Ledger and ranking composed into the vote lifecycle.
//! - [`slashing`]: Forced multi-group vote decrement.
//! - [`apportion`]: Seat apportionment and the seeded shuffle.
//! - [`engine`]: The guarded public surface ([`Election`]).
//! - [`collaborators`]: Traits for the stake ledger, group registry, randomness, epochs, authorization.
//! - [`config`]: Election parameters with TOML support.
//! - [`events`]: Structured events emitted by every state transition.
//! - [`error`]: Election error types.

pub mod apportion;
pub mod collaborators;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod ledger;
pub mod ordering;
pub mod slashing;
pub mod state;
pub mod units;

pub use apportion::{apportion_seats, elect, shuffle, Candidate};
pub use collaborators::{
    Authorization, Collaborators, EpochSource, GroupRegistry, RandomnessError, RandomnessSource,
    RegistryError, StakeError, StakeLedger, StaticAuthorization,
};
pub use config::ElectionConfig;
pub use engine::Election;
pub use error::{ElectionError, ErrorKind};
pub use events::ElectionEvent;
pub use ledger::{PendingVote, VoteLedger};
pub use ordering::{EligibleGroups, OrderingError, OrderingHint};
pub use slashing::SlashHints;
pub use state::ElectionState;
pub use units::ActivePool;
pub use valelect_utils::OperationCounts;
