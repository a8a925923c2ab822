//! Nullable collaborators for deterministic testing.
//!
//! Every collaborator the election engine consumes (stake ledger, group
//! registry, randomness, epochs) is a trait. This crate provides in-memory
//! implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem or network
//!
//! Usage: build a [`NullHarness`], hand its [`NullHarness::collaborators`] to
//! `Election::new`, and keep the `Arc` handles to drive the collaborators.

pub mod epochs;
pub mod harness;
pub mod random;
pub mod registry;
pub mod stake;

pub use epochs::NullEpochs;
pub use harness::{NullHarness, EPOCH_PROCESSOR, OWNER, STAKE_AUTHORITY, VALIDATOR_REGISTRY};
pub use random::NullRandomness;
pub use registry::NullGroupRegistry;
pub use stake::NullStakeLedger;
