//! Nullable group registry: in-memory groups, members and signers.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use valelect_election::{GroupRegistry, RegistryError};
use valelect_types::Address;

#[derive(Default)]
struct Registry {
    groups: HashMap<Address, Vec<Address>>,
    signers: HashMap<Address, Address>,
    registered_validators: Option<usize>,
}

/// A deterministic group registry for testing.
///
/// A signing key resolves to itself unless it was authorized for another account.
#[derive(Default)]
pub struct NullGroupRegistry {
    inner: Mutex<Registry>,
}

impl NullGroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn inner(&self) -> MutexGuard<'_, Registry> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a group with members in priority order, replacing any previous entry.
    pub fn add_group(&self, group: Address, members: Vec<Address>) {
        self.inner().groups.insert(group, members);
    }

    pub fn remove_group(&self, group: &Address) {
        self.inner().groups.remove(group);
    }

    /// Let `signer` act for `account`.
    pub fn authorize_signer(&self, signer: Address, account: Address) {
        self.inner().signers.insert(signer, account);
    }

    /// Override the registered validator count (defaults to the sum of all members).
    pub fn set_registered_validators(&self, count: usize) {
        self.inner().registered_validators = Some(count);
    }
}

impl GroupRegistry for NullGroupRegistry {
    fn is_validator_group(&self, group: &Address) -> Result<bool, RegistryError> {
        Ok(self.inner().groups.contains_key(group))
    }

    fn members(&self, group: &Address) -> Result<Vec<Address>, RegistryError> {
        self.inner()
            .groups
            .get(group)
            .cloned()
            .ok_or(RegistryError::GroupNotFound(*group))
    }

    fn num_registered_validators(&self) -> Result<usize, RegistryError> {
        let inner = self.inner();
        Ok(inner
            .registered_validators
            .unwrap_or_else(|| inner.groups.values().map(Vec::len).sum()))
    }

    fn resolve_signing_key_to_account(&self, key: &Address) -> Result<Address, RegistryError> {
        Ok(self.inner().signers.get(key).copied().unwrap_or(*key))
    }
}
