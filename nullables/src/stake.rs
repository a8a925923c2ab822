//! Nullable stake ledger: in-memory locked and nonvoting balances.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use valelect_election::{StakeError, StakeLedger};
use valelect_types::Address;

#[derive(Clone, Copy, Debug, Default)]
struct Balance {
    locked: u128,
    nonvoting: u128,
}

/// A deterministic stake ledger for testing.
///
/// Locking stake raises both the locked and the nonvoting balance; voting then
/// moves value out of the nonvoting balance only.
#[derive(Default)]
pub struct NullStakeLedger {
    balances: Mutex<HashMap<Address, Balance>>,
    fail_next: Mutex<Option<StakeError>>,
}

fn guard<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl NullStakeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock `value` of new stake for `account`.
    pub fn lock(&self, account: &Address, value: u128) {
        let mut balances = guard(&self.balances);
        let balance = balances.entry(*account).or_default();
        balance.locked += value;
        balance.nonvoting += value;
    }

    /// Remove slashed stake from the locked balance. Votes are decremented separately.
    pub fn slash(&self, account: &Address, value: u128) {
        let mut balances = guard(&self.balances);
        let balance = balances.entry(*account).or_default();
        balance.locked = balance.locked.saturating_sub(value);
    }

    pub fn locked(&self, account: &Address) -> u128 {
        guard(&self.balances)
            .get(account)
            .map(|b| b.locked)
            .unwrap_or(0)
    }

    pub fn nonvoting(&self, account: &Address) -> u128 {
        guard(&self.balances)
            .get(account)
            .map(|b| b.nonvoting)
            .unwrap_or(0)
    }

    /// Make the next balance mutation fail with `error`.
    pub fn fail_next(&self, error: StakeError) {
        *guard(&self.fail_next) = Some(error);
    }

    fn injected_failure(&self) -> Result<(), StakeError> {
        match guard(&self.fail_next).take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl StakeLedger for NullStakeLedger {
    fn decrement_nonvoting_balance(&self, account: &Address, value: u128) -> Result<(), StakeError> {
        self.injected_failure()?;
        let mut balances = guard(&self.balances);
        let balance = balances.entry(*account).or_default();
        if balance.nonvoting < value {
            return Err(StakeError::InsufficientNonvoting {
                account: *account,
                needed: value,
                available: balance.nonvoting,
            });
        }
        balance.nonvoting -= value;
        Ok(())
    }

    fn increment_nonvoting_balance(&self, account: &Address, value: u128) -> Result<(), StakeError> {
        self.injected_failure()?;
        let mut balances = guard(&self.balances);
        let balance = balances.entry(*account).or_default();
        balance.nonvoting = balance
            .nonvoting
            .checked_add(value)
            .ok_or(StakeError::Overflow)?;
        Ok(())
    }

    fn total_locked(&self) -> Result<u128, StakeError> {
        guard(&self.balances)
            .values()
            .try_fold(0u128, |acc, b| acc.checked_add(b.locked))
            .ok_or(StakeError::Overflow)
    }

    fn nonvoting_balance(&self, account: &Address) -> Result<u128, StakeError> {
        Ok(self.nonvoting(account))
    }
}
