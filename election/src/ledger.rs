//! Vote ledger: the ground truth for pending and active votes.
//!
//! Tracks, per group, the pending votes of every account and the active vote
//! pool, plus the ordered list of groups each account votes for. The ledger
//! knows nothing about rankings or collaborators; [`crate::state`] composes it
//! with the eligible-group ordering.

use crate::error::ElectionError;
use crate::units::ActivePool;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use valelect_types::{Address, Epoch};

/// Value pending for one (account, group) pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingVote {
    pub value: u128,
    /// Epoch of the most recent vote; activation needs a later epoch.
    pub epoch: Epoch,
}

/// All votes for one group.
#[derive(Clone, Debug, Default)]
struct GroupVotes {
    pending_total: u128,
    pending_by_account: HashMap<Address, PendingVote>,
    active: ActivePool,
}

impl GroupVotes {
    fn total(&self) -> u128 {
        // Both parts are bounded by the global total, which is checked on every increment.
        self.pending_total.saturating_add(self.active.total())
    }

    fn is_empty(&self) -> bool {
        self.pending_total == 0 && self.active.is_empty()
    }
}

/// Per-account and per-group vote balances.
#[derive(Clone, Debug, Default)]
pub struct VoteLedger {
    groups: HashMap<Address, GroupVotes>,
    groups_voted_for: HashMap<Address, Vec<Address>>,
    pending_total: u128,
    active_total: u128,
}

impl VoteLedger {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ─────────────────────────────────────────────────────────

    /// Pending plus active votes across all groups.
    pub fn total_votes(&self) -> u128 {
        self.pending_total.saturating_add(self.active_total)
    }

    pub fn pending_total(&self) -> u128 {
        self.pending_total
    }

    pub fn active_total(&self) -> u128 {
        self.active_total
    }

    pub fn total_for_group(&self, group: &Address) -> u128 {
        self.groups.get(group).map(GroupVotes::total).unwrap_or(0)
    }

    pub fn pending_for_group(&self, group: &Address) -> u128 {
        self.groups.get(group).map(|g| g.pending_total).unwrap_or(0)
    }

    pub fn active_for_group(&self, group: &Address) -> u128 {
        self.groups.get(group).map(|g| g.active.total()).unwrap_or(0)
    }

    pub fn active_units_for_group(&self, group: &Address) -> u128 {
        self.groups
            .get(group)
            .map(|g| g.active.unit_total())
            .unwrap_or(0)
    }

    pub fn pending_vote(&self, account: &Address, group: &Address) -> PendingVote {
        self.groups
            .get(group)
            .and_then(|g| g.pending_by_account.get(account))
            .copied()
            .unwrap_or_default()
    }

    pub fn pending_for(&self, account: &Address, group: &Address) -> u128 {
        self.pending_vote(account, group).value
    }

    pub fn active_units_for(&self, account: &Address, group: &Address) -> u128 {
        self.groups
            .get(group)
            .map(|g| g.active.units_of(account))
            .unwrap_or(0)
    }

    /// Active value the account can withdraw from the group (floored).
    pub fn active_for(&self, account: &Address, group: &Address) -> Result<u128, ElectionError> {
        match self.groups.get(group) {
            Some(g) => g.active.value_of(account),
            None => Ok(0),
        }
    }

    pub fn total_for(&self, account: &Address, group: &Address) -> Result<u128, ElectionError> {
        self.pending_for(account, group)
            .checked_add(self.active_for(account, group)?)
            .ok_or(ElectionError::ArithmeticOverflow)
    }

    /// Groups the account votes for, in list order.
    pub fn groups_voted_for(&self, account: &Address) -> &[Address] {
        self.groups_voted_for
            .get(account)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Pending plus active votes of an account across all of its groups.
    pub fn total_by_account(&self, account: &Address) -> Result<u128, ElectionError> {
        self.groups_voted_for(account)
            .iter()
            .try_fold(0u128, |acc, group| {
                acc.checked_add(self.total_for(account, group)?)
                    .ok_or(ElectionError::ArithmeticOverflow)
            })
    }

    // ── Voted-for list ──────────────────────────────────────────────────

    /// Append `group` to the account's list unless already present.
    ///
    /// `limit` is `None` when the account may vote for any number of groups.
    /// Returns whether the group was appended.
    pub fn ensure_voted_for(
        &mut self,
        account: &Address,
        group: &Address,
        limit: Option<usize>,
    ) -> Result<bool, ElectionError> {
        let list = self.groups_voted_for.entry(*account).or_default();
        if list.contains(group) {
            return Ok(false);
        }
        if limit.is_some_and(|max| list.len() >= max) {
            return Err(ElectionError::TooManyGroups);
        }
        list.push(*group);
        Ok(true)
    }

    /// Check that `group` sits at `index` in the account's list.
    pub fn check_index(
        &self,
        account: &Address,
        group: &Address,
        index: usize,
    ) -> Result<(), ElectionError> {
        match self.groups_voted_for(account).get(index) {
            Some(g) if g == group => Ok(()),
            _ => Err(ElectionError::BadIndex),
        }
    }

    /// Remove the entry at `index` by swapping in the last entry.
    pub fn remove_voted_for_at(&mut self, account: &Address, index: usize) -> Result<Address, ElectionError> {
        let list = self
            .groups_voted_for
            .get_mut(account)
            .ok_or(ElectionError::BadIndex)?;
        if index >= list.len() {
            return Err(ElectionError::BadIndex);
        }
        let removed = list.swap_remove(index);
        if list.is_empty() {
            self.groups_voted_for.remove(account);
        }
        Ok(removed)
    }

    // ── Pending votes ───────────────────────────────────────────────────

    /// Add pending votes; the entry's epoch is reset to `epoch`.
    pub fn add_pending(
        &mut self,
        account: &Address,
        group: &Address,
        value: u128,
        epoch: Epoch,
    ) -> Result<(), ElectionError> {
        let pending_total = self
            .pending_total
            .checked_add(value)
            .ok_or(ElectionError::ArithmeticOverflow)?;
        pending_total
            .checked_add(self.active_total)
            .ok_or(ElectionError::ArithmeticOverflow)?;

        let votes = self.groups.entry(*group).or_default();
        let entry = votes.pending_by_account.entry(*account).or_default();
        entry.value = entry
            .value
            .checked_add(value)
            .ok_or(ElectionError::ArithmeticOverflow)?;
        entry.epoch = epoch;
        votes.pending_total += value;
        self.pending_total = pending_total;
        Ok(())
    }

    pub fn remove_pending(
        &mut self,
        account: &Address,
        group: &Address,
        value: u128,
    ) -> Result<(), ElectionError> {
        let available = self.pending_for(account, group);
        if value > available {
            return Err(ElectionError::InsufficientPendingVotes {
                requested: value,
                available,
            });
        }
        if value == 0 {
            return Ok(());
        }
        if let Some(votes) = self.groups.get_mut(group) {
            if available == value {
                votes.pending_by_account.remove(account);
            } else if let Some(entry) = votes.pending_by_account.get_mut(account) {
                entry.value -= value;
            }
            votes.pending_total -= value;
        }
        self.pending_total -= value;
        self.prune(group);
        Ok(())
    }

    // ── Active votes ────────────────────────────────────────────────────

    /// Credit active votes. Returns the units minted.
    pub fn add_active(
        &mut self,
        account: &Address,
        group: &Address,
        value: u128,
    ) -> Result<u128, ElectionError> {
        let active_total = self
            .active_total
            .checked_add(value)
            .ok_or(ElectionError::ArithmeticOverflow)?;
        active_total
            .checked_add(self.pending_total)
            .ok_or(ElectionError::ArithmeticOverflow)?;
        let units = self
            .groups
            .entry(*group)
            .or_default()
            .active
            .increment(account, value)?;
        self.active_total = active_total;
        Ok(units)
    }

    /// Debit active votes. Returns the units burned.
    pub fn remove_active(
        &mut self,
        account: &Address,
        group: &Address,
        value: u128,
    ) -> Result<u128, ElectionError> {
        let units = match self.groups.get_mut(group) {
            Some(votes) => votes.active.decrement(account, value)?,
            None if value == 0 => 0,
            None => {
                return Err(ElectionError::InsufficientActiveVotes {
                    requested: value,
                    available: 0,
                })
            }
        };
        self.active_total -= value;
        self.prune(group);
        Ok(units)
    }

    /// Move the account's entire pending value for the group into the active pool.
    ///
    /// Returns `(value, units)`.
    pub fn activate(
        &mut self,
        account: &Address,
        group: &Address,
        now: Epoch,
    ) -> Result<(u128, u128), ElectionError> {
        let pending = self.pending_vote(account, group);
        if pending.value == 0 {
            return Err(ElectionError::NoPendingVotes);
        }
        if !pending.epoch.has_passed(now) {
            return Err(ElectionError::NotYetActivatable {
                cast: pending.epoch,
                current: now,
            });
        }
        self.remove_pending(account, group, pending.value)?;
        let units = self.add_active(account, group, pending.value)?;
        Ok((pending.value, units))
    }

    /// Add rewards to a group's active pool without minting units.
    pub fn add_rewards(&mut self, group: &Address, value: u128) -> Result<(), ElectionError> {
        let active_total = self
            .active_total
            .checked_add(value)
            .ok_or(ElectionError::ArithmeticOverflow)?;
        active_total
            .checked_add(self.pending_total)
            .ok_or(ElectionError::ArithmeticOverflow)?;
        self.groups
            .entry(*group)
            .or_default()
            .active
            .distribute(value)?;
        self.active_total = active_total;
        Ok(())
    }

    fn prune(&mut self, group: &Address) {
        if self.groups.get(group).is_some_and(GroupVotes::is_empty) {
            self.groups.remove(group);
        }
    }

    // ── Invariants ──────────────────────────────────────────────────────

    /// Check the bookkeeping invariants that must hold between operations.
    pub fn verify_invariants(&self) -> Result<(), ElectionError> {
        let violation = |msg: String| Err(ElectionError::InvariantViolation(msg));

        let mut pending_sum: u128 = 0;
        let mut active_sum: u128 = 0;
        for (group, votes) in &self.groups {
            let by_account = votes
                .pending_by_account
                .values()
                .try_fold(0u128, |acc, p| acc.checked_add(p.value));
            if by_account != Some(votes.pending_total) {
                return violation(format!("pending votes of {group} do not add up"));
            }
            if !votes.active.units_consistent() {
                return violation(format!("active units of {group} do not add up"));
            }
            pending_sum = pending_sum.saturating_add(votes.pending_total);
            active_sum = active_sum.saturating_add(votes.active.total());
        }
        if pending_sum != self.pending_total || active_sum != self.active_total {
            return violation("group totals do not add up to the global total".into());
        }

        for (account, list) in &self.groups_voted_for {
            for (i, group) in list.iter().enumerate() {
                if list[..i].contains(group) {
                    return violation(format!("{account} lists {group} twice"));
                }
                if self.total_for(account, group)? == 0
                    && self.active_units_for(account, group) == 0
                {
                    return violation(format!("{account} lists {group} without votes"));
                }
            }
        }
        Ok(())
    }
}
