//! Forced vote decrement for slashed accounts.
//!
//! The stake authority removes a value from an account's votes spread over
//! every group it votes for. Groups are drained in the order of the account's
//! voted-for list, pending votes before active ones, each with its own
//! ordering hint and list index.

use crate::error::ElectionError;
use crate::events::ElectionEvent;
use crate::ordering::OrderingHint;
use crate::state::ElectionState;
use serde::{Deserialize, Serialize};
use valelect_types::Address;

/// Per-group hints for a forced decrement, in voted-for list order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlashHints {
    pub lessers: Vec<Option<Address>>,
    pub greaters: Vec<Option<Address>>,
    pub indices: Vec<usize>,
}

/// How much of `remaining` one group gives up.
struct Drain {
    pending: u128,
    active: u128,
}

impl Drain {
    fn total(&self) -> u128 {
        self.pending + self.active
    }
}

impl ElectionState {
    fn plan_drain(
        &self,
        account: &Address,
        group: &Address,
        remaining: u128,
    ) -> Result<Drain, ElectionError> {
        let pending = remaining.min(self.ledger.pending_for(account, group));
        let active = (remaining - pending).min(self.ledger.active_for(account, group)?);
        Ok(Drain { pending, active })
    }

    /// Remove `value` from the account's votes across its groups.
    ///
    /// Entry `i` of the hint arrays belongs to the group at position `i` of the
    /// account's voted-for list when the call starts, and `indices[i]` must be `i`.
    /// Groups left without votes are dropped from the list once every group has
    /// been processed. Returns the value removed, which is always `value`.
    pub fn force_decrement(
        &mut self,
        account: &Address,
        value: u128,
        lessers: &[Option<Address>],
        greaters: &[Option<Address>],
        indices: &[usize],
    ) -> Result<u128, ElectionError> {
        if value == 0 {
            return Err(ElectionError::InvalidInput(
                "decrement value cannot be zero".into(),
            ));
        }
        let groups = self.ledger.groups_voted_for(account).to_vec();
        if lessers.len() != greaters.len()
            || lessers.len() != indices.len()
            || indices.len() > groups.len()
        {
            return Err(ElectionError::InvalidInput(
                "input lengths must correspond".into(),
            ));
        }

        let mut remaining = value;
        let mut emptied = Vec::new();
        for (position, group) in groups.iter().enumerate().take(indices.len()) {
            if remaining == 0 {
                break;
            }
            if indices[position] != position {
                return Err(ElectionError::BadIndex);
            }
            let hint = OrderingHint::new(lessers[position], greaters[position]);
            if hint.is_empty() && self.eligible.contains(group) && self.eligible.len() > 1 {
                return Err(ElectionError::MalformedSlashInput(*group));
            }

            let drain = self.plan_drain(account, group, remaining)?;
            if drain.pending > 0 {
                self.ledger.remove_pending(account, group, drain.pending)?;
            }
            if drain.active > 0 {
                self.ledger.remove_active(account, group, drain.active)?;
            }
            self.update_group_ordering(group, hint)?;
            remaining -= drain.total();

            if self.ledger.total_for(account, group)? == 0 {
                emptied.push(position);
            }
        }

        if remaining > 0 {
            return Err(ElectionError::IncompleteSlash {
                requested: value,
                decremented: value - remaining,
            });
        }

        // Highest position first so the lower positions stay put.
        for position in emptied.into_iter().rev() {
            self.ledger.remove_voted_for_at(account, position)?;
        }

        self.events.push(ElectionEvent::VotesForceDecremented {
            account: *account,
            value,
        });
        Ok(value)
    }

    /// Compute the hints [`ElectionState::force_decrement`] needs for `value`
    /// by replaying the decrement against a scratch copy of the ranking.
    ///
    /// Covers only the groups the decrement would touch.
    pub fn force_decrement_hints(
        &self,
        account: &Address,
        value: u128,
    ) -> Result<SlashHints, ElectionError> {
        let mut ranking = self.eligible.clone();
        let mut hints = SlashHints::default();
        let mut remaining = value;

        for (position, group) in self.ledger.groups_voted_for(account).iter().enumerate() {
            if remaining == 0 {
                break;
            }
            let drain = self.plan_drain(account, group, remaining)?;
            remaining -= drain.total();

            let hint = if ranking.contains(group) {
                let total = self.ledger.total_for_group(group) - drain.total();
                let hint = ranking.hints_for(group, total);
                ranking.update(*group, total, hint)?;
                hint
            } else {
                OrderingHint::NONE
            };
            hints.lessers.push(hint.lesser);
            hints.greaters.push(hint.greater);
            hints.indices.push(position);
        }
        Ok(hints)
    }
}
