//! The public election surface.
//!
//! [`Election`] owns the vote state behind one mutex and the injected
//! collaborators. Every mutating entry point goes through one guarded call:
//!
//! 1. Reject a call from the thread already inside the engine.
//! 2. Take the state lock.
//! 3. Check the caller's role.
//! 4. Run the operation on a working copy of the state.
//! 5. Commit the copy only if the operation succeeded, moving the events it
//!    raised onto the engine's committed queue.
//!
//! Collaborator mutations (moving stake in or out of the nonvoting balance)
//! always happen last, so a failing collaborator leaves the state untouched.

use crate::apportion::{self, Candidate};
use crate::collaborators::Collaborators;
use crate::config::{check_electable_bounds, ElectionConfig};
use crate::error::ElectionError;
use crate::events::ElectionEvent;
use crate::ordering::OrderingHint;
use crate::slashing::SlashHints;
use crate::state::ElectionState;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use std::thread::{self, ThreadId};
use valelect_types::{mul_div_floor, Address, Fraction};
use valelect_utils::{OperationCounts, OperationStats};

const STAT_NAMES: &[&str] = &[
    "vote",
    "activate",
    "revoke_pending",
    "revoke_active",
    "force_decrement",
    "distribute_rewards",
    "eligibility",
    "config",
    "elect",
];

/// Who may call an entry point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Role {
    Any,
    Owner,
    StakeAuthority,
    ValidatorRegistry,
    EpochProcessor,
}

/// Marks the thread currently running an engine operation.
struct ActiveCall<'a> {
    slot: &'a Mutex<Option<ThreadId>>,
    thread: ThreadId,
}

impl Drop for ActiveCall<'_> {
    fn drop(&mut self) {
        let mut slot = self
            .slot
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        // Another thread may already have entered once the state lock was released.
        if *slot == Some(self.thread) {
            *slot = None;
        }
    }
}

/// Validator-group vote accounting and election engine.
pub struct Election {
    state: Mutex<ElectionState>,
    active_thread: Mutex<Option<ThreadId>>,
    collaborators: Collaborators,
    /// Committed events not yet drained. Kept outside the state so working
    /// copies start with an empty queue.
    events: Mutex<Vec<ElectionEvent>>,
    stats: OperationStats,
}

impl Election {
    pub fn new(config: ElectionConfig, collaborators: Collaborators) -> Result<Self, ElectionError> {
        config.validate()?;
        tracing::info!(
            min = config.min_electable_validators,
            max = config.max_electable_validators,
            max_groups = config.max_num_groups_voted_for,
            threshold = %config.electability_threshold,
            "election engine started"
        );
        Ok(Self {
            state: Mutex::new(ElectionState::new(config)),
            active_thread: Mutex::new(None),
            collaborators,
            events: Mutex::new(Vec::new()),
            stats: OperationStats::new(STAT_NAMES),
        })
    }

    // ── Call guard ──────────────────────────────────────────────────────

    fn enter(&self) -> Result<(MutexGuard<'_, ElectionState>, ActiveCall<'_>), ElectionError> {
        let me = thread::current().id();
        let reentrant = *self
            .active_thread
            .lock()
            .map_err(|_| ElectionError::LockPoisoned)?
            == Some(me);
        if reentrant {
            return Err(ElectionError::ReentrantCall);
        }
        let state = self.state.lock().map_err(|_| ElectionError::LockPoisoned)?;
        *self
            .active_thread
            .lock()
            .map_err(|_| ElectionError::LockPoisoned)? = Some(me);
        Ok((
            state,
            ActiveCall {
                slot: &self.active_thread,
                thread: me,
            },
        ))
    }

    fn authorize(&self, caller: &Address, role: Role, operation: &'static str) -> Result<(), ElectionError> {
        let auth = &self.collaborators.auth;
        let allowed = match role {
            Role::Any => true,
            Role::Owner => auth.is_owner(caller),
            Role::StakeAuthority => auth.is_stake_authority(caller),
            Role::ValidatorRegistry => auth.is_validator_registry(caller),
            Role::EpochProcessor => auth.is_epoch_processor(caller),
        };
        if allowed {
            Ok(())
        } else {
            Err(ElectionError::Unauthorized {
                caller: *caller,
                operation,
            })
        }
    }

    fn guarded<T>(
        &self,
        caller: &Address,
        role: Role,
        operation: &'static str,
        stat: &'static str,
        op: impl FnOnce(&mut ElectionState, &Collaborators) -> Result<T, ElectionError>,
    ) -> Result<T, ElectionError> {
        let result: Result<T, ElectionError> = (|| {
            let (mut state, _active) = self.enter()?;
            self.authorize(caller, role, operation)?;

            let mut working = state.clone();
            let value = op(&mut working, &self.collaborators)?;
            let raised = working.take_events();
            for event in &raised {
                tracing::info!(operation, caller = %caller, ?event, "{}", event.name());
            }
            let mut committed = self.events.lock().map_err(|_| ElectionError::LockPoisoned)?;
            *state = working;
            committed.extend(raised);
            Ok(value)
        })();

        self.stats.record(stat, result.is_ok());
        if let Err(e) = &result {
            tracing::debug!(operation, caller = %caller, error = %e, "operation rejected");
        }
        result
    }

    fn read<T>(
        &self,
        query: impl FnOnce(&ElectionState, &Collaborators) -> Result<T, ElectionError>,
    ) -> Result<T, ElectionError> {
        let (state, _active) = self.enter()?;
        query(&*state, &self.collaborators)
    }

    // ── Voting ──────────────────────────────────────────────────────────

    /// Cast `value` pending votes for `group` from the caller's account.
    pub fn vote(
        &self,
        caller: &Address,
        group: &Address,
        value: u128,
        hint: OrderingHint,
    ) -> Result<(), ElectionError> {
        self.guarded(caller, Role::Any, "vote", "vote", |state, c| {
            let account = c.registry.resolve_signing_key_to_account(caller)?;
            let receivable = votes_receivable(state.config(), c, group)?;
            let epoch = c.epochs.current_epoch();
            state.cast_vote(&account, group, value, hint, epoch, receivable)?;
            c.stake.decrement_nonvoting_balance(&account, value)?;
            Ok(())
        })
    }

    /// Activate the caller's pending votes for `group`. Returns the value activated.
    pub fn activate(&self, caller: &Address, group: &Address) -> Result<u128, ElectionError> {
        self.guarded(caller, Role::Any, "activate", "activate", |state, c| {
            let account = c.registry.resolve_signing_key_to_account(caller)?;
            let (value, _) = state.activate(&account, group, c.epochs.current_epoch())?;
            Ok(value)
        })
    }

    /// Activate another account's pending votes. Anyone may do this.
    pub fn activate_for_account(
        &self,
        caller: &Address,
        account: &Address,
        group: &Address,
    ) -> Result<u128, ElectionError> {
        self.guarded(caller, Role::Any, "activate", "activate", |state, c| {
            let (value, _) = state.activate(account, group, c.epochs.current_epoch())?;
            Ok(value)
        })
    }

    pub fn revoke_pending(
        &self,
        caller: &Address,
        group: &Address,
        value: u128,
        hint: OrderingHint,
        index: usize,
    ) -> Result<(), ElectionError> {
        self.guarded(caller, Role::Any, "revoke pending votes", "revoke_pending", |state, c| {
            let account = c.registry.resolve_signing_key_to_account(caller)?;
            state.revoke_pending(&account, group, value, hint, index)?;
            c.stake.increment_nonvoting_balance(&account, value)?;
            Ok(())
        })
    }

    pub fn revoke_active(
        &self,
        caller: &Address,
        group: &Address,
        value: u128,
        hint: OrderingHint,
        index: usize,
    ) -> Result<(), ElectionError> {
        self.guarded(caller, Role::Any, "revoke active votes", "revoke_active", |state, c| {
            let account = c.registry.resolve_signing_key_to_account(caller)?;
            state.revoke_active(&account, group, value, hint, index)?;
            c.stake.increment_nonvoting_balance(&account, value)?;
            Ok(())
        })
    }

    /// Revoke all of the caller's active votes for `group`. Returns the value revoked.
    pub fn revoke_all_active(
        &self,
        caller: &Address,
        group: &Address,
        hint: OrderingHint,
        index: usize,
    ) -> Result<u128, ElectionError> {
        self.guarded(caller, Role::Any, "revoke active votes", "revoke_active", |state, c| {
            let account = c.registry.resolve_signing_key_to_account(caller)?;
            let value = state.revoke_all_active(&account, group, hint, index)?;
            c.stake.increment_nonvoting_balance(&account, value)?;
            Ok(value)
        })
    }

    /// Remove `value` from a slashed account's votes. Stake authority only.
    ///
    /// The slashed stake is not returned to the account's nonvoting balance.
    pub fn force_decrement_votes(
        &self,
        caller: &Address,
        account: &Address,
        value: u128,
        lessers: &[Option<Address>],
        greaters: &[Option<Address>],
        indices: &[usize],
    ) -> Result<u128, ElectionError> {
        self.guarded(
            caller,
            Role::StakeAuthority,
            "force decrement votes",
            "force_decrement",
            |state, _| state.force_decrement(account, value, lessers, greaters, indices),
        )
    }

    /// Add epoch rewards to a group's active votes. Epoch processor only.
    pub fn distribute_epoch_rewards(
        &self,
        caller: &Address,
        group: &Address,
        value: u128,
        hint: OrderingHint,
    ) -> Result<(), ElectionError> {
        self.guarded(
            caller,
            Role::EpochProcessor,
            "distribute epoch rewards",
            "distribute_rewards",
            |state, _| state.distribute_rewards(group, value, hint),
        )
    }

    // ── Eligibility ─────────────────────────────────────────────────────

    pub fn mark_group_eligible(
        &self,
        caller: &Address,
        group: &Address,
        hint: OrderingHint,
    ) -> Result<(), ElectionError> {
        self.guarded(
            caller,
            Role::ValidatorRegistry,
            "mark group eligible",
            "eligibility",
            |state, c| {
                if !c.registry.is_validator_group(group)? {
                    return Err(ElectionError::NotValidatorGroup(*group));
                }
                state.mark_group_eligible(group, hint)
            },
        )
    }

    pub fn mark_group_ineligible(&self, caller: &Address, group: &Address) -> Result<(), ElectionError> {
        self.guarded(
            caller,
            Role::ValidatorRegistry,
            "mark group ineligible",
            "eligibility",
            |state, _| state.mark_group_ineligible(group),
        )
    }

    // ── Parameters ──────────────────────────────────────────────────────

    pub fn set_electable_validators(
        &self,
        caller: &Address,
        min: usize,
        max: usize,
    ) -> Result<(), ElectionError> {
        self.guarded(caller, Role::Owner, "set electable validators", "config", |state, _| {
            state.set_electable_validators(min, max)
        })
    }

    pub fn set_max_num_groups_voted_for(&self, caller: &Address, max: usize) -> Result<(), ElectionError> {
        self.guarded(caller, Role::Owner, "set max groups voted for", "config", |state, _| {
            state.set_max_num_groups_voted_for(max)
        })
    }

    pub fn set_electability_threshold(
        &self,
        caller: &Address,
        threshold: Fraction,
    ) -> Result<(), ElectionError> {
        self.guarded(caller, Role::Owner, "set electability threshold", "config", |state, _| {
            state.set_electability_threshold(threshold)
        })
    }

    /// Let the caller's account vote for any number of groups, or revert to the limit.
    pub fn set_allowed_to_vote_over_max_groups(
        &self,
        caller: &Address,
        allowed: bool,
    ) -> Result<(), ElectionError> {
        self.guarded(caller, Role::Any, "set over max groups flag", "config", |state, c| {
            let account = c.registry.resolve_signing_key_to_account(caller)?;
            state.set_allowed_to_vote_over_max_groups(&account, allowed)
        })
    }

    // ── Elections ───────────────────────────────────────────────────────

    /// Elect validators within the configured bounds.
    pub fn elect_validators(&self) -> Result<Vec<Address>, ElectionError> {
        let (min, max) = self.get_electable_validators()?;
        self.elect_n_validators(min, max)
    }

    /// Elect between `min` and `max` validators, ordered by the current epoch's seed.
    pub fn elect_n_validators(&self, min: usize, max: usize) -> Result<Vec<Address>, ElectionError> {
        check_electable_bounds(min, max)?;
        let result = self.read(|state, c| {
            let epoch = c.epochs.current_epoch();
            let seed = c.randomness.seed_for(epoch)?;
            let candidates = state
                .election_candidates(max)?
                .into_iter()
                .map(|(group, votes)| -> Result<Candidate, ElectionError> {
                    Ok(Candidate {
                        group,
                        votes,
                        members: c.registry.members(&group)?,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            let elected = apportion::elect(&candidates, min, max, seed)?;
            tracing::info!(
                epoch = %epoch,
                groups = candidates.len(),
                elected = elected.len(),
                "validators elected"
            );
            Ok(elected)
        });
        self.stats.record("elect", result.is_ok());
        if let Err(e) = &result {
            tracing::warn!(min, max, error = %e, "election failed");
        }
        result
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn get_pending_votes_for_group_by_account(
        &self,
        group: &Address,
        account: &Address,
    ) -> Result<u128, ElectionError> {
        self.read(|state, _| Ok(state.ledger().pending_for(account, group)))
    }

    pub fn get_active_votes_for_group_by_account(
        &self,
        group: &Address,
        account: &Address,
    ) -> Result<u128, ElectionError> {
        self.read(|state, _| state.ledger().active_for(account, group))
    }

    pub fn get_active_vote_units_for_group_by_account(
        &self,
        group: &Address,
        account: &Address,
    ) -> Result<u128, ElectionError> {
        self.read(|state, _| Ok(state.ledger().active_units_for(account, group)))
    }

    pub fn get_total_votes_for_group_by_account(
        &self,
        group: &Address,
        account: &Address,
    ) -> Result<u128, ElectionError> {
        self.read(|state, _| state.ledger().total_for(account, group))
    }

    pub fn get_total_votes_by_account(&self, account: &Address) -> Result<u128, ElectionError> {
        self.read(|state, _| state.ledger().total_by_account(account))
    }

    pub fn get_total_votes_for_group(&self, group: &Address) -> Result<u128, ElectionError> {
        self.read(|state, _| Ok(state.ledger().total_for_group(group)))
    }

    pub fn get_pending_votes_for_group(&self, group: &Address) -> Result<u128, ElectionError> {
        self.read(|state, _| Ok(state.ledger().pending_for_group(group)))
    }

    pub fn get_active_votes_for_group(&self, group: &Address) -> Result<u128, ElectionError> {
        self.read(|state, _| Ok(state.ledger().active_for_group(group)))
    }

    pub fn get_active_vote_units_for_group(&self, group: &Address) -> Result<u128, ElectionError> {
        self.read(|state, _| Ok(state.ledger().active_units_for_group(group)))
    }

    /// Pending plus active votes across all groups.
    pub fn get_total_votes(&self) -> Result<u128, ElectionError> {
        self.read(|state, _| Ok(state.ledger().total_votes()))
    }

    pub fn get_active_votes(&self) -> Result<u128, ElectionError> {
        self.read(|state, _| Ok(state.ledger().active_total()))
    }

    pub fn get_groups_voted_for_by_account(&self, account: &Address) -> Result<Vec<Address>, ElectionError> {
        self.read(|state, _| Ok(state.ledger().groups_voted_for(account).to_vec()))
    }

    pub fn has_activatable_pending_votes(
        &self,
        account: &Address,
        group: &Address,
    ) -> Result<bool, ElectionError> {
        self.read(|state, c| {
            let pending = state.ledger().pending_vote(account, group);
            Ok(pending.value > 0 && pending.epoch.has_passed(c.epochs.current_epoch()))
        })
    }

    /// Eligible groups, most votes first.
    pub fn get_eligible_validator_groups(&self) -> Result<Vec<Address>, ElectionError> {
        self.read(|state, _| Ok(state.eligible().iter().map(|(group, _)| group).collect()))
    }

    /// Eligible groups with their totals, most votes first.
    pub fn get_total_votes_for_eligible_validator_groups(
        &self,
    ) -> Result<Vec<(Address, u128)>, ElectionError> {
        self.read(|state, _| Ok(state.eligible_groups()))
    }

    pub fn get_group_eligibility(&self, group: &Address) -> Result<bool, ElectionError> {
        self.read(|state, _| Ok(state.eligible().contains(group)))
    }

    /// Most votes `group` may hold in total.
    pub fn get_num_votes_receivable(&self, group: &Address) -> Result<u128, ElectionError> {
        self.read(|state, c| votes_receivable(state.config(), c, group))
    }

    pub fn can_receive_votes(&self, group: &Address, value: u128) -> Result<bool, ElectionError> {
        self.read(|state, c| {
            let receivable = votes_receivable(state.config(), c, group)?;
            Ok(state
                .ledger()
                .total_for_group(group)
                .checked_add(value)
                .is_some_and(|total| total <= receivable))
        })
    }

    /// `(min, max)` electable validators.
    pub fn get_electable_validators(&self) -> Result<(usize, usize), ElectionError> {
        self.read(|state, _| {
            let config = state.config();
            Ok((
                config.min_electable_validators,
                config.max_electable_validators,
            ))
        })
    }

    pub fn get_max_num_groups_voted_for(&self) -> Result<usize, ElectionError> {
        self.read(|state, _| Ok(state.config().max_num_groups_voted_for))
    }

    pub fn get_electability_threshold(&self) -> Result<Fraction, ElectionError> {
        self.read(|state, _| Ok(state.config().electability_threshold))
    }

    pub fn is_allowed_to_vote_over_max_groups(&self, account: &Address) -> Result<bool, ElectionError> {
        self.read(|state, _| Ok(state.is_allowed_unlimited(account)))
    }

    /// The group's share of `total_epoch_rewards`, by active votes.
    pub fn get_group_epoch_rewards(
        &self,
        group: &Address,
        total_epoch_rewards: u128,
    ) -> Result<u128, ElectionError> {
        self.read(|state, _| state.group_epoch_rewards(group, total_epoch_rewards))
    }

    /// A valid hint for moving `group` to `new_total` in the current ranking.
    pub fn ordering_hints(&self, group: &Address, new_total: u128) -> Result<OrderingHint, ElectionError> {
        self.read(|state, _| Ok(state.eligible().hints_for(group, new_total)))
    }

    /// Hints for [`Election::force_decrement_votes`] against the current state.
    pub fn force_decrement_hints(&self, account: &Address, value: u128) -> Result<SlashHints, ElectionError> {
        self.read(|state, _| state.force_decrement_hints(account, value))
    }

    // ── Housekeeping ────────────────────────────────────────────────────

    /// Take every event committed since the last drain.
    pub fn drain_events(&self) -> Result<Vec<ElectionEvent>, ElectionError> {
        let (_state, _active) = self.enter()?;
        let mut committed = self.events.lock().map_err(|_| ElectionError::LockPoisoned)?;
        Ok(std::mem::take(&mut *committed))
    }

    /// Check the bookkeeping invariants of the committed state.
    pub fn verify_invariants(&self) -> Result<(), ElectionError> {
        self.read(|state, _| state.verify_invariants())
    }

    /// A copy of the committed state.
    pub fn snapshot(&self) -> Result<ElectionState, ElectionError> {
        self.read(|state, _| Ok(state.clone()))
    }

    /// Committed and rejected calls per operation kind.
    pub fn stats(&self) -> BTreeMap<&'static str, OperationCounts> {
        self.stats.snapshot()
    }
}

/// `(members + 1) * total_locked / min(max_electable, registered_validators)`, floored.
fn votes_receivable(
    config: &ElectionConfig,
    c: &Collaborators,
    group: &Address,
) -> Result<u128, ElectionError> {
    let members = c.registry.members(group)?.len() as u128;
    let locked = c.stake.total_locked()?;
    let seats = config
        .max_electable_validators
        .min(c.registry.num_registered_validators()?) as u128;
    if seats == 0 {
        return Ok(0);
    }
    Ok(mul_div_floor(members + 1, locked, seats)?)
}
