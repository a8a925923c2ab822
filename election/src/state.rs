//! Vote lifecycle over the ledger and the eligible-group ranking.
//!
//! [`ElectionState`] is plain data: it never calls a collaborator. The engine
//! gathers whatever external facts an operation needs, runs the operation on
//! a clone of the state and commits the clone only if every step succeeded.

use crate::config::{check_electable_bounds, check_threshold, ElectionConfig};
use crate::error::ElectionError;
use crate::events::ElectionEvent;
use crate::ledger::VoteLedger;
use crate::ordering::{EligibleGroups, OrderingHint};
use std::collections::HashSet;
use valelect_types::{mul_div_floor, Address, Epoch, Fraction};

#[derive(Clone, Debug, Default)]
pub struct ElectionState {
    pub(crate) config: ElectionConfig,
    pub(crate) ledger: VoteLedger,
    pub(crate) eligible: EligibleGroups,
    /// Accounts allowed to vote for more than the configured number of groups.
    pub(crate) unlimited: HashSet<Address>,
    /// Events raised since the engine last took them. Empty between calls.
    pub(crate) events: Vec<ElectionEvent>,
}

fn zero_value() -> ElectionError {
    ElectionError::InvalidInput("vote value cannot be zero".into())
}

impl ElectionState {
    pub fn new(config: ElectionConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &ElectionConfig {
        &self.config
    }

    pub fn ledger(&self) -> &VoteLedger {
        &self.ledger
    }

    pub fn eligible(&self) -> &EligibleGroups {
        &self.eligible
    }

    pub fn events(&self) -> &[ElectionEvent] {
        &self.events
    }

    pub(crate) fn take_events(&mut self) -> Vec<ElectionEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_allowed_unlimited(&self, account: &Address) -> bool {
        self.unlimited.contains(account)
    }

    /// Reposition an eligible group at its current total. Ineligible groups
    /// are not ranked and the hint is ignored.
    pub(crate) fn update_group_ordering(
        &mut self,
        group: &Address,
        hint: OrderingHint,
    ) -> Result<(), ElectionError> {
        if self.eligible.contains(group) {
            let total = self.ledger.total_for_group(group);
            self.eligible.update(*group, total, hint)?;
        }
        Ok(())
    }

    /// Drop `group` from the account's list once nothing is left in it.
    fn forget_group_if_empty(
        &mut self,
        account: &Address,
        group: &Address,
        index: usize,
    ) -> Result<(), ElectionError> {
        if self.ledger.total_for(account, group)? == 0 {
            self.ledger.remove_voted_for_at(account, index)?;
        }
        Ok(())
    }

    // ── Votes ───────────────────────────────────────────────────────────

    /// Cast `value` pending votes. `receivable` is the most the group may hold
    /// in total, computed by the caller from the stake and registry collaborators.
    pub fn cast_vote(
        &mut self,
        account: &Address,
        group: &Address,
        value: u128,
        hint: OrderingHint,
        epoch: Epoch,
        receivable: u128,
    ) -> Result<(), ElectionError> {
        if value == 0 {
            return Err(zero_value());
        }
        if !self.eligible.contains(group) {
            return Err(ElectionError::GroupNotEligible(*group));
        }
        let new_total = self
            .ledger
            .total_for_group(group)
            .checked_add(value)
            .ok_or(ElectionError::ArithmeticOverflow)?;
        if new_total > receivable {
            return Err(ElectionError::GroupCannotReceiveVotes(*group));
        }

        let limit = (!self.is_allowed_unlimited(account))
            .then_some(self.config.max_num_groups_voted_for);
        self.ledger.ensure_voted_for(account, group, limit)?;
        self.ledger.add_pending(account, group, value, epoch)?;
        self.update_group_ordering(group, hint)?;

        self.events.push(ElectionEvent::VoteCast {
            account: *account,
            group: *group,
            value,
        });
        Ok(())
    }

    /// Convert the account's pending votes for the group into active votes.
    pub fn activate(
        &mut self,
        account: &Address,
        group: &Address,
        now: Epoch,
    ) -> Result<(u128, u128), ElectionError> {
        let (value, units) = self.ledger.activate(account, group, now)?;
        self.events.push(ElectionEvent::VoteActivated {
            account: *account,
            group: *group,
            value,
            units,
        });
        Ok((value, units))
    }

    pub fn revoke_pending(
        &mut self,
        account: &Address,
        group: &Address,
        value: u128,
        hint: OrderingHint,
        index: usize,
    ) -> Result<(), ElectionError> {
        if value == 0 {
            return Err(zero_value());
        }
        self.ledger.check_index(account, group, index)?;
        self.ledger.remove_pending(account, group, value)?;
        self.update_group_ordering(group, hint)?;
        self.forget_group_if_empty(account, group, index)?;

        self.events.push(ElectionEvent::PendingVoteRevoked {
            account: *account,
            group: *group,
            value,
        });
        Ok(())
    }

    /// Revoke active votes. Returns the units burned.
    pub fn revoke_active(
        &mut self,
        account: &Address,
        group: &Address,
        value: u128,
        hint: OrderingHint,
        index: usize,
    ) -> Result<u128, ElectionError> {
        if value == 0 {
            return Err(zero_value());
        }
        self.ledger.check_index(account, group, index)?;
        let units = self.ledger.remove_active(account, group, value)?;
        self.update_group_ordering(group, hint)?;
        self.forget_group_if_empty(account, group, index)?;

        self.events.push(ElectionEvent::ActiveVoteRevoked {
            account: *account,
            group: *group,
            value,
            units,
        });
        Ok(units)
    }

    /// Revoke the account's entire active value for the group. Returns the value revoked.
    pub fn revoke_all_active(
        &mut self,
        account: &Address,
        group: &Address,
        hint: OrderingHint,
        index: usize,
    ) -> Result<u128, ElectionError> {
        let value = self.ledger.active_for(account, group)?;
        self.revoke_active(account, group, value, hint, index)?;
        Ok(value)
    }

    /// Grow the group's active pool by `value` without minting units.
    pub fn distribute_rewards(
        &mut self,
        group: &Address,
        value: u128,
        hint: OrderingHint,
    ) -> Result<(), ElectionError> {
        if value > 0 && self.ledger.active_units_for_group(group) == 0 {
            return Err(ElectionError::InvalidInput(format!(
                "group {group} has no active votes to reward"
            )));
        }
        self.ledger.add_rewards(group, value)?;
        self.update_group_ordering(group, hint)?;
        self.events.push(ElectionEvent::EpochRewardsDistributed {
            group: *group,
            value,
        });
        Ok(())
    }

    // ── Eligibility ─────────────────────────────────────────────────────

    pub fn mark_group_eligible(
        &mut self,
        group: &Address,
        hint: OrderingHint,
    ) -> Result<(), ElectionError> {
        if self.eligible.contains(group) {
            return Err(ElectionError::GroupAlreadyEligible(*group));
        }
        let total = self.ledger.total_for_group(group);
        self.eligible.insert(*group, total, hint)?;
        self.events
            .push(ElectionEvent::GroupMarkedEligible { group: *group });
        Ok(())
    }

    pub fn mark_group_ineligible(&mut self, group: &Address) -> Result<(), ElectionError> {
        if !self.eligible.contains(group) {
            return Err(ElectionError::GroupNotEligible(*group));
        }
        self.eligible.remove(group)?;
        self.events
            .push(ElectionEvent::GroupMarkedIneligible { group: *group });
        Ok(())
    }

    // ── Parameters ──────────────────────────────────────────────────────

    pub fn set_electable_validators(&mut self, min: usize, max: usize) -> Result<(), ElectionError> {
        check_electable_bounds(min, max)?;
        if self.config.min_electable_validators == min && self.config.max_electable_validators == max
        {
            return Err(ElectionError::ConfigUnchanged("electable validators"));
        }
        self.config.min_electable_validators = min;
        self.config.max_electable_validators = max;
        self.events
            .push(ElectionEvent::ElectableValidatorsSet { min, max });
        Ok(())
    }

    pub fn set_max_num_groups_voted_for(&mut self, max: usize) -> Result<(), ElectionError> {
        if self.config.max_num_groups_voted_for == max {
            return Err(ElectionError::ConfigUnchanged("max groups voted for"));
        }
        self.config.max_num_groups_voted_for = max;
        self.events
            .push(ElectionEvent::MaxNumGroupsVotedForSet { max });
        Ok(())
    }

    pub fn set_electability_threshold(&mut self, threshold: Fraction) -> Result<(), ElectionError> {
        check_threshold(&threshold)?;
        if self.config.electability_threshold == threshold {
            return Err(ElectionError::ConfigUnchanged("electability threshold"));
        }
        self.config.electability_threshold = threshold;
        self.events
            .push(ElectionEvent::ElectabilityThresholdSet { threshold });
        Ok(())
    }

    pub fn set_allowed_to_vote_over_max_groups(
        &mut self,
        account: &Address,
        allowed: bool,
    ) -> Result<(), ElectionError> {
        if self.is_allowed_unlimited(account) == allowed {
            return Err(ElectionError::ConfigUnchanged("over max groups flag"));
        }
        if allowed {
            self.unlimited.insert(*account);
        } else {
            if self.ledger.groups_voted_for(account).len() > self.config.max_num_groups_voted_for {
                return Err(ElectionError::TooManyGroups);
            }
            self.unlimited.remove(account);
        }
        self.events
            .push(ElectionEvent::AllowedToVoteOverMaxNumberOfGroups {
                account: *account,
                allowed,
            });
        Ok(())
    }

    // ── Queries ─────────────────────────────────────────────────────────

    /// Eligible groups with their totals, most votes first.
    pub fn eligible_groups(&self) -> Vec<(Address, u128)> {
        self.eligible.iter().collect()
    }

    /// Votes a group must hold to take part in an election. A group below the
    /// exact threshold share of all votes is excluded, so the share rounds up.
    pub fn required_votes(&self) -> Result<u128, ElectionError> {
        Ok(self
            .config
            .electability_threshold
            .mul_ceil(self.ledger.total_votes())?)
    }

    /// Leading eligible groups that meet the threshold, at most `max_groups`.
    pub fn election_candidates(&self, max_groups: usize) -> Result<Vec<(Address, u128)>, ElectionError> {
        let required = self.required_votes()?;
        Ok(self
            .eligible
            .iter()
            .take(max_groups)
            .take_while(|(_, votes)| *votes >= required)
            .collect())
    }

    /// The group's share of `total_rewards`, proportional to its active votes.
    pub fn group_epoch_rewards(
        &self,
        group: &Address,
        total_rewards: u128,
    ) -> Result<u128, ElectionError> {
        let active_total = self.ledger.active_total();
        if !self.eligible.contains(group) || active_total == 0 {
            return Ok(0);
        }
        Ok(mul_div_floor(
            total_rewards,
            self.ledger.active_for_group(group),
            active_total,
        )?)
    }

    /// Ledger invariants plus ranking consistency.
    pub fn verify_invariants(&self) -> Result<(), ElectionError> {
        self.ledger.verify_invariants()?;
        let mut previous: Option<u128> = None;
        for (group, value) in self.eligible.iter() {
            if value != self.ledger.total_for_group(&group) {
                return Err(ElectionError::InvariantViolation(format!(
                    "ranked total of {group} is stale"
                )));
            }
            if previous.is_some_and(|p| p < value) {
                return Err(ElectionError::InvariantViolation(format!(
                    "ranking out of order at {group}"
                )));
            }
            previous = Some(value);
        }
        Ok(())
    }
}
