//! Shared fixture for the election integration and property tests.

#![allow(dead_code)]

use valelect_election::{Election, ElectionConfig, ElectionError, OrderingHint};
use valelect_nullables::{NullHarness, EPOCH_PROCESSOR, STAKE_AUTHORITY, VALIDATOR_REGISTRY};
use valelect_types::{Address, Seed};

/// Holds most of the locked stake so vote caps stay out of the way.
pub const RESERVE: Address = Address::repeat_byte(0xEE);

pub fn addr(n: u64) -> Address {
    Address::from_low_u64(n)
}

/// Members of `group` are derived from its number: `group * 100 + i`.
pub fn member(group: u64, i: u64) -> Address {
    addr(group * 100 + i)
}

pub struct Fixture {
    pub harness: NullHarness,
    pub election: Election,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(ElectionConfig::default())
    }

    pub fn with_config(config: ElectionConfig) -> Self {
        Self::build(config, Seed::ZERO)
    }

    pub fn build(config: ElectionConfig, seed: Seed) -> Self {
        let harness = NullHarness::with_seed(seed);
        harness.stake.lock(&RESERVE, 1_000_000_000);
        let election = Election::new(config, harness.collaborators()).expect("valid config");
        Self { harness, election }
    }

    /// Register a group with `members` validators and mark it eligible.
    pub fn eligible_group(&self, group: u64, members: u64) -> Address {
        let g = addr(group);
        self.harness
            .registry
            .add_group(g, (0..members).map(|i| member(group, i)).collect());
        let total = self.election.get_total_votes_for_group(&g).unwrap();
        let hint = self.election.ordering_hints(&g, total).unwrap();
        self.election
            .mark_group_eligible(&VALIDATOR_REGISTRY, &g, hint)
            .expect("mark eligible");
        g
    }

    pub fn lock(&self, account: &Address, value: u128) {
        self.harness.stake.lock(account, value);
    }

    pub fn advance_epoch(&self) {
        self.harness.epochs.advance();
    }

    fn hint_after(&self, group: &Address, delta: i128) -> OrderingHint {
        let total = self.election.get_total_votes_for_group(group).unwrap() as i128 + delta;
        self.election
            .ordering_hints(group, total.max(0) as u128)
            .unwrap()
    }

    fn index_of(&self, account: &Address, group: &Address) -> usize {
        self.election
            .get_groups_voted_for_by_account(account)
            .unwrap()
            .iter()
            .position(|g| g == group)
            .unwrap_or(usize::MAX)
    }

    pub fn vote(&self, account: &Address, group: &Address, value: u128) -> Result<(), ElectionError> {
        let hint = self.hint_after(group, value as i128);
        self.election.vote(account, group, value, hint)
    }

    pub fn activate(&self, account: &Address, group: &Address) -> Result<u128, ElectionError> {
        self.election.activate(account, group)
    }

    pub fn revoke_pending(
        &self,
        account: &Address,
        group: &Address,
        value: u128,
    ) -> Result<(), ElectionError> {
        let hint = self.hint_after(group, -(value as i128));
        let index = self.index_of(account, group);
        self.election
            .revoke_pending(account, group, value, hint, index)
    }

    pub fn revoke_active(
        &self,
        account: &Address,
        group: &Address,
        value: u128,
    ) -> Result<(), ElectionError> {
        let hint = self.hint_after(group, -(value as i128));
        let index = self.index_of(account, group);
        self.election.revoke_active(account, group, value, hint, index)
    }

    pub fn reward(&self, group: &Address, value: u128) -> Result<(), ElectionError> {
        let hint = self.hint_after(group, value as i128);
        self.election
            .distribute_epoch_rewards(&EPOCH_PROCESSOR, group, value, hint)
    }

    pub fn slash(&self, account: &Address, value: u128) -> Result<u128, ElectionError> {
        let hints = self.election.force_decrement_hints(account, value)?;
        self.election.force_decrement_votes(
            &STAKE_AUTHORITY,
            account,
            value,
            &hints.lessers,
            &hints.greaters,
            &hints.indices,
        )
    }

    /// Pending plus active votes of `account` over every group it lists.
    pub fn account_total(&self, account: &Address) -> u128 {
        self.election.get_total_votes_by_account(account).unwrap()
    }
}
