#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use valelect_election::{Election, ElectionConfig, OrderingHint};
use valelect_nullables::{
    NullHarness, EPOCH_PROCESSOR, OWNER, STAKE_AUTHORITY, VALIDATOR_REGISTRY,
};
use valelect_types::Address;

const ACCOUNTS: u64 = 4;
const GROUPS: u64 = 4;

#[derive(Arbitrary, Debug)]
enum Op {
    Vote { account: u8, group: u8, value: u32, raw_hint: Option<(u8, u8)> },
    Activate { account: u8, group: u8 },
    RevokePending { account: u8, group: u8, value: u32, index: u8 },
    RevokeActive { account: u8, group: u8, value: u32, index: u8 },
    Reward { group: u8, value: u32 },
    Slash { account: u8, value: u32, indices: Vec<u8> },
    ToggleEligible { group: u8 },
    SetMaxGroups { limit: u8 },
    Elect { min: u8, max: u8 },
    AdvanceEpoch,
}

fn account(n: u8) -> Address {
    Address::from_low_u64(1 + u64::from(n) % ACCOUNTS)
}

fn group(n: u8) -> Address {
    Address::from_low_u64(100 + u64::from(n) % GROUPS)
}

/// Honest hints for a new group total, or arbitrary neighbours when `raw` is set.
fn hint(election: &Election, g: &Address, total: u128, raw: Option<(u8, u8)>) -> OrderingHint {
    match raw {
        Some((lesser, greater)) => OrderingHint::new(Some(group(lesser)), Some(group(greater))),
        None => election.ordering_hints(g, total).unwrap_or(OrderingHint::NONE),
    }
}

fn group_total(election: &Election, g: &Address) -> u128 {
    election.get_total_votes_for_group(g).unwrap_or(0)
}

// Drive the engine with arbitrary operation streams. Rejections are fine;
// panics and broken accounting are not.
fuzz_target!(|ops: Vec<Op>| {
    let harness = NullHarness::new();
    let Ok(election) = Election::new(ElectionConfig::default(), harness.collaborators()) else {
        return;
    };
    for n in 0..ACCOUNTS {
        harness.stake.lock(&Address::from_low_u64(1 + n), 1 << 40);
    }
    for n in 0..GROUPS {
        let g = Address::from_low_u64(100 + n);
        harness
            .registry
            .add_group(g, (0..3).map(|m| Address::from_low_u64(1000 + n * 10 + m)).collect());
        let _ = election.mark_group_eligible(&VALIDATOR_REGISTRY, &g, hint(&election, &g, 0, None));
    }

    for op in ops.into_iter().take(256) {
        match op {
            Op::Vote { account: a, group: g, value, raw_hint } => {
                let (a, g, value) = (account(a), group(g), u128::from(value));
                let h = hint(&election, &g, group_total(&election, &g) + value, raw_hint);
                let _ = election.vote(&a, &g, value, h);
            }
            Op::Activate { account: a, group: g } => {
                let _ = election.activate(&account(a), &group(g));
            }
            Op::RevokePending { account: a, group: g, value, index } => {
                let (a, g, value) = (account(a), group(g), u128::from(value));
                let h = hint(&election, &g, group_total(&election, &g).saturating_sub(value), None);
                let _ = election.revoke_pending(&a, &g, value, h, usize::from(index % 8));
            }
            Op::RevokeActive { account: a, group: g, value, index } => {
                let (a, g, value) = (account(a), group(g), u128::from(value));
                let h = hint(&election, &g, group_total(&election, &g).saturating_sub(value), None);
                let _ = election.revoke_active(&a, &g, value, h, usize::from(index % 8));
            }
            Op::Reward { group: g, value } => {
                let (g, value) = (group(g), u128::from(value));
                let h = hint(&election, &g, group_total(&election, &g) + value, None);
                let _ = election.distribute_epoch_rewards(&EPOCH_PROCESSOR, &g, value, h);
            }
            Op::Slash { account: a, value, indices } => {
                let (a, value) = (account(a), u128::from(value));
                if indices.is_empty() {
                    if let Ok(hints) = election.force_decrement_hints(&a, value) {
                        let _ = election.force_decrement_votes(
                            &STAKE_AUTHORITY,
                            &a,
                            value,
                            &hints.lessers,
                            &hints.greaters,
                            &hints.indices,
                        );
                    }
                } else {
                    let indices: Vec<usize> = indices.iter().map(|i| usize::from(*i % 8)).collect();
                    let none = vec![None; indices.len()];
                    let _ = election.force_decrement_votes(
                        &STAKE_AUTHORITY,
                        &a,
                        value,
                        &none,
                        &none,
                        &indices,
                    );
                }
            }
            Op::ToggleEligible { group: g } => {
                let g = group(g);
                if election.get_group_eligibility(&g).unwrap_or(false) {
                    let _ = election.mark_group_ineligible(&VALIDATOR_REGISTRY, &g);
                } else {
                    let h = hint(&election, &g, group_total(&election, &g), None);
                    let _ = election.mark_group_eligible(&VALIDATOR_REGISTRY, &g, h);
                }
            }
            Op::SetMaxGroups { limit } => {
                let _ = election.set_max_num_groups_voted_for(&OWNER, usize::from(limit % 6));
            }
            Op::Elect { min, max } => {
                let _ = election.elect_n_validators(usize::from(min % 16), usize::from(max % 16));
            }
            Op::AdvanceEpoch => harness.epochs.advance(),
        }

        election.verify_invariants().expect("invariants hold after every operation");
        let by_account: u128 = (0..ACCOUNTS)
            .map(|n| {
                election
                    .get_total_votes_by_account(&Address::from_low_u64(1 + n))
                    .expect("query")
            })
            .sum();
        // Floored per-account values never promise more than the pools hold.
        assert!(by_account <= election.get_total_votes().expect("query"));
    }
});
