//! Integration tests driving the public election surface end to end:
//! voting → activation → rewards → revocation → slashing → election,
//! with nullable stake, registry, randomness and epoch collaborators.

mod common;

use common::{addr, member, Fixture};
use std::collections::HashMap;
use valelect_election::{
    Election, ElectionConfig, ElectionError, ElectionEvent, ErrorKind, OperationCounts, OrderingHint,
    StakeLedger,
};
use valelect_nullables::{NullHarness, OWNER, STAKE_AUTHORITY, VALIDATOR_REGISTRY};
use valelect_types::{Address, Fraction, Seed};

const ALICE: u64 = 1;
const BOB: u64 = 2;

fn seats_by_group(elected: &[Address]) -> HashMap<u64, usize> {
    let mut seats = HashMap::new();
    for validator in elected {
        let mut low = [0u8; 8];
        low.copy_from_slice(&validator.as_bytes()[12..]);
        *seats.entry(u64::from_be_bytes(low) / 100).or_insert(0) += 1;
    }
    seats
}

// ---------------------------------------------------------------------------
// 1. Basic vote and revoke
// ---------------------------------------------------------------------------

#[test]
fn partial_then_full_pending_revoke() {
    let f = Fixture::new();
    let g = f.eligible_group(10, 3);
    let alice = addr(ALICE);
    f.lock(&alice, 1000);

    f.vote(&alice, &g, 1000).unwrap();
    assert_eq!(f.election.get_pending_votes_for_group_by_account(&g, &alice).unwrap(), 1000);
    assert_eq!(f.election.get_groups_voted_for_by_account(&alice).unwrap(), vec![g]);

    f.election
        .revoke_pending(&alice, &g, 999, OrderingHint::NONE, 0)
        .unwrap();
    assert_eq!(f.election.get_pending_votes_for_group_by_account(&g, &alice).unwrap(), 1);
    assert_eq!(f.election.get_groups_voted_for_by_account(&alice).unwrap(), vec![g]);

    f.election
        .revoke_pending(&alice, &g, 1, OrderingHint::NONE, 0)
        .unwrap();
    assert_eq!(f.election.get_pending_votes_for_group_by_account(&g, &alice).unwrap(), 0);
    assert!(f.election.get_groups_voted_for_by_account(&alice).unwrap().is_empty());
    assert_eq!(f.election.get_total_votes().unwrap(), 0);
    f.election.verify_invariants().unwrap();
}

#[test]
fn zero_value_vote_rejected() {
    let f = Fixture::new();
    let g = f.eligible_group(10, 3);
    let err = f.vote(&addr(ALICE), &g, 0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert_eq!(err.to_string(), "vote value cannot be zero");
}

#[test]
fn revoke_more_than_pending_fails() {
    let f = Fixture::new();
    let g = f.eligible_group(10, 3);
    let alice = addr(ALICE);
    f.lock(&alice, 100);
    f.vote(&alice, &g, 100).unwrap();
    let err = f.revoke_pending(&alice, &g, 101).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientBalance);
    assert_eq!(f.election.get_total_votes().unwrap(), 100);
}

#[test]
fn revoke_with_stale_index_fails() {
    let f = Fixture::new();
    let g1 = f.eligible_group(10, 3);
    let g2 = f.eligible_group(11, 3);
    let alice = addr(ALICE);
    f.lock(&alice, 100);
    f.vote(&alice, &g1, 50).unwrap();
    f.vote(&alice, &g2, 50).unwrap();
    let hint = f.election.ordering_hints(&g1, 40).unwrap();
    let err = f.election.revoke_pending(&alice, &g1, 10, hint, 1).unwrap_err();
    assert_eq!(err.to_string(), "bad index");
}

#[test]
fn full_revoke_swaps_last_group_into_place() {
    let f = Fixture::new();
    let groups: Vec<_> = (10..13).map(|g| f.eligible_group(g, 2)).collect();
    let alice = addr(ALICE);
    f.lock(&alice, 300);
    for g in &groups {
        f.vote(&alice, g, 100).unwrap();
    }
    f.revoke_pending(&alice, &groups[0], 100).unwrap();
    assert_eq!(
        f.election.get_groups_voted_for_by_account(&alice).unwrap(),
        vec![groups[2], groups[1]]
    );
}

// ---------------------------------------------------------------------------
// 2. Activation and rewards
// ---------------------------------------------------------------------------

#[test]
fn activation_then_reward() {
    let f = Fixture::new();
    let g = f.eligible_group(10, 3);
    let alice = addr(ALICE);
    f.lock(&alice, 1000);

    f.vote(&alice, &g, 1000).unwrap();
    f.advance_epoch();
    assert_eq!(f.activate(&alice, &g).unwrap(), 1000);
    assert_eq!(f.election.get_active_votes_for_group_by_account(&g, &alice).unwrap(), 1000);
    assert_eq!(
        f.election
            .get_active_vote_units_for_group_by_account(&g, &alice)
            .unwrap(),
        1000
    );

    f.reward(&g, 111).unwrap();
    assert_eq!(f.election.get_active_votes_for_group_by_account(&g, &alice).unwrap(), 1111);
    assert_eq!(f.election.get_total_votes_for_group(&g).unwrap(), 1111);
    assert_eq!(f.election.get_active_vote_units_for_group(&g).unwrap(), 1000);
    f.election.verify_invariants().unwrap();
}

#[test]
fn activation_waits_for_next_epoch() {
    let f = Fixture::new();
    let g = f.eligible_group(10, 3);
    let alice = addr(ALICE);
    f.lock(&alice, 1000);
    f.vote(&alice, &g, 1000).unwrap();

    let err = f.activate(&alice, &g).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotYetActivatable);
    assert!(!f.election.has_activatable_pending_votes(&alice, &g).unwrap());

    f.advance_epoch();
    assert!(f.election.has_activatable_pending_votes(&alice, &g).unwrap());
    f.activate(&alice, &g).unwrap();

    let err = f.activate(&alice, &g).unwrap_err();
    assert!(matches!(err, ElectionError::NoPendingVotes));
}

#[test]
fn voting_again_resets_pending_epoch() {
    let f = Fixture::new();
    let g = f.eligible_group(10, 3);
    let alice = addr(ALICE);
    f.lock(&alice, 1000);
    f.vote(&alice, &g, 500).unwrap();
    f.advance_epoch();
    f.vote(&alice, &g, 500).unwrap();
    assert!(f.activate(&alice, &g).is_err());
    f.advance_epoch();
    assert_eq!(f.activate(&alice, &g).unwrap(), 1000);
}

#[test]
fn anyone_may_activate_for_an_account() {
    let f = Fixture::new();
    let g = f.eligible_group(10, 3);
    let alice = addr(ALICE);
    f.lock(&alice, 1000);
    f.vote(&alice, &g, 1000).unwrap();
    f.advance_epoch();
    assert_eq!(
        f.election.activate_for_account(&addr(BOB), &alice, &g).unwrap(),
        1000
    );
    assert_eq!(f.election.get_active_votes_for_group_by_account(&g, &alice).unwrap(), 1000);
}

#[test]
fn rewards_are_shared_by_active_voters() {
    let f = Fixture::new();
    let g = f.eligible_group(10, 3);
    let (alice, bob) = (addr(ALICE), addr(BOB));
    f.lock(&alice, 3000);
    f.lock(&bob, 1000);
    f.vote(&alice, &g, 3000).unwrap();
    f.vote(&bob, &g, 1000).unwrap();
    f.advance_epoch();
    f.activate(&alice, &g).unwrap();
    f.activate(&bob, &g).unwrap();

    assert_eq!(f.election.get_group_epoch_rewards(&g, 400).unwrap(), 400);
    f.reward(&g, 400).unwrap();
    assert_eq!(f.election.get_active_votes_for_group_by_account(&g, &alice).unwrap(), 3300);
    assert_eq!(f.election.get_active_votes_for_group_by_account(&g, &bob).unwrap(), 1100);

    let revoked = f
        .election
        .revoke_all_active(&bob, &g, f.election.ordering_hints(&g, 3300).unwrap(), 0)
        .unwrap();
    assert_eq!(revoked, 1100);
    assert_eq!(f.harness.stake.nonvoting(&bob), 1100);
    assert!(f.election.get_groups_voted_for_by_account(&bob).unwrap().is_empty());
}

#[test]
fn revoke_more_than_active_fails() {
    let f = Fixture::new();
    let g = f.eligible_group(10, 3);
    let alice = addr(ALICE);
    f.lock(&alice, 100);
    f.vote(&alice, &g, 100).unwrap();
    f.advance_epoch();
    f.activate(&alice, &g).unwrap();
    let err = f.revoke_active(&alice, &g, 101).unwrap_err();
    assert!(matches!(
        err,
        ElectionError::InsufficientActiveVotes {
            requested: 101,
            available: 100
        }
    ));
    assert_eq!(err.kind(), ErrorKind::InsufficientBalance);
}

#[test]
fn epoch_rewards_split_by_active_votes() {
    let f = Fixture::new();
    let g1 = f.eligible_group(10, 3);
    let g2 = f.eligible_group(11, 3);
    let alice = addr(ALICE);
    f.lock(&alice, 1000);
    f.vote(&alice, &g1, 750).unwrap();
    f.vote(&alice, &g2, 250).unwrap();
    assert_eq!(f.election.get_group_epoch_rewards(&g1, 100).unwrap(), 0);
    f.advance_epoch();
    f.activate(&alice, &g1).unwrap();
    f.activate(&alice, &g2).unwrap();
    assert_eq!(f.election.get_group_epoch_rewards(&g1, 100).unwrap(), 75);
    assert_eq!(f.election.get_group_epoch_rewards(&g2, 100).unwrap(), 25);
}

// ---------------------------------------------------------------------------
// 3. Forced decrement
// ---------------------------------------------------------------------------

#[test]
fn slash_across_two_groups() {
    let f = Fixture::new();
    let a = f.eligible_group(10, 3);
    let b = f.eligible_group(11, 3);
    let alice = addr(ALICE);
    f.lock(&alice, 1000);

    f.vote(&alice, &a, 200).unwrap();
    f.vote(&alice, &b, 300).unwrap();
    f.advance_epoch();
    f.activate(&alice, &a).unwrap();
    f.activate(&alice, &b).unwrap();
    f.vote(&alice, &a, 100).unwrap();
    f.vote(&alice, &b, 400).unwrap();
    assert_eq!(f.election.get_total_votes_for_group(&a).unwrap(), 300);
    assert_eq!(f.election.get_total_votes_for_group(&b).unwrap(), 700);
    f.election.drain_events().unwrap();

    assert_eq!(f.slash(&alice, 450).unwrap(), 450);

    assert_eq!(f.election.get_total_votes_for_group_by_account(&a, &alice).unwrap(), 0);
    assert_eq!(f.election.get_pending_votes_for_group_by_account(&b, &alice).unwrap(), 250);
    assert_eq!(f.election.get_active_votes_for_group_by_account(&b, &alice).unwrap(), 300);
    assert_eq!(f.account_total(&alice), 1000 - 450);
    assert_eq!(f.election.get_total_votes().unwrap(), 550);
    assert_eq!(f.election.get_groups_voted_for_by_account(&alice).unwrap(), vec![b]);
    assert_eq!(
        f.election.get_total_votes_for_eligible_validator_groups().unwrap(),
        vec![(b, 550), (a, 0)]
    );
    assert_eq!(
        f.election.drain_events().unwrap(),
        vec![ElectionEvent::VotesForceDecremented {
            account: alice,
            value: 450
        }]
    );
    // Slashed stake is not handed back.
    assert_eq!(f.harness.stake.nonvoting(&alice), 0);
    f.election.verify_invariants().unwrap();
}

#[test]
fn slash_larger_than_votes_changes_nothing() {
    let f = Fixture::new();
    let a = f.eligible_group(10, 3);
    let alice = addr(ALICE);
    f.lock(&alice, 500);
    f.vote(&alice, &a, 500).unwrap();

    let err = f.slash(&alice, 501).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IncompleteSlash);
    assert_eq!(f.account_total(&alice), 500);
    assert_eq!(f.election.get_groups_voted_for_by_account(&alice).unwrap(), vec![a]);
}

#[test]
fn slash_requires_stake_authority() {
    let f = Fixture::new();
    let a = f.eligible_group(10, 3);
    let alice = addr(ALICE);
    f.lock(&alice, 500);
    f.vote(&alice, &a, 500).unwrap();
    let err = f
        .election
        .force_decrement_votes(&alice, &alice, 100, &[None], &[None], &[0])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert_eq!(
        err.to_string(),
        format!("caller {alice} is not authorized to force decrement votes")
    );
}

#[test]
fn slash_with_mismatched_inputs() {
    let f = Fixture::new();
    let a = f.eligible_group(10, 3);
    let alice = addr(ALICE);
    f.lock(&alice, 500);
    f.vote(&alice, &a, 500).unwrap();
    let err = f
        .election
        .force_decrement_votes(&STAKE_AUTHORITY, &alice, 100, &[None, None], &[None], &[0])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert_eq!(err.to_string(), "input lengths must correspond");
}

// ---------------------------------------------------------------------------
// 4. Elections
// ---------------------------------------------------------------------------

#[test]
fn seats_follow_highest_averages() {
    let f = Fixture::new();
    let alice = addr(ALICE);
    f.lock(&alice, 160);
    for (group, votes) in [(1u64, 80u128), (2, 50), (3, 30)] {
        let g = f.eligible_group(group, 3);
        f.vote(&alice, &g, votes).unwrap();
    }
    f.election.set_electable_validators(&OWNER, 4, 6).unwrap();

    let elected = f.election.elect_validators().unwrap();
    assert_eq!(elected.len(), 6);
    let seats = seats_by_group(&elected);
    assert_eq!(seats[&1], 3);
    assert_eq!(seats[&2], 2);
    assert_eq!(seats[&3], 1);
    assert!(elected.contains(&member(2, 0)) && elected.contains(&member(2, 1)));
    assert!(elected.contains(&member(3, 0)));
}

#[test]
fn election_fails_without_enough_members() {
    let f = Fixture::new();
    let alice = addr(ALICE);
    f.lock(&alice, 160);
    for (group, votes) in [(1u64, 80u128), (2, 50), (3, 30)] {
        let g = f.eligible_group(group, 1);
        f.vote(&alice, &g, votes).unwrap();
    }
    let err = f.election.elect_n_validators(4, 6).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientElectableValidators);
    assert_eq!(
        err.to_string(),
        "not enough elected validators: elected 3, minimum 4"
    );
}

#[test]
fn groups_below_threshold_are_not_elected() {
    let f = Fixture::new();
    let alice = addr(ALICE);
    f.lock(&alice, 1000);
    let big = f.eligible_group(1, 2);
    let small = f.eligible_group(2, 2);
    f.vote(&alice, &big, 950).unwrap();
    f.vote(&alice, &small, 50).unwrap();
    f.election
        .set_electability_threshold(&OWNER, "0.1".parse().unwrap())
        .unwrap();

    let elected = f.election.elect_n_validators(1, 4).unwrap();
    assert_eq!(seats_by_group(&elected).get(&2), None);
    assert_eq!(elected.len(), 2);
}

#[test]
fn election_order_depends_only_on_seed() {
    let run = |seed: Seed| {
        let f = Fixture::build(ElectionConfig::default(), seed);
        let alice = addr(ALICE);
        f.lock(&alice, 1000);
        for group in 1..=3u64 {
            let g = f.eligible_group(group, 4);
            f.vote(&alice, &g, 100 * group as u128).unwrap();
        }
        f.election.elect_n_validators(1, 12).unwrap()
    };
    let first = run(Seed::new([3u8; 32]));
    assert_eq!(first, run(Seed::new([3u8; 32])));

    let mut a = first.clone();
    let mut b = run(Seed::new([4u8; 32]));
    a.sort();
    b.sort();
    assert_eq!(a, b);
}

#[test]
fn ineligible_groups_leave_the_ranking() {
    let f = Fixture::new();
    let g = f.eligible_group(10, 3);
    let alice = addr(ALICE);
    f.lock(&alice, 100);
    f.vote(&alice, &g, 100).unwrap();
    f.election
        .mark_group_ineligible(&VALIDATOR_REGISTRY, &g)
        .unwrap();
    assert!(!f.election.get_group_eligibility(&g).unwrap());
    assert!(f.election.get_eligible_validator_groups().unwrap().is_empty());

    // Existing votes stay and can still be revoked.
    f.revoke_pending(&alice, &g, 100).unwrap();
    let err = f.vote(&alice, &g, 10).unwrap_err();
    assert!(matches!(err, ElectionError::GroupNotEligible(_)));
}

#[test]
fn only_registered_groups_become_eligible() {
    let f = Fixture::new();
    let err = f
        .election
        .mark_group_eligible(
            &VALIDATOR_REGISTRY,
            &addr(99),
            OrderingHint::NONE,
        )
        .unwrap_err();
    assert!(matches!(err, ElectionError::NotValidatorGroup(_)));

    let g = f.eligible_group(10, 1);
    let err = f
        .election
        .mark_group_eligible(&VALIDATOR_REGISTRY, &g, OrderingHint::NONE)
        .unwrap_err();
    assert!(matches!(err, ElectionError::GroupAlreadyEligible(_)));
}

// ---------------------------------------------------------------------------
// 5. Limits and parameters
// ---------------------------------------------------------------------------

#[test]
fn group_limit_and_override_flag() {
    let f = Fixture::new();
    f.election.set_max_num_groups_voted_for(&OWNER, 2).unwrap();
    let groups: Vec<_> = (10..13).map(|g| f.eligible_group(g, 2)).collect();
    let alice = addr(ALICE);
    f.lock(&alice, 300);

    f.vote(&alice, &groups[0], 100).unwrap();
    f.vote(&alice, &groups[1], 100).unwrap();
    let err = f.vote(&alice, &groups[2], 100).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CapacityExceeded);
    assert_eq!(err.to_string(), "voted for too many groups");

    f.election
        .set_allowed_to_vote_over_max_groups(&alice, true)
        .unwrap();
    f.vote(&alice, &groups[2], 100).unwrap();
    assert!(f.election.is_allowed_to_vote_over_max_groups(&alice).unwrap());

    let err = f
        .election
        .set_allowed_to_vote_over_max_groups(&alice, false)
        .unwrap_err();
    assert!(matches!(err, ElectionError::TooManyGroups));
}

#[test]
fn vote_cap_per_group() {
    let harness = NullHarness::new();
    let alice = addr(ALICE);
    harness.stake.lock(&alice, 1000);
    let g = addr(10);
    harness.registry.add_group(g, vec![member(10, 0)]);
    harness.registry.set_registered_validators(10);
    let election = Election::new(ElectionConfig::default(), harness.collaborators()).unwrap();
    election
        .mark_group_eligible(&VALIDATOR_REGISTRY, &g, OrderingHint::NONE)
        .unwrap();

    // (1 member + 1) * 1000 locked / min(100, 10) registered.
    assert_eq!(election.get_num_votes_receivable(&g).unwrap(), 200);
    assert!(election.can_receive_votes(&g, 200).unwrap());
    assert!(!election.can_receive_votes(&g, 201).unwrap());

    let err = election.vote(&alice, &g, 201, OrderingHint::NONE).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CapacityExceeded);
    election.vote(&alice, &g, 200, OrderingHint::NONE).unwrap();
}

#[test]
fn unchanged_parameters_are_rejected() {
    let f = Fixture::new();
    let err = f.election.set_electable_validators(&OWNER, 1, 100).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigUnchanged);
    assert_eq!(err.to_string(), "electable validators not changed");

    let err = f.election.set_max_num_groups_voted_for(&OWNER, 10).unwrap_err();
    assert_eq!(err.to_string(), "max groups voted for not changed");

    let threshold: Fraction = "0.01".parse().unwrap();
    let err = f
        .election
        .set_electability_threshold(&OWNER, threshold)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigUnchanged);

    let err = f
        .election
        .set_allowed_to_vote_over_max_groups(&addr(ALICE), false)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigUnchanged);
}

#[test]
fn parameters_update_and_emit_events() {
    let f = Fixture::new();
    f.election.drain_events().unwrap();
    f.election.set_electable_validators(&OWNER, 2, 50).unwrap();
    f.election.set_max_num_groups_voted_for(&OWNER, 3).unwrap();
    let threshold: Fraction = "0.05".parse().unwrap();
    f.election
        .set_electability_threshold(&OWNER, threshold)
        .unwrap();

    assert_eq!(f.election.get_electable_validators().unwrap(), (2, 50));
    assert_eq!(f.election.get_max_num_groups_voted_for().unwrap(), 3);
    assert_eq!(f.election.get_electability_threshold().unwrap(), threshold);
    assert_eq!(
        f.election.drain_events().unwrap(),
        vec![
            ElectionEvent::ElectableValidatorsSet { min: 2, max: 50 },
            ElectionEvent::MaxNumGroupsVotedForSet { max: 3 },
            ElectionEvent::ElectabilityThresholdSet { threshold },
        ]
    );
}

// ---------------------------------------------------------------------------
// 6. Stake round trip and signers
// ---------------------------------------------------------------------------

#[test]
fn vote_then_revoke_restores_stake() {
    let f = Fixture::new();
    let g = f.eligible_group(10, 3);
    let alice = addr(ALICE);
    f.lock(&alice, 1000);

    let pending_before = f.election.get_pending_votes_for_group(&g).unwrap();
    f.vote(&alice, &g, 400).unwrap();
    assert_eq!(f.harness.stake.nonvoting_balance(&alice).unwrap(), 600);

    f.revoke_pending(&alice, &g, 400).unwrap();
    assert_eq!(f.harness.stake.nonvoting_balance(&alice).unwrap(), 1000);
    assert_eq!(f.election.get_pending_votes_for_group(&g).unwrap(), pending_before);
}

#[test]
fn vote_beyond_nonvoting_balance_changes_nothing() {
    let f = Fixture::new();
    let g = f.eligible_group(10, 3);
    let alice = addr(ALICE);
    f.lock(&alice, 100);
    f.election.drain_events().unwrap();

    let err = f.vote(&alice, &g, 200).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientBalance);
    assert_eq!(f.election.get_total_votes().unwrap(), 0);
    assert!(f.election.get_groups_voted_for_by_account(&alice).unwrap().is_empty());
    assert!(f.election.drain_events().unwrap().is_empty());
    f.election.verify_invariants().unwrap();
}

#[test]
fn signer_votes_for_its_account() {
    let f = Fixture::new();
    let g = f.eligible_group(10, 3);
    let alice = addr(ALICE);
    let signer = addr(500);
    f.lock(&alice, 100);
    f.harness.registry.authorize_signer(signer, alice);

    f.vote(&signer, &g, 100).unwrap();
    assert_eq!(f.election.get_pending_votes_for_group_by_account(&g, &alice).unwrap(), 100);
    assert_eq!(f.election.get_pending_votes_for_group_by_account(&g, &signer).unwrap(), 0);
    assert_eq!(f.harness.stake.nonvoting(&alice), 0);
}

#[test]
fn vote_and_activation_events() {
    let f = Fixture::new();
    let g = f.eligible_group(10, 3);
    let alice = addr(ALICE);
    f.lock(&alice, 100);
    assert_eq!(
        f.election.drain_events().unwrap(),
        vec![ElectionEvent::GroupMarkedEligible { group: g }]
    );

    f.vote(&alice, &g, 100).unwrap();
    f.advance_epoch();
    f.activate(&alice, &g).unwrap();
    assert_eq!(
        f.election.drain_events().unwrap(),
        vec![
            ElectionEvent::VoteCast {
                account: alice,
                group: g,
                value: 100
            },
            ElectionEvent::VoteActivated {
                account: alice,
                group: g,
                value: 100,
                units: 100
            },
        ]
    );
    assert!(f.election.drain_events().unwrap().is_empty());
}

#[test]
fn undrained_events_stay_out_of_the_state() {
    let f = Fixture::new();
    let g = f.eligible_group(10, 3);
    let alice = addr(ALICE);
    f.lock(&alice, 1_000);
    for _ in 0..200 {
        f.vote(&alice, &g, 1).unwrap();
    }
    let _ = f.vote(&alice, &g, 0);

    // Every working copy is cloned from this state, so its queue starts empty.
    assert!(f.election.snapshot().unwrap().events().is_empty());

    let events = f.election.drain_events().unwrap();
    assert_eq!(events.len(), 201);
    assert_eq!(events[0], ElectionEvent::GroupMarkedEligible { group: g });
    assert!(events[1..].iter().all(|e| *e
        == ElectionEvent::VoteCast {
            account: alice,
            group: g,
            value: 1
        }));
    assert!(f.election.drain_events().unwrap().is_empty());
}

#[test]
fn engine_counts_operations() {
    let f = Fixture::new();
    let g = f.eligible_group(10, 3);
    let alice = addr(ALICE);
    f.lock(&alice, 100);
    f.vote(&alice, &g, 50).unwrap();
    let _ = f.vote(&alice, &g, 0);
    let _ = f.election.mark_group_ineligible(&addr(ALICE), &g);
    let stats = f.election.stats();
    assert_eq!(stats["vote"], OperationCounts { committed: 1, rejected: 1 });
    assert_eq!(stats["eligibility"], OperationCounts { committed: 1, rejected: 1 });
    assert_eq!(stats["activate"], OperationCounts::default());
    assert!(!stats.contains_key("rejected"));
}
