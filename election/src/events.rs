//! Events emitted by election state transitions.

use serde::{Deserialize, Serialize};
use valelect_types::{Address, Fraction};

/// One committed state transition.
///
/// Events raised by an operation reach the engine's queue only when the
/// operation commits, so one that fails leaves no events behind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ElectionEvent {
    ElectableValidatorsSet {
        min: usize,
        max: usize,
    },
    MaxNumGroupsVotedForSet {
        max: usize,
    },
    ElectabilityThresholdSet {
        threshold: Fraction,
    },
    AllowedToVoteOverMaxNumberOfGroups {
        account: Address,
        allowed: bool,
    },
    GroupMarkedEligible {
        group: Address,
    },
    GroupMarkedIneligible {
        group: Address,
    },
    VoteCast {
        account: Address,
        group: Address,
        value: u128,
    },
    VoteActivated {
        account: Address,
        group: Address,
        value: u128,
        units: u128,
    },
    PendingVoteRevoked {
        account: Address,
        group: Address,
        value: u128,
    },
    ActiveVoteRevoked {
        account: Address,
        group: Address,
        value: u128,
        units: u128,
    },
    EpochRewardsDistributed {
        group: Address,
        value: u128,
    },
    VotesForceDecremented {
        account: Address,
        value: u128,
    },
}

impl ElectionEvent {
    /// Short snake_case name, used as the log message.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ElectableValidatorsSet { .. } => "electable_validators_set",
            Self::MaxNumGroupsVotedForSet { .. } => "max_num_groups_voted_for_set",
            Self::ElectabilityThresholdSet { .. } => "electability_threshold_set",
            Self::AllowedToVoteOverMaxNumberOfGroups { .. } => {
                "allowed_to_vote_over_max_number_of_groups"
            }
            Self::GroupMarkedEligible { .. } => "group_marked_eligible",
            Self::GroupMarkedIneligible { .. } => "group_marked_ineligible",
            Self::VoteCast { .. } => "vote_cast",
            Self::VoteActivated { .. } => "vote_activated",
            Self::PendingVoteRevoked { .. } => "pending_vote_revoked",
            Self::ActiveVoteRevoked { .. } => "active_vote_revoked",
            Self::EpochRewardsDistributed { .. } => "epoch_rewards_distributed",
            Self::VotesForceDecremented { .. } => "votes_force_decremented",
        }
    }
}
