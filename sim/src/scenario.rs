//! Scenario files and the runner that plays them against nullable collaborators.
//!
//! A scenario declares groups with their members, accounts with locked stake,
//! and a list of steps. Every step computes its own ordering hints and list
//! indices from the engine's current state, the way a well-behaved client would.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use valelect_election::{
    Election, ElectionConfig, ElectionError, ElectionEvent, EpochSource, OrderingHint,
};
use valelect_nullables::{NullHarness, EPOCH_PROCESSOR, STAKE_AUTHORITY, VALIDATOR_REGISTRY};
use valelect_types::{Address, Seed};

#[derive(Clone, Debug, Deserialize)]
pub struct Scenario {
    /// Hex-encoded 32-byte randomness base. Zero when absent.
    #[serde(default)]
    pub seed: Option<String>,
    #[serde(default)]
    pub groups: Vec<GroupSpec>,
    #[serde(default)]
    pub accounts: Vec<AccountSpec>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct GroupSpec {
    pub address: Address,
    pub members: Vec<Address>,
    #[serde(default = "default_eligible")]
    pub eligible: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AccountSpec {
    pub address: Address,
    pub locked: u64,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Vote {
        account: Address,
        group: Address,
        value: u64,
    },
    Activate {
        account: Address,
        group: Address,
    },
    RevokePending {
        account: Address,
        group: Address,
        value: u64,
    },
    RevokeActive {
        account: Address,
        group: Address,
        value: u64,
    },
    Reward {
        group: Address,
        value: u64,
    },
    Slash {
        account: Address,
        value: u64,
    },
    MarkIneligible {
        group: Address,
    },
    AdvanceEpoch {
        #[serde(default = "default_epochs")]
        epochs: u64,
    },
}

fn default_eligible() -> bool {
    true
}

fn default_epochs() -> u64 {
    1
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::Vote { .. } => "vote",
            Step::Activate { .. } => "activate",
            Step::RevokePending { .. } => "revoke_pending",
            Step::RevokeActive { .. } => "revoke_active",
            Step::Reward { .. } => "reward",
            Step::Slash { .. } => "slash",
            Step::MarkIneligible { .. } => "mark_ineligible",
            Step::AdvanceEpoch { .. } => "advance_epoch",
        }
    }
}

impl Scenario {
    pub fn from_toml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("parsing scenario {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    fn seed(&self) -> anyhow::Result<Seed> {
        let Some(hex_seed) = &self.seed else {
            return Ok(Seed::ZERO);
        };
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(hex_seed.trim_start_matches("0x"), &mut bytes)
            .context("seed must be 32 hex-encoded bytes")?;
        Ok(Seed::new(bytes))
    }
}

/// Outcome of a scenario run, printed as JSON by the CLI.
#[derive(Clone, Debug, Serialize)]
pub struct Report {
    pub epoch: u64,
    pub total_votes: u128,
    pub ranking: Vec<RankedGroup>,
    pub elected: Vec<Address>,
    /// Why the final election failed, if it did.
    pub election_error: Option<String>,
    pub rejected: Vec<Rejection>,
    pub events: Vec<ElectionEvent>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RankedGroup {
    pub group: Address,
    pub votes: u128,
}

#[derive(Clone, Debug, Serialize)]
pub struct Rejection {
    pub step: usize,
    pub action: &'static str,
    pub reason: String,
}

/// Build the collaborators, play every step and run a final election.
///
/// Rejected steps are recorded and the run continues.
pub fn run(config: ElectionConfig, scenario: &Scenario) -> anyhow::Result<Report> {
    let harness = NullHarness::with_seed(scenario.seed()?);
    let election = Election::new(config, harness.collaborators())?;

    for account in &scenario.accounts {
        harness.stake.lock(&account.address, account.locked.into());
    }
    for group in &scenario.groups {
        harness
            .registry
            .add_group(group.address, group.members.clone());
        if group.eligible {
            let hint = election.ordering_hints(&group.address, 0)?;
            election
                .mark_group_eligible(&VALIDATOR_REGISTRY, &group.address, hint)
                .with_context(|| format!("marking group {} eligible", group.address))?;
        }
    }

    let mut rejected = Vec::new();
    for (i, step) in scenario.steps.iter().enumerate() {
        if let Err(e) = apply(&harness, &election, step) {
            tracing::warn!(step = i, action = step.name(), error = %e, "step rejected");
            rejected.push(Rejection {
                step: i,
                action: step.name(),
                reason: e.to_string(),
            });
        }
    }

    let (elected, election_error) = match election.elect_validators() {
        Ok(elected) => (elected, None),
        Err(e) => (Vec::new(), Some(e.to_string())),
    };
    let ranking = election
        .get_total_votes_for_eligible_validator_groups()?
        .into_iter()
        .map(|(group, votes)| RankedGroup { group, votes })
        .collect();

    Ok(Report {
        epoch: harness.epochs.current_epoch().number(),
        total_votes: election.get_total_votes()?,
        ranking,
        elected,
        election_error,
        rejected,
        events: election.drain_events()?,
    })
}

fn apply(harness: &NullHarness, election: &Election, step: &Step) -> Result<(), ElectionError> {
    match *step {
        Step::Vote {
            account,
            group,
            value,
        } => {
            let value = u128::from(value);
            let hint = hint_after(election, &group, value, true)?;
            election.vote(&account, &group, value, hint)
        }
        Step::Activate { account, group } => election.activate(&account, &group).map(|_| ()),
        Step::RevokePending {
            account,
            group,
            value,
        } => {
            let value = u128::from(value);
            let hint = hint_after(election, &group, value, false)?;
            let index = index_of(election, &account, &group)?;
            election.revoke_pending(&account, &group, value, hint, index)
        }
        Step::RevokeActive {
            account,
            group,
            value,
        } => {
            let value = u128::from(value);
            let hint = hint_after(election, &group, value, false)?;
            let index = index_of(election, &account, &group)?;
            election.revoke_active(&account, &group, value, hint, index)
        }
        Step::Reward { group, value } => {
            let value = u128::from(value);
            let hint = hint_after(election, &group, value, true)?;
            election.distribute_epoch_rewards(&EPOCH_PROCESSOR, &group, value, hint)
        }
        Step::Slash { account, value } => {
            let value = u128::from(value);
            let hints = election.force_decrement_hints(&account, value)?;
            let slashed = election.force_decrement_votes(
                &STAKE_AUTHORITY,
                &account,
                value,
                &hints.lessers,
                &hints.greaters,
                &hints.indices,
            )?;
            // The stake leaves the locked balance only once the votes are gone.
            harness.stake.slash(&account, slashed);
            Ok(())
        }
        Step::MarkIneligible { group } => {
            election.mark_group_ineligible(&VALIDATOR_REGISTRY, &group)
        }
        Step::AdvanceEpoch { epochs } => {
            for _ in 0..epochs {
                harness.epochs.advance();
            }
            Ok(())
        }
    }
}

fn hint_after(
    election: &Election,
    group: &Address,
    value: u128,
    increase: bool,
) -> Result<OrderingHint, ElectionError> {
    let total = election.get_total_votes_for_group(group)?;
    let total = if increase {
        total.saturating_add(value)
    } else {
        total.saturating_sub(value)
    };
    election.ordering_hints(group, total)
}

/// Position of `group` in the account's list. An absent group yields an
/// out-of-range index so the engine reports it.
fn index_of(election: &Election, account: &Address, group: &Address) -> Result<usize, ElectionError> {
    let groups = election.get_groups_voted_for_by_account(account)?;
    Ok(groups
        .iter()
        .position(|g| g == group)
        .unwrap_or(groups.len()))
}
