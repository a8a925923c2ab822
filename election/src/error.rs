use crate::collaborators::{RandomnessError, RegistryError, StakeError};
use crate::ordering::OrderingError;
use thiserror::Error;
use valelect_types::{Address, Epoch, TypesError};

/// Broad failure categories, stable across variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    StaleOrderingHint,
    CapacityExceeded,
    InsufficientBalance,
    NotYetActivatable,
    Unauthorized,
    ConfigUnchanged,
    InsufficientElectableValidators,
    IncompleteSlash,
    Reentrancy,
    Collaborator,
    Internal,
}

#[derive(Debug, Error)]
pub enum ElectionError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("group {0} not eligible")]
    GroupNotEligible(Address),

    #[error("group {0} already eligible")]
    GroupAlreadyEligible(Address),

    #[error("{0} is not a registered validator group")]
    NotValidatorGroup(Address),

    #[error("bad index")]
    BadIndex,

    #[error("ambiguous ordering hint for group {0}")]
    MalformedSlashInput(Address),

    #[error(transparent)]
    Ordering(#[from] OrderingError),

    #[error("voted for too many groups")]
    TooManyGroups,

    #[error("group {0} cannot receive votes")]
    GroupCannotReceiveVotes(Address),

    #[error("vote value larger than pending votes: requested {requested}, pending {available}")]
    InsufficientPendingVotes { requested: u128, available: u128 },

    #[error("vote value larger than active votes: requested {requested}, active {available}")]
    InsufficientActiveVotes { requested: u128, available: u128 },

    #[error("pending vote epoch not passed: cast in {cast}, now {current}")]
    NotYetActivatable { cast: Epoch, current: Epoch },

    #[error("no pending votes to activate")]
    NoPendingVotes,

    #[error("caller {caller} is not authorized to {operation}")]
    Unauthorized {
        caller: Address,
        operation: &'static str,
    },

    #[error("{0} not changed")]
    ConfigUnchanged(&'static str),

    #[error("not enough elected validators: elected {elected}, minimum {minimum}")]
    InsufficientElectableValidators { elected: usize, minimum: usize },

    #[error("failure to decrement all votes: requested {requested}, decremented {decremented}")]
    IncompleteSlash { requested: u128, decremented: u128 },

    #[error("reentrant call")]
    ReentrantCall,

    #[error("arithmetic overflow")]
    ArithmeticOverflow,

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Stake(#[from] StakeError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Randomness(#[from] RandomnessError),

    #[error("engine lock poisoned")]
    LockPoisoned,

    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

impl ElectionError {
    /// The category this failure belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_)
            | Self::GroupNotEligible(_)
            | Self::GroupAlreadyEligible(_)
            | Self::NotValidatorGroup(_)
            | Self::BadIndex
            | Self::MalformedSlashInput(_)
            | Self::Config(_) => ErrorKind::InvalidInput,
            Self::Ordering(OrderingError::StaleHint(_)) => ErrorKind::StaleOrderingHint,
            Self::Ordering(_) => ErrorKind::InvalidInput,
            Self::TooManyGroups | Self::GroupCannotReceiveVotes(_) => ErrorKind::CapacityExceeded,
            Self::InsufficientPendingVotes { .. } | Self::InsufficientActiveVotes { .. } => {
                ErrorKind::InsufficientBalance
            }
            Self::NotYetActivatable { .. } | Self::NoPendingVotes => ErrorKind::NotYetActivatable,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::ConfigUnchanged(_) => ErrorKind::ConfigUnchanged,
            Self::InsufficientElectableValidators { .. } => {
                ErrorKind::InsufficientElectableValidators
            }
            Self::IncompleteSlash { .. } => ErrorKind::IncompleteSlash,
            Self::ReentrantCall => ErrorKind::Reentrancy,
            Self::Stake(StakeError::InsufficientNonvoting { .. }) => ErrorKind::InsufficientBalance,
            Self::Stake(_) | Self::Registry(_) | Self::Randomness(_) => ErrorKind::Collaborator,
            Self::ArithmeticOverflow | Self::LockPoisoned | Self::InvariantViolation(_) => {
                ErrorKind::Internal
            }
        }
    }
}

impl From<TypesError> for ElectionError {
    fn from(e: TypesError) -> Self {
        match e {
            TypesError::Overflow | TypesError::DivisionByZero => Self::ArithmeticOverflow,
            other => Self::InvalidInput(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reasons_are_stable() {
        assert_eq!(ElectionError::BadIndex.to_string(), "bad index");
        assert_eq!(ElectionError::TooManyGroups.to_string(), "voted for too many groups");
        assert_eq!(
            ElectionError::ConfigUnchanged("max groups voted for").to_string(),
            "max groups voted for not changed"
        );
        assert_eq!(
            ElectionError::IncompleteSlash {
                requested: 10,
                decremented: 4
            }
            .to_string(),
            "failure to decrement all votes: requested 10, decremented 4"
        );
    }

    #[test]
    fn kinds_follow_taxonomy() {
        let stale = ElectionError::from(OrderingError::StaleHint(Address::repeat_byte(1)));
        assert_eq!(stale.kind(), ErrorKind::StaleOrderingHint);
        assert_eq!(ElectionError::BadIndex.kind(), ErrorKind::InvalidInput);
        assert_eq!(
            ElectionError::GroupCannotReceiveVotes(Address::ZERO).kind(),
            ErrorKind::CapacityExceeded
        );
        assert_eq!(ElectionError::NoPendingVotes.kind(), ErrorKind::NotYetActivatable);
        assert_eq!(
            ElectionError::from(TypesError::Overflow).kind(),
            ErrorKind::Internal
        );
    }
}
