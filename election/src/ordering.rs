//! Descending ranking of eligible validator groups by total votes.
//!
//! Backed by a doubly linked list keyed by group address. Callers position a
//! group by naming its would-be neighbours (an [`OrderingHint`]); the list only
//! verifies the claim, so every insert or update is a constant-time splice.
//! [`EligibleGroups::hints_for`] computes a valid hint from the current order
//! for callers that do not track the ranking themselves.
//!
//! Equal totals are allowed; their relative order is whatever the callers'
//! hints produced and is never changed spontaneously.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use valelect_types::Address;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderingError {
    #[error("group {0} is already in the ordering")]
    AlreadyPresent(Address),

    #[error("group {0} is not in the ordering")]
    NotPresent(Address),

    #[error("stale ordering hint for group {0}")]
    StaleHint(Address),
}

/// A caller's claim about where a group belongs in the ranking.
///
/// `lesser` is the neighbour with fewer (or equal) votes, `greater` the neighbour
/// with more (or equal) votes. `None` means "no such neighbour": the group is
/// claimed to be last (`lesser == None`) or first (`greater == None`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderingHint {
    pub lesser: Option<Address>,
    pub greater: Option<Address>,
}

impl OrderingHint {
    /// Both neighbours absent. Only valid when the group is alone in the ranking.
    pub const NONE: Self = Self {
        lesser: None,
        greater: None,
    };

    pub fn new(lesser: Option<Address>, greater: Option<Address>) -> Self {
        Self { lesser, greater }
    }

    pub fn is_empty(&self) -> bool {
        self.lesser.is_none() && self.greater.is_none()
    }
}

#[derive(Clone, Debug)]
struct Node {
    value: u128,
    /// Neighbour towards the tail (fewer votes).
    lesser: Option<Address>,
    /// Neighbour towards the head (more votes).
    greater: Option<Address>,
}

/// The eligible-group ranking.
#[derive(Clone, Debug, Default)]
pub struct EligibleGroups {
    nodes: HashMap<Address, Node>,
    /// Group with the most votes.
    head: Option<Address>,
    /// Group with the fewest votes.
    tail: Option<Address>,
}

impl EligibleGroups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, group: &Address) -> bool {
        self.nodes.contains_key(group)
    }

    /// The recorded total for a group, if it is in the ranking.
    pub fn value(&self, group: &Address) -> Option<u128> {
        self.nodes.get(group).map(|n| n.value)
    }

    /// Add a group at the position described by `hint`.
    pub fn insert(
        &mut self,
        group: Address,
        value: u128,
        hint: OrderingHint,
    ) -> Result<(), OrderingError> {
        if self.contains(&group) {
            return Err(OrderingError::AlreadyPresent(group));
        }
        self.check_position(&group, value, &hint)?;
        self.link(group, value, hint);
        Ok(())
    }

    /// Move a group to the position described by `hint` with a new total.
    ///
    /// On a stale hint the group keeps its previous value and position.
    pub fn update(
        &mut self,
        group: Address,
        value: u128,
        hint: OrderingHint,
    ) -> Result<(), OrderingError> {
        let old = self.unlink(&group)?;
        if let Err(e) = self.check_position(&group, value, &hint) {
            self.link(
                group,
                old.value,
                OrderingHint::new(old.lesser, old.greater),
            );
            return Err(e);
        }
        self.link(group, value, hint);
        Ok(())
    }

    /// Remove a group from the ranking.
    pub fn remove(&mut self, group: &Address) -> Result<u128, OrderingError> {
        self.unlink(group).map(|node| node.value)
    }

    /// Iterate groups from the most to the fewest votes.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            list: self,
            next: self.head,
        }
    }

    /// The `k` groups with the most votes, best first.
    pub fn top(&self, k: usize) -> impl Iterator<Item = (Address, u128)> + '_ {
        self.iter().take(k)
    }

    /// Number of leading groups whose total is at least `threshold`, capped at `max`.
    pub fn count_at_least(&self, threshold: u128, max: usize) -> usize {
        self.iter()
            .take(max)
            .take_while(|(_, value)| *value >= threshold)
            .count()
    }

    /// A hint that places `group` with total `value` after every other group
    /// holding at least `value` votes.
    pub fn hints_for(&self, group: &Address, value: u128) -> OrderingHint {
        let mut greater = None;
        let mut lesser = None;
        for (candidate, candidate_value) in self.iter().filter(|(g, _)| g != group) {
            if candidate_value >= value {
                greater = Some(candidate);
            } else {
                lesser = Some(candidate);
                break;
            }
        }
        OrderingHint::new(lesser, greater)
    }

    /// Verify that `hint` names adjacent neighbours bracketing `value`.
    ///
    /// `group` must not be linked when this runs.
    fn check_position(
        &self,
        group: &Address,
        value: u128,
        hint: &OrderingHint,
    ) -> Result<(), OrderingError> {
        let stale = || OrderingError::StaleHint(*group);

        match hint.lesser {
            Some(lesser) => {
                let node = self.nodes.get(&lesser).ok_or_else(stale)?;
                if node.value > value || node.greater != hint.greater {
                    return Err(stale());
                }
            }
            None if hint.greater != self.tail => return Err(stale()),
            None => {}
        }

        match hint.greater {
            Some(greater) => {
                let node = self.nodes.get(&greater).ok_or_else(stale)?;
                if node.value < value || node.lesser != hint.lesser {
                    return Err(stale());
                }
            }
            None if hint.lesser != self.head => return Err(stale()),
            None => {}
        }

        Ok(())
    }

    /// Splice `group` between the already verified neighbours of `hint`.
    fn link(&mut self, group: Address, value: u128, hint: OrderingHint) {
        match hint.greater.and_then(|g| self.nodes.get_mut(&g)) {
            Some(node) => node.lesser = Some(group),
            None => self.head = Some(group),
        }
        match hint.lesser.and_then(|l| self.nodes.get_mut(&l)) {
            Some(node) => node.greater = Some(group),
            None => self.tail = Some(group),
        }
        self.nodes.insert(
            group,
            Node {
                value,
                lesser: hint.lesser,
                greater: hint.greater,
            },
        );
    }

    fn unlink(&mut self, group: &Address) -> Result<Node, OrderingError> {
        let node = self
            .nodes
            .remove(group)
            .ok_or(OrderingError::NotPresent(*group))?;
        match node.greater.and_then(|g| self.nodes.get_mut(&g)) {
            Some(greater) => greater.lesser = node.lesser,
            None => self.head = node.lesser,
        }
        match node.lesser.and_then(|l| self.nodes.get_mut(&l)) {
            Some(lesser) => lesser.greater = node.greater,
            None => self.tail = node.greater,
        }
        Ok(node)
    }
}

/// Descending iterator over the ranking.
pub struct Iter<'a> {
    list: &'a EligibleGroups,
    next: Option<Address>,
}

impl Iterator for Iter<'_> {
    type Item = (Address, u128);

    fn next(&mut self) -> Option<Self::Item> {
        let group = self.next?;
        let node = self.list.nodes.get(&group)?;
        self.next = node.lesser;
        Some((group, node.value))
    }
}
