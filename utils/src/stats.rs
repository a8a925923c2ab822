//! Per-operation outcome counters for the engine.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Commits and rejections seen for one operation kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OperationCounts {
    pub committed: u64,
    pub rejected: u64,
}

#[derive(Default)]
struct Slot {
    committed: AtomicU64,
    rejected: AtomicU64,
}

/// Outcome counters keyed by operation kind, fixed when the engine starts.
///
/// Recording an outcome for a kind that was not registered is a no-op, so
/// callers never have to handle a missing counter.
pub struct OperationStats {
    slots: BTreeMap<&'static str, Slot>,
}

impl OperationStats {
    pub fn new(operations: &[&'static str]) -> Self {
        Self {
            slots: operations.iter().map(|&op| (op, Slot::default())).collect(),
        }
    }

    pub fn record(&self, operation: &str, committed: bool) {
        let Some(slot) = self.slots.get(operation) else {
            return;
        };
        let counter = if committed {
            &slot.committed
        } else {
            &slot.rejected
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn counts(&self, operation: &str) -> OperationCounts {
        self.slots
            .get(operation)
            .map(Slot::load)
            .unwrap_or_default()
    }

    /// Rejections over every operation kind.
    pub fn rejected_total(&self) -> u64 {
        self.slots.values().map(|s| s.rejected.load(Ordering::Relaxed)).sum()
    }

    /// Every registered kind in name order.
    pub fn snapshot(&self) -> BTreeMap<&'static str, OperationCounts> {
        self.slots.iter().map(|(&op, s)| (op, s.load())).collect()
    }
}

impl Slot {
    fn load(&self) -> OperationCounts {
        OperationCounts {
            committed: self.committed.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }
}
