//! Nullable epoch counter: epochs only advance when you tell them to.

use std::sync::atomic::{AtomicU64, Ordering};
use valelect_election::EpochSource;
use valelect_types::Epoch;

pub struct NullEpochs {
    current: AtomicU64,
}

impl NullEpochs {
    pub fn new(initial: u64) -> Self {
        Self {
            current: AtomicU64::new(initial),
        }
    }

    /// Move to the next epoch.
    pub fn advance(&self) {
        self.current.fetch_add(1, Ordering::SeqCst);
    }

    pub fn set(&self, epoch: u64) {
        self.current.store(epoch, Ordering::SeqCst);
    }
}

impl EpochSource for NullEpochs {
    fn current_epoch(&self) -> Epoch {
        Epoch::new(self.current.load(Ordering::SeqCst))
    }
}
