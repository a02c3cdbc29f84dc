//! Monotonic best-score cell
//!
//! Every writer goes through a max-merge, so updates racing in from the
//! frame loop, ledger confirmations and ledger notifications converge on the
//! largest value no matter the order they land in.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

/// Shared handle to a best score; clones observe the same value
#[derive(Debug, Clone, Default)]
pub struct BestScore(Arc<AtomicU32>);

impl BestScore {
    pub fn new(initial: u32) -> Self {
        Self(Arc::new(AtomicU32::new(initial)))
    }

    pub fn get(&self) -> u32 {
        self.0.load(Ordering::Acquire)
    }

    /// Raise the stored value to `candidate` if it is strictly greater.
    ///
    /// Returns true when the value changed.
    pub fn set_best_score_if_higher(&self, candidate: u32) -> bool {
        self.0.fetch_max(candidate, Ordering::AcqRel) < candidate
    }
}
