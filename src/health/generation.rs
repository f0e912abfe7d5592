//! Generation-tagged evaluation ordering.
//!
//! Rapid successive password edits produce overlapping health
//! evaluations. Instead of timers and cancellation callbacks, each
//! evaluation takes a monotonically increasing generation number; a
//! finished evaluation is applied only while its generation is still
//! the latest. A stale result can therefore never overwrite a fresher
//! one, regardless of completion order.

use std::sync::atomic::{AtomicU64, Ordering};

/// Issues generation numbers and gates result application.
#[derive(Debug, Default)]
pub struct EvaluationGate {
    latest: AtomicU64,
}

impl EvaluationGate {
    pub fn new() -> Self {
        Self {
            latest: AtomicU64::new(0),
        }
    }

    /// Start a new evaluation, superseding every earlier one.
    pub fn begin(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Whether the given generation is still the latest. In-flight work
    /// can poll this to abandon early instead of finishing a result
    /// that would be discarded anyway.
    pub fn is_current(&self, generation: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == generation
    }

    /// Gate a finished result: returns it only if its generation has
    /// not been superseded.
    pub fn accept<T>(&self, generation: u64, result: T) -> Option<T> {
        if self.is_current(generation) {
            Some(result)
        } else {
            None
        }
    }
}
