//! Generation counters for superseding in-flight work.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Lease handed to a fetch or playback when it starts.
///
/// Completions compare their lease against the one currently stored; a
/// mismatch means the work was superseded and its result is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct LeaseId(u64);

impl fmt::Display for LeaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic source of [`LeaseId`]s.
#[derive(Debug, Default)]
pub(crate) struct LeaseCounter(AtomicU64);

impl LeaseCounter {
    pub(crate) fn mint(&self) -> LeaseId {
        LeaseId(self.0.fetch_add(1, Ordering::Relaxed))
    }
}
