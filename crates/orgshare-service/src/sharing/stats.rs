//! Propagation counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Running totals across every instruction an executor has handled.
#[derive(Debug, Default)]
pub struct PropagationStats {
    /// Instructions that passed validation
    pub accepted: AtomicU64,
    /// Instructions rejected as client input errors
    pub rejected: AtomicU64,
    /// Instructions whose background work has settled
    pub completed: AtomicU64,
    /// Users skipped as absent from the root tenant
    pub skipped_absent: AtomicU64,
    /// Users skipped as managed elsewhere
    pub skipped_non_resident: AtomicU64,
    /// Users routed to the update path
    pub update_path: AtomicU64,
    /// Associations created
    pub associations_created: AtomicU64,
    /// Roles granted
    pub roles_granted: AtomicU64,
    /// Associations removed
    pub associations_removed: AtomicU64,
    /// Units that failed after retries
    pub unit_failures: AtomicU64,
    /// Retries performed
    pub retries: AtomicU64,
}

impl PropagationStats {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `n` to a counter
    pub fn add(counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    /// Increment a counter
    pub fn inc(counter: &AtomicU64) {
        Self::add(counter, 1);
    }

    /// Get a snapshot of all counters
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            accepted: self.accepted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            skipped_absent: self.skipped_absent.load(Ordering::Relaxed),
            skipped_non_resident: self.skipped_non_resident.load(Ordering::Relaxed),
            update_path: self.update_path.load(Ordering::Relaxed),
            associations_created: self.associations_created.load(Ordering::Relaxed),
            roles_granted: self.roles_granted.load(Ordering::Relaxed),
            associations_removed: self.associations_removed.load(Ordering::Relaxed),
            unit_failures: self.unit_failures.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
        }
    }
}

/// Serializable stats snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Instructions accepted
    pub accepted: u64,
    /// Instructions rejected
    pub rejected: u64,
    /// Instructions settled
    pub completed: u64,
    /// Users skipped as absent
    pub skipped_absent: u64,
    /// Users skipped as non-resident
    pub skipped_non_resident: u64,
    /// Users on the update path
    pub update_path: u64,
    /// Associations created
    pub associations_created: u64,
    /// Roles granted
    pub roles_granted: u64,
    /// Associations removed
    pub associations_removed: u64,
    /// Failed units
    pub unit_failures: u64,
    /// Retries
    pub retries: u64,
}

impl StatsSnapshot {
    /// Counter name and value pairs, in a stable order for display.
    pub fn entries(&self) -> [(&'static str, u64); 11] {
        [
            ("accepted", self.accepted),
            ("rejected", self.rejected),
            ("completed", self.completed),
            ("skipped_absent", self.skipped_absent),
            ("skipped_non_resident", self.skipped_non_resident),
            ("update_path", self.update_path),
            ("associations_created", self.associations_created),
            ("roles_granted", self.roles_granted),
            ("associations_removed", self.associations_removed),
            ("unit_failures", self.unit_failures),
            ("retries", self.retries),
        ]
    }
}
