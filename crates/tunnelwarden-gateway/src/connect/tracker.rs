//! Concurrent-use tracking for shared connection targets.
//!
//! The tracker is the one piece of mutable shared state in the enforcement
//! core: a process-wide usage count per [`GlobalResourceId`]. Counts are
//! mutated under the map's per-key shard lock, so acquire/release pairs on
//! the same identifier serialize while sessions on unrelated resources
//! proceed without contention. No operation blocks on I/O; admission is
//! immediate, never retried internally.

use std::sync::Arc;

use dashmap::DashMap;

use crate::connect::resource::GlobalResourceId;

/// Usage counts for all in-use connections and connection groups.
///
/// Cloning yields another handle to the same process-wide state.
#[derive(Clone, Default)]
pub struct AccessTracker {
    active: Arc<DashMap<GlobalResourceId, usize>>,
}

impl AccessTracker {
    pub fn new() -> Self {
        Self {
            active: Arc::new(DashMap::new()),
        }
    }

    /// Attempt to mark the resource with the given identifier as in use.
    ///
    /// The count is incremented first; if concurrent access is not allowed
    /// and some other session already holds the resource, the increment is
    /// rolled back and admission is denied. A denied acquire leaves the
    /// count exactly as it was before the call.
    ///
    /// Every acquire that returns `true` must be balanced by exactly one
    /// [`release`](Self::release).
    pub fn acquire(&self, id: &GlobalResourceId, allow_concurrent: bool) -> bool {
        let count = {
            let mut entry = self.active.entry(id.clone()).or_insert(0);
            *entry += 1;
            *entry
        };

        // Fail acquisition if concurrent access is prohibited and we are
        // not the only user of this resource
        if !allow_concurrent && count != 1 {
            self.release(id);
            return false;
        }

        true
    }

    /// Unmark one use of the resource with the given identifier. Must be
    /// called exactly once for every successful acquire, and never
    /// otherwise. The map entry is removed once its count reaches zero, so
    /// a later acquire on the same identifier starts fresh.
    pub fn release(&self, id: &GlobalResourceId) {
        let drained = {
            match self.active.get_mut(id) {
                Some(mut entry) => {
                    *entry = entry.saturating_sub(1);
                    *entry == 0
                }
                None => false,
            }
        };

        if drained {
            self.active.remove_if(id, |_, count| *count == 0);
        }
    }

    /// Current usage count for the identifier (0 when untracked).
    pub fn active(&self, id: &GlobalResourceId) -> usize {
        self.active.get(id).map(|entry| *entry).unwrap_or(0)
    }

    /// Acquire with scope-bound release: the returned guard releases the
    /// reservation exactly once when dropped, on every exit path.
    pub fn try_acquire(&self, id: GlobalResourceId, allow_concurrent: bool) -> Option<AccessGuard> {
        if self.acquire(&id, allow_concurrent) {
            Some(AccessGuard {
                tracker: self.clone(),
                id: Some(id),
            })
        } else {
            None
        }
    }
}

/// A held reservation on a tracked resource. Dropping the guard releases
/// the reservation; the release cannot run twice and cannot be forgotten.
pub struct AccessGuard {
    tracker: AccessTracker,
    id: Option<GlobalResourceId>,
}

impl AccessGuard {
    /// The identifier this guard holds.
    pub fn id(&self) -> Option<&GlobalResourceId> {
        self.id.as_ref()
    }
}

impl Drop for AccessGuard {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            self.tracker.release(&id);
        }
    }
}
