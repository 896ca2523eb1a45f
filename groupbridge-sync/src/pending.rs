//! Two-phase delete handshake.
//!
//! The "deleted" event arrives after the source group, and with it the data
//! needed to find the counterpart, is gone. The counterpart id is captured
//! here at "deleting" time and consumed at "deleted" time.

use groupbridge_types::{GroupId, System};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug)]
struct PendingEntry {
    counterpart: GroupId,
    captured_at: Instant,
}

/// Short-lived map from a group being deleted to its counterpart.
#[derive(Debug)]
pub struct PendingDeleteContext {
    entries: Mutex<HashMap<(System, GroupId), PendingEntry>>,
    ttl: Duration,
}

impl PendingDeleteContext {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<(System, GroupId), PendingEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Remembers `counterpart` for `group` on `system`. A later capture for
    /// the same group overwrites the earlier one.
    pub fn capture(&self, system: System, group: GroupId, counterpart: GroupId) {
        let mut entries = self.lock();
        let ttl = self.ttl;
        entries.retain(|_, entry| entry.captured_at.elapsed() < ttl);
        entries.insert(
            (system, group),
            PendingEntry {
                counterpart,
                captured_at: Instant::now(),
            },
        );
    }

    /// Removes and returns the captured counterpart, if one was captured and
    /// has not expired.
    pub fn take(&self, system: System, group: GroupId) -> Option<GroupId> {
        let entry = self.lock().remove(&(system, group))?;
        if entry.captured_at.elapsed() >= self.ttl {
            debug!(%system, %group, "discarding expired pending delete");
            return None;
        }
        Some(entry.counterpart)
    }

    /// Returns true if a non-expired capture exists for the group.
    pub fn contains(&self, system: System, group: GroupId) -> bool {
        self.lock()
            .get(&(system, group))
            .is_some_and(|entry| entry.captured_at.elapsed() < self.ttl)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
