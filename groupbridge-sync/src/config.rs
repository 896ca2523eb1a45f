use std::time::Duration;

/// Engine knobs that are not part of the per-installation sync policy.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// How long a counterpart captured at "deleting" time waits for the
    /// matching "deleted" event before it is discarded.
    pub pending_delete_ttl: Duration,
    /// Copy name and description to the counterpart during a full resync.
    pub propagate_details: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            pending_delete_ttl: Duration::from_secs(300),
            propagate_details: true,
        }
    }
}
