//! Error types for the sync layer.

use groupbridge_types::{GroupId, System};
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur in sync operations.
///
/// Policy rejections and unlinked groups are not errors; they are reported
/// as [`crate::Outcome`] variants.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A bridged system rejected a read or mutation.
    #[error("{system} rejected the operation: {message}")]
    Collaborator { system: System, message: String },

    /// A group the operation needs to read is gone.
    #[error("{system} group not found: {group}")]
    GroupNotFound { system: System, group: GroupId },

    /// Link registry storage error.
    #[error("storage error: {0}")]
    Storage(String),
}

impl SyncError {
    pub fn collaborator(system: System, message: impl Into<String>) -> Self {
        SyncError::Collaborator {
            system,
            message: message.into(),
        }
    }
}
