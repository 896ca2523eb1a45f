//! Core type definitions for groupbridge.
//!
//! This crate defines the plain data shared by the sync engine and its
//! collaborators:
//! - Group and user identifiers issued by the bridged systems
//! - The two bridged systems and the propagation directions between them
//! - Roles, per-role sync modes and role assignments
//! - Group links and the lifecycle events either system emits
//!
//! Nothing here performs I/O. Membership records live in the bridged systems;
//! the engine only reads and writes them through collaborator traits.

mod event;
mod ids;
mod link;
mod role;
mod system;

pub use event::{CreationStep, EventKind, LifecycleEvent};
pub use ids::{GroupId, UserId};
pub use link::{GroupDetails, GroupLink};
pub use role::{Role, RoleAssignment, RoleSyncMode};
pub use system::{Direction, System};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid {kind}: {source}")]
    InvalidId {
        kind: &'static str,
        #[source]
        source: uuid::Error,
    },

    #[error("unknown system: {0}")]
    UnknownSystem(String),

    #[error("unknown direction: {0}")]
    UnknownDirection(String),

    #[error("unknown role: {0}")]
    UnknownRole(String),

    #[error("unknown role sync mode: {0}")]
    UnknownSyncMode(String),
}
