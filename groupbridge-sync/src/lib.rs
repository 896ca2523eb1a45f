//! Group and role sync engine between social groups and course groups.
//!
//! Either system can originate a change: a group is created, updated or
//! deleted, or a member's role is added or removed. The engine propagates
//! that change to the other system exactly once, without feeding it back,
//! and only where the installation's settings allow it.
//!
//! # Architecture
//!
//! ## Components
//!
//! - **PolicyGate**: answers "may this direction / role / aspect sync?" from
//!   a fresh settings snapshot
//! - **LoopGuard**: suppresses echoes of our own writes into a system
//! - **RoleSyncOperations**: idempotent per-role apply/remove on the
//!   counterpart
//! - **GroupSyncOperations**: create-linked, full resync, two-phase delete,
//!   unlink
//! - **SyncController**: routes lifecycle events through guard, policy and
//!   a dispatch table to the operations
//!
//! ## Collaborators
//!
//! Settings, the link registry and both systems' membership APIs are traits
//! (see [`collaborator`]). In-memory implementations live in [`memory`];
//! durable ones live in the `groupbridge-store` crate.
//!
//! # Example
//!
//! ```
//! use groupbridge_sync::memory::{MemoryLinkRegistry, MemoryMembership, MemorySettings};
//! use groupbridge_sync::{Collaborators, Outcome, SyncConfig, SyncController};
//! use groupbridge_types::{GroupId, LifecycleEvent, System};
//! use std::sync::Arc;
//!
//! let settings = MemorySettings::new().with("buddypress.enabled", true);
//! let controller = SyncController::assemble(
//!     Collaborators {
//!         social: Arc::new(MemoryMembership::new(System::Social)),
//!         course: Arc::new(MemoryMembership::new(System::Course)),
//!         links: Arc::new(MemoryLinkRegistry::new()),
//!         settings: Arc::new(settings),
//!     },
//!     SyncConfig::default(),
//! );
//!
//! let group: GroupId = "0190a8f1-5b2c-7d3e-9f40-112233445566".parse().unwrap();
//! let event = LifecycleEvent::GroupUpdated { source: System::Social, group };
//! assert_eq!(controller.handle(&event).unwrap(), Outcome::Unlinked);
//! ```

pub mod collaborator;
mod config;
mod controller;
mod error;
pub mod group_ops;
pub mod loop_guard;
pub mod memory;
pub mod pending;
pub mod policy;
pub mod role_ops;

pub use collaborator::{Collaborators, LinkRegistry, MembershipApi, SettingsReader};
pub use config::SyncConfig;
pub use controller::{Outcome, SyncController};
pub use error::{SyncError, SyncResult};
pub use group_ops::{
    CreateOutcome, DeleteOutcome, GroupSyncOperations, LinkState, ReconcileReport, SkipReason,
};
pub use loop_guard::{LoopGuard, PropagationScope};
pub use pending::PendingDeleteContext;
pub use policy::{Aspect, PolicyGate, SyncPolicy};
pub use role_ops::{RoleOutcome, RoleSyncOperations};
