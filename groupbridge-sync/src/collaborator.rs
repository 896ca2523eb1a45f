//! Contracts of the systems the engine talks to.
//!
//! The engine owns no group or membership records. It reads settings, looks
//! up and records links, and mutates memberships exclusively through these
//! traits. Every call is synchronous.

use crate::error::SyncResult;
use groupbridge_types::{GroupDetails, GroupId, GroupLink, Role, RoleAssignment, System, UserId};
use std::sync::Arc;

/// Read side of the installation's settings store.
pub trait SettingsReader: Send + Sync {
    /// Returns the value stored under a dotted key such as
    /// `buddypress.enabled`, or `Value::Null` when the key is unknown.
    fn get(&self, key: &str) -> serde_json::Value;
}

/// Maps a social group id to its course counterpart and back.
pub trait LinkRegistry: Send + Sync {
    /// Returns the counterpart of `group`, which lives on `system`.
    fn resolve_counterpart(&self, system: System, group: GroupId) -> SyncResult<Option<GroupId>>;

    /// Records a link. Any existing link involving either id is replaced.
    fn set_link(&self, link: GroupLink) -> SyncResult<()>;

    /// Removes the link that `group` (on `system`) takes part in and returns
    /// it. Removing a missing link is not an error.
    fn remove_link(&self, system: System, group: GroupId) -> SyncResult<Option<GroupLink>>;
}

/// Native group and membership API of one bridged system.
///
/// Mutations are expected to emit the system's own lifecycle events, which
/// is why the engine holds a [`crate::LoopGuard`] scope around them.
pub trait MembershipApi: Send + Sync {
    fn add_role(&self, group: GroupId, user: UserId, role: Role) -> SyncResult<()>;

    fn remove_role(&self, group: GroupId, user: UserId, role: Role) -> SyncResult<()>;

    fn list_members(&self, group: GroupId) -> SyncResult<Vec<RoleAssignment>>;

    /// Roles `user` currently holds in `group`.
    fn roles_of(&self, group: GroupId, user: UserId) -> SyncResult<Vec<Role>> {
        Ok(self
            .list_members(group)?
            .into_iter()
            .filter(|a| a.user == user)
            .map(|a| a.role)
            .collect())
    }

    fn create_group(&self, details: &GroupDetails) -> SyncResult<GroupId>;

    fn delete_group(&self, group: GroupId) -> SyncResult<()>;

    /// Returns `None` when the group does not exist.
    fn describe_group(&self, group: GroupId) -> SyncResult<Option<GroupDetails>>;

    fn update_group(&self, group: GroupId, details: &GroupDetails) -> SyncResult<()>;
}

/// Handles to every collaborator the operations need.
#[derive(Clone)]
pub struct Collaborators {
    pub social: Arc<dyn MembershipApi>,
    pub course: Arc<dyn MembershipApi>,
    pub links: Arc<dyn LinkRegistry>,
    pub settings: Arc<dyn SettingsReader>,
}

impl Collaborators {
    /// Returns the membership API of `system`.
    pub fn membership(&self, system: System) -> &dyn MembershipApi {
        match system {
            System::Social => self.social.as_ref(),
            System::Course => self.course.as_ref(),
        }
    }
}
