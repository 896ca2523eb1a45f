//! Role-level propagation: one user's role on one group.

use crate::collaborator::Collaborators;
use crate::error::SyncResult;
use crate::loop_guard::LoopGuard;
use crate::policy::{Aspect, PolicyGate};
use groupbridge_types::{Direction, GroupId, Role, UserId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Result of a single role propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleOutcome {
    /// The counterpart was mutated.
    Applied,
    /// The counterpart already had the requested state.
    Unchanged,
    /// The group has no counterpart; nothing to do.
    Unlinked,
    /// The role does not sync in this direction.
    PolicyRejected,
}

/// Applies or removes a role on the counterpart of a group.
///
/// Every call is idempotent: adding a role the user already holds, or
/// removing one they do not hold, leaves the counterpart untouched. This is
/// what makes promotions (a "member removed" plus an "admin added" in either
/// order) converge without transient states.
#[derive(Clone)]
pub struct RoleSyncOperations {
    collaborators: Arc<Collaborators>,
    gate: PolicyGate,
    guard: LoopGuard,
}

impl RoleSyncOperations {
    pub fn new(collaborators: Arc<Collaborators>, gate: PolicyGate, guard: LoopGuard) -> Self {
        Self {
            collaborators,
            gate,
            guard,
        }
    }

    pub fn sync_admin(
        &self,
        direction: Direction,
        group: GroupId,
        user: UserId,
        is_removal: bool,
    ) -> SyncResult<RoleOutcome> {
        self.sync_role(direction, Role::Admin, group, user, is_removal)
    }

    pub fn sync_moderator(
        &self,
        direction: Direction,
        group: GroupId,
        user: UserId,
        is_removal: bool,
    ) -> SyncResult<RoleOutcome> {
        self.sync_role(direction, Role::Moderator, group, user, is_removal)
    }

    pub fn sync_member(
        &self,
        direction: Direction,
        group: GroupId,
        user: UserId,
        is_removal: bool,
    ) -> SyncResult<RoleOutcome> {
        self.sync_role(direction, Role::Member, group, user, is_removal)
    }

    /// Propagates `role` for `user` from `group` to its counterpart.
    pub fn sync_role(
        &self,
        direction: Direction,
        role: Role,
        group: GroupId,
        user: UserId,
        is_removal: bool,
    ) -> SyncResult<RoleOutcome> {
        let Some(counterpart) = self
            .collaborators
            .links
            .resolve_counterpart(direction.source(), group)?
        else {
            debug!(%direction, %group, %role, "role change on unlinked group ignored");
            return Ok(RoleOutcome::Unlinked);
        };

        if !self.gate.allowed(direction, Some(role), Aspect::Enabled) {
            debug!(%direction, %role, "role sync disabled for direction");
            return Ok(RoleOutcome::PolicyRejected);
        }

        self.apply_on(direction, counterpart, user, role, is_removal)
    }

    /// Brings `role` for `user` on the target-side group `counterpart` to the
    /// requested state, mutating only if it differs.
    pub(crate) fn apply_on(
        &self,
        direction: Direction,
        counterpart: GroupId,
        user: UserId,
        role: Role,
        is_removal: bool,
    ) -> SyncResult<RoleOutcome> {
        let target = self.collaborators.membership(direction.target());
        let holds = target.roles_of(counterpart, user)?.contains(&role);
        if holds == !is_removal {
            return Ok(RoleOutcome::Unchanged);
        }

        let _scope = self.guard.enter(direction.target());
        if is_removal {
            target.remove_role(counterpart, user, role)?;
            info!(%direction, %counterpart, %user, %role, "removed role on counterpart");
        } else {
            target.add_role(counterpart, user, role)?;
            info!(%direction, %counterpart, %user, %role, "added role on counterpart");
        }
        Ok(RoleOutcome::Applied)
    }
}
