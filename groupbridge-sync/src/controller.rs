//! Event routing for both bridged systems.
//!
//! Each inbound event passes through the same steps:
//!
//! 1. **entry guard**: drop echoes of our own writes (LoopGuard)
//! 2. **policy guard**: drop events whose direction/role/aspect is off
//! 3. **special case**: defer group creation during the first wizard step
//! 4. **dispatch**: exactly one operation per event kind

use crate::collaborator::Collaborators;
use crate::config::SyncConfig;
use crate::error::SyncResult;
use crate::group_ops::{CreateOutcome, DeleteOutcome, GroupSyncOperations, ReconcileReport};
use crate::loop_guard::LoopGuard;
use crate::policy::{Aspect, PolicyGate};
use crate::role_ops::{RoleOutcome, RoleSyncOperations};
use groupbridge_types::{
    CreationStep, Direction, EventKind, GroupId, LifecycleEvent, Role, UserId,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// What handling an event amounted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The event is an echo of a propagation into its source system.
    Suppressed,
    PolicyRejected,
    /// Group creation left for the dedicated wizard step.
    Deferred,
    /// The group has no counterpart.
    Unlinked,
    Created(CreateOutcome),
    Resynced(ReconcileReport),
    /// Counterpart captured at "deleting" time, if there was one.
    Captured(Option<GroupId>),
    Finalized(DeleteOutcome),
    Role(RoleOutcome),
    /// A collaborator failed; the failure was logged and swallowed.
    Failed,
}

/// Receives lifecycle events from both systems and propagates them.
pub struct SyncController {
    gate: PolicyGate,
    guard: LoopGuard,
    groups: GroupSyncOperations,
    roles: RoleSyncOperations,
}

impl SyncController {
    pub fn new(
        gate: PolicyGate,
        guard: LoopGuard,
        groups: GroupSyncOperations,
        roles: RoleSyncOperations,
    ) -> Self {
        Self {
            gate,
            guard,
            groups,
            roles,
        }
    }

    /// Wires up the gate, guard and operations over one set of collaborators.
    pub fn assemble(collaborators: Collaborators, config: SyncConfig) -> Self {
        let gate = PolicyGate::new(collaborators.settings.clone());
        let guard = LoopGuard::new();
        let collaborators = Arc::new(collaborators);
        let roles = RoleSyncOperations::new(collaborators.clone(), gate.clone(), guard.clone());
        let groups = GroupSyncOperations::new(
            collaborators,
            gate.clone(),
            guard.clone(),
            roles.clone(),
            config,
        );
        Self::new(gate, guard, groups, roles)
    }

    pub fn gate(&self) -> &PolicyGate {
        &self.gate
    }

    pub fn loop_guard(&self) -> &LoopGuard {
        &self.guard
    }

    pub fn groups(&self) -> &GroupSyncOperations {
        &self.groups
    }

    pub fn roles(&self) -> &RoleSyncOperations {
        &self.roles
    }

    /// Handles one event. Collaborator failures are logged and returned so
    /// the action that triggered the event can report them.
    pub fn handle(&self, event: &LifecycleEvent) -> SyncResult<Outcome> {
        let source = event.source();
        let direction = event.direction();
        let kind = event.kind();

        if self.guard.is_suppressed(source) {
            debug!(%kind, %source, "echo of in-flight propagation suppressed");
            return Ok(Outcome::Suppressed);
        }

        let policy = self.gate.snapshot();
        let aspect = match kind {
            EventKind::GroupCreated => Aspect::AutoSyncOnCreate,
            _ => Aspect::Enabled,
        };
        if !policy.allows(direction, event.role(), aspect) {
            debug!(%kind, %direction, %aspect, "event rejected by policy");
            return Ok(Outcome::PolicyRejected);
        }

        if let LifecycleEvent::GroupCreated {
            step: Some(step), ..
        } = event
        {
            if step.is_first() && policy.allows(direction, None, Aspect::DeferredDuringWizard) {
                debug!(group = %event.group(), "group creation deferred to wizard step");
                return Ok(Outcome::Deferred);
            }
        }

        self.dispatch(event).inspect_err(|err| {
            warn!(%kind, %direction, group = %event.group(), "sync failed: {err}");
        })
    }

    /// Handles one event with nobody waiting on the result. Failures are
    /// logged by [`SyncController::handle`] and reported as
    /// [`Outcome::Failed`].
    pub fn notify(&self, event: &LifecycleEvent) -> Outcome {
        self.handle(event).unwrap_or(Outcome::Failed)
    }

    /// Dispatch table. Every event variant maps to exactly one handler.
    fn dispatch(&self, event: &LifecycleEvent) -> SyncResult<Outcome> {
        let direction = event.direction();
        match *event {
            LifecycleEvent::GroupCreated {
                group, ref step, ..
            } => self.on_group_created(direction, group, step.as_ref()),
            LifecycleEvent::GroupUpdated { group, .. } => self.on_group_updated(direction, group),
            LifecycleEvent::GroupDeleting { group, .. } => self.on_group_deleting(direction, group),
            LifecycleEvent::GroupDeleted { group, .. } => self.on_group_deleted(direction, group),
            LifecycleEvent::RoleAdded {
                group, user, role, ..
            } => self.on_role_changed(direction, group, user, role, false),
            LifecycleEvent::RoleRemoved {
                group, user, role, ..
            } => self.on_role_changed(direction, group, user, role, true),
        }
    }

    fn on_group_created(
        &self,
        direction: Direction,
        group: GroupId,
        step: Option<&CreationStep>,
    ) -> SyncResult<Outcome> {
        self.groups
            .create_linked(direction, group, step)
            .map(Outcome::Created)
    }

    fn on_group_updated(&self, direction: Direction, group: GroupId) -> SyncResult<Outcome> {
        let report = self.groups.full_resync(direction, group)?;
        if !report.linked {
            return Ok(Outcome::Unlinked);
        }
        Ok(Outcome::Resynced(report))
    }

    fn on_group_deleting(&self, direction: Direction, group: GroupId) -> SyncResult<Outcome> {
        self.groups
            .capture_for_deletion(direction, group)
            .map(Outcome::Captured)
    }

    fn on_group_deleted(&self, direction: Direction, group: GroupId) -> SyncResult<Outcome> {
        self.groups
            .finalize_deletion(direction, group)
            .map(Outcome::Finalized)
    }

    fn on_role_changed(
        &self,
        direction: Direction,
        group: GroupId,
        user: UserId,
        role: Role,
        is_removal: bool,
    ) -> SyncResult<Outcome> {
        if !self.groups.has_linked_counterpart(direction.source(), group)? {
            debug!(%group, %role, "role change on unlinked group ignored");
            return Ok(Outcome::Unlinked);
        }

        let outcome = match role {
            Role::Admin => self.roles.sync_admin(direction, group, user, is_removal)?,
            Role::Moderator => self.roles.sync_moderator(direction, group, user, is_removal)?,
            Role::Member => self.roles.sync_member(direction, group, user, is_removal)?,
        };
        Ok(Outcome::Role(outcome))
    }
}
