//! Group-level propagation: creating, reconciling, and tearing down linked
//! counterparts.
//!
//! Link lifecycle of a group: `Unlinked → Linked → (Desyncing | Deleting) →
//! Unlinked`. Deleting ends the link; whether it also ends the counterpart
//! depends on the delete policy.

use crate::collaborator::Collaborators;
use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::loop_guard::LoopGuard;
use crate::pending::PendingDeleteContext;
use crate::policy::{Aspect, PolicyGate};
use crate::role_ops::{RoleOutcome, RoleSyncOperations};
use groupbridge_types::{
    CreationStep, Direction, GroupId, GroupLink, Role, RoleAssignment, System, UserId,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Why `create_linked` did not create a counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Sync is disabled for the direction.
    Disabled,
    /// The group is at the first creation wizard step and the counterpart is
    /// created at a dedicated later step.
    DeferredToWizard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreateOutcome {
    LinkCreated(GroupLink),
    AlreadyLinked(GroupLink),
    Skipped(SkipReason),
}

/// What a full resync changed on the counterpart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    /// False when the group had no counterpart and nothing was compared.
    pub linked: bool,
    pub details_updated: bool,
    /// Assignments added on the counterpart (counterpart group ids).
    pub added: Vec<RoleAssignment>,
    /// Assignments removed from the counterpart (counterpart group ids).
    pub removed: Vec<RoleAssignment>,
    /// Assignments that were already correct.
    pub unchanged: usize,
}

impl ReconcileReport {
    fn unlinked() -> Self {
        Self::default()
    }

    /// True if the counterpart was not touched.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        !self.details_updated && self.added.is_empty() && self.removed.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteOutcome {
    /// Nothing was captured at "deleting" time.
    NothingPending,
    /// The link was removed and the counterpart kept.
    Desynced(GroupLink),
    /// The link was removed and the counterpart deleted.
    Deleted(GroupLink),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkState {
    Unlinked,
    Linked(GroupId),
    /// Captured for deletion, waiting for the "deleted" event.
    Deleting,
}

/// Group-level operations. All of them are safe to repeat.
#[derive(Clone)]
pub struct GroupSyncOperations {
    collaborators: Arc<Collaborators>,
    gate: PolicyGate,
    guard: LoopGuard,
    roles: RoleSyncOperations,
    pending: Arc<PendingDeleteContext>,
    config: SyncConfig,
}

impl GroupSyncOperations {
    pub fn new(
        collaborators: Arc<Collaborators>,
        gate: PolicyGate,
        guard: LoopGuard,
        roles: RoleSyncOperations,
        config: SyncConfig,
    ) -> Self {
        let pending = Arc::new(PendingDeleteContext::new(config.pending_delete_ttl));
        Self {
            collaborators,
            gate,
            guard,
            roles,
            pending,
            config,
        }
    }

    pub fn has_linked_counterpart(&self, system: System, group: GroupId) -> SyncResult<bool> {
        Ok(self
            .collaborators
            .links
            .resolve_counterpart(system, group)?
            .is_some())
    }

    pub fn link_state(&self, system: System, group: GroupId) -> SyncResult<LinkState> {
        if self.pending.contains(system, group) {
            return Ok(LinkState::Deleting);
        }
        Ok(match self.collaborators.links.resolve_counterpart(system, group)? {
            Some(counterpart) => LinkState::Linked(counterpart),
            None => LinkState::Unlinked,
        })
    }

    /// Creates a counterpart for `source` and links it, then runs an initial
    /// full resync.
    ///
    /// The source system adds the creator as admin before it announces the
    /// group, so that add was seen while the group was still unlinked. The
    /// resync picks it up along with anything else already present.
    pub fn create_linked(
        &self,
        direction: Direction,
        source: GroupId,
        step: Option<&CreationStep>,
    ) -> SyncResult<CreateOutcome> {
        let policy = self.gate.snapshot();
        if !policy.allows(direction, None, Aspect::Enabled) {
            return Ok(CreateOutcome::Skipped(SkipReason::Disabled));
        }
        if step.is_some_and(CreationStep::is_first)
            && policy.allows(direction, None, Aspect::DeferredDuringWizard)
        {
            debug!(%direction, %source, "counterpart creation deferred to wizard step");
            return Ok(CreateOutcome::Skipped(SkipReason::DeferredToWizard));
        }

        let links = &self.collaborators.links;
        if let Some(existing) = links.resolve_counterpart(direction.source(), source)? {
            return Ok(CreateOutcome::AlreadyLinked(GroupLink::from_pair(
                direction.source(),
                source,
                existing,
            )));
        }

        let details = self
            .collaborators
            .membership(direction.source())
            .describe_group(source)?
            .ok_or(SyncError::GroupNotFound {
                system: direction.source(),
                group: source,
            })?;

        let target = self.collaborators.membership(direction.target());
        let counterpart = {
            let _scope = self.guard.enter(direction.target());
            target.create_group(&details)?
        };

        let link = GroupLink::from_pair(direction.source(), source, counterpart);
        if let Err(err) = links.set_link(link) {
            warn!(%direction, %source, %counterpart, "failed to record link: {err}");
            let _scope = self.guard.enter(direction.target());
            if let Err(cleanup) = target.delete_group(counterpart) {
                warn!(%counterpart, "failed to remove orphaned counterpart: {cleanup}");
            }
            return Err(err);
        }
        info!(%direction, %source, %counterpart, "created linked counterpart");

        self.full_resync(direction, source)?;
        Ok(CreateOutcome::LinkCreated(link))
    }

    /// Re-derives the counterpart's roles (and details) from the source
    /// group's current state.
    ///
    /// Only roles whose sync mode permits `direction` are compared; other
    /// roles on the counterpart are left alone. A failure part-way leaves the
    /// counterpart partially reconciled; calling again finishes the job.
    pub fn full_resync(&self, direction: Direction, group: GroupId) -> SyncResult<ReconcileReport> {
        let Some(counterpart) = self
            .collaborators
            .links
            .resolve_counterpart(direction.source(), group)?
        else {
            return Ok(ReconcileReport::unlinked());
        };

        let mut report = ReconcileReport {
            linked: true,
            ..ReconcileReport::default()
        };

        let policy = self.gate.snapshot();
        if !policy.allows(direction, None, Aspect::Enabled) {
            return Ok(report);
        }

        let source = self.collaborators.membership(direction.source());
        let target = self.collaborators.membership(direction.target());

        if self.config.propagate_details {
            let wanted = source.describe_group(group)?.ok_or(SyncError::GroupNotFound {
                system: direction.source(),
                group,
            })?;
            let current = target.describe_group(counterpart)?.ok_or(SyncError::GroupNotFound {
                system: direction.target(),
                group: counterpart,
            })?;
            if wanted != current {
                let _scope = self.guard.enter(direction.target());
                target.update_group(counterpart, &wanted)?;
                report.details_updated = true;
            }
        }

        let source_members = source.list_members(group)?;
        let target_members = target.list_members(counterpart)?;
        let users_with = |members: &[RoleAssignment], role: Role| -> BTreeSet<UserId> {
            members
                .iter()
                .filter(|a| a.role == role)
                .map(|a| a.user)
                .collect()
        };

        for role in Role::ALL {
            if !policy.allows(direction, Some(role), Aspect::Enabled) {
                continue;
            }
            let wanted = users_with(&source_members, role);
            let present = users_with(&target_members, role);
            report.unchanged += wanted.intersection(&present).count();

            for user in wanted.difference(&present) {
                if self.roles.apply_on(direction, counterpart, *user, role, false)?
                    == RoleOutcome::Applied
                {
                    report.added.push(RoleAssignment::new(counterpart, *user, role));
                }
            }
            for user in present.difference(&wanted) {
                if self.roles.apply_on(direction, counterpart, *user, role, true)?
                    == RoleOutcome::Applied
                {
                    report.removed.push(RoleAssignment::new(counterpart, *user, role));
                }
            }
        }

        if report.is_noop() {
            debug!(%direction, %group, "full resync found nothing to change");
        } else {
            info!(
                %direction,
                %group,
                %counterpart,
                added = report.added.len(),
                removed = report.removed.len(),
                details = report.details_updated,
                "full resync applied"
            );
        }
        Ok(report)
    }

    /// Captures the counterpart of a group that is about to be deleted.
    pub fn capture_for_deletion(
        &self,
        direction: Direction,
        group: GroupId,
    ) -> SyncResult<Option<GroupId>> {
        let counterpart = self
            .collaborators
            .links
            .resolve_counterpart(direction.source(), group)?;
        if let Some(counterpart) = counterpart {
            self.pending.capture(direction.source(), group, counterpart);
            debug!(%direction, %group, %counterpart, "captured counterpart for deletion");
        }
        Ok(counterpart)
    }

    /// Completes the delete handshake for a group that is now gone.
    ///
    /// Nothing captured means there was no link (or the capture expired);
    /// that is not an error. Neither is a link that changed since capture:
    /// the counterpart then belongs to someone else and is left alone. The
    /// link is removed before the counterpart is deleted so a failing delete
    /// still leaves no dangling link.
    pub fn finalize_deletion(&self, direction: Direction, group: GroupId) -> SyncResult<DeleteOutcome> {
        let Some(counterpart) = self.pending.take(direction.source(), group) else {
            debug!(%direction, %group, "no pending counterpart for deleted group");
            return Ok(DeleteOutcome::NothingPending);
        };
        let link = GroupLink::from_pair(direction.source(), group, counterpart);

        let links = &self.collaborators.links;
        let current = links.resolve_counterpart(direction.source(), group)?;
        if current != Some(counterpart) {
            info!(
                %direction,
                %group,
                %counterpart,
                "link changed after deletion began, counterpart left alone"
            );
            return Ok(DeleteOutcome::NothingPending);
        }
        links.remove_link(direction.source(), group)?;

        if !self.gate.allowed(direction, None, Aspect::DeleteOnDelete) {
            info!(%direction, %group, %counterpart, "desynced counterpart of deleted group");
            return Ok(DeleteOutcome::Desynced(link));
        }

        let _scope = self.guard.enter(direction.target());
        self.collaborators
            .membership(direction.target())
            .delete_group(counterpart)?;
        info!(%direction, %group, %counterpart, "deleted counterpart of deleted group");
        Ok(DeleteOutcome::Deleted(link))
    }

    /// Removes the link of `group` and keeps the counterpart.
    pub fn unlink(&self, direction: Direction, group: GroupId) -> SyncResult<Option<GroupLink>> {
        let removed = self
            .collaborators
            .links
            .remove_link(direction.source(), group)?;
        if let Some(link) = removed {
            info!(%direction, social = %link.social, course = %link.course, "unlinked groups");
        }
        Ok(removed)
    }
}
