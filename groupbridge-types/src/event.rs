//! Lifecycle events emitted by either bridged system.
//!
//! Every event carries the system it was observed on. The controller turns
//! that into a [`Direction`] and routes the event by its [`EventKind`].

use crate::{Direction, GroupId, Role, System, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Step of the source system's group creation wizard.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CreationStep {
    /// First step of the wizard, where the group's name and description are
    /// entered. Nothing else about the group is configured yet.
    GroupDetails,
    /// Any later step, by name.
    Other(String),
}

impl CreationStep {
    pub fn from_name(name: &str) -> Self {
        match name {
            "group-details" => CreationStep::GroupDetails,
            other => CreationStep::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn is_first(&self) -> bool {
        matches!(self, CreationStep::GroupDetails)
    }
}

impl fmt::Display for CreationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CreationStep::GroupDetails => f.write_str("group-details"),
            CreationStep::Other(name) => f.write_str(name),
        }
    }
}

/// A group or membership change observed on one system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LifecycleEvent {
    /// A group was created. `step` is the creation wizard step that was
    /// current when the event fired, if the group came from the wizard.
    GroupCreated {
        source: System,
        group: GroupId,
        #[serde(default)]
        step: Option<CreationStep>,
    },
    GroupUpdated {
        source: System,
        group: GroupId,
    },
    /// Fired before the group record is removed.
    GroupDeleting {
        source: System,
        group: GroupId,
    },
    /// Fired after the group record is gone.
    GroupDeleted {
        source: System,
        group: GroupId,
    },
    RoleAdded {
        source: System,
        group: GroupId,
        user: UserId,
        role: Role,
    },
    RoleRemoved {
        source: System,
        group: GroupId,
        user: UserId,
        role: Role,
    },
}

impl LifecycleEvent {
    /// System the event was observed on.
    #[must_use]
    pub fn source(&self) -> System {
        match self {
            LifecycleEvent::GroupCreated { source, .. }
            | LifecycleEvent::GroupUpdated { source, .. }
            | LifecycleEvent::GroupDeleting { source, .. }
            | LifecycleEvent::GroupDeleted { source, .. }
            | LifecycleEvent::RoleAdded { source, .. }
            | LifecycleEvent::RoleRemoved { source, .. } => *source,
        }
    }

    /// Group the event concerns, on the source system.
    #[must_use]
    pub fn group(&self) -> GroupId {
        match self {
            LifecycleEvent::GroupCreated { group, .. }
            | LifecycleEvent::GroupUpdated { group, .. }
            | LifecycleEvent::GroupDeleting { group, .. }
            | LifecycleEvent::GroupDeleted { group, .. }
            | LifecycleEvent::RoleAdded { group, .. }
            | LifecycleEvent::RoleRemoved { group, .. } => *group,
        }
    }

    /// Role the event concerns, for membership events.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        match self {
            LifecycleEvent::RoleAdded { role, .. } | LifecycleEvent::RoleRemoved { role, .. } => {
                Some(*role)
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn direction(&self) -> Direction {
        Direction::from_source(self.source())
    }

    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            LifecycleEvent::GroupCreated { .. } => EventKind::GroupCreated,
            LifecycleEvent::GroupUpdated { .. } => EventKind::GroupUpdated,
            LifecycleEvent::GroupDeleting { .. } => EventKind::GroupDeleting,
            LifecycleEvent::GroupDeleted { .. } => EventKind::GroupDeleted,
            LifecycleEvent::RoleAdded { .. } => EventKind::RoleAdded,
            LifecycleEvent::RoleRemoved { .. } => EventKind::RoleRemoved,
        }
    }
}

/// Discriminant of a [`LifecycleEvent`], used as the dispatch key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    GroupCreated,
    GroupUpdated,
    GroupDeleting,
    GroupDeleted,
    RoleAdded,
    RoleRemoved,
}

impl EventKind {
    pub const ALL: [EventKind; 6] = [
        EventKind::GroupCreated,
        EventKind::GroupUpdated,
        EventKind::GroupDeleting,
        EventKind::GroupDeleted,
        EventKind::RoleAdded,
        EventKind::RoleRemoved,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            EventKind::GroupCreated => "group_created",
            EventKind::GroupUpdated => "group_updated",
            EventKind::GroupDeleting => "group_deleting",
            EventKind::GroupDeleted => "group_deleted",
            EventKind::RoleAdded => "role_added",
            EventKind::RoleRemoved => "role_removed",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
