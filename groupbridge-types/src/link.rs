//! Group links and the group details copied across them.

use crate::{GroupId, System};
use serde::{Deserialize, Serialize};

/// The association between a social group and its course counterpart.
///
/// Links are 1:1: a group id appears in at most one link on its side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupLink {
    pub social: GroupId,
    pub course: GroupId,
}

impl GroupLink {
    #[must_use]
    pub const fn new(social: GroupId, course: GroupId) -> Self {
        Self { social, course }
    }

    /// Builds a link from a group on `system` and its counterpart on the
    /// other system.
    #[must_use]
    pub const fn from_pair(system: System, group: GroupId, counterpart: GroupId) -> Self {
        match system {
            System::Social => Self::new(group, counterpart),
            System::Course => Self::new(counterpart, group),
        }
    }

    /// Returns the id this link holds for `system`.
    #[must_use]
    pub const fn side(&self, system: System) -> GroupId {
        match system {
            System::Social => self.social,
            System::Course => self.course,
        }
    }

    /// Returns the id on the other side of `group`, if `group` is the
    /// `system` side of this link.
    #[must_use]
    pub fn counterpart_of(&self, system: System, group: GroupId) -> Option<GroupId> {
        (self.side(system) == group).then(|| self.side(system.other()))
    }
}

/// Descriptive fields of a group that a counterpart is created from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDetails {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl GroupDetails {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
