//! Group roles and per-role sync modes.

use crate::{Direction, Error, GroupId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// A membership role inside a group.
///
/// Both systems expose the same three roles to the engine; a user may hold
/// more than one of them at a time on a given group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Moderator,
    Member,
}

impl Role {
    /// Every role, in reconcile order.
    pub const ALL: [Role; 3] = [Role::Admin, Role::Moderator, Role::Member];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Moderator => "moderator",
            Role::Member => "member",
        }
    }

    /// Short name used in settings keys (`default_{name}_sync_to`).
    #[must_use]
    pub const fn settings_name(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Moderator => "mod",
            Role::Member => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "moderator" | "mod" => Ok(Role::Moderator),
            "member" | "user" => Ok(Role::Member),
            other => Err(Error::UnknownRole(other.to_string())),
        }
    }
}

/// Which directions a role is propagated in.
///
/// There is a single mode per role; asymmetric setups are expressed by
/// picking one of the one-way modes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoleSyncMode {
    #[default]
    #[serde(rename = "none")]
    None,
    #[serde(rename = "bidirectional")]
    Bidirectional,
    #[serde(rename = "a-to-b")]
    SocialToCourse,
    #[serde(rename = "b-to-a")]
    CourseToSocial,
}

impl RoleSyncMode {
    /// Returns true if changes travelling in `direction` should be applied.
    #[must_use]
    pub const fn permits(self, direction: Direction) -> bool {
        match (self, direction) {
            (RoleSyncMode::None, _) => false,
            (RoleSyncMode::Bidirectional, _) => true,
            (RoleSyncMode::SocialToCourse, Direction::SocialToCourse) => true,
            (RoleSyncMode::CourseToSocial, Direction::CourseToSocial) => true,
            _ => false,
        }
    }

    /// Parses a settings value, treating anything unrecognised as `None`.
    ///
    /// Installations configured before modes existed store a target role
    /// (`admin`, `user`, ...) here; those read as `None` and are logged.
    #[must_use]
    pub fn parse_lenient(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() {
            return RoleSyncMode::None;
        }
        s.parse().unwrap_or_else(|_| {
            warn!(value = s, "unrecognised role sync mode, role will not sync");
            RoleSyncMode::None
        })
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            RoleSyncMode::None => "none",
            RoleSyncMode::Bidirectional => "bidirectional",
            RoleSyncMode::SocialToCourse => "a-to-b",
            RoleSyncMode::CourseToSocial => "b-to-a",
        }
    }
}

impl fmt::Display for RoleSyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoleSyncMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(RoleSyncMode::None),
            "bidirectional" => Ok(RoleSyncMode::Bidirectional),
            "a-to-b" => Ok(RoleSyncMode::SocialToCourse),
            "b-to-a" => Ok(RoleSyncMode::CourseToSocial),
            other => Err(Error::UnknownSyncMode(other.to_string())),
        }
    }
}

/// A user holding a role in a group on one of the systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub group: GroupId,
    pub user: UserId,
    pub role: Role,
}

impl RoleAssignment {
    #[must_use]
    pub const fn new(group: GroupId, user: UserId, role: Role) -> Self {
        Self { group, user, role }
    }
}
