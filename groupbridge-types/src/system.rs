//! The two bridged systems and the directions a change can travel.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the two group-bearing systems being kept in sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum System {
    /// Social groups (admin / moderator / member roles). "System A".
    Social,
    /// Course groups. "System B".
    Course,
}

impl System {
    /// Returns the opposite system.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            System::Social => System::Course,
            System::Course => System::Social,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            System::Social => "social",
            System::Course => "course",
        }
    }
}

impl fmt::Display for System {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for System {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "social" => Ok(System::Social),
            "course" => Ok(System::Course),
            other => Err(Error::UnknownSystem(other.to_string())),
        }
    }
}

/// Direction of a propagation, from the system where a change was observed
/// to the system it is applied on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "a-to-b")]
    SocialToCourse,
    #[serde(rename = "b-to-a")]
    CourseToSocial,
}

impl Direction {
    /// Returns the direction that carries changes observed on `source`.
    #[must_use]
    pub const fn from_source(source: System) -> Self {
        match source {
            System::Social => Direction::SocialToCourse,
            System::Course => Direction::CourseToSocial,
        }
    }

    /// System the change was observed on.
    #[must_use]
    pub const fn source(self) -> System {
        match self {
            Direction::SocialToCourse => System::Social,
            Direction::CourseToSocial => System::Course,
        }
    }

    /// System the change is applied on.
    #[must_use]
    pub const fn target(self) -> System {
        self.source().other()
    }

    #[must_use]
    pub const fn reversed(self) -> Self {
        Self::from_source(self.target())
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Direction::SocialToCourse => "a-to-b",
            Direction::CourseToSocial => "b-to-a",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "a-to-b" => Ok(Direction::SocialToCourse),
            "b-to-a" => Ok(Direction::CourseToSocial),
            other => Err(Error::UnknownDirection(other.to_string())),
        }
    }
}
