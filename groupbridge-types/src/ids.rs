//! Identifiers assigned by the bridged systems.
//!
//! The engine never mints ids; groups get theirs from the system that
//! creates them, users from the shared user directory. Both are carried as
//! UUIDs so either system can be backed by any store.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! native_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Wraps an id issued by a bridged system.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            #[must_use]
            pub const fn as_uuid(&self) -> Uuid {
                self.0
            }

            /// Parses the hyphenated form written by [`fmt::Display`].
            pub fn parse(s: &str) -> crate::Result<Self> {
                Uuid::parse_str(s.trim())
                    .map(Self)
                    .map_err(|source| Error::InvalidId { kind: $kind, source })
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }
    };
}

native_id!(
    /// A group on one of the bridged systems.
    ///
    /// Social and course groups share this type; the owning [`crate::System`]
    /// always travels alongside it.
    GroupId,
    "group id"
);

native_id!(
    /// A user. Both systems see the same user ids.
    UserId,
    "user id"
);
