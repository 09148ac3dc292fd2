//! Strongly typed identifiers for portfolio aggregates.
//!
//! Every locally owned entity is keyed by a server-generated UUID. Wrapping the
//! raw UUID per aggregate keeps project identifiers from being passed where a
//! user identifier is expected.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Parse failures for textual identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdParseError {
    /// Input was empty or only whitespace.
    #[error("identifier must not be empty")]
    Empty,
    /// Input was not a valid UUID.
    #[error("identifier must be a valid UUID: {value}")]
    Invalid { value: String },
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh random identifier.
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Borrow the underlying UUID.
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Parse an identifier from its hyphenated textual form.
            pub fn parse(raw: &str) -> Result<Self, IdParseError> {
                if raw.trim().is_empty() {
                    return Err(IdParseError::Empty);
                }
                Uuid::parse_str(raw)
                    .map(Self)
                    .map_err(|_| IdParseError::Invalid {
                        value: raw.to_owned(),
                    })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl std::str::FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }
    };
}

define_id!(
    /// Identifier of a portfolio user; shared with the presence service.
    UserId
);
define_id!(
    /// Identifier of an external account linked to a user.
    AccountId
);
define_id!(
    /// Identifier of a project.
    ProjectId
);
define_id!(
    /// Identifier of a contest.
    ContestId
);
define_id!(
    /// Identifier of a team entered into a contest.
    ContestTeamId
);
define_id!(
    /// Identifier of a group.
    GroupId
);
define_id!(
    /// Identifier of a calendar event.
    EventId
);
