//! Calendar events overlaid with a locally stored visibility level.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EventId, UserId};

/// Visibility of an event on the public portfolio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventLevel {
    /// Shown without identifying details. Applies when no level is stored.
    #[default]
    Anonymous,
    Public,
    Private,
}

impl EventLevel {
    pub const fn code(self) -> i16 {
        match self {
            Self::Anonymous => 0,
            Self::Public => 1,
            Self::Private => 2,
        }
    }

    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            0 => Some(Self::Anonymous),
            1 => Some(Self::Public),
            2 => Some(Self::Private),
            _ => None,
        }
    }
}

/// Event summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub name: String,
    pub time_start: DateTime<Utc>,
    pub time_end: DateTime<Utc>,
    pub level: EventLevel,
}

/// Event with the calendar's descriptive fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetail {
    #[serde(flatten)]
    pub event: Event,
    pub description: String,
    pub place: String,
    pub shared_room: bool,
    pub admins: Vec<UserId>,
}

/// Stored level row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventLevelRecord {
    pub event_id: EventId,
    pub level: EventLevel,
    pub updated_at: DateTime<Utc>,
}

/// Outcome of writing a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelUpdate {
    /// Stored level already matched; nothing was written.
    Unchanged,
    Updated,
}
