//! DTOs for calendar service JSON payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::ports::CalendarEvent;
use crate::domain::{EventId, UserId};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CalendarEventDto {
    pub(crate) event_id: Uuid,
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) description: String,
    #[serde(default)]
    pub(crate) place: String,
    pub(crate) time_start: DateTime<Utc>,
    pub(crate) time_end: DateTime<Utc>,
    #[serde(default)]
    pub(crate) shared_room: bool,
    #[serde(default)]
    pub(crate) admins: Vec<Uuid>,
}

impl From<CalendarEventDto> for CalendarEvent {
    fn from(dto: CalendarEventDto) -> Self {
        Self {
            id: EventId::from_uuid(dto.event_id),
            name: dto.name,
            description: dto.description,
            place: dto.place,
            time_start: dto.time_start,
            time_end: dto.time_end,
            shared_room: dto.shared_room,
            admins: dto.admins.into_iter().map(UserId::from_uuid).collect(),
        }
    }
}
