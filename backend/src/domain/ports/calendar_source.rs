//! Driven port for the calendar service, the authority on event scheduling.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{EventId, UserId};

use super::SourceError;

/// Event as reported by the calendar service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub id: EventId,
    pub name: String,
    pub description: String,
    pub place: String,
    pub time_start: DateTime<Utc>,
    pub time_end: DateTime<Utc>,
    pub shared_room: bool,
    /// Users administering the event; "owner" lookups match on these.
    pub admins: Vec<UserId>,
}

/// Port for reading events from the calendar service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CalendarSource: Send + Sync {
    async fn list_events(&self) -> Result<Vec<CalendarEvent>, SourceError>;

    async fn get_event(&self, id: &EventId) -> Result<CalendarEvent, SourceError>;

    /// List events administered by `owner`.
    async fn list_events_by_owner(&self, owner: &UserId)
    -> Result<Vec<CalendarEvent>, SourceError>;
}

/// Fixture implementation serving a fixed event list.
#[derive(Debug, Clone, Default)]
pub struct FixtureCalendarSource {
    events: Vec<CalendarEvent>,
}

impl FixtureCalendarSource {
    pub fn new(events: Vec<CalendarEvent>) -> Self {
        Self { events }
    }
}

#[async_trait]
impl CalendarSource for FixtureCalendarSource {
    async fn list_events(&self) -> Result<Vec<CalendarEvent>, SourceError> {
        Ok(self.events.clone())
    }

    async fn get_event(&self, id: &EventId) -> Result<CalendarEvent, SourceError> {
        self.events
            .iter()
            .find(|event| event.id == *id)
            .cloned()
            .ok_or_else(|| SourceError::not_found(format!("/events/{id}")))
    }

    async fn list_events_by_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<CalendarEvent>, SourceError> {
        Ok(self
            .events
            .iter()
            .filter(|event| event.admins.contains(owner))
            .cloned()
            .collect())
    }
}
