//! Driving port for calendar events with their local visibility level.

use async_trait::async_trait;

use crate::domain::{Error, Event, EventDetail, EventId, EventLevel, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// List every calendar event; events without a stored level are
    /// anonymous.
    async fn get_events(&self) -> Result<Vec<Event>, Error>;

    async fn get_event(&self, id: &EventId) -> Result<EventDetail, Error>;

    async fn get_user_events(&self, user_id: &UserId) -> Result<Vec<Event>, Error>;

    /// Change a provisioned level. Writing the current level is a no-op.
    async fn update_event_level(&self, id: &EventId, level: EventLevel) -> Result<(), Error>;

    /// Provision the level row for an event known to the calendar.
    async fn create_event_level(&self, id: &EventId, level: EventLevel) -> Result<(), Error>;
}
