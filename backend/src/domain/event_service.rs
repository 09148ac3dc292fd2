//! Event repository service: calendar events decorated with the local
//! visibility level.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::ports::{
    CalendarEvent, CalendarSource, EventLevelStore, EventRepository, StoreError,
};
use crate::domain::{Error, Event, EventDetail, EventId, EventLevel, LevelUpdate, UserId};

/// Event service implementing [`EventRepository`].
pub struct EventService<E, K> {
    levels: Arc<E>,
    calendar: Arc<K>,
}

impl<E, K> EventService<E, K> {
    pub fn new(levels: Arc<E>, calendar: Arc<K>) -> Self {
        Self { levels, calendar }
    }
}

fn summary(event: &CalendarEvent, level: EventLevel) -> Event {
    Event {
        id: event.id,
        name: event.name.clone(),
        time_start: event.time_start,
        time_end: event.time_end,
        level,
    }
}

impl<E, K> EventService<E, K>
where
    E: EventLevelStore,
    K: CalendarSource,
{
    /// Attach stored levels to a batch of events. Events without a level row
    /// are anonymous.
    async fn decorate(&self, events: Vec<CalendarEvent>) -> Result<Vec<Event>, Error> {
        if events.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<EventId> = events.iter().map(|event| event.id).collect();
        let levels: HashMap<EventId, EventLevel> = self
            .levels
            .find_levels(&ids)
            .await?
            .into_iter()
            .map(|record| (record.event_id, record.level))
            .collect();
        Ok(events
            .iter()
            .map(|event| summary(event, levels.get(&event.id).copied().unwrap_or_default()))
            .collect())
    }
}

#[async_trait]
impl<E, K> EventRepository for EventService<E, K>
where
    E: EventLevelStore,
    K: CalendarSource,
{
    async fn get_events(&self) -> Result<Vec<Event>, Error> {
        let events = self.calendar.list_events().await?;
        self.decorate(events).await
    }

    async fn get_event(&self, id: &EventId) -> Result<EventDetail, Error> {
        let event = self.calendar.get_event(id).await?;
        let level = match self.levels.find_level(id).await {
            Ok(record) => record.level,
            Err(StoreError::NotFound { .. }) => {
                debug!(event_id = %id, "no stored level; defaulting to anonymous");
                EventLevel::Anonymous
            }
            Err(err) => return Err(err.into()),
        };
        Ok(EventDetail {
            event: summary(&event, level),
            description: event.description,
            place: event.place,
            shared_room: event.shared_room,
            admins: event.admins,
        })
    }

    async fn get_user_events(&self, user_id: &UserId) -> Result<Vec<Event>, Error> {
        let events = self.calendar.list_events_by_owner(user_id).await?;
        self.decorate(events).await
    }

    async fn update_event_level(&self, id: &EventId, level: EventLevel) -> Result<(), Error> {
        match self.levels.update_level(id, level).await? {
            LevelUpdate::Unchanged => {
                debug!(event_id = %id, ?level, "event level unchanged");
            }
            LevelUpdate::Updated => {
                info!(event_id = %id, ?level, "updated event level");
            }
        }
        Ok(())
    }

    async fn create_event_level(&self, id: &EventId, level: EventLevel) -> Result<(), Error> {
        self.calendar.get_event(id).await?;
        self.levels.create_level(id, level).await?;
        info!(event_id = %id, ?level, "provisioned event level");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockCalendarSource, MockEventLevelStore, SourceError};
    use crate::domain::{ErrorCode, EventLevelRecord};
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    fn calendar_event(id: EventId) -> CalendarEvent {
        let start = Utc
            .with_ymd_and_hms(2024, 4, 1, 18, 0, 0)
            .single()
            .expect("valid timestamp");
        CalendarEvent {
            id,
            name: "study session".to_owned(),
            description: "weekly".to_owned(),
            place: "room 101".to_owned(),
            time_start: start,
            time_end: start + chrono::Duration::hours(2),
            shared_room: false,
            admins: Vec::new(),
        }
    }

    #[tokio::test]
    async fn missing_level_row_defaults_to_anonymous() {
        let id = EventId::random();
        let mut calendar = MockCalendarSource::new();
        calendar
            .expect_get_event()
            .return_once(move |_| Ok(calendar_event(id)));
        let mut levels = MockEventLevelStore::new();
        levels
            .expect_find_level()
            .return_once(|_| Err(StoreError::not_found("event level")));

        let service = EventService::new(Arc::new(levels), Arc::new(calendar));
        let detail = service.get_event(&id).await.expect("soft default");
        assert_eq!(detail.event.level, EventLevel::Anonymous);
    }

    #[tokio::test]
    async fn remote_not_found_is_propagated() {
        let mut calendar = MockCalendarSource::new();
        calendar
            .expect_get_event()
            .return_once(|_| Err(SourceError::not_found("/events/x")));

        let service = EventService::new(Arc::new(MockEventLevelStore::new()), Arc::new(calendar));
        let err = service
            .get_event(&EventId::random())
            .await
            .expect_err("unknown event");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn empty_calendar_skips_level_query() {
        let mut calendar = MockCalendarSource::new();
        calendar
            .expect_list_events()
            .return_once(|| Ok(Vec::new()));

        let service = EventService::new(Arc::new(MockEventLevelStore::new()), Arc::new(calendar));
        assert!(service.get_events().await.expect("empty").is_empty());
    }

    #[tokio::test]
    async fn listing_overlays_stored_levels() {
        let public = EventId::random();
        let unset = EventId::random();
        let mut calendar = MockCalendarSource::new();
        calendar
            .expect_list_events()
            .return_once(move || Ok(vec![calendar_event(public), calendar_event(unset)]));
        let mut levels = MockEventLevelStore::new();
        levels.expect_find_levels().return_once(move |_| {
            Ok(vec![EventLevelRecord {
                event_id: public,
                level: EventLevel::Public,
                updated_at: Utc::now(),
            }])
        });

        let service = EventService::new(Arc::new(levels), Arc::new(calendar));
        let events = service.get_events().await.expect("listing");
        let observed: Vec<EventLevel> = events.iter().map(|event| event.level).collect();
        assert_eq!(observed, vec![EventLevel::Public, EventLevel::Anonymous]);
    }

    #[rstest]
    #[case(LevelUpdate::Unchanged)]
    #[case(LevelUpdate::Updated)]
    #[tokio::test]
    async fn update_level_succeeds_either_way(#[case] outcome: LevelUpdate) {
        let mut levels = MockEventLevelStore::new();
        levels
            .expect_update_level()
            .times(1)
            .return_once(move |_, _| Ok(outcome));

        let service = EventService::new(Arc::new(levels), Arc::new(MockCalendarSource::new()));
        service
            .update_event_level(&EventId::random(), EventLevel::Private)
            .await
            .expect("update");
    }

    #[tokio::test]
    async fn update_level_without_row_is_not_found() {
        let mut levels = MockEventLevelStore::new();
        levels
            .expect_update_level()
            .return_once(|_, _| Err(StoreError::not_found("event level")));

        let service = EventService::new(Arc::new(levels), Arc::new(MockCalendarSource::new()));
        let err = service
            .update_event_level(&EventId::random(), EventLevel::Public)
            .await
            .expect_err("missing row");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
