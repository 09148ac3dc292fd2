//! Reqwest-backed calendar source.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;

use super::dto::CalendarEventDto;
use crate::domain::ports::{CalendarEvent, CalendarSource, SourceError};
use crate::domain::{EventId, UserId};
use crate::outbound::remote_http::{CookieJsonClient, RequestKind};

/// Name of the session cookie the calendar service expects.
pub const CALENDAR_SESSION_COOKIE: &str = "session";

/// Calendar source issuing `GET /events`, `GET /events/{id}` and
/// `GET /users/{id}/events`.
#[derive(Debug, Clone)]
pub struct CalendarHttpSource {
    client: CookieJsonClient,
}

impl CalendarHttpSource {
    /// Build an adapter with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: Url, session: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = CookieJsonClient::new(base_url, CALENDAR_SESSION_COOKIE, session, timeout)?;
        Ok(Self { client })
    }

    async fn list(&self, segments: &[&str]) -> Result<Vec<CalendarEvent>, SourceError> {
        let dtos: Vec<CalendarEventDto> = self
            .client
            .get_json(RequestKind::Listing, segments, &[])
            .await?;
        Ok(dtos.into_iter().map(CalendarEvent::from).collect())
    }
}

#[async_trait]
impl CalendarSource for CalendarHttpSource {
    async fn list_events(&self) -> Result<Vec<CalendarEvent>, SourceError> {
        self.list(&["events"]).await
    }

    async fn get_event(&self, id: &EventId) -> Result<CalendarEvent, SourceError> {
        let id = id.to_string();
        let dto: CalendarEventDto = self
            .client
            .get_json(RequestKind::Lookup, &["events", &id], &[])
            .await?;
        Ok(dto.into())
    }

    async fn list_events_by_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<CalendarEvent>, SourceError> {
        let owner = owner.to_string();
        self.list(&["users", &owner, "events"]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn source(server: &MockServer) -> CalendarHttpSource {
        CalendarHttpSource::new(
            Url::parse(&server.uri()).expect("mock server uri"),
            "cal",
            Duration::from_secs(5),
        )
        .expect("client builds")
    }

    #[tokio::test]
    async fn owner_listing_decodes_admins() {
        let server = MockServer::start().await;
        let owner = UserId::random();
        let event = EventId::random();
        Mock::given(method("GET"))
            .and(path(format!("/users/{owner}/events")))
            .and(header("cookie", "session=cal"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "eventId": event.to_string(),
                "name": "retro",
                "timeStart": "2024-04-01T09:00:00Z",
                "timeEnd": "2024-04-01T10:00:00Z",
                "sharedRoom": true,
                "admins": [owner.to_string()]
            }])))
            .expect(1)
            .mount(&server)
            .await;

        let events = source(&server)
            .await
            .list_events_by_owner(&owner)
            .await
            .expect("listing succeeds");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, event);
        assert_eq!(events[0].admins, vec![owner]);
        assert!(events[0].description.is_empty());
    }

    #[tokio::test]
    async fn unknown_event_is_not_found() {
        let server = MockServer::start().await;
        let event = EventId::random();
        Mock::given(method("GET"))
            .and(path(format!("/events/{event}")))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = source(&server)
            .await
            .get_event(&event)
            .await
            .expect_err("missing event");
        assert!(matches!(err, SourceError::NotFound { .. }));
    }

    #[tokio::test]
    async fn slow_response_is_a_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/events"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([]))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let source = CalendarHttpSource::new(
            Url::parse(&server.uri()).expect("uri"),
            "cal",
            Duration::from_millis(100),
        )
        .expect("client builds");
        let err = source.list_events().await.expect_err("request times out");
        assert!(matches!(err, SourceError::Transport { ref path, .. } if path == "/events"));
    }
}
