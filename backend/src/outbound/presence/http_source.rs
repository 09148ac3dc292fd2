//! Reqwest-backed presence source.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;

use super::dto::PresenceUserDto;
use crate::domain::UserId;
use crate::domain::ports::{PresenceSource, PresenceUser, PresenceUserQuery, SourceError};
use crate::outbound::remote_http::{CookieJsonClient, RequestKind};

/// Name of the session cookie the presence service expects.
pub const PRESENCE_SESSION_COOKIE: &str = "r_session";

/// Presence source issuing `GET /users` and `GET /users/{id}`.
#[derive(Debug, Clone)]
pub struct PresenceHttpSource {
    client: CookieJsonClient,
}

impl PresenceHttpSource {
    /// Build an adapter with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: Url, session: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = CookieJsonClient::new(base_url, PRESENCE_SESSION_COOKIE, session, timeout)?;
        Ok(Self { client })
    }
}

fn listing_query(query: &PresenceUserQuery) -> Vec<(&'static str, String)> {
    let mut pairs = Vec::with_capacity(2);
    if let Some(include) = query.include_suspended {
        pairs.push(("include-suspended", include.to_string()));
    }
    if let Some(name) = &query.name {
        pairs.push(("name", name.clone()));
    }
    pairs
}

fn into_domain(path: &str, dto: PresenceUserDto) -> Result<PresenceUser, SourceError> {
    dto.into_domain()
        .map_err(|message| SourceError::decode(path, message))
}

#[async_trait]
impl PresenceSource for PresenceHttpSource {
    async fn list_users(
        &self,
        query: &PresenceUserQuery,
    ) -> Result<Vec<PresenceUser>, SourceError> {
        let dtos: Vec<PresenceUserDto> = self
            .client
            .get_json(RequestKind::Listing, &["users"], &listing_query(query))
            .await?;
        dtos.into_iter()
            .map(|dto| into_domain("/users", dto))
            .collect()
    }

    async fn get_user(&self, id: &UserId) -> Result<PresenceUser, SourceError> {
        let id = id.to_string();
        let dto: PresenceUserDto = self
            .client
            .get_json(RequestKind::Lookup, &["users", &id], &[])
            .await?;
        into_domain(&format!("/users/{id}"), dto)
    }
}
