//! Reqwest-backed directory source.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;

use super::dto::DirectoryUserDto;
use crate::domain::ports::{DirectorySource, DirectoryUser, SourceError};
use crate::outbound::remote_http::{CookieJsonClient, RequestKind};

/// Name of the cookie carrying the directory access token.
pub const DIRECTORY_ACCESS_COOKIE: &str = "access_token";

/// Directory source issuing `GET /user` and `GET /user/{name}`.
#[derive(Debug, Clone)]
pub struct DirectoryHttpSource {
    client: CookieJsonClient,
}

impl DirectoryHttpSource {
    /// Build an adapter with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        base_url: Url,
        access_token: &str,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client =
            CookieJsonClient::new(base_url, DIRECTORY_ACCESS_COOKIE, access_token, timeout)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl DirectorySource for DirectoryHttpSource {
    async fn list_users(&self) -> Result<Vec<DirectoryUser>, SourceError> {
        let dtos: Vec<DirectoryUserDto> = self
            .client
            .get_json(RequestKind::Listing, &["user"], &[])
            .await?;
        Ok(dtos.into_iter().map(DirectoryUser::from).collect())
    }

    async fn get_user(&self, name: &str) -> Result<DirectoryUser, SourceError> {
        let dto: DirectoryUserDto = self
            .client
            .get_json(RequestKind::Lookup, &["user", name], &[])
            .await?;
        Ok(dto.into())
    }
}
