//! Cookie-authenticated JSON client shared by the remote source adapters.
//!
//! Each remote service is reached through one base URL and authenticates with
//! a session cookie. This module owns the transport details: URL building,
//! cookie injection, timeout, status mapping and JSON decoding. A non-2xx
//! status is the only error signal the services emit.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::domain::ports::SourceError;

/// Whether a request addresses one record or a collection.
///
/// Only single-record lookups translate a 404 into
/// [`SourceError::NotFound`]; a 404 from a listing endpoint is a plain
/// status failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RequestKind {
    Listing,
    Lookup,
}

/// Reqwest client bound to one remote service.
#[derive(Debug, Clone)]
pub(crate) struct CookieJsonClient {
    client: Client,
    base_url: Url,
    cookie: String,
}

impl CookieJsonClient {
    /// Build a client sending `cookie_name=cookie_value` with every request.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub(crate) fn new(
        base_url: Url,
        cookie_name: &str,
        cookie_value: &str,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            cookie: format!("{cookie_name}={cookie_value}"),
        })
    }

    /// Resolve `segments` below the base URL. Segments are percent-encoded.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, SourceError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                SourceError::transport(
                    self.base_url.as_str(),
                    "base URL cannot carry path segments",
                )
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Issue a GET and decode the JSON body into `T`.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        kind: RequestKind,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T, SourceError> {
        let mut url = self.endpoint(segments)?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(key, value)| (*key, value.as_str())));
        }
        let path = url.path().to_owned();

        let response = self
            .client
            .get(url)
            .header(reqwest::header::COOKIE, self.cookie.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|error| map_transport_error(&path, &error))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|error| map_transport_error(&path, &error))?;
        if !status.is_success() {
            return Err(map_status_error(kind, status, &path, body.as_ref()));
        }
        decode_body(&path, body.as_ref())
    }
}

fn decode_body<T: DeserializeOwned>(path: &str, body: &[u8]) -> Result<T, SourceError> {
    serde_json::from_slice(body).map_err(|error| SourceError::decode(path, error.to_string()))
}

fn map_transport_error(path: &str, error: &reqwest::Error) -> SourceError {
    if error.is_timeout() {
        SourceError::transport(path, format!("timed out: {error}"))
    } else {
        SourceError::transport(path, error.to_string())
    }
}

fn map_status_error(kind: RequestKind, status: StatusCode, path: &str, body: &[u8]) -> SourceError {
    if kind == RequestKind::Lookup && status == StatusCode::NOT_FOUND {
        return SourceError::not_found(path);
    }
    warn!(
        status = status.as_u16(),
        path,
        body = %body_preview(body),
        "remote request failed"
    );
    SourceError::status(status.as_u16(), path)
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for URL building and status mapping.

    use super::*;
    use rstest::rstest;
    use serde::Deserialize;

    fn client(base: &str) -> CookieJsonClient {
        CookieJsonClient::new(
            Url::parse(base).expect("base url"),
            "session",
            "token",
            Duration::from_secs(5),
        )
        .expect("client builds")
    }

    #[rstest]
    #[case::bare_host("http://calendar.test", "http://calendar.test/events/42")]
    #[case::trailing_slash("http://calendar.test/api/", "http://calendar.test/api/events/42")]
    #[case::nested_prefix("http://calendar.test/api/v1", "http://calendar.test/api/v1/events/42")]
    fn endpoint_appends_segments(#[case] base: &str, #[case] expected: &str) {
        let url = client(base).endpoint(&["events", "42"]).expect("endpoint");
        assert_eq!(url.as_str(), expected);
    }

    #[test]
    fn endpoint_escapes_segment_content() {
        let url = client("http://directory.test")
            .endpoint(&["user", "a/b c"])
            .expect("endpoint");
        assert_eq!(url.path(), "/user/a%2Fb%20c");
    }

    #[test]
    fn opaque_base_is_rejected() {
        let err = client("mailto:ops@example.com")
            .endpoint(&["users"])
            .expect_err("cannot-be-a-base");
        assert!(matches!(err, SourceError::Transport { .. }));
    }

    #[rstest]
    #[case::lookup_missing(RequestKind::Lookup, StatusCode::NOT_FOUND, true)]
    #[case::listing_missing(RequestKind::Listing, StatusCode::NOT_FOUND, false)]
    #[case::lookup_forbidden(RequestKind::Lookup, StatusCode::FORBIDDEN, false)]
    #[case::lookup_server_error(RequestKind::Lookup, StatusCode::BAD_GATEWAY, false)]
    fn maps_statuses_by_request_kind(
        #[case] kind: RequestKind,
        #[case] status: StatusCode,
        #[case] expect_not_found: bool,
    ) {
        let error = map_status_error(kind, status, "/users/1", b"{\"error\":\"nope\"}");
        if expect_not_found {
            assert_eq!(error, SourceError::not_found("/users/1"));
        } else {
            assert_eq!(error, SourceError::status(status.as_u16(), "/users/1"));
        }
    }

    #[test]
    fn malformed_body_is_a_decode_error() {
        #[derive(Debug, Deserialize)]
        struct Payload {
            #[expect(dead_code, reason = "decode target only")]
            id: String,
        }

        let err = decode_body::<Payload>("/users", b"[1,2,3]").expect_err("shape mismatch");
        assert!(matches!(err, SourceError::Decode { ref path, .. } if path == "/users"));
    }

    #[test]
    fn preview_truncates_long_bodies() {
        let body = "x".repeat(400);
        let preview = body_preview(body.as_bytes());
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), 163);
    }
}
