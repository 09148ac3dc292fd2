//! Presence service adapter.
//!
//! Implements the `PresenceSource` port over the service's JSON API,
//! authenticating with the `r_session` cookie.

pub(crate) mod dto;
mod http_source;

pub use http_source::{PRESENCE_SESSION_COOKIE, PresenceHttpSource};
