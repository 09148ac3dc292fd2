//! Calendar service adapter, authenticated with the `session` cookie.

pub(crate) mod dto;
mod http_source;

pub use http_source::{CALENDAR_SESSION_COOKIE, CalendarHttpSource};
