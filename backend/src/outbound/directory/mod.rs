//! Directory service adapter.
//!
//! The directory is keyed by user handle and is the authority on real
//! names. Requests authenticate with the `access_token` cookie.

pub(crate) mod dto;
mod http_source;

pub use http_source::{DIRECTORY_ACCESS_COOKIE, DirectoryHttpSource};
