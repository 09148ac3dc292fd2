//! Outbound adapters implementing the driven ports.
//!
//! - **persistence**: Diesel/PostgreSQL stores for locally owned rows.
//! - **presence**, **directory**, **calendar**: cookie-authenticated HTTP
//!   clients for the remote services.
//! - **cache**: in-process TTL cache in front of the directory listing.
//! - **fixtures**: JSON-file backed sources for offline runs.
//!
//! Adapters translate between wire or row shapes and domain types. They hold
//! no business logic.

pub mod cache;
pub mod calendar;
pub mod directory;
pub mod fixtures;
pub mod persistence;
pub mod presence;
mod remote_http;
