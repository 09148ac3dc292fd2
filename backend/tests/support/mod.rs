//! Shared helpers for the Diesel store integration suites.
//!
//! Each suite under `backend/tests/` compiles as its own crate and pulls this
//! module in with `mod support;`.

pub mod cluster_skip;
pub mod embedded_postgres;

pub use cluster_skip::handle_cluster_setup_failure;
pub use embedded_postgres::{MigratedDatabase, migrated_database};
