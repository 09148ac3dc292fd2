//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Each `Diesel*Store` implements one store port from
//! [`crate::domain::ports`]. Row structs (`models.rs`) and the table
//! definitions (`schema.rs`) stay private to this module; stores translate
//! rows into domain records and map every Diesel or pool failure into
//! [`crate::domain::ports::StoreError`].
//!
//! Operations that touch more than one table run inside a single
//! transaction. Membership syncs plan their diff against rows read inside
//! that same transaction.
//!
//! # Example
//!
//! ```ignore
//! use portfolio::outbound::persistence::{DbPool, DieselProjectStore, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/portfolio")).await?;
//! let projects = DieselProjectStore::new(pool.clone());
//! ```

mod diesel_contest_store;
mod diesel_error_mapping;
mod diesel_event_level_store;
mod diesel_group_store;
mod diesel_project_store;
mod diesel_user_store;
mod models;
mod pool;
mod schema;

pub use diesel_contest_store::DieselContestStore;
pub use diesel_event_level_store::DieselEventLevelStore;
pub use diesel_group_store::DieselGroupStore;
pub use diesel_project_store::DieselProjectStore;
pub use diesel_user_store::DieselUserStore;
pub use pool::{DbPool, PoolConfig, PoolError};
