//! Portfolio backend library.
//!
//! Merges locally stored users, projects, contests, groups and event levels
//! with records from the presence, directory and calendar services.
//! [`state::build_repositories`] wires everything from [`settings`].

pub mod domain;
pub mod outbound;
pub mod settings;
pub mod state;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
