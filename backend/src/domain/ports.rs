//! Domain ports for the hexagonal boundary.
//!
//! Driven ports (`*Source`, `*Store`) are implemented by outbound adapters.
//! Driving ports (`*Repository`) are implemented by the domain services and
//! consumed by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod calendar_source;
mod contest_repository;
mod contest_store;
mod directory_source;
mod event_level_store;
mod event_repository;
mod group_repository;
mod group_store;
mod presence_source;
mod project_repository;
mod project_store;
mod source_error;
mod store_error;
mod user_repository;
mod user_store;

#[cfg(test)]
pub use calendar_source::MockCalendarSource;
pub use calendar_source::{CalendarEvent, CalendarSource, FixtureCalendarSource};
#[cfg(test)]
pub use contest_repository::MockContestRepository;
pub use contest_repository::ContestRepository;
#[cfg(test)]
pub use contest_store::MockContestStore;
pub use contest_store::ContestStore;
#[cfg(test)]
pub use directory_source::MockDirectorySource;
pub use directory_source::{DirectorySource, DirectoryUser, FixtureDirectorySource};
#[cfg(test)]
pub use event_level_store::MockEventLevelStore;
pub use event_level_store::EventLevelStore;
#[cfg(test)]
pub use event_repository::MockEventRepository;
pub use event_repository::EventRepository;
#[cfg(test)]
pub use group_repository::MockGroupRepository;
pub use group_repository::GroupRepository;
#[cfg(test)]
pub use group_store::MockGroupStore;
pub use group_store::GroupStore;
#[cfg(test)]
pub use presence_source::MockPresenceSource;
pub use presence_source::{
    FixturePresenceSource, PresenceSource, PresenceUser, PresenceUserQuery,
};
#[cfg(test)]
pub use project_repository::MockProjectRepository;
pub use project_repository::ProjectRepository;
#[cfg(test)]
pub use project_store::MockProjectStore;
pub use project_store::ProjectStore;
pub use source_error::SourceError;
pub use store_error::StoreError;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::UserRepository;
#[cfg(test)]
pub use user_store::MockUserStore;
pub use user_store::UserStore;
