//! Port for the locally stored event visibility overlay.

use async_trait::async_trait;

use crate::domain::{EventId, EventLevel, EventLevelRecord, LevelUpdate};

use super::StoreError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventLevelStore: Send + Sync {
    /// Load the level row for one event.
    async fn find_level(&self, id: &EventId) -> Result<EventLevelRecord, StoreError>;

    /// Load level rows for the given events; absent rows are omitted.
    /// Callers never pass an empty slice.
    async fn find_levels(&self, ids: &[EventId]) -> Result<Vec<EventLevelRecord>, StoreError>;

    /// Provision the level row. An existing row is a [`StoreError::Conflict`].
    async fn create_level(&self, id: &EventId, level: EventLevel) -> Result<(), StoreError>;

    /// Change the stored level inside one transaction.
    ///
    /// A missing row is [`StoreError::NotFound`]. When the stored level
    /// already equals `level` no UPDATE is issued and `updated_at` is kept.
    async fn update_level(&self, id: &EventId, level: EventLevel)
    -> Result<LevelUpdate, StoreError>;
}
