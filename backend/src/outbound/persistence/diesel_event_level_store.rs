//! PostgreSQL-backed `EventLevelStore` implementation using Diesel ORM.
//!
//! Only the level overlay lives here; event bodies come from the calendar
//! service.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{EventLevelStore, StoreError};
use crate::domain::{EventId, EventLevel, EventLevelRecord, LevelUpdate};

use super::diesel_error_mapping::{corrupt_row, map_pool_error};
use super::models::{EventLevelRow, NewEventLevelRow};
use super::pool::DbPool;
use super::schema::event_levels;

/// Diesel-backed implementation of the [`EventLevelStore`] port.
#[derive(Clone)]
pub struct DieselEventLevelStore {
    pool: DbPool,
}

impl DieselEventLevelStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_record(row: EventLevelRow) -> Result<EventLevelRecord, StoreError> {
    EventLevelRecord::try_from(row).map_err(|err| corrupt_row("event_levels", err))
}

#[async_trait]
impl EventLevelStore for DieselEventLevelStore {
    async fn find_level(&self, id: &EventId) -> Result<EventLevelRecord, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<EventLevelRow> = event_levels::table
            .find(*id.as_uuid())
            .select(EventLevelRow::as_select())
            .first(&mut conn)
            .await
            .optional()?;

        row_to_record(row.ok_or_else(|| StoreError::not_found("event level"))?)
    }

    async fn find_levels(&self, ids: &[EventId]) -> Result<Vec<EventLevelRecord>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();

        let rows: Vec<EventLevelRow> = event_levels::table
            .filter(event_levels::event_id.eq_any(&uuids))
            .select(EventLevelRow::as_select())
            .load(&mut conn)
            .await?;

        rows.into_iter().map(row_to_record).collect()
    }

    async fn create_level(&self, id: &EventId, level: EventLevel) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(event_levels::table)
            .values(NewEventLevelRow {
                event_id: *id.as_uuid(),
                level: level.code(),
            })
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    async fn update_level(
        &self,
        id: &EventId,
        level: EventLevel,
    ) -> Result<LevelUpdate, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let event_id = *id.as_uuid();

        conn.transaction::<_, StoreError, _>(|conn| {
            async move {
                let stored: Option<i16> = event_levels::table
                    .find(event_id)
                    .select(event_levels::level)
                    .first(conn)
                    .await
                    .optional()?;
                let Some(stored) = stored else {
                    return Err(StoreError::not_found("event level"));
                };
                if stored == level.code() {
                    return Ok(LevelUpdate::Unchanged);
                }

                diesel::update(event_levels::table.find(event_id))
                    .set((
                        event_levels::level.eq(level.code()),
                        event_levels::updated_at.eq(diesel::dsl::now),
                    ))
                    .execute(conn)
                    .await?;
                Ok(LevelUpdate::Updated)
            }
            .scope_boxed()
        })
        .await
    }
}
