//! PostgreSQL-backed `GroupStore` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{GroupStore, StoreError};
use crate::domain::{
    GroupId, GroupMemberRecord, GroupRecord, MemberSync, MembershipChange, UserGroup, UserId,
};

use super::diesel_error_mapping::{corrupt_row, expect_one, map_pool_error};
use super::models::{GroupMemberRow, GroupRow};
use super::pool::DbPool;
use super::schema::{group_user_belongings as belongings, groups};

/// Diesel-backed implementation of the [`GroupStore`] port.
#[derive(Clone)]
pub struct DieselGroupStore {
    pool: DbPool,
}

impl DieselGroupStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_member(row: GroupMemberRow) -> Result<GroupMemberRecord, StoreError> {
    GroupMemberRecord::try_from(row).map_err(|err| corrupt_row("group_user_belongings", err))
}

#[async_trait]
impl GroupStore for DieselGroupStore {
    async fn list_groups(&self) -> Result<Vec<GroupRecord>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<GroupRow> = groups::table
            .order_by(groups::name)
            .select(GroupRow::as_select())
            .load(&mut conn)
            .await?;

        Ok(rows.into_iter().map(GroupRecord::from).collect())
    }

    async fn find_group(&self, id: &GroupId) -> Result<GroupRecord, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<GroupRow> = groups::table
            .find(*id.as_uuid())
            .select(GroupRow::as_select())
            .first(&mut conn)
            .await
            .optional()?;

        row.map(GroupRecord::from)
            .ok_or_else(|| StoreError::not_found("group"))
    }

    async fn create_group(&self, record: &GroupRecord) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(groups::table)
            .values(GroupRow::from(record))
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    async fn update_group(&self, record: &GroupRecord) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = GroupRow::from(record);

        let affected = diesel::update(groups::table.find(row.id))
            .set(&row)
            .execute(&mut conn)
            .await?;
        expect_one(affected, "group")
    }

    async fn delete_group(&self, id: &GroupId) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let group_id = *id.as_uuid();

        conn.transaction::<_, StoreError, _>(|conn| {
            async move {
                diesel::delete(belongings::table.filter(belongings::group_id.eq(group_id)))
                    .execute(conn)
                    .await?;
                let affected = diesel::delete(groups::table.find(group_id))
                    .execute(conn)
                    .await?;
                expect_one(affected, "group")
            }
            .scope_boxed()
        })
        .await
    }

    async fn list_group_members(
        &self,
        id: &GroupId,
    ) -> Result<Vec<GroupMemberRecord>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<GroupMemberRow> = belongings::table
            .filter(belongings::group_id.eq(id.as_uuid()))
            .order_by(belongings::user_id)
            .select(GroupMemberRow::as_select())
            .load(&mut conn)
            .await?;

        rows.into_iter().map(row_to_member).collect()
    }

    async fn sync_group_members(
        &self,
        id: &GroupId,
        request: MemberSync<GroupMemberRecord>,
    ) -> Result<MembershipChange, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let group = *id;
        let group_id = *id.as_uuid();

        conn.transaction::<_, StoreError, _>(|conn| {
            async move {
                let exists: Option<Uuid> = groups::table
                    .find(group_id)
                    .select(groups::id)
                    .first(conn)
                    .await
                    .optional()?;
                if exists.is_none() {
                    return Err(StoreError::not_found("group"));
                }

                let existing = belongings::table
                    .filter(belongings::group_id.eq(group_id))
                    .select(GroupMemberRow::as_select())
                    .load(conn)
                    .await?
                    .into_iter()
                    .map(row_to_member)
                    .collect::<Result<Vec<_>, _>>()?;
                let diff = request.plan(&existing);
                let change = diff.change();

                if !diff.deletes.is_empty() {
                    let removed: Vec<Uuid> =
                        diff.deletes.iter().map(|user| *user.as_uuid()).collect();
                    diesel::delete(
                        belongings::table
                            .filter(belongings::group_id.eq(group_id))
                            .filter(belongings::user_id.eq_any(&removed)),
                    )
                    .execute(conn)
                    .await?;
                }
                for member in &diff.updates {
                    let row = GroupMemberRow::new(&group, member);
                    diesel::update(
                        belongings::table
                            .filter(belongings::group_id.eq(group_id))
                            .filter(belongings::user_id.eq(row.user_id)),
                    )
                    .set((
                        belongings::since_year.eq(row.since_year),
                        belongings::since_semester.eq(row.since_semester),
                        belongings::until_year.eq(row.until_year),
                        belongings::until_semester.eq(row.until_semester),
                    ))
                    .execute(conn)
                    .await?;
                }
                if !diff.inserts.is_empty() {
                    let rows: Vec<GroupMemberRow> = diff
                        .inserts
                        .iter()
                        .map(|member| GroupMemberRow::new(&group, member))
                        .collect();
                    diesel::insert_into(belongings::table)
                        .values(&rows)
                        .execute(conn)
                        .await?;
                }
                Ok(change)
            }
            .scope_boxed()
        })
        .await
    }

    async fn list_user_groups(&self, user_id: &UserId) -> Result<Vec<UserGroup>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<(GroupRow, GroupMemberRow)> = belongings::table
            .inner_join(groups::table)
            .filter(belongings::user_id.eq(user_id.as_uuid()))
            .order_by(groups::name)
            .select((GroupRow::as_select(), GroupMemberRow::as_select()))
            .load(&mut conn)
            .await?;

        rows.into_iter()
            .map(|(group, member)| {
                let member = row_to_member(member)?;
                Ok(UserGroup {
                    group: GroupRecord::from(group).summary(),
                    user_duration: member.duration,
                })
            })
            .collect()
    }
}
