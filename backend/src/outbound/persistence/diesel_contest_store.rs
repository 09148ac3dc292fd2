//! PostgreSQL-backed `ContestStore` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{ContestStore, StoreError};
use crate::domain::{
    ContestId, ContestRecord, ContestTeamId, ContestTeamRecord, MemberSync, MembershipChange,
    UserId,
};

use super::diesel_error_mapping::{expect_one, map_pool_error};
use super::models::{ContestRow, ContestTeamRow, NewTeamMemberRow};
use super::pool::DbPool;
use super::schema::{contest_team_user_belongings as belongings, contest_teams, contests};

/// Diesel-backed implementation of the [`ContestStore`] port.
#[derive(Clone)]
pub struct DieselContestStore {
    pool: DbPool,
}

impl DieselContestStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Fail with [`StoreError::NotFound`] unless `team_id` belongs to
/// `contest_id`.
async fn ensure_team_in_contest(
    conn: &mut AsyncPgConnection,
    contest_id: Uuid,
    team_id: Uuid,
) -> Result<(), StoreError> {
    let owned: Option<Uuid> = contest_teams::table
        .find(team_id)
        .filter(contest_teams::contest_id.eq(contest_id))
        .select(contest_teams::id)
        .first(conn)
        .await
        .optional()?;
    owned
        .map(|_| ())
        .ok_or_else(|| StoreError::not_found("contest team"))
}

#[async_trait]
impl ContestStore for DieselContestStore {
    async fn list_contests(&self) -> Result<Vec<ContestRecord>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ContestRow> = contests::table
            .order_by(contests::time_start.desc())
            .select(ContestRow::as_select())
            .load(&mut conn)
            .await?;

        Ok(rows.into_iter().map(ContestRecord::from).collect())
    }

    async fn find_contests_by_ids(
        &self,
        ids: &[ContestId],
    ) -> Result<Vec<ContestRecord>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();

        let rows: Vec<ContestRow> = contests::table
            .filter(contests::id.eq_any(&uuids))
            .order_by(contests::time_start.desc())
            .select(ContestRow::as_select())
            .load(&mut conn)
            .await?;

        Ok(rows.into_iter().map(ContestRecord::from).collect())
    }

    async fn find_contest(&self, id: &ContestId) -> Result<ContestRecord, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ContestRow> = contests::table
            .find(*id.as_uuid())
            .select(ContestRow::as_select())
            .first(&mut conn)
            .await
            .optional()?;

        row.map(ContestRecord::from)
            .ok_or_else(|| StoreError::not_found("contest"))
    }

    async fn create_contest(&self, record: &ContestRecord) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(contests::table)
            .values(ContestRow::from(record))
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    async fn update_contest(&self, record: &ContestRecord) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = ContestRow::from(record);

        let affected = diesel::update(contests::table.find(row.id))
            .set(&row)
            .execute(&mut conn)
            .await?;
        expect_one(affected, "contest")
    }

    async fn delete_contest(&self, id: &ContestId) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let contest_id = *id.as_uuid();

        conn.transaction::<_, StoreError, _>(|conn| {
            async move {
                let teams = contest_teams::table
                    .filter(contest_teams::contest_id.eq(contest_id))
                    .select(contest_teams::id);
                diesel::delete(belongings::table.filter(belongings::team_id.eq_any(teams)))
                    .execute(conn)
                    .await?;
                diesel::delete(contest_teams::table.filter(contest_teams::contest_id.eq(contest_id)))
                    .execute(conn)
                    .await?;
                let affected = diesel::delete(contests::table.find(contest_id))
                    .execute(conn)
                    .await?;
                expect_one(affected, "contest")
            }
            .scope_boxed()
        })
        .await
    }

    async fn list_teams(
        &self,
        contest_id: &ContestId,
    ) -> Result<Vec<ContestTeamRecord>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ContestTeamRow> = contest_teams::table
            .filter(contest_teams::contest_id.eq(contest_id.as_uuid()))
            .order_by(contest_teams::name)
            .select(ContestTeamRow::as_select())
            .load(&mut conn)
            .await?;

        Ok(rows.into_iter().map(ContestTeamRecord::from).collect())
    }

    async fn find_team(
        &self,
        contest_id: &ContestId,
        team_id: &ContestTeamId,
    ) -> Result<ContestTeamRecord, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ContestTeamRow> = contest_teams::table
            .find(*team_id.as_uuid())
            .filter(contest_teams::contest_id.eq(contest_id.as_uuid()))
            .select(ContestTeamRow::as_select())
            .first(&mut conn)
            .await
            .optional()?;

        row.map(ContestTeamRecord::from)
            .ok_or_else(|| StoreError::not_found("contest team"))
    }

    async fn create_team(&self, record: &ContestTeamRecord) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(contest_teams::table)
            .values(ContestTeamRow::from(record))
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    async fn update_team(&self, record: &ContestTeamRecord) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = ContestTeamRow::from(record);

        let affected = diesel::update(
            contest_teams::table
                .find(row.id)
                .filter(contest_teams::contest_id.eq(row.contest_id)),
        )
        .set(&row)
        .execute(&mut conn)
        .await?;
        expect_one(affected, "contest team")
    }

    async fn delete_team(
        &self,
        contest_id: &ContestId,
        team_id: &ContestTeamId,
    ) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let contest_id = *contest_id.as_uuid();
        let team_id = *team_id.as_uuid();

        conn.transaction::<_, StoreError, _>(|conn| {
            async move {
                ensure_team_in_contest(conn, contest_id, team_id).await?;
                diesel::delete(belongings::table.filter(belongings::team_id.eq(team_id)))
                    .execute(conn)
                    .await?;
                let affected = diesel::delete(contest_teams::table.find(team_id))
                    .execute(conn)
                    .await?;
                expect_one(affected, "contest team")
            }
            .scope_boxed()
        })
        .await
    }

    async fn list_team_members(
        &self,
        contest_id: &ContestId,
        team_id: &ContestTeamId,
    ) -> Result<Vec<UserId>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let contest_id = *contest_id.as_uuid();
        let team_id = *team_id.as_uuid();

        conn.transaction::<_, StoreError, _>(|conn| {
            async move {
                ensure_team_in_contest(conn, contest_id, team_id).await?;
                let members: Vec<Uuid> = belongings::table
                    .filter(belongings::team_id.eq(team_id))
                    .order_by(belongings::user_id)
                    .select(belongings::user_id)
                    .load(conn)
                    .await?;
                Ok(members.into_iter().map(UserId::from_uuid).collect())
            }
            .scope_boxed()
        })
        .await
    }

    async fn sync_team_members(
        &self,
        contest_id: &ContestId,
        team_id: &ContestTeamId,
        request: MemberSync<UserId>,
    ) -> Result<MembershipChange, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let contest_id = *contest_id.as_uuid();
        let team_id = *team_id.as_uuid();

        conn.transaction::<_, StoreError, _>(|conn| {
            async move {
                ensure_team_in_contest(conn, contest_id, team_id).await?;

                let existing: Vec<UserId> = belongings::table
                    .filter(belongings::team_id.eq(team_id))
                    .select(belongings::user_id)
                    .load::<Uuid>(conn)
                    .await?
                    .into_iter()
                    .map(UserId::from_uuid)
                    .collect();
                let diff = request.plan(&existing);
                let change = diff.change();

                if !diff.deletes.is_empty() {
                    let removed: Vec<Uuid> =
                        diff.deletes.iter().map(|user| *user.as_uuid()).collect();
                    diesel::delete(
                        belongings::table
                            .filter(belongings::team_id.eq(team_id))
                            .filter(belongings::user_id.eq_any(&removed)),
                    )
                    .execute(conn)
                    .await?;
                }
                if !diff.inserts.is_empty() {
                    let rows: Vec<NewTeamMemberRow> = diff
                        .inserts
                        .iter()
                        .map(|user| NewTeamMemberRow {
                            team_id,
                            user_id: *user.as_uuid(),
                        })
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

    async fn list_user_teams(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ContestTeamRecord>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ContestTeamRow> = belongings::table
            .inner_join(contest_teams::table)
            .filter(belongings::user_id.eq(user_id.as_uuid()))
            .order_by(contest_teams::name)
            .select(ContestTeamRow::as_select())
            .load(&mut conn)
            .await?;

        Ok(rows.into_iter().map(ContestTeamRecord::from).collect())
    }
}
