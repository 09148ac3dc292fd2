//! PostgreSQL-backed `ProjectStore` implementation using Diesel ORM.
//!
//! Deletes, updates and membership syncs run in one transaction each. Writes
//! that depend on the project span lock the project row first, then check
//! member spans against rows read inside that transaction.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{ProjectStore, StoreError};
use crate::domain::{
    MemberSync, MembershipChange, ProjectId, ProjectMemberRecord, ProjectRecord, UserId,
    UserProject, YearWithSemesterDuration, check_member_spans,
};

use super::diesel_error_mapping::{corrupt_row, expect_one, map_pool_error};
use super::models::{ProjectMemberRow, ProjectRow};
use super::pool::DbPool;
use super::schema::{project_members, projects};

/// Diesel-backed implementation of the [`ProjectStore`] port.
#[derive(Clone)]
pub struct DieselProjectStore {
    pool: DbPool,
}

impl DieselProjectStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_project(row: ProjectRow) -> Result<ProjectRecord, StoreError> {
    ProjectRecord::try_from(row).map_err(|err| corrupt_row("projects", err))
}

fn rows_to_members(rows: Vec<ProjectMemberRow>) -> Result<Vec<ProjectMemberRecord>, StoreError> {
    rows.into_iter()
        .map(|row| {
            ProjectMemberRecord::try_from(row).map_err(|err| corrupt_row("project_members", err))
        })
        .collect()
}

/// Read the project span under a row lock held until the transaction ends.
async fn lock_project_span(
    conn: &mut AsyncPgConnection,
    project_id: Uuid,
) -> Result<YearWithSemesterDuration, StoreError> {
    let row: Option<ProjectRow> = projects::table
        .find(project_id)
        .select(ProjectRow::as_select())
        .for_update()
        .first(conn)
        .await
        .optional()?;
    let project = row_to_project(row.ok_or_else(|| StoreError::not_found("project"))?)?;
    Ok(project.duration)
}

async fn load_members(
    conn: &mut AsyncPgConnection,
    project_id: Uuid,
) -> Result<Vec<ProjectMemberRecord>, StoreError> {
    let rows: Vec<ProjectMemberRow> = project_members::table
        .filter(project_members::project_id.eq(project_id))
        .select(ProjectMemberRow::as_select())
        .load(conn)
        .await?;
    rows_to_members(rows)
}

#[async_trait]
impl ProjectStore for DieselProjectStore {
    async fn list_projects(&self) -> Result<Vec<ProjectRecord>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ProjectRow> = projects::table
            .order_by(projects::name)
            .select(ProjectRow::as_select())
            .load(&mut conn)
            .await?;

        rows.into_iter().map(row_to_project).collect()
    }

    async fn find_project(&self, id: &ProjectId) -> Result<ProjectRecord, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ProjectRow> = projects::table
            .find(*id.as_uuid())
            .select(ProjectRow::as_select())
            .first(&mut conn)
            .await
            .optional()?;

        row_to_project(row.ok_or_else(|| StoreError::not_found("project"))?)
    }

    async fn create_project(&self, record: &ProjectRecord) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(projects::table)
            .values(ProjectRow::from(record))
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    async fn update_project(&self, record: &ProjectRecord) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let span = record.duration;
        let row = ProjectRow::from(record);

        conn.transaction::<_, StoreError, _>(|conn| {
            async move {
                lock_project_span(conn, row.id).await?;
                check_member_spans(&span, &load_members(conn, row.id).await?)?;
                let affected = diesel::update(projects::table.find(row.id))
                    .set(&row)
                    .execute(conn)
                    .await?;
                expect_one(affected, "project")
            }
            .scope_boxed()
        })
        .await
    }

    async fn delete_project(&self, id: &ProjectId) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let project_id = *id.as_uuid();

        conn.transaction::<_, StoreError, _>(|conn| {
            async move {
                diesel::delete(
                    project_members::table.filter(project_members::project_id.eq(project_id)),
                )
                .execute(conn)
                .await?;
                let affected = diesel::delete(projects::table.find(project_id))
                    .execute(conn)
                    .await?;
                expect_one(affected, "project")
            }
            .scope_boxed()
        })
        .await
    }

    async fn list_project_members(
        &self,
        id: &ProjectId,
    ) -> Result<Vec<ProjectMemberRecord>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ProjectMemberRow> = project_members::table
            .filter(project_members::project_id.eq(id.as_uuid()))
            .order_by(project_members::user_id)
            .select(ProjectMemberRow::as_select())
            .load(&mut conn)
            .await?;

        rows_to_members(rows)
    }

    async fn sync_project_members(
        &self,
        id: &ProjectId,
        request: MemberSync<ProjectMemberRecord>,
    ) -> Result<MembershipChange, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let project = *id;
        let project_id = *id.as_uuid();

        conn.transaction::<_, StoreError, _>(|conn| {
            async move {
                let span = lock_project_span(conn, project_id).await?;
                check_member_spans(&span, request.members())?;

                let diff = request.plan(&load_members(conn, project_id).await?);
                let change = diff.change();

                if !diff.deletes.is_empty() {
                    let removed: Vec<Uuid> =
                        diff.deletes.iter().map(|user| *user.as_uuid()).collect();
                    diesel::delete(
                        project_members::table
                            .filter(project_members::project_id.eq(project_id))
                            .filter(project_members::user_id.eq_any(&removed)),
                    )
                    .execute(conn)
                    .await?;
                }
                for member in &diff.updates {
                    let row = ProjectMemberRow::new(&project, member);
                    diesel::update(
                        project_members::table
                            .filter(project_members::project_id.eq(project_id))
                            .filter(project_members::user_id.eq(row.user_id)),
                    )
                    .set((
                        project_members::since_year.eq(row.since_year),
                        project_members::since_semester.eq(row.since_semester),
                        project_members::until_year.eq(row.until_year),
                        project_members::until_semester.eq(row.until_semester),
                    ))
                    .execute(conn)
                    .await?;
                }
                if !diff.inserts.is_empty() {
                    let rows: Vec<ProjectMemberRow> = diff
                        .inserts
                        .iter()
                        .map(|member| ProjectMemberRow::new(&project, member))
                        .collect();
                    diesel::insert_into(project_members::table)
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

    async fn list_user_projects(&self, user_id: &UserId) -> Result<Vec<UserProject>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<(ProjectRow, ProjectMemberRow)> = project_members::table
            .inner_join(projects::table)
            .filter(project_members::user_id.eq(user_id.as_uuid()))
            .order_by(projects::name)
            .select((ProjectRow::as_select(), ProjectMemberRow::as_select()))
            .load(&mut conn)
            .await?;

        rows.into_iter()
            .map(|(project, member)| {
                let project = row_to_project(project)?;
                let member = ProjectMemberRecord::try_from(member)
                    .map_err(|err| corrupt_row("project_members", err))?;
                Ok(UserProject {
                    project: project.summary(),
                    user_duration: member.duration,
                })
            })
            .collect()
    }
}
