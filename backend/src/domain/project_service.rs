//! Project repository service.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::ports::{DirectorySource, ProjectRepository, ProjectStore, UserStore};
use crate::domain::user_view::UserViewResolver;
use crate::domain::{
    CreateProjectArgs, Error, Member, MemberSync, Project, ProjectDetail, ProjectId,
    ProjectMember, ProjectMemberRecord, UpdateProjectArgs, UserId, UserProject,
};

/// Project service implementing [`ProjectRepository`].
pub struct ProjectService<P, U, D> {
    store: Arc<P>,
    users: UserViewResolver<U, D>,
}

impl<P, U, D> ProjectService<P, U, D> {
    pub fn new(store: Arc<P>, user_store: Arc<U>, directory: Arc<D>) -> Self {
        Self {
            store,
            users: UserViewResolver::new(user_store, directory),
        }
    }
}

impl<P, U, D> ProjectService<P, U, D>
where
    P: ProjectStore,
    U: UserStore,
    D: DirectorySource,
{
    async fn resolve_members(
        &self,
        records: Vec<ProjectMemberRecord>,
    ) -> Result<Vec<ProjectMember>, Error> {
        let ids: Vec<UserId> = records.iter().map(Member::user_id).collect();
        let mut views = self.users.resolve(&ids).await?;
        Ok(records
            .into_iter()
            .filter_map(|record| {
                views.remove(&record.user_id).map(|user| ProjectMember {
                    user,
                    duration: record.duration,
                })
            })
            .collect())
    }

    async fn sync_members(
        &self,
        id: &ProjectId,
        request: MemberSync<ProjectMemberRecord>,
    ) -> Result<(), Error> {
        request.validate()?;
        let change = self.store.sync_project_members(id, request).await?;
        debug!(
            project_id = %id,
            inserted = change.inserted,
            updated = change.updated,
            deleted = change.deleted,
            "synced project members"
        );
        Ok(())
    }
}

#[async_trait]
impl<P, U, D> ProjectRepository for ProjectService<P, U, D>
where
    P: ProjectStore,
    U: UserStore,
    D: DirectorySource,
{
    async fn get_projects(&self) -> Result<Vec<Project>, Error> {
        let records = self.store.list_projects().await?;
        Ok(records.iter().map(|record| record.summary()).collect())
    }

    async fn get_project(&self, id: &ProjectId) -> Result<ProjectDetail, Error> {
        let record = self.store.find_project(id).await?;
        let members = self.store.list_project_members(id).await?;
        let members = self.resolve_members(members).await?;
        Ok(ProjectDetail {
            project: record.summary(),
            description: record.description,
            link: record.link,
            members,
        })
    }

    async fn create_project(&self, args: CreateProjectArgs) -> Result<Project, Error> {
        args.validate()?;
        let record = args.into_record(ProjectId::random());
        self.store.create_project(&record).await?;
        info!(project_id = %record.id, name = %record.name, "created project");
        Ok(record.summary())
    }

    async fn update_project(
        &self,
        id: &ProjectId,
        args: UpdateProjectArgs,
    ) -> Result<Project, Error> {
        args.validate()?;
        let current = self.store.find_project(id).await?;
        if args.is_empty() {
            return Ok(current.summary());
        }
        let next = args.apply(&current)?;
        self.store.update_project(&next).await?;
        Ok(self.store.find_project(id).await?.summary())
    }

    async fn delete_project(&self, id: &ProjectId) -> Result<(), Error> {
        self.store.delete_project(id).await?;
        info!(project_id = %id, "deleted project");
        Ok(())
    }

    async fn get_project_members(&self, id: &ProjectId) -> Result<Vec<ProjectMember>, Error> {
        self.store.find_project(id).await?;
        let members = self.store.list_project_members(id).await?;
        self.resolve_members(members).await
    }

    async fn add_project_members(
        &self,
        id: &ProjectId,
        members: Vec<ProjectMemberRecord>,
    ) -> Result<(), Error> {
        self.sync_members(id, MemberSync::Add(members)).await
    }

    async fn edit_project_members(
        &self,
        id: &ProjectId,
        members: Vec<ProjectMemberRecord>,
    ) -> Result<(), Error> {
        self.sync_members(id, MemberSync::Replace(members)).await
    }

    async fn delete_project_members(
        &self,
        id: &ProjectId,
        user_ids: Vec<UserId>,
    ) -> Result<(), Error> {
        self.sync_members(id, MemberSync::Remove(user_ids)).await
    }

    async fn get_user_projects(&self, user_id: &UserId) -> Result<Vec<UserProject>, Error> {
        Ok(self.store.list_user_projects(user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        MockDirectorySource, MockProjectStore, MockUserStore, StoreError,
    };
    use crate::domain::{
        ErrorCode, MembershipChange, ProjectRecord, Semester, YearWithSemester,
        YearWithSemesterDuration,
    };
    use rstest::{fixture, rstest};

    fn span(since: (i32, Semester), until: (i32, Semester)) -> YearWithSemesterDuration {
        YearWithSemesterDuration::new(
            YearWithSemester::new(since.0, since.1),
            Some(YearWithSemester::new(until.0, until.1)),
        )
        .expect("valid span")
    }

    #[fixture]
    fn project() -> ProjectRecord {
        ProjectRecord {
            id: ProjectId::random(),
            name: "portfolio".to_owned(),
            description: String::new(),
            link: String::new(),
            duration: span((2022, Semester::FIRST), (2023, Semester::FIRST)),
        }
    }

    fn service(
        store: MockProjectStore,
    ) -> ProjectService<MockProjectStore, MockUserStore, MockDirectorySource> {
        ProjectService::new(
            Arc::new(store),
            Arc::new(MockUserStore::new()),
            Arc::new(MockDirectorySource::new()),
        )
    }

    #[tokio::test]
    async fn add_rejects_empty_input_without_io() {
        let err = service(MockProjectStore::new())
            .add_project_members(&ProjectId::random(), Vec::new())
            .await
            .expect_err("empty add");
        assert_eq!(err.code(), ErrorCode::InvalidArgument);
    }

    #[rstest]
    #[tokio::test]
    async fn member_outside_project_span_is_rejected(project: ProjectRecord) {
        let id = project.id;
        let mut store = MockProjectStore::new();
        store.expect_find_project().never();
        store
            .expect_sync_project_members()
            .times(1)
            .return_once(|_, _| {
                Err(StoreError::rejected(
                    "member duration lies outside the project duration",
                ))
            });
        let member = ProjectMemberRecord {
            user_id: UserId::random(),
            duration: span((2021, Semester::SECOND), (2022, Semester::SECOND)),
        };

        let err = service(store)
            .edit_project_members(&id, vec![member])
            .await
            .expect_err("outside span");
        assert_eq!(err.code(), ErrorCode::InvalidArgument);
    }

    #[rstest]
    #[tokio::test]
    async fn shrinking_below_a_member_span_is_rejected_without_reread(project: ProjectRecord) {
        let id = project.id;
        let mut store = MockProjectStore::new();
        store
            .expect_find_project()
            .times(1)
            .return_once(move |_| Ok(project));
        store
            .expect_update_project()
            .withf(|record| {
                record.duration.until() == Some(YearWithSemester::new(2022, Semester::FIRST))
            })
            .times(1)
            .return_once(|_| {
                Err(StoreError::rejected(
                    "member duration lies outside the project duration",
                ))
            });

        let err = service(store)
            .update_project(
                &id,
                UpdateProjectArgs {
                    until: Some(Some(YearWithSemester::new(2022, Semester::FIRST))),
                    ..UpdateProjectArgs::default()
                },
            )
            .await
            .expect_err("member would fall outside");
        assert_eq!(err.code(), ErrorCode::InvalidArgument);
    }

    #[rstest]
    #[tokio::test]
    async fn edit_with_empty_set_is_forwarded(project: ProjectRecord) {
        let id = project.id;
        let mut store = MockProjectStore::new();
        store
            .expect_sync_project_members()
            .withf(|_, request| {
                matches!(request, MemberSync::Replace(members) if members.is_empty())
            })
            .times(1)
            .return_once(|_, _| {
                Ok(MembershipChange {
                    deleted: 2,
                    ..MembershipChange::default()
                })
            });

        service(store)
            .edit_project_members(&id, Vec::new())
            .await
            .expect("clearing members succeeds");
    }

    #[rstest]
    #[tokio::test]
    async fn empty_update_returns_current_row(project: ProjectRecord) {
        let id = project.id;
        let expected = project.summary();
        let mut store = MockProjectStore::new();
        store
            .expect_find_project()
            .times(1)
            .return_once(move |_| Ok(project));

        let updated = service(store)
            .update_project(&id, UpdateProjectArgs::default())
            .await
            .expect("no-op update");
        assert_eq!(updated, expected);
    }
}
