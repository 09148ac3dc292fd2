//! Driving port for the project aggregate.

use async_trait::async_trait;

use crate::domain::{
    CreateProjectArgs, Error, Project, ProjectDetail, ProjectId, ProjectMember,
    ProjectMemberRecord, UpdateProjectArgs, UserId, UserProject,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn get_projects(&self) -> Result<Vec<Project>, Error>;

    async fn get_project(&self, id: &ProjectId) -> Result<ProjectDetail, Error>;

    async fn create_project(&self, args: CreateProjectArgs) -> Result<Project, Error>;

    /// Patch the project and return the re-read row.
    async fn update_project(
        &self,
        id: &ProjectId,
        args: UpdateProjectArgs,
    ) -> Result<Project, Error>;

    async fn delete_project(&self, id: &ProjectId) -> Result<(), Error>;

    async fn get_project_members(&self, id: &ProjectId) -> Result<Vec<ProjectMember>, Error>;

    /// Add members not already present. Empty input is rejected.
    async fn add_project_members(
        &self,
        id: &ProjectId,
        members: Vec<ProjectMemberRecord>,
    ) -> Result<(), Error>;

    /// Make the member set exactly `members`; an empty list clears it.
    async fn edit_project_members(
        &self,
        id: &ProjectId,
        members: Vec<ProjectMemberRecord>,
    ) -> Result<(), Error>;

    /// Remove the named members. Empty input is rejected.
    async fn delete_project_members(
        &self,
        id: &ProjectId,
        user_ids: Vec<UserId>,
    ) -> Result<(), Error>;

    async fn get_user_projects(&self, user_id: &UserId) -> Result<Vec<UserProject>, Error>;
}
