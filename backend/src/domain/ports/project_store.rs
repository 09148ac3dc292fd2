//! Port for locally persisted projects and project memberships.

use async_trait::async_trait;

use crate::domain::{
    MemberSync, MembershipChange, ProjectId, ProjectMemberRecord, ProjectRecord, UserId,
    UserProject,
};

use super::StoreError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn list_projects(&self) -> Result<Vec<ProjectRecord>, StoreError>;

    async fn find_project(&self, id: &ProjectId) -> Result<ProjectRecord, StoreError>;

    /// Insert a project. Duplicate names are a [`StoreError::Conflict`].
    async fn create_project(&self, record: &ProjectRecord) -> Result<(), StoreError>;

    /// Overwrite a project row. In the same transaction as the write, a
    /// duration that no longer contains every persisted member span is
    /// [`StoreError::Rejected`].
    async fn update_project(&self, record: &ProjectRecord) -> Result<(), StoreError>;

    /// Delete a project together with its member rows.
    async fn delete_project(&self, id: &ProjectId) -> Result<(), StoreError>;

    async fn list_project_members(
        &self,
        id: &ProjectId,
    ) -> Result<Vec<ProjectMemberRecord>, StoreError>;

    /// Check the project exists and that every requested member span lies
    /// within it ([`StoreError::Rejected`] otherwise), plan `request` against
    /// the persisted members and apply the diff, all in one transaction.
    async fn sync_project_members(
        &self,
        id: &ProjectId,
        request: MemberSync<ProjectMemberRecord>,
    ) -> Result<MembershipChange, StoreError>;

    /// Projects `user_id` belongs to, with the member's own duration.
    async fn list_user_projects(&self, user_id: &UserId) -> Result<Vec<UserProject>, StoreError>;
}
