//! Port for locally persisted groups and group memberships.

use async_trait::async_trait;

use crate::domain::{
    GroupId, GroupMemberRecord, GroupRecord, MemberSync, MembershipChange, UserGroup, UserId,
};

use super::StoreError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupStore: Send + Sync {
    async fn list_groups(&self) -> Result<Vec<GroupRecord>, StoreError>;

    async fn find_group(&self, id: &GroupId) -> Result<GroupRecord, StoreError>;

    /// Insert a group. An unknown leader is a [`StoreError::NotFound`].
    async fn create_group(&self, record: &GroupRecord) -> Result<(), StoreError>;

    async fn update_group(&self, record: &GroupRecord) -> Result<(), StoreError>;

    /// Delete a group together with its member rows.
    async fn delete_group(&self, id: &GroupId) -> Result<(), StoreError>;

    async fn list_group_members(&self, id: &GroupId)
    -> Result<Vec<GroupMemberRecord>, StoreError>;

    /// Check the group exists, plan `request` against its persisted members
    /// and apply the diff, all in one transaction.
    async fn sync_group_members(
        &self,
        id: &GroupId,
        request: MemberSync<GroupMemberRecord>,
    ) -> Result<MembershipChange, StoreError>;

    async fn list_user_groups(&self, user_id: &UserId) -> Result<Vec<UserGroup>, StoreError>;
}
