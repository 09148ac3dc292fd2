//! Driving port for the group aggregate.

use async_trait::async_trait;

use crate::domain::{
    CreateGroupArgs, Error, Group, GroupDetail, GroupId, GroupMember, GroupMemberRecord,
    UpdateGroupArgs, UserGroup, UserId,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupRepository: Send + Sync {
    async fn get_groups(&self) -> Result<Vec<Group>, Error>;

    async fn get_group(&self, id: &GroupId) -> Result<GroupDetail, Error>;

    async fn create_group(&self, args: CreateGroupArgs) -> Result<Group, Error>;

    async fn update_group(&self, id: &GroupId, args: UpdateGroupArgs) -> Result<Group, Error>;

    async fn delete_group(&self, id: &GroupId) -> Result<(), Error>;

    async fn get_group_members(&self, id: &GroupId) -> Result<Vec<GroupMember>, Error>;

    async fn add_group_members(
        &self,
        id: &GroupId,
        members: Vec<GroupMemberRecord>,
    ) -> Result<(), Error>;

    async fn edit_group_members(
        &self,
        id: &GroupId,
        members: Vec<GroupMemberRecord>,
    ) -> Result<(), Error>;

    async fn delete_group_members(&self, id: &GroupId, user_ids: Vec<UserId>)
    -> Result<(), Error>;

    async fn get_user_groups(&self, user_id: &UserId) -> Result<Vec<UserGroup>, Error>;
}
