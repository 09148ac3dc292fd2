//! Port for locally persisted contests, teams and team memberships.

use async_trait::async_trait;

use crate::domain::{
    ContestId, ContestRecord, ContestTeamId, ContestTeamRecord, MemberSync, MembershipChange,
    UserId,
};

use super::StoreError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContestStore: Send + Sync {
    async fn list_contests(&self) -> Result<Vec<ContestRecord>, StoreError>;

    /// Load every contest whose id is in `ids`. Callers never pass an empty
    /// slice.
    async fn find_contests_by_ids(&self, ids: &[ContestId])
    -> Result<Vec<ContestRecord>, StoreError>;

    async fn find_contest(&self, id: &ContestId) -> Result<ContestRecord, StoreError>;

    async fn create_contest(&self, record: &ContestRecord) -> Result<(), StoreError>;

    async fn update_contest(&self, record: &ContestRecord) -> Result<(), StoreError>;

    /// Delete a contest together with its teams and their member rows.
    async fn delete_contest(&self, id: &ContestId) -> Result<(), StoreError>;

    async fn list_teams(&self, contest_id: &ContestId)
    -> Result<Vec<ContestTeamRecord>, StoreError>;

    /// Load a team, requiring it to belong to `contest_id`.
    async fn find_team(
        &self,
        contest_id: &ContestId,
        team_id: &ContestTeamId,
    ) -> Result<ContestTeamRecord, StoreError>;

    async fn create_team(&self, record: &ContestTeamRecord) -> Result<(), StoreError>;

    async fn update_team(&self, record: &ContestTeamRecord) -> Result<(), StoreError>;

    /// Delete a team together with its member rows.
    async fn delete_team(
        &self,
        contest_id: &ContestId,
        team_id: &ContestTeamId,
    ) -> Result<(), StoreError>;

    /// Member ids of a team. A team that does not exist under `contest_id`
    /// is [`StoreError::NotFound`].
    async fn list_team_members(
        &self,
        contest_id: &ContestId,
        team_id: &ContestTeamId,
    ) -> Result<Vec<UserId>, StoreError>;

    /// Check the team exists under `contest_id`, plan `request` against its
    /// persisted members and apply the diff, all in one transaction.
    async fn sync_team_members(
        &self,
        contest_id: &ContestId,
        team_id: &ContestTeamId,
        request: MemberSync<UserId>,
    ) -> Result<MembershipChange, StoreError>;

    /// Teams `user_id` is a member of, across all contests.
    async fn list_user_teams(&self, user_id: &UserId)
    -> Result<Vec<ContestTeamRecord>, StoreError>;
}
