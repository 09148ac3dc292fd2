//! Driving port for contests and their teams.

use async_trait::async_trait;

use crate::domain::{
    Contest, ContestDetail, ContestId, ContestTeam, ContestTeamDetail, ContestTeamId,
    CreateContestArgs, CreateContestTeamArgs, Error, UpdateContestArgs, UpdateContestTeamArgs,
    User, UserContest, UserId,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContestRepository: Send + Sync {
    async fn get_contests(&self) -> Result<Vec<Contest>, Error>;

    async fn get_contest(&self, id: &ContestId) -> Result<ContestDetail, Error>;

    async fn create_contest(&self, args: CreateContestArgs) -> Result<Contest, Error>;

    async fn update_contest(
        &self,
        id: &ContestId,
        args: UpdateContestArgs,
    ) -> Result<Contest, Error>;

    async fn delete_contest(&self, id: &ContestId) -> Result<(), Error>;

    async fn get_contest_teams(&self, contest_id: &ContestId) -> Result<Vec<ContestTeam>, Error>;

    async fn get_contest_team(
        &self,
        contest_id: &ContestId,
        team_id: &ContestTeamId,
    ) -> Result<ContestTeamDetail, Error>;

    async fn create_contest_team(
        &self,
        contest_id: &ContestId,
        args: CreateContestTeamArgs,
    ) -> Result<ContestTeam, Error>;

    async fn update_contest_team(
        &self,
        contest_id: &ContestId,
        team_id: &ContestTeamId,
        args: UpdateContestTeamArgs,
    ) -> Result<ContestTeam, Error>;

    async fn delete_contest_team(
        &self,
        contest_id: &ContestId,
        team_id: &ContestTeamId,
    ) -> Result<(), Error>;

    /// Members of a team, which must belong to `contest_id`.
    async fn get_contest_team_members(
        &self,
        contest_id: &ContestId,
        team_id: &ContestTeamId,
    ) -> Result<Vec<User>, Error>;

    /// Add members not already on the team. Overlap is a silent no-op.
    async fn add_contest_team_members(
        &self,
        contest_id: &ContestId,
        team_id: &ContestTeamId,
        user_ids: Vec<UserId>,
    ) -> Result<(), Error>;

    async fn edit_contest_team_members(
        &self,
        contest_id: &ContestId,
        team_id: &ContestTeamId,
        user_ids: Vec<UserId>,
    ) -> Result<(), Error>;

    async fn delete_contest_team_members(
        &self,
        contest_id: &ContestId,
        team_id: &ContestTeamId,
        user_ids: Vec<UserId>,
    ) -> Result<(), Error>;

    async fn get_user_contests(&self, user_id: &UserId) -> Result<Vec<UserContest>, Error>;
}
