//! Contest repository service covering contests, teams and team members.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::ports::{ContestRepository, ContestStore, DirectorySource, UserStore};
use crate::domain::user_view::UserViewResolver;
use crate::domain::{
    Contest, ContestDetail, ContestId, ContestTeam, ContestTeamDetail, ContestTeamId,
    ContestTeamRecord, CreateContestArgs, CreateContestTeamArgs, Error, MemberSync,
    UpdateContestArgs, UpdateContestTeamArgs, User, UserContest, UserId,
};

/// Contest service implementing [`ContestRepository`].
pub struct ContestService<C, U, D> {
    store: Arc<C>,
    users: UserViewResolver<U, D>,
}

impl<C, U, D> ContestService<C, U, D> {
    pub fn new(store: Arc<C>, user_store: Arc<U>, directory: Arc<D>) -> Self {
        Self {
            store,
            users: UserViewResolver::new(user_store, directory),
        }
    }
}

impl<C, U, D> ContestService<C, U, D>
where
    C: ContestStore,
    U: UserStore,
    D: DirectorySource,
{
    async fn sync_members(
        &self,
        contest_id: &ContestId,
        team_id: &ContestTeamId,
        request: MemberSync<UserId>,
    ) -> Result<(), Error> {
        request.validate()?;
        let change = self
            .store
            .sync_team_members(contest_id, team_id, request)
            .await?;
        debug!(
            contest_id = %contest_id,
            team_id = %team_id,
            inserted = change.inserted,
            deleted = change.deleted,
            "synced contest team members"
        );
        Ok(())
    }
}

#[async_trait]
impl<C, U, D> ContestRepository for ContestService<C, U, D>
where
    C: ContestStore,
    U: UserStore,
    D: DirectorySource,
{
    async fn get_contests(&self) -> Result<Vec<Contest>, Error> {
        let records = self.store.list_contests().await?;
        Ok(records.iter().map(|record| record.summary()).collect())
    }

    async fn get_contest(&self, id: &ContestId) -> Result<ContestDetail, Error> {
        let record = self.store.find_contest(id).await?;
        let teams = self.store.list_teams(id).await?;
        Ok(ContestDetail {
            contest: record.summary(),
            description: record.description,
            link: record.link,
            teams: teams.iter().map(ContestTeamRecord::summary).collect(),
        })
    }

    async fn create_contest(&self, args: CreateContestArgs) -> Result<Contest, Error> {
        args.validate()?;
        let record = args.into_record(ContestId::random());
        self.store.create_contest(&record).await?;
        info!(contest_id = %record.id, name = %record.name, "created contest");
        Ok(record.summary())
    }

    async fn update_contest(
        &self,
        id: &ContestId,
        args: UpdateContestArgs,
    ) -> Result<Contest, Error> {
        args.validate()?;
        let current = self.store.find_contest(id).await?;
        if args.is_empty() {
            return Ok(current.summary());
        }
        let next = args.apply(&current)?;
        self.store.update_contest(&next).await?;
        Ok(self.store.find_contest(id).await?.summary())
    }

    async fn delete_contest(&self, id: &ContestId) -> Result<(), Error> {
        self.store.delete_contest(id).await?;
        info!(contest_id = %id, "deleted contest");
        Ok(())
    }

    async fn get_contest_teams(&self, contest_id: &ContestId) -> Result<Vec<ContestTeam>, Error> {
        self.store.find_contest(contest_id).await?;
        let teams = self.store.list_teams(contest_id).await?;
        Ok(teams.iter().map(ContestTeamRecord::summary).collect())
    }

    async fn get_contest_team(
        &self,
        contest_id: &ContestId,
        team_id: &ContestTeamId,
    ) -> Result<ContestTeamDetail, Error> {
        let team = self.store.find_team(contest_id, team_id).await?;
        let member_ids = self.store.list_team_members(contest_id, team_id).await?;
        let members = self.users.resolve_ordered(&member_ids).await?;
        Ok(ContestTeamDetail {
            team: team.summary(),
            link: team.link,
            description: team.description,
            members,
        })
    }

    async fn create_contest_team(
        &self,
        contest_id: &ContestId,
        args: CreateContestTeamArgs,
    ) -> Result<ContestTeam, Error> {
        args.validate()?;
        self.store.find_contest(contest_id).await?;
        let record = args.into_record(ContestTeamId::random(), *contest_id);
        self.store.create_team(&record).await?;
        info!(contest_id = %contest_id, team_id = %record.id, "created contest team");
        Ok(record.summary())
    }

    async fn update_contest_team(
        &self,
        contest_id: &ContestId,
        team_id: &ContestTeamId,
        args: UpdateContestTeamArgs,
    ) -> Result<ContestTeam, Error> {
        args.validate()?;
        let current = self.store.find_team(contest_id, team_id).await?;
        if args.is_empty() {
            return Ok(current.summary());
        }
        self.store.update_team(&args.apply(&current)).await?;
        Ok(self.store.find_team(contest_id, team_id).await?.summary())
    }

    async fn delete_contest_team(
        &self,
        contest_id: &ContestId,
        team_id: &ContestTeamId,
    ) -> Result<(), Error> {
        self.store.delete_team(contest_id, team_id).await?;
        Ok(())
    }

    async fn get_contest_team_members(
        &self,
        contest_id: &ContestId,
        team_id: &ContestTeamId,
    ) -> Result<Vec<User>, Error> {
        let member_ids = self.store.list_team_members(contest_id, team_id).await?;
        self.users.resolve_ordered(&member_ids).await
    }

    async fn add_contest_team_members(
        &self,
        contest_id: &ContestId,
        team_id: &ContestTeamId,
        user_ids: Vec<UserId>,
    ) -> Result<(), Error> {
        self.sync_members(contest_id, team_id, MemberSync::Add(user_ids))
            .await
    }

    async fn edit_contest_team_members(
        &self,
        contest_id: &ContestId,
        team_id: &ContestTeamId,
        user_ids: Vec<UserId>,
    ) -> Result<(), Error> {
        self.sync_members(contest_id, team_id, MemberSync::Replace(user_ids))
            .await
    }

    async fn delete_contest_team_members(
        &self,
        contest_id: &ContestId,
        team_id: &ContestTeamId,
        user_ids: Vec<UserId>,
    ) -> Result<(), Error> {
        self.sync_members(contest_id, team_id, MemberSync::Remove(user_ids))
            .await
    }

    async fn get_user_contests(&self, user_id: &UserId) -> Result<Vec<UserContest>, Error> {
        let teams = self.store.list_user_teams(user_id).await?;
        if teams.is_empty() {
            return Ok(Vec::new());
        }
        let mut by_contest: BTreeMap<ContestId, Vec<ContestTeam>> = BTreeMap::new();
        for team in &teams {
            by_contest
                .entry(team.contest_id)
                .or_default()
                .push(team.summary());
        }
        let ids: Vec<ContestId> = by_contest.keys().copied().collect();
        let contests = self.store.find_contests_by_ids(&ids).await?;
        Ok(contests
            .into_iter()
            .map(|contest| UserContest {
                teams: by_contest.remove(&contest.id).unwrap_or_default(),
                contest: contest.summary(),
            })
            .collect())
    }
}
