//! Stateful in-memory store implementing every local store port.
//!
//! Mirrors the relational rules of the PostgreSQL schema that the services
//! depend on: unique user names, one account per type per user, unique
//! project names, foreign keys to users and cascading deletes of owned join
//! rows. Listings follow the same orderings as the Diesel adapters.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use mockable::{Clock, DefaultClock};

use crate::domain::ports::{
    ContestStore, EventLevelStore, GroupStore, ProjectStore, StoreError, UserStore,
};
use crate::domain::{
    Account, AccountId, ContestId, ContestRecord, ContestTeamId, ContestTeamRecord, EventId,
    EventLevel, EventLevelRecord, GroupId, GroupMemberRecord, GroupRecord, LevelUpdate, Member,
    MemberSync, MembershipChange, MembershipDiff, ProjectId, ProjectMemberRecord, ProjectRecord,
    UpdateUserArgs, UserGroup, UserId, UserProject, UserRecord, YearWithSemesterDuration,
    check_member_spans,
};

#[derive(Default)]
struct Tables {
    users: Vec<UserRecord>,
    accounts: Vec<(UserId, Account)>,
    projects: Vec<ProjectRecord>,
    project_members: Vec<(ProjectId, ProjectMemberRecord)>,
    contests: Vec<ContestRecord>,
    teams: Vec<ContestTeamRecord>,
    team_members: Vec<(ContestTeamId, UserId)>,
    groups: Vec<GroupRecord>,
    group_members: Vec<(GroupId, GroupMemberRecord)>,
    event_levels: Vec<EventLevelRecord>,
}

impl Tables {
    fn require_user(&self, id: &UserId) -> Result<(), StoreError> {
        if self.users.iter().any(|user| user.id == *id) {
            Ok(())
        } else {
            Err(StoreError::not_found("user"))
        }
    }

    fn require_users<M: Member>(&self, members: &[M]) -> Result<(), StoreError> {
        members
            .iter()
            .try_for_each(|member| self.require_user(&member.user_id()))
    }

    fn require_team(
        &self,
        contest_id: &ContestId,
        team_id: &ContestTeamId,
    ) -> Result<(), StoreError> {
        if self
            .teams
            .iter()
            .any(|team| team.id == *team_id && team.contest_id == *contest_id)
        {
            Ok(())
        } else {
            Err(StoreError::not_found("contest team"))
        }
    }

    fn project_duration(&self, id: &ProjectId) -> Result<YearWithSemesterDuration, StoreError> {
        self.projects
            .iter()
            .find(|project| project.id == *id)
            .map(|project| project.duration)
            .ok_or_else(|| StoreError::not_found("project"))
    }
}

/// In-memory implementation of the five store ports.
///
/// Every operation holds one lock for its whole duration, which gives the
/// same all-or-nothing behaviour as a database transaction.
pub struct MemoryStore {
    tables: Mutex<Tables>,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(Arc::new(DefaultClock))
    }
}

impl MemoryStore {
    pub fn new(clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of project member rows across all projects.
    pub fn project_member_rows(&self) -> usize {
        self.lock().project_members.len()
    }

    /// Number of contest team member rows across all teams.
    pub fn team_member_rows(&self) -> usize {
        self.lock().team_members.len()
    }
}

fn sorted_by_user<M: Member>(mut members: Vec<M>) -> Vec<M> {
    members.sort_by_key(Member::user_id);
    members
}

/// Apply a membership diff to a keyed join table.
fn apply_diff<K, M>(rows: &mut Vec<(K, M)>, owner: K, diff: MembershipDiff<M>)
where
    K: Copy + PartialEq,
    M: Member,
{
    rows.retain(|(key, member)| *key != owner || !diff.deletes.contains(&member.user_id()));
    for update in diff.updates {
        if let Some(slot) = rows
            .iter_mut()
            .find(|(key, member)| *key == owner && member.user_id() == update.user_id())
        {
            slot.1 = update;
        }
    }
    rows.extend(diff.inserts.into_iter().map(|member| (owner, member)));
}

fn members_of<K: PartialEq, M: Clone>(rows: &[(K, M)], owner: &K) -> Vec<M> {
    rows.iter()
        .filter(|(key, _)| key == owner)
        .map(|(_, member)| member.clone())
        .collect()
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_users_by_ids(&self, ids: &[UserId]) -> Result<Vec<UserRecord>, StoreError> {
        Ok(self
            .lock()
            .users
            .iter()
            .filter(|user| ids.contains(&user.id))
            .cloned()
            .collect())
    }

    async fn find_user(&self, id: &UserId) -> Result<UserRecord, StoreError> {
        self.lock()
            .users
            .iter()
            .find(|user| user.id == *id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("user"))
    }

    async fn create_user(&self, record: &UserRecord) -> Result<(), StoreError> {
        let mut tables = self.lock();
        if tables.users.iter().any(|user| user.name == record.name) {
            return Err(StoreError::conflict(format!(
                "user name {} is taken",
                record.name
            )));
        }
        tables.users.push(record.clone());
        Ok(())
    }

    async fn update_user(&self, id: &UserId, args: &UpdateUserArgs) -> Result<(), StoreError> {
        let mut tables = self.lock();
        let user = tables
            .users
            .iter_mut()
            .find(|user| user.id == *id)
            .ok_or_else(|| StoreError::not_found("user"))?;
        if let Some(bio) = &args.bio {
            user.bio.clone_from(bio);
        }
        if let Some(check) = args.check {
            user.check = check;
        }
        Ok(())
    }

    async fn list_accounts(&self, user_id: &UserId) -> Result<Vec<Account>, StoreError> {
        let mut accounts = members_of(&self.lock().accounts, user_id);
        accounts.sort_by_key(|account| account.account_type.code());
        Ok(accounts)
    }

    async fn find_account(
        &self,
        user_id: &UserId,
        account_id: &AccountId,
    ) -> Result<Account, StoreError> {
        self.lock()
            .accounts
            .iter()
            .find(|(owner, account)| owner == user_id && account.id == *account_id)
            .map(|(_, account)| account.clone())
            .ok_or_else(|| StoreError::not_found("account"))
    }

    async fn create_account(
        &self,
        user_id: &UserId,
        account: &Account,
    ) -> Result<(), StoreError> {
        let mut tables = self.lock();
        tables.require_user(user_id)?;
        let duplicate = tables.accounts.iter().any(|(owner, existing)| {
            owner == user_id && existing.account_type == account.account_type
        });
        if duplicate {
            return Err(StoreError::conflict("account type already linked"));
        }
        tables.accounts.push((*user_id, account.clone()));
        Ok(())
    }

    async fn update_account(
        &self,
        user_id: &UserId,
        account: &Account,
    ) -> Result<(), StoreError> {
        let mut tables = self.lock();
        let duplicate = tables.accounts.iter().any(|(owner, existing)| {
            owner == user_id
                && existing.id != account.id
                && existing.account_type == account.account_type
        });
        if duplicate {
            return Err(StoreError::conflict("account type already linked"));
        }
        let slot = tables
            .accounts
            .iter_mut()
            .find(|(owner, existing)| owner == user_id && existing.id == account.id)
            .ok_or_else(|| StoreError::not_found("account"))?;
        slot.1 = account.clone();
        Ok(())
    }

    async fn delete_account(
        &self,
        user_id: &UserId,
        account_id: &AccountId,
    ) -> Result<(), StoreError> {
        let mut tables = self.lock();
        let before = tables.accounts.len();
        tables
            .accounts
            .retain(|(owner, account)| !(owner == user_id && account.id == *account_id));
        if tables.accounts.len() == before {
            return Err(StoreError::not_found("account"));
        }
        Ok(())
    }
}

#[async_trait]
impl ProjectStore for MemoryStore {
    async fn list_projects(&self) -> Result<Vec<ProjectRecord>, StoreError> {
        let mut projects = self.lock().projects.clone();
        projects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(projects)
    }

    async fn find_project(&self, id: &ProjectId) -> Result<ProjectRecord, StoreError> {
        self.lock()
            .projects
            .iter()
            .find(|project| project.id == *id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("project"))
    }

    async fn create_project(&self, record: &ProjectRecord) -> Result<(), StoreError> {
        let mut tables = self.lock();
        if tables.projects.iter().any(|project| project.name == record.name) {
            return Err(StoreError::conflict(format!(
                "project name {} is taken",
                record.name
            )));
        }
        tables.projects.push(record.clone());
        Ok(())
    }

    async fn update_project(&self, record: &ProjectRecord) -> Result<(), StoreError> {
        let mut tables = self.lock();
        if tables
            .projects
            .iter()
            .any(|project| project.id != record.id && project.name == record.name)
        {
            return Err(StoreError::conflict(format!(
                "project name {} is taken",
                record.name
            )));
        }
        tables.project_duration(&record.id)?;
        check_member_spans(
            &record.duration,
            &members_of(&tables.project_members, &record.id),
        )?;
        if let Some(slot) = tables
            .projects
            .iter_mut()
            .find(|project| project.id == record.id)
        {
            *slot = record.clone();
        }
        Ok(())
    }

    async fn delete_project(&self, id: &ProjectId) -> Result<(), StoreError> {
        let mut tables = self.lock();
        let before = tables.projects.len();
        tables.projects.retain(|project| project.id != *id);
        if tables.projects.len() == before {
            return Err(StoreError::not_found("project"));
        }
        tables.project_members.retain(|(project, _)| project != id);
        Ok(())
    }

    async fn list_project_members(
        &self,
        id: &ProjectId,
    ) -> Result<Vec<ProjectMemberRecord>, StoreError> {
        Ok(sorted_by_user(members_of(&self.lock().project_members, id)))
    }

    async fn sync_project_members(
        &self,
        id: &ProjectId,
        request: MemberSync<ProjectMemberRecord>,
    ) -> Result<MembershipChange, StoreError> {
        let mut tables = self.lock();
        let duration = tables.project_duration(id)?;
        check_member_spans(&duration, request.members())?;
        let existing = members_of(&tables.project_members, id);
        let diff = request.plan(&existing);
        tables.require_users(&diff.inserts)?;
        let change = diff.change();
        apply_diff(&mut tables.project_members, *id, diff);
        Ok(change)
    }

    async fn list_user_projects(&self, user_id: &UserId) -> Result<Vec<UserProject>, StoreError> {
        let tables = self.lock();
        let mut projects: Vec<UserProject> = tables
            .project_members
            .iter()
            .filter(|(_, member)| member.user_id == *user_id)
            .filter_map(|(project_id, member)| {
                tables
                    .projects
                    .iter()
                    .find(|project| project.id == *project_id)
                    .map(|project| UserProject {
                        project: project.summary(),
                        user_duration: member.duration,
                    })
            })
            .collect();
        projects.sort_by(|a, b| a.project.name.cmp(&b.project.name));
        Ok(projects)
    }
}

#[async_trait]
impl ContestStore for MemoryStore {
    async fn list_contests(&self) -> Result<Vec<ContestRecord>, StoreError> {
        let mut contests = self.lock().contests.clone();
        contests.sort_by(|a, b| b.time_start.cmp(&a.time_start));
        Ok(contests)
    }

    async fn find_contests_by_ids(
        &self,
        ids: &[ContestId],
    ) -> Result<Vec<ContestRecord>, StoreError> {
        let mut contests: Vec<ContestRecord> = self
            .lock()
            .contests
            .iter()
            .filter(|contest| ids.contains(&contest.id))
            .cloned()
            .collect();
        contests.sort_by(|a, b| b.time_start.cmp(&a.time_start));
        Ok(contests)
    }

    async fn find_contest(&self, id: &ContestId) -> Result<ContestRecord, StoreError> {
        self.lock()
            .contests
            .iter()
            .find(|contest| contest.id == *id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("contest"))
    }

    async fn create_contest(&self, record: &ContestRecord) -> Result<(), StoreError> {
        self.lock().contests.push(record.clone());
        Ok(())
    }

    async fn update_contest(&self, record: &ContestRecord) -> Result<(), StoreError> {
        let mut tables = self.lock();
        let slot = tables
            .contests
            .iter_mut()
            .find(|contest| contest.id == record.id)
            .ok_or_else(|| StoreError::not_found("contest"))?;
        *slot = record.clone();
        Ok(())
    }

    async fn delete_contest(&self, id: &ContestId) -> Result<(), StoreError> {
        let mut tables = self.lock();
        let before = tables.contests.len();
        tables.contests.retain(|contest| contest.id != *id);
        if tables.contests.len() == before {
            return Err(StoreError::not_found("contest"));
        }
        let removed: Vec<ContestTeamId> = tables
            .teams
            .iter()
            .filter(|team| team.contest_id == *id)
            .map(|team| team.id)
            .collect();
        tables.teams.retain(|team| team.contest_id != *id);
        tables
            .team_members
            .retain(|(team, _)| !removed.contains(team));
        Ok(())
    }

    async fn list_teams(
        &self,
        contest_id: &ContestId,
    ) -> Result<Vec<ContestTeamRecord>, StoreError> {
        let mut teams: Vec<ContestTeamRecord> = self
            .lock()
            .teams
            .iter()
            .filter(|team| team.contest_id == *contest_id)
            .cloned()
            .collect();
        teams.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(teams)
    }

    async fn find_team(
        &self,
        contest_id: &ContestId,
        team_id: &ContestTeamId,
    ) -> Result<ContestTeamRecord, StoreError> {
        self.lock()
            .teams
            .iter()
            .find(|team| team.id == *team_id && team.contest_id == *contest_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("contest team"))
    }

    async fn create_team(&self, record: &ContestTeamRecord) -> Result<(), StoreError> {
        let mut tables = self.lock();
        if !tables
            .contests
            .iter()
            .any(|contest| contest.id == record.contest_id)
        {
            return Err(StoreError::not_found("contest"));
        }
        tables.teams.push(record.clone());
        Ok(())
    }

    async fn update_team(&self, record: &ContestTeamRecord) -> Result<(), StoreError> {
        let mut tables = self.lock();
        let slot = tables
            .teams
            .iter_mut()
            .find(|team| team.id == record.id && team.contest_id == record.contest_id)
            .ok_or_else(|| StoreError::not_found("contest team"))?;
        *slot = record.clone();
        Ok(())
    }

    async fn delete_team(
        &self,
        contest_id: &ContestId,
        team_id: &ContestTeamId,
    ) -> Result<(), StoreError> {
        let mut tables = self.lock();
        let before = tables.teams.len();
        tables
            .teams
            .retain(|team| !(team.id == *team_id && team.contest_id == *contest_id));
        if tables.teams.len() == before {
            return Err(StoreError::not_found("contest team"));
        }
        tables.team_members.retain(|(team, _)| team != team_id);
        Ok(())
    }

    async fn list_team_members(
        &self,
        contest_id: &ContestId,
        team_id: &ContestTeamId,
    ) -> Result<Vec<UserId>, StoreError> {
        let tables = self.lock();
        tables.require_team(contest_id, team_id)?;
        Ok(sorted_by_user(members_of(&tables.team_members, team_id)))
    }

    async fn sync_team_members(
        &self,
        contest_id: &ContestId,
        team_id: &ContestTeamId,
        request: MemberSync<UserId>,
    ) -> Result<MembershipChange, StoreError> {
        let mut tables = self.lock();
        tables.require_team(contest_id, team_id)?;
        let existing = members_of(&tables.team_members, team_id);
        let diff = request.plan(&existing);
        tables.require_users(&diff.inserts)?;
        let change = diff.change();
        apply_diff(&mut tables.team_members, *team_id, diff);
        Ok(change)
    }

    async fn list_user_teams(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ContestTeamRecord>, StoreError> {
        let tables = self.lock();
        let mut teams: Vec<ContestTeamRecord> = tables
            .teams
            .iter()
            .filter(|team| {
                tables
                    .team_members
                    .iter()
                    .any(|(member_team, member)| *member_team == team.id && member == user_id)
            })
            .cloned()
            .collect();
        teams.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(teams)
    }
}

#[async_trait]
impl GroupStore for MemoryStore {
    async fn list_groups(&self) -> Result<Vec<GroupRecord>, StoreError> {
        let mut groups = self.lock().groups.clone();
        groups.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(groups)
    }

    async fn find_group(&self, id: &GroupId) -> Result<GroupRecord, StoreError> {
        self.lock()
            .groups
            .iter()
            .find(|group| group.id == *id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("group"))
    }

    async fn create_group(&self, record: &GroupRecord) -> Result<(), StoreError> {
        let mut tables = self.lock();
        tables.require_user(&record.leader)?;
        tables.groups.push(record.clone());
        Ok(())
    }

    async fn update_group(&self, record: &GroupRecord) -> Result<(), StoreError> {
        let mut tables = self.lock();
        tables.require_user(&record.leader)?;
        let slot = tables
            .groups
            .iter_mut()
            .find(|group| group.id == record.id)
            .ok_or_else(|| StoreError::not_found("group"))?;
        *slot = record.clone();
        Ok(())
    }

    async fn delete_group(&self, id: &GroupId) -> Result<(), StoreError> {
        let mut tables = self.lock();
        let before = tables.groups.len();
        tables.groups.retain(|group| group.id != *id);
        if tables.groups.len() == before {
            return Err(StoreError::not_found("group"));
        }
        tables.group_members.retain(|(group, _)| group != id);
        Ok(())
    }

    async fn list_group_members(
        &self,
        id: &GroupId,
    ) -> Result<Vec<GroupMemberRecord>, StoreError> {
        Ok(sorted_by_user(members_of(&self.lock().group_members, id)))
    }

    async fn sync_group_members(
        &self,
        id: &GroupId,
        request: MemberSync<GroupMemberRecord>,
    ) -> Result<MembershipChange, StoreError> {
        let mut tables = self.lock();
        if !tables.groups.iter().any(|group| group.id == *id) {
            return Err(StoreError::not_found("group"));
        }
        let existing = members_of(&tables.group_members, id);
        let diff = request.plan(&existing);
        tables.require_users(&diff.inserts)?;
        let change = diff.change();
        apply_diff(&mut tables.group_members, *id, diff);
        Ok(change)
    }

    async fn list_user_groups(&self, user_id: &UserId) -> Result<Vec<UserGroup>, StoreError> {
        let tables = self.lock();
        let mut groups: Vec<UserGroup> = tables
            .group_members
            .iter()
            .filter(|(_, member)| member.user_id == *user_id)
            .filter_map(|(group_id, member)| {
                tables
                    .groups
                    .iter()
                    .find(|group| group.id == *group_id)
                    .map(|group| UserGroup {
                        group: group.summary(),
                        user_duration: member.duration,
                    })
            })
            .collect();
        groups.sort_by(|a, b| a.group.name.cmp(&b.group.name));
        Ok(groups)
    }
}

#[async_trait]
impl EventLevelStore for MemoryStore {
    async fn find_level(&self, id: &EventId) -> Result<EventLevelRecord, StoreError> {
        self.lock()
            .event_levels
            .iter()
            .find(|record| record.event_id == *id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("event level"))
    }

    async fn find_levels(&self, ids: &[EventId]) -> Result<Vec<EventLevelRecord>, StoreError> {
        Ok(self
            .lock()
            .event_levels
            .iter()
            .filter(|record| ids.contains(&record.event_id))
            .cloned()
            .collect())
    }

    async fn create_level(&self, id: &EventId, level: EventLevel) -> Result<(), StoreError> {
        let now = self.clock.utc();
        let mut tables = self.lock();
        if tables.event_levels.iter().any(|record| record.event_id == *id) {
            return Err(StoreError::conflict(format!("event {id} already has a level")));
        }
        tables.event_levels.push(EventLevelRecord {
            event_id: *id,
            level,
            updated_at: now,
        });
        Ok(())
    }

    async fn update_level(
        &self,
        id: &EventId,
        level: EventLevel,
    ) -> Result<LevelUpdate, StoreError> {
        let now = self.clock.utc();
        let mut tables = self.lock();
        let record = tables
            .event_levels
            .iter_mut()
            .find(|record| record.event_id == *id)
            .ok_or_else(|| StoreError::not_found("event level"))?;
        if record.level == level {
            return Ok(LevelUpdate::Unchanged);
        }
        record.level = level;
        record.updated_at = now;
        Ok(LevelUpdate::Updated)
    }
}
