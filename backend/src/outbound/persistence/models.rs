//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions into domain records validate
//! the stored codes and durations and report failures as plain strings for
//! [`super::diesel_error_mapping::corrupt_row`].

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{
    accounts, contest_team_user_belongings, contest_teams, contests, event_levels,
    group_user_belongings, groups, project_members, projects, users,
};
use crate::domain::{
    Account, AccountId, AccountType, ContestId, ContestRecord, ContestTeamId, ContestTeamRecord,
    EventId, EventLevel, EventLevelRecord, GroupId, GroupMemberRecord, GroupRecord, ProjectId,
    ProjectMemberRecord, ProjectRecord, UserId, UserRecord, YearWithSemester,
    YearWithSemesterDuration,
};

// ---------------------------------------------------------------------------
// Duration columns
// ---------------------------------------------------------------------------

type DurationColumns = (i32, i16, Option<i32>, Option<i16>);

fn duration_from_columns(
    (since_year, since_semester, until_year, until_semester): DurationColumns,
) -> Result<YearWithSemesterDuration, String> {
    let since =
        YearWithSemester::from_parts(since_year, since_semester).map_err(|err| err.to_string())?;
    let until = match (until_year, until_semester) {
        (Some(year), Some(semester)) => {
            Some(YearWithSemester::from_parts(year, semester).map_err(|err| err.to_string())?)
        }
        (None, None) => None,
        _ => return Err("until year and semester must both be set or both be null".to_owned()),
    };
    YearWithSemesterDuration::new(since, until).map_err(|err| err.to_string())
}

fn duration_columns(duration: &YearWithSemesterDuration) -> DurationColumns {
    let since = duration.since();
    let until = duration.until();
    (
        since.year,
        i16::from(since.semester.code()),
        until.map(|term| term.year),
        until.map(|term| i16::from(term.semester.code())),
    )
}

// ---------------------------------------------------------------------------
// Users and accounts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub bio: String,
    pub check_flag: bool,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::from_uuid(row.id),
            name: row.name,
            bio: row.bio,
            check: row.check_flag,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub bio: &'a str,
    pub check_flag: bool,
}

impl<'a> From<&'a UserRecord> for NewUserRow<'a> {
    fn from(record: &'a UserRecord) -> Self {
        Self {
            id: *record.id.as_uuid(),
            name: &record.name,
            bio: &record.bio,
            check_flag: record.check,
        }
    }
}

/// Partial update of the locally owned user fields.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserUpdate<'a> {
    pub bio: Option<&'a str>,
    pub check_flag: Option<bool>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AccountRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub account_type: i16,
    pub display_name: String,
    pub url: String,
    pub pr_permitted: bool,
}

impl AccountRow {
    pub(crate) fn new(user_id: &UserId, account: &Account) -> Self {
        Self {
            id: *account.id.as_uuid(),
            user_id: *user_id.as_uuid(),
            account_type: account.account_type.code(),
            display_name: account.display_name.clone(),
            url: account.url.clone(),
            pr_permitted: account.pr_permitted,
        }
    }
}

impl TryFrom<AccountRow> for Account {
    type Error = String;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let account_type =
            AccountType::from_code(i64::from(row.account_type)).map_err(|err| err.to_string())?;
        Ok(Self {
            id: AccountId::from_uuid(row.id),
            account_type,
            display_name: row.display_name,
            url: row.url,
            pr_permitted: row.pr_permitted,
        })
    }
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = projects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ProjectRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub link: String,
    pub since_year: i32,
    pub since_semester: i16,
    pub until_year: Option<i32>,
    pub until_semester: Option<i16>,
}

impl From<&ProjectRecord> for ProjectRow {
    fn from(record: &ProjectRecord) -> Self {
        let (since_year, since_semester, until_year, until_semester) =
            duration_columns(&record.duration);
        Self {
            id: *record.id.as_uuid(),
            name: record.name.clone(),
            description: record.description.clone(),
            link: record.link.clone(),
            since_year,
            since_semester,
            until_year,
            until_semester,
        }
    }
}

impl TryFrom<ProjectRow> for ProjectRecord {
    type Error = String;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        let duration = duration_from_columns((
            row.since_year,
            row.since_semester,
            row.until_year,
            row.until_semester,
        ))?;
        Ok(Self {
            id: ProjectId::from_uuid(row.id),
            name: row.name,
            description: row.description,
            link: row.link,
            duration,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = project_members)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProjectMemberRow {
    pub project_id: Uuid,
    pub user_id: Uuid,
    pub since_year: i32,
    pub since_semester: i16,
    pub until_year: Option<i32>,
    pub until_semester: Option<i16>,
}

impl ProjectMemberRow {
    pub(crate) fn new(project_id: &ProjectId, member: &ProjectMemberRecord) -> Self {
        let (since_year, since_semester, until_year, until_semester) =
            duration_columns(&member.duration);
        Self {
            project_id: *project_id.as_uuid(),
            user_id: *member.user_id.as_uuid(),
            since_year,
            since_semester,
            until_year,
            until_semester,
        }
    }
}

impl TryFrom<ProjectMemberRow> for ProjectMemberRecord {
    type Error = String;

    fn try_from(row: ProjectMemberRow) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: UserId::from_uuid(row.user_id),
            duration: duration_from_columns((
                row.since_year,
                row.since_semester,
                row.until_year,
                row.until_semester,
            ))?,
        })
    }
}

// ---------------------------------------------------------------------------
// Contests and teams
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = contests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ContestRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub link: String,
    pub time_start: DateTime<Utc>,
    pub time_end: Option<DateTime<Utc>>,
}

impl From<&ContestRecord> for ContestRow {
    fn from(record: &ContestRecord) -> Self {
        Self {
            id: *record.id.as_uuid(),
            name: record.name.clone(),
            description: record.description.clone(),
            link: record.link.clone(),
            time_start: record.time_start,
            time_end: record.time_end,
        }
    }
}

impl From<ContestRow> for ContestRecord {
    fn from(row: ContestRow) -> Self {
        Self {
            id: ContestId::from_uuid(row.id),
            name: row.name,
            description: row.description,
            link: row.link,
            time_start: row.time_start,
            time_end: row.time_end,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = contest_teams)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ContestTeamRow {
    pub id: Uuid,
    pub contest_id: Uuid,
    pub name: String,
    pub result: String,
    pub link: String,
    pub description: String,
}

impl From<&ContestTeamRecord> for ContestTeamRow {
    fn from(record: &ContestTeamRecord) -> Self {
        Self {
            id: *record.id.as_uuid(),
            contest_id: *record.contest_id.as_uuid(),
            name: record.name.clone(),
            result: record.result.clone(),
            link: record.link.clone(),
            description: record.description.clone(),
        }
    }
}

impl From<ContestTeamRow> for ContestTeamRecord {
    fn from(row: ContestTeamRow) -> Self {
        Self {
            id: ContestTeamId::from_uuid(row.id),
            contest_id: ContestId::from_uuid(row.contest_id),
            name: row.name,
            result: row.result,
            link: row.link,
            description: row.description,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = contest_team_user_belongings)]
pub(crate) struct NewTeamMemberRow {
    pub team_id: Uuid,
    pub user_id: Uuid,
}

// ---------------------------------------------------------------------------
// Groups
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = groups)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct GroupRow {
    pub id: Uuid,
    pub name: String,
    pub link: String,
    pub description: String,
    pub leader: Uuid,
}

impl From<&GroupRecord> for GroupRow {
    fn from(record: &GroupRecord) -> Self {
        Self {
            id: *record.id.as_uuid(),
            name: record.name.clone(),
            link: record.link.clone(),
            description: record.description.clone(),
            leader: *record.leader.as_uuid(),
        }
    }
}

impl From<GroupRow> for GroupRecord {
    fn from(row: GroupRow) -> Self {
        Self {
            id: GroupId::from_uuid(row.id),
            name: row.name,
            link: row.link,
            description: row.description,
            leader: UserId::from_uuid(row.leader),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = group_user_belongings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct GroupMemberRow {
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub since_year: i32,
    pub since_semester: i16,
    pub until_year: Option<i32>,
    pub until_semester: Option<i16>,
}

impl GroupMemberRow {
    pub(crate) fn new(group_id: &GroupId, member: &GroupMemberRecord) -> Self {
        let (since_year, since_semester, until_year, until_semester) =
            duration_columns(&member.duration);
        Self {
            group_id: *group_id.as_uuid(),
            user_id: *member.user_id.as_uuid(),
            since_year,
            since_semester,
            until_year,
            until_semester,
        }
    }
}

impl TryFrom<GroupMemberRow> for GroupMemberRecord {
    type Error = String;

    fn try_from(row: GroupMemberRow) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: UserId::from_uuid(row.user_id),
            duration: duration_from_columns((
                row.since_year,
                row.since_semester,
                row.until_year,
                row.until_semester,
            ))?,
        })
    }
}

// ---------------------------------------------------------------------------
// Event levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = event_levels)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct EventLevelRow {
    pub event_id: Uuid,
    pub level: i16,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<EventLevelRow> for EventLevelRecord {
    type Error = String;

    fn try_from(row: EventLevelRow) -> Result<Self, Self::Error> {
        let level = EventLevel::from_code(row.level)
            .ok_or_else(|| format!("unknown event level code {}", row.level))?;
        Ok(Self {
            event_id: EventId::from_uuid(row.event_id),
            level,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = event_levels)]
pub(crate) struct NewEventLevelRow {
    pub event_id: Uuid,
    pub level: i16,
}
