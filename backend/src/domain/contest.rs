//! Contest aggregate: contests own teams, teams own member users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ContestId, ContestTeamId, Error, User};

/// Contest summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contest {
    pub id: ContestId,
    pub name: String,
    pub time_start: DateTime<Utc>,
    pub time_end: Option<DateTime<Utc>>,
}

/// Team summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestTeam {
    pub id: ContestTeamId,
    pub name: String,
    pub result: String,
}

/// Team with its resolved members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestTeamDetail {
    #[serde(flatten)]
    pub team: ContestTeam,
    pub link: String,
    pub description: String,
    pub members: Vec<User>,
}

/// Contest with description, link and team summaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestDetail {
    #[serde(flatten)]
    pub contest: Contest,
    pub description: String,
    pub link: String,
    pub teams: Vec<ContestTeam>,
}

/// A contest together with the teams a given user entered it with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserContest {
    #[serde(flatten)]
    pub contest: Contest,
    pub teams: Vec<ContestTeam>,
}

/// Persisted contest row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContestRecord {
    pub id: ContestId,
    pub name: String,
    pub description: String,
    pub link: String,
    pub time_start: DateTime<Utc>,
    pub time_end: Option<DateTime<Utc>>,
}

impl ContestRecord {
    pub fn summary(&self) -> Contest {
        Contest {
            id: self.id,
            name: self.name.clone(),
            time_start: self.time_start,
            time_end: self.time_end,
        }
    }
}

/// Persisted team row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContestTeamRecord {
    pub id: ContestTeamId,
    pub contest_id: ContestId,
    pub name: String,
    pub result: String,
    pub link: String,
    pub description: String,
}

impl ContestTeamRecord {
    pub fn summary(&self) -> ContestTeam {
        ContestTeam {
            id: self.id,
            name: self.name.clone(),
            result: self.result.clone(),
        }
    }
}

fn ensure_time_order(
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
) -> Result<(), Error> {
    match end {
        Some(end) if end < start => Err(Error::invalid_argument(format!(
            "contest end {end} precedes start {start}"
        ))),
        _ => Ok(()),
    }
}

fn ensure_named(name: &str, what: &str) -> Result<(), Error> {
    if name.trim().is_empty() {
        return Err(Error::invalid_argument(format!(
            "{what} name must not be empty"
        )));
    }
    Ok(())
}

/// Arguments for creating a contest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateContestArgs {
    pub name: String,
    pub description: String,
    pub link: String,
    pub time_start: DateTime<Utc>,
    pub time_end: Option<DateTime<Utc>>,
}

impl CreateContestArgs {
    pub fn validate(&self) -> Result<(), Error> {
        ensure_named(&self.name, "contest")?;
        ensure_time_order(self.time_start, self.time_end)
    }

    pub fn into_record(self, id: ContestId) -> ContestRecord {
        ContestRecord {
            id,
            name: self.name,
            description: self.description,
            link: self.link,
            time_start: self.time_start,
            time_end: self.time_end,
        }
    }
}

/// Partial contest update. `time_end: Some(None)` clears the end time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateContestArgs {
    pub name: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub time_start: Option<DateTime<Utc>>,
    pub time_end: Option<Option<DateTime<Utc>>>,
}

impl UpdateContestArgs {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.link.is_none()
            && self.time_start.is_none()
            && self.time_end.is_none()
    }

    pub fn validate(&self) -> Result<(), Error> {
        if let Some(name) = self.name.as_deref() {
            ensure_named(name, "contest")?;
        }
        if let (Some(start), Some(end)) = (self.time_start, self.time_end) {
            ensure_time_order(start, end)?;
        }
        Ok(())
    }

    pub fn apply(&self, current: &ContestRecord) -> Result<ContestRecord, Error> {
        let time_start = self.time_start.unwrap_or(current.time_start);
        let time_end = self.time_end.unwrap_or(current.time_end);
        ensure_time_order(time_start, time_end)?;
        Ok(ContestRecord {
            id: current.id,
            name: self.name.clone().unwrap_or_else(|| current.name.clone()),
            description: self
                .description
                .clone()
                .unwrap_or_else(|| current.description.clone()),
            link: self.link.clone().unwrap_or_else(|| current.link.clone()),
            time_start,
            time_end,
        })
    }
}

/// Arguments for entering a team into a contest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateContestTeamArgs {
    pub name: String,
    pub result: String,
    pub link: String,
    pub description: String,
}

impl CreateContestTeamArgs {
    pub fn validate(&self) -> Result<(), Error> {
        ensure_named(&self.name, "team")
    }

    pub fn into_record(self, id: ContestTeamId, contest_id: ContestId) -> ContestTeamRecord {
        ContestTeamRecord {
            id,
            contest_id,
            name: self.name,
            result: self.result,
            link: self.link,
            description: self.description,
        }
    }
}

/// Partial team update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateContestTeamArgs {
    pub name: Option<String>,
    pub result: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
}

impl UpdateContestTeamArgs {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.result.is_none()
            && self.link.is_none()
            && self.description.is_none()
    }

    pub fn validate(&self) -> Result<(), Error> {
        match self.name.as_deref() {
            Some(name) => ensure_named(name, "team"),
            None => Ok(()),
        }
    }

    pub fn apply(&self, current: &ContestTeamRecord) -> ContestTeamRecord {
        ContestTeamRecord {
            id: current.id,
            contest_id: current.contest_id,
            name: self.name.clone().unwrap_or_else(|| current.name.clone()),
            result: self.result.clone().unwrap_or_else(|| current.result.clone()),
            link: self.link.clone().unwrap_or_else(|| current.link.clone()),
            description: self
                .description
                .clone()
                .unwrap_or_else(|| current.description.clone()),
        }
    }
}
