//! Project aggregate and its dated memberships.

use serde::{Deserialize, Serialize};

use super::ports::StoreError;
use super::{
    Error, Member, ProjectId, User, UserId, YearWithSemester, YearWithSemesterDuration,
};

/// Project summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub duration: YearWithSemesterDuration,
}

/// A project member resolved to its user view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMember {
    #[serde(flatten)]
    pub user: User,
    pub duration: YearWithSemesterDuration,
}

/// Project with description, link and resolved members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    pub description: String,
    pub link: String,
    pub members: Vec<ProjectMember>,
}

/// Project the user belongs to, with the user's own participation span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProject {
    #[serde(flatten)]
    pub project: Project,
    pub user_duration: YearWithSemesterDuration,
}

/// Persisted project row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRecord {
    pub id: ProjectId,
    pub name: String,
    pub description: String,
    pub link: String,
    pub duration: YearWithSemesterDuration,
}

impl ProjectRecord {
    pub fn summary(&self) -> Project {
        Project {
            id: self.id,
            name: self.name.clone(),
            duration: self.duration,
        }
    }
}

/// Persisted membership row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectMemberRecord {
    pub user_id: UserId,
    pub duration: YearWithSemesterDuration,
}

impl Member for ProjectMemberRecord {
    fn user_id(&self) -> UserId {
        self.user_id
    }

    fn differs_from(&self, persisted: &Self) -> bool {
        self.duration != persisted.duration
    }
}

/// Arguments for creating a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProjectArgs {
    pub name: String,
    pub description: String,
    pub link: String,
    pub duration: YearWithSemesterDuration,
}

impl CreateProjectArgs {
    pub fn validate(&self) -> Result<(), Error> {
        if self.name.trim().is_empty() {
            return Err(Error::invalid_argument("project name must not be empty"));
        }
        Ok(())
    }

    /// Row to insert under the given fresh identifier.
    pub fn into_record(self, id: ProjectId) -> ProjectRecord {
        ProjectRecord {
            id,
            name: self.name,
            description: self.description,
            link: self.link,
            duration: self.duration,
        }
    }
}

/// Partial project update.
///
/// `until: Some(None)` reopens the project; `until: None` leaves it alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateProjectArgs {
    pub name: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub since: Option<YearWithSemester>,
    pub until: Option<Option<YearWithSemester>>,
}

impl UpdateProjectArgs {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.link.is_none()
            && self.since.is_none()
            && self.until.is_none()
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self
            .name
            .as_deref()
            .is_some_and(|name| name.trim().is_empty())
        {
            return Err(Error::invalid_argument("project name must not be empty"));
        }
        if let (Some(since), Some(Some(until))) = (self.since, self.until) {
            YearWithSemesterDuration::new(since, Some(until))
                .map_err(|err| Error::invalid_argument(err.to_string()))?;
        }
        Ok(())
    }

    /// Apply the patch to `current`, rejecting a resulting duration that
    /// ends before it starts.
    pub fn apply(&self, current: &ProjectRecord) -> Result<ProjectRecord, Error> {
        let since = self.since.unwrap_or(current.duration.since());
        let until = self.until.unwrap_or(current.duration.until());
        let duration = YearWithSemesterDuration::new(since, until)
            .map_err(|err| Error::invalid_argument(err.to_string()))?;
        Ok(ProjectRecord {
            id: current.id,
            name: self.name.clone().unwrap_or_else(|| current.name.clone()),
            description: self
                .description
                .clone()
                .unwrap_or_else(|| current.description.clone()),
            link: self.link.clone().unwrap_or_else(|| current.link.clone()),
            duration,
        })
    }
}

/// Check every member span lies within the project span.
///
/// Stores call this against the project row they read inside the writing
/// transaction, so a concurrent project update cannot slip between the
/// check and the write.
pub fn check_member_spans(
    project: &YearWithSemesterDuration,
    members: &[ProjectMemberRecord],
) -> Result<(), StoreError> {
    match members
        .iter()
        .find(|member| !project.contains(&member.duration))
    {
        Some(member) => Err(StoreError::rejected(format!(
            "member {} duration lies outside the project duration",
            member.user_id
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorCode, Semester};
    use rstest::{fixture, rstest};

    fn term(year: i32, semester: Semester) -> YearWithSemester {
        YearWithSemester::new(year, semester)
    }

    #[fixture]
    fn record() -> ProjectRecord {
        ProjectRecord {
            id: ProjectId::random(),
            name: "compiler".to_owned(),
            description: "toy compiler".to_owned(),
            link: "https://example.org/compiler".to_owned(),
            duration: YearWithSemesterDuration::new(
                term(2022, Semester::FIRST),
                Some(term(2023, Semester::FIRST)),
            )
            .expect("valid"),
        }
    }

    #[rstest]
    fn apply_keeps_absent_fields(record: ProjectRecord) {
        let patched = UpdateProjectArgs {
            description: Some("optimising compiler".to_owned()),
            ..UpdateProjectArgs::default()
        }
        .apply(&record)
        .expect("patch applies");
        assert_eq!(patched.name, record.name);
        assert_eq!(patched.description, "optimising compiler");
        assert_eq!(patched.duration, record.duration);
    }

    #[rstest]
    fn apply_can_reopen_a_project(record: ProjectRecord) {
        let patched = UpdateProjectArgs {
            until: Some(None),
            ..UpdateProjectArgs::default()
        }
        .apply(&record)
        .expect("patch applies");
        assert_eq!(patched.duration.until(), None);
    }

    #[rstest]
    fn apply_rejects_since_after_existing_until(record: ProjectRecord) {
        let err = UpdateProjectArgs {
            since: Some(term(2024, Semester::FIRST)),
            ..UpdateProjectArgs::default()
        }
        .apply(&record)
        .expect_err("since after until");
        assert_eq!(err.code(), ErrorCode::InvalidArgument);
    }

    #[rstest]
    fn members_must_fit_inside_project(record: ProjectRecord) {
        let inside = ProjectMemberRecord {
            user_id: UserId::random(),
            duration: YearWithSemesterDuration::new(
                term(2022, Semester::SECOND),
                Some(term(2022, Semester::SECOND)),
            )
            .expect("valid"),
        };
        let outside = ProjectMemberRecord {
            user_id: UserId::random(),
            duration: YearWithSemesterDuration::new(term(2022, Semester::SECOND), None)
                .expect("valid"),
        };
        assert!(check_member_spans(&record.duration, &[inside]).is_ok());
        let err = check_member_spans(&record.duration, &[inside, outside])
            .expect_err("open-ended member in a closed project");
        assert!(matches!(err, StoreError::Rejected { .. }));
    }

    #[rstest]
    fn shrinking_below_an_existing_member_is_rejected(record: ProjectRecord) {
        let member = ProjectMemberRecord {
            user_id: UserId::random(),
            duration: YearWithSemesterDuration::new(
                term(2023, Semester::FIRST),
                Some(term(2023, Semester::FIRST)),
            )
            .expect("valid"),
        };
        let shrunk = UpdateProjectArgs {
            until: Some(Some(term(2022, Semester::FIRST))),
            ..UpdateProjectArgs::default()
        }
        .apply(&record)
        .expect("shrunk span is itself valid");
        assert!(check_member_spans(&shrunk.duration, &[member]).is_err());
    }

    #[rstest]
    fn member_update_detected_on_duration_change(record: ProjectRecord) {
        let user_id = UserId::random();
        let persisted = ProjectMemberRecord {
            user_id,
            duration: record.duration,
        };
        let same = persisted;
        let changed = ProjectMemberRecord {
            user_id,
            duration: YearWithSemesterDuration::new(term(2022, Semester::FIRST), None)
                .expect("valid"),
        };
        assert!(!same.differs_from(&persisted));
        assert!(changed.differs_from(&persisted));
    }
}
