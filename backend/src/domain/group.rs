//! Group aggregate: a named circle with a leader and dated members.

use serde::{Deserialize, Serialize};

use super::{Error, GroupId, Member, User, UserId, YearWithSemesterDuration};

/// Group summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: GroupId,
    pub name: String,
}

/// Group member resolved to its user view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMember {
    #[serde(flatten)]
    pub user: User,
    pub duration: YearWithSemesterDuration,
}

/// Group with leader and members resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDetail {
    #[serde(flatten)]
    pub group: Group,
    pub link: String,
    pub description: String,
    pub leader: User,
    pub members: Vec<GroupMember>,
}

/// Group a user belongs to, with the user's own membership span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserGroup {
    #[serde(flatten)]
    pub group: Group,
    pub user_duration: YearWithSemesterDuration,
}

/// Persisted group row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRecord {
    pub id: GroupId,
    pub name: String,
    pub link: String,
    pub description: String,
    pub leader: UserId,
}

impl GroupRecord {
    pub fn summary(&self) -> Group {
        Group {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

/// Persisted membership row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupMemberRecord {
    pub user_id: UserId,
    pub duration: YearWithSemesterDuration,
}

impl Member for GroupMemberRecord {
    fn user_id(&self) -> UserId {
        self.user_id
    }

    fn differs_from(&self, persisted: &Self) -> bool {
        self.duration != persisted.duration
    }
}

/// Arguments for creating a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateGroupArgs {
    pub name: String,
    pub link: String,
    pub description: String,
    pub leader: UserId,
}

impl CreateGroupArgs {
    pub fn validate(&self) -> Result<(), Error> {
        if self.name.trim().is_empty() {
            return Err(Error::invalid_argument("group name must not be empty"));
        }
        Ok(())
    }

    pub fn into_record(self, id: GroupId) -> GroupRecord {
        GroupRecord {
            id,
            name: self.name,
            link: self.link,
            description: self.description,
            leader: self.leader,
        }
    }
}

/// Partial group update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateGroupArgs {
    pub name: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub leader: Option<UserId>,
}

impl UpdateGroupArgs {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.link.is_none()
            && self.description.is_none()
            && self.leader.is_none()
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self
            .name
            .as_deref()
            .is_some_and(|name| name.trim().is_empty())
        {
            return Err(Error::invalid_argument("group name must not be empty"));
        }
        Ok(())
    }

    pub fn apply(&self, current: &GroupRecord) -> GroupRecord {
        GroupRecord {
            id: current.id,
            name: self.name.clone().unwrap_or_else(|| current.name.clone()),
            link: self.link.clone().unwrap_or_else(|| current.link.clone()),
            description: self
                .description
                .clone()
                .unwrap_or_else(|| current.description.clone()),
            leader: self.leader.unwrap_or(current.leader),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn apply_replaces_only_given_fields() {
        let current = GroupRecord {
            id: GroupId::random(),
            name: "infra".to_owned(),
            link: "https://example.org/infra".to_owned(),
            description: "keeps the lights on".to_owned(),
            leader: UserId::random(),
        };
        let next_leader = UserId::random();
        let patched = UpdateGroupArgs {
            leader: Some(next_leader),
            ..UpdateGroupArgs::default()
        }
        .apply(&current);
        assert_eq!(patched.leader, next_leader);
        assert_eq!(patched.name, current.name);
        assert_eq!(patched.link, current.link);
    }

    #[rstest]
    #[case(Some(""), true)]
    #[case(Some("ops"), false)]
    #[case(None, false)]
    fn blank_names_are_rejected(#[case] name: Option<&str>, #[case] rejected: bool) {
        let args = UpdateGroupArgs {
            name: name.map(str::to_owned),
            ..UpdateGroupArgs::default()
        };
        assert_eq!(args.validate().is_err(), rejected);
    }
}
