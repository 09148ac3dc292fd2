//! User aggregate: a local row merged with presence and directory records.

use serde::{Deserialize, Serialize};

use super::{Account, UserId};

/// Account state as reported by the presence service.
///
/// Suspended accounts are how the presence service represents deleted
/// members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserState {
    Deactivated,
    Active,
    Suspended,
}

impl UserState {
    /// Decode the presence service's numeric state code.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Deactivated),
            1 => Some(Self::Active),
            2 => Some(Self::Suspended),
            _ => None,
        }
    }

    pub const fn code(self) -> i64 {
        match self {
            Self::Deactivated => 0,
            Self::Active => 1,
            Self::Suspended => 2,
        }
    }
}

/// Merged user view.
///
/// `name` comes from the presence service and `real_name` from the directory;
/// `check` is the local flag controlling whether the real name may be shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub real_name: String,
    pub check: bool,
}

/// Full user profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,
    pub state: UserState,
    pub bio: String,
    pub accounts: Vec<Account>,
}

/// Locally persisted part of a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: UserId,
    pub name: String,
    pub bio: String,
    pub check: bool,
}

impl UserRecord {
    /// Combine the local row with a real name resolved from the directory.
    pub fn into_user(self, real_name: impl Into<String>) -> User {
        User {
            id: self.id,
            name: self.name,
            real_name: real_name.into(),
            check: self.check,
        }
    }
}

/// Filter accepted by `get_users`. At most one field may be set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetUsersArgs {
    pub include_suspended: Option<bool>,
    pub name: Option<String>,
}

/// Arguments for registering a user locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateUserArgs {
    pub name: String,
    pub bio: String,
    pub check: bool,
}

/// Partial update of the locally owned user fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateUserArgs {
    pub bio: Option<String>,
    pub check: Option<bool>,
}

impl UpdateUserArgs {
    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.bio.is_none() && self.check.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, Some(UserState::Deactivated))]
    #[case(1, Some(UserState::Active))]
    #[case(2, Some(UserState::Suspended))]
    #[case(3, None)]
    fn state_codes_decode(#[case] code: i64, #[case] expected: Option<UserState>) {
        assert_eq!(UserState::from_code(code), expected);
    }

    #[rstest]
    fn detail_flattens_user_fields() {
        let id = UserId::random();
        let detail = UserDetail {
            user: User {
                id,
                name: "alice".to_owned(),
                real_name: "Alice Liddell".to_owned(),
                check: true,
            },
            state: UserState::Active,
            bio: String::new(),
            accounts: Vec::new(),
        };
        let value = serde_json::to_value(&detail).expect("serialise");
        assert_eq!(value["name"], "alice");
        assert_eq!(value["realName"], "Alice Liddell");
        assert_eq!(value["state"], "active");
    }

    #[rstest]
    fn empty_update_is_detected() {
        assert!(UpdateUserArgs::default().is_empty());
        assert!(
            !UpdateUserArgs {
                check: Some(false),
                ..UpdateUserArgs::default()
            }
            .is_empty()
        );
    }
}
