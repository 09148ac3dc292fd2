//! Driven port for the presence service, the authority on user names and
//! account state.

use async_trait::async_trait;

use crate::domain::{UserId, UserState};

use super::SourceError;

/// User record as reported by the presence service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceUser {
    pub id: UserId,
    /// Handle used as the join key into the directory.
    pub name: String,
    pub display_name: String,
    pub state: UserState,
    pub bot: bool,
}

/// Listing filter in the presence service's native query shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresenceUserQuery {
    pub include_suspended: Option<bool>,
    pub name: Option<String>,
}

impl PresenceUserQuery {
    /// Whether `user` passes this filter.
    ///
    /// Suspended users are hidden unless explicitly included.
    pub fn matches(&self, user: &PresenceUser) -> bool {
        if user.state == UserState::Suspended && self.include_suspended != Some(true) {
            return false;
        }
        self.name
            .as_deref()
            .is_none_or(|name| user.name == name)
    }
}

/// Port for reading users from the presence service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PresenceSource: Send + Sync {
    /// List users matching `query`, in the service's order.
    async fn list_users(&self, query: &PresenceUserQuery)
    -> Result<Vec<PresenceUser>, SourceError>;

    /// Fetch one user by identifier.
    async fn get_user(&self, id: &UserId) -> Result<PresenceUser, SourceError>;
}

/// Fixture implementation serving a fixed roster.
#[derive(Debug, Clone, Default)]
pub struct FixturePresenceSource {
    users: Vec<PresenceUser>,
}

impl FixturePresenceSource {
    pub fn new(users: Vec<PresenceUser>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl PresenceSource for FixturePresenceSource {
    async fn list_users(
        &self,
        query: &PresenceUserQuery,
    ) -> Result<Vec<PresenceUser>, SourceError> {
        Ok(self
            .users
            .iter()
            .filter(|user| query.matches(user))
            .cloned()
            .collect())
    }

    async fn get_user(&self, id: &UserId) -> Result<PresenceUser, SourceError> {
        self.users
            .iter()
            .find(|user| user.id == *id)
            .cloned()
            .ok_or_else(|| SourceError::not_found(format!("/users/{id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    fn user(name: &str, state: UserState) -> PresenceUser {
        PresenceUser {
            id: UserId::random(),
            name: name.to_owned(),
            display_name: name.to_uppercase(),
            state,
            bot: false,
        }
    }

    #[fixture]
    fn source() -> FixturePresenceSource {
        FixturePresenceSource::new(vec![
            user("alice", UserState::Active),
            user("bob", UserState::Suspended),
            user("carol", UserState::Deactivated),
        ])
    }

    #[rstest]
    #[tokio::test]
    async fn listing_hides_suspended_by_default(source: FixturePresenceSource) {
        let names: Vec<String> = source
            .list_users(&PresenceUserQuery::default())
            .await
            .expect("fixture listing")
            .into_iter()
            .map(|user| user.name)
            .collect();
        assert_eq!(names, vec!["alice", "carol"]);
    }

    #[rstest]
    #[tokio::test]
    async fn listing_can_include_suspended(source: FixturePresenceSource) {
        let users = source
            .list_users(&PresenceUserQuery {
                include_suspended: Some(true),
                name: None,
            })
            .await
            .expect("fixture listing");
        assert_eq!(users.len(), 3);
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_id_is_not_found(source: FixturePresenceSource) {
        let err = source
            .get_user(&UserId::random())
            .await
            .expect_err("unknown user");
        assert!(matches!(err, SourceError::NotFound { .. }));
    }
}
