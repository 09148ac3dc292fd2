//! Driven port for the directory service, the authority on real names.

use async_trait::async_trait;

use super::SourceError;

/// Directory entry keyed by user name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryUser {
    pub name: String,
    pub real_name: String,
    pub alphabetic_name: String,
}

/// Port for reading the roster from the directory service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DirectorySource: Send + Sync {
    /// List the full roster.
    async fn list_users(&self) -> Result<Vec<DirectoryUser>, SourceError>;

    /// Fetch one entry by user name.
    async fn get_user(&self, name: &str) -> Result<DirectoryUser, SourceError>;
}

/// Fixture implementation serving a fixed roster.
#[derive(Debug, Clone, Default)]
pub struct FixtureDirectorySource {
    users: Vec<DirectoryUser>,
}

impl FixtureDirectorySource {
    pub fn new(users: Vec<DirectoryUser>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl DirectorySource for FixtureDirectorySource {
    async fn list_users(&self) -> Result<Vec<DirectoryUser>, SourceError> {
        Ok(self.users.clone())
    }

    async fn get_user(&self, name: &str) -> Result<DirectoryUser, SourceError> {
        self.users
            .iter()
            .find(|user| user.name == name)
            .cloned()
            .ok_or_else(|| SourceError::not_found(format!("/user/{name}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixture_looks_up_by_name() {
        let source = FixtureDirectorySource::new(vec![DirectoryUser {
            name: "alice".to_owned(),
            real_name: "Alice Liddell".to_owned(),
            alphabetic_name: "Liddell Alice".to_owned(),
        }]);
        let found = source.get_user("alice").await.expect("known user");
        assert_eq!(found.real_name, "Alice Liddell");
        let missing = source.get_user("bob").await.expect_err("unknown user");
        assert_eq!(missing.path(), "/user/bob");
    }
}
