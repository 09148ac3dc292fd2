//! Presence source whose roster tests can extend after wiring.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::domain::UserId;
use crate::domain::ports::{PresenceSource, PresenceUser, PresenceUserQuery, SourceError};

/// Presence roster shared between a test and the services it drives.
///
/// Users created through `create_user` receive fresh ids; registering them
/// here afterwards mirrors the presence service learning about the account.
#[derive(Debug, Default)]
pub struct SharedRoster {
    users: Mutex<Vec<PresenceUser>>,
}

impl SharedRoster {
    pub fn new(users: Vec<PresenceUser>) -> Self {
        Self {
            users: Mutex::new(users),
        }
    }

    pub fn register(&self, user: PresenceUser) {
        self.users
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(user);
    }
}

#[async_trait]
impl PresenceSource for SharedRoster {
    async fn list_users(
        &self,
        query: &PresenceUserQuery,
    ) -> Result<Vec<PresenceUser>, SourceError> {
        let users = self.users.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(users
            .iter()
            .filter(|user| query.matches(user))
            .cloned()
            .collect())
    }

    async fn get_user(&self, id: &UserId) -> Result<PresenceUser, SourceError> {
        let users = self.users.lock().unwrap_or_else(PoisonError::into_inner);
        users
            .iter()
            .find(|user| user.id == *id)
            .cloned()
            .ok_or_else(|| SourceError::not_found(format!("/users/{id}")))
    }
}
