//! Port for locally persisted users and their linked accounts.

use async_trait::async_trait;

use crate::domain::{Account, AccountId, UpdateUserArgs, UserId, UserRecord};

use super::StoreError;

/// Local user and account persistence.
///
/// Lookups of a single row report [`StoreError::NotFound`] when absent.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Load every user whose id is in `ids`, in one query.
    ///
    /// Callers never pass an empty slice.
    async fn find_users_by_ids(&self, ids: &[UserId]) -> Result<Vec<UserRecord>, StoreError>;

    async fn find_user(&self, id: &UserId) -> Result<UserRecord, StoreError>;

    /// Insert a user. A taken name is a [`StoreError::Conflict`].
    async fn create_user(&self, record: &UserRecord) -> Result<(), StoreError>;

    /// Write the fields present in `args`, leaving others untouched.
    async fn update_user(&self, id: &UserId, args: &UpdateUserArgs) -> Result<(), StoreError>;

    async fn list_accounts(&self, user_id: &UserId) -> Result<Vec<Account>, StoreError>;

    async fn find_account(
        &self,
        user_id: &UserId,
        account_id: &AccountId,
    ) -> Result<Account, StoreError>;

    /// Insert an account. A second account of the same type for the user is a
    /// [`StoreError::Conflict`].
    async fn create_account(&self, user_id: &UserId, account: &Account)
    -> Result<(), StoreError>;

    /// Overwrite an account row. Switching to a type the user already holds
    /// is a [`StoreError::Conflict`].
    async fn update_account(&self, user_id: &UserId, account: &Account)
    -> Result<(), StoreError>;

    async fn delete_account(
        &self,
        user_id: &UserId,
        account_id: &AccountId,
    ) -> Result<(), StoreError>;
}
