//! Driving port for the user aggregate.
//!
//! The inbound layer binds to this trait; every method returns either the
//! merged entity or a domain [`Error`].

use async_trait::async_trait;

use crate::domain::{
    Account, AccountId, CreateAccountArgs, CreateUserArgs, Error, GetUsersArgs, UpdateAccountArgs,
    UpdateUserArgs, User, UserDetail, UserId,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// List users merged from presence, local rows and the directory.
    ///
    /// Setting both filter fields is [`crate::domain::ErrorCode::InvalidArgument`].
    async fn get_users(&self, args: &GetUsersArgs) -> Result<Vec<User>, Error>;

    async fn get_user(&self, id: &UserId) -> Result<UserDetail, Error>;

    /// Register a user known to the directory under `args.name`.
    async fn create_user(&self, args: CreateUserArgs) -> Result<User, Error>;

    async fn update_user(&self, id: &UserId, args: UpdateUserArgs) -> Result<(), Error>;

    async fn get_accounts(&self, user_id: &UserId) -> Result<Vec<Account>, Error>;

    async fn get_account(&self, user_id: &UserId, account_id: &AccountId)
    -> Result<Account, Error>;

    async fn create_account(
        &self,
        user_id: &UserId,
        args: CreateAccountArgs,
    ) -> Result<Account, Error>;

    async fn update_account(
        &self,
        user_id: &UserId,
        account_id: &AccountId,
        args: UpdateAccountArgs,
    ) -> Result<Account, Error>;

    async fn delete_account(&self, user_id: &UserId, account_id: &AccountId)
    -> Result<(), Error>;
}
