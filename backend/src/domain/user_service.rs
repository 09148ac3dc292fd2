//! User repository service.
//!
//! Merges the presence roster, local rows and the directory into user views,
//! and owns the locally stored profile fields and linked accounts.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::ports::{
    DirectorySource, PresenceSource, PresenceUserQuery, StoreError, UserRepository, UserStore,
};
use crate::domain::user_view::real_names_by_user;
use crate::domain::{
    Account, AccountId, CreateAccountArgs, CreateUserArgs, Error, GetUsersArgs,
    UpdateAccountArgs, UpdateUserArgs, User, UserDetail, UserId, UserRecord,
};

/// User service implementing [`UserRepository`].
pub struct UserService<S, P, D> {
    store: Arc<S>,
    presence: Arc<P>,
    directory: Arc<D>,
}

impl<S, P, D> UserService<S, P, D> {
    pub fn new(store: Arc<S>, presence: Arc<P>, directory: Arc<D>) -> Self {
        Self {
            store,
            presence,
            directory,
        }
    }
}

fn presence_query(args: &GetUsersArgs) -> Result<PresenceUserQuery, Error> {
    if args.include_suspended.is_some() && args.name.is_some() {
        return Err(Error::invalid_argument(
            "include_suspended and name filters cannot be combined",
        ));
    }
    Ok(PresenceUserQuery {
        include_suspended: args.include_suspended,
        name: args.name.clone(),
    })
}

impl<S, P, D> UserService<S, P, D>
where
    S: UserStore,
    P: PresenceSource,
    D: DirectorySource,
{
    async fn ensure_user(&self, id: &UserId) -> Result<UserRecord, Error> {
        Ok(self.store.find_user(id).await?)
    }

    /// Re-read an account that was just written. Its absence means the
    /// write did not land.
    async fn reread_account(
        &self,
        user_id: &UserId,
        account_id: &AccountId,
    ) -> Result<Account, Error> {
        match self.store.find_account(user_id, account_id).await {
            Ok(account) => Ok(account),
            Err(StoreError::NotFound { .. }) => Err(Error::internal(format!(
                "account {account_id} missing after write"
            ))),
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl<S, P, D> UserRepository for UserService<S, P, D>
where
    S: UserStore,
    P: PresenceSource,
    D: DirectorySource,
{
    async fn get_users(&self, args: &GetUsersArgs) -> Result<Vec<User>, Error> {
        let query = presence_query(args)?;
        let listed = self.presence.list_users(&query).await?;
        if listed.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<UserId> = listed.iter().map(|user| user.id).collect();
        let mut records: HashMap<UserId, UserRecord> = self
            .store
            .find_users_by_ids(&ids)
            .await?
            .into_iter()
            .map(|record| (record.id, record))
            .collect();
        let real_names = real_names_by_user(self.directory.list_users().await?);

        let users = listed
            .into_iter()
            .filter_map(|presence| {
                let record = records.remove(&presence.id)?;
                let real_name = real_names.get(&presence.name).cloned().unwrap_or_default();
                Some(User {
                    id: presence.id,
                    name: presence.name,
                    real_name,
                    check: record.check,
                })
            })
            .collect::<Vec<_>>();
        debug!(count = users.len(), "merged user listing");
        Ok(users)
    }

    async fn get_user(&self, id: &UserId) -> Result<UserDetail, Error> {
        let record = self.ensure_user(id).await?;
        let presence = self.presence.get_user(id).await?;
        let directory = self.directory.get_user(&presence.name).await?;
        let accounts = self.store.list_accounts(id).await?;
        Ok(UserDetail {
            user: User {
                id: record.id,
                name: presence.name,
                real_name: directory.real_name,
                check: record.check,
            },
            state: presence.state,
            bio: record.bio,
            accounts,
        })
    }

    async fn create_user(&self, args: CreateUserArgs) -> Result<User, Error> {
        if args.name.trim().is_empty() {
            return Err(Error::invalid_argument("user name must not be empty"));
        }
        let directory = self.directory.get_user(&args.name).await?;
        let record = UserRecord {
            id: UserId::random(),
            name: args.name,
            bio: args.bio,
            check: args.check,
        };
        self.store.create_user(&record).await?;
        info!(user_id = %record.id, name = %record.name, "created user");
        Ok(record.into_user(directory.real_name))
    }

    async fn update_user(&self, id: &UserId, args: UpdateUserArgs) -> Result<(), Error> {
        self.ensure_user(id).await?;
        if args.is_empty() {
            debug!(user_id = %id, "user update carries no fields");
            return Ok(());
        }
        self.store.update_user(id, &args).await?;
        Ok(())
    }

    async fn get_accounts(&self, user_id: &UserId) -> Result<Vec<Account>, Error> {
        self.ensure_user(user_id).await?;
        Ok(self.store.list_accounts(user_id).await?)
    }

    async fn get_account(
        &self,
        user_id: &UserId,
        account_id: &AccountId,
    ) -> Result<Account, Error> {
        Ok(self.store.find_account(user_id, account_id).await?)
    }

    async fn create_account(
        &self,
        user_id: &UserId,
        args: CreateAccountArgs,
    ) -> Result<Account, Error> {
        args.validate()
            .map_err(|err| Error::invalid_argument(err.to_string()))?;
        self.ensure_user(user_id).await?;
        let account = Account {
            id: AccountId::random(),
            account_type: args.account_type,
            display_name: args.display_name,
            url: args.url,
            pr_permitted: args.pr_permitted,
        };
        self.store.create_account(user_id, &account).await?;
        self.reread_account(user_id, &account.id).await
    }

    async fn update_account(
        &self,
        user_id: &UserId,
        account_id: &AccountId,
        args: UpdateAccountArgs,
    ) -> Result<Account, Error> {
        args.validate_standalone()
            .map_err(|err| Error::invalid_argument(err.to_string()))?;
        let current = self.store.find_account(user_id, account_id).await?;
        if args.is_empty() {
            return Ok(current);
        }
        args.validate_against(&current)
            .map_err(|err| Error::invalid_argument(err.to_string()))?;
        let next = Account {
            id: current.id,
            account_type: args.account_type.unwrap_or(current.account_type),
            display_name: args.display_name.unwrap_or(current.display_name),
            url: args.url.unwrap_or(current.url),
            pr_permitted: args.pr_permitted.unwrap_or(current.pr_permitted),
        };
        self.store.update_account(user_id, &next).await?;
        self.reread_account(user_id, account_id).await
    }

    async fn delete_account(
        &self,
        user_id: &UserId,
        account_id: &AccountId,
    ) -> Result<(), Error> {
        self.store.delete_account(user_id, account_id).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "user_service_tests.rs"]
mod tests;
