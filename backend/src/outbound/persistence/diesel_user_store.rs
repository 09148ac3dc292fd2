//! PostgreSQL-backed `UserStore` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{StoreError, UserStore};
use crate::domain::{Account, AccountId, UpdateUserArgs, UserId, UserRecord};

use super::diesel_error_mapping::{corrupt_row, expect_one, map_diesel_error, map_pool_error};
use super::models::{AccountRow, NewUserRow, UserRow, UserUpdate};
use super::pool::DbPool;
use super::schema::{accounts, users};

/// Diesel-backed implementation of the [`UserStore`] port.
#[derive(Clone)]
pub struct DieselUserStore {
    pool: DbPool,
}

impl DieselUserStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn rows_to_accounts(rows: Vec<AccountRow>) -> Result<Vec<Account>, StoreError> {
    rows.into_iter()
        .map(|row| Account::try_from(row).map_err(|err| corrupt_row("accounts", err)))
        .collect()
}

#[async_trait]
impl UserStore for DieselUserStore {
    async fn find_users_by_ids(&self, ids: &[UserId]) -> Result<Vec<UserRecord>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let uuids: Vec<uuid::Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();

        let rows: Vec<UserRow> = users::table
            .filter(users::id.eq_any(&uuids))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(UserRecord::from).collect())
    }

    async fn find_user(&self, id: &UserId) -> Result<UserRecord, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(UserRecord::from)
            .ok_or_else(|| StoreError::not_found("user"))
    }

    async fn create_user(&self, record: &UserRecord) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(users::table)
            .values(NewUserRow::from(record))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update_user(&self, id: &UserId, args: &UpdateUserArgs) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = UserUpdate {
            bio: args.bio.as_deref(),
            check_flag: args.check,
        };

        let affected = diesel::update(users::table.filter(users::id.eq(id.as_uuid())))
            .set((&changes, users::updated_at.eq(diesel::dsl::now)))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        expect_one(affected, "user")
    }

    async fn list_accounts(&self, user_id: &UserId) -> Result<Vec<Account>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<AccountRow> = accounts::table
            .filter(accounts::user_id.eq(user_id.as_uuid()))
            .order_by(accounts::account_type)
            .select(AccountRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_accounts(rows)
    }

    async fn find_account(
        &self,
        user_id: &UserId,
        account_id: &AccountId,
    ) -> Result<Account, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<AccountRow> = accounts::table
            .filter(accounts::id.eq(account_id.as_uuid()))
            .filter(accounts::user_id.eq(user_id.as_uuid()))
            .select(AccountRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        let row = row.ok_or_else(|| StoreError::not_found("account"))?;
        Account::try_from(row).map_err(|err| corrupt_row("accounts", err))
    }

    async fn create_account(
        &self,
        user_id: &UserId,
        account: &Account,
    ) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(accounts::table)
            .values(AccountRow::new(user_id, account))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update_account(
        &self,
        user_id: &UserId,
        account: &Account,
    ) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = AccountRow::new(user_id, account);

        let affected = diesel::update(
            accounts::table
                .filter(accounts::id.eq(row.id))
                .filter(accounts::user_id.eq(row.user_id)),
        )
        .set((
            accounts::account_type.eq(row.account_type),
            accounts::display_name.eq(&row.display_name),
            accounts::url.eq(&row.url),
            accounts::pr_permitted.eq(row.pr_permitted),
        ))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        expect_one(affected, "account")
    }

    async fn delete_account(
        &self,
        user_id: &UserId,
        account_id: &AccountId,
    ) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let affected = diesel::delete(
            accounts::table
                .filter(accounts::id.eq(account_id.as_uuid()))
                .filter(accounts::user_id.eq(user_id.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        expect_one(affected, "account")
    }
}
