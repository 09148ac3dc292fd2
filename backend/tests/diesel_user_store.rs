//! Integration tests for `DieselUserStore` against embedded PostgreSQL.
//!
//! Focuses on the uniqueness rules the schema enforces: one name per user
//! and one account per type per user.

use portfolio::domain::ports::{StoreError, UserStore};
use portfolio::domain::{Account, AccountId, AccountType, UserId, UserRecord};
use portfolio::outbound::persistence::DieselUserStore;
use rstest::{fixture, rstest};
use tokio::runtime::Runtime;

mod support;

use support::{MigratedDatabase, handle_cluster_setup_failure, migrated_database};

struct TestContext {
    users: DieselUserStore,
    alice: UserRecord,
    _database: MigratedDatabase,
    runtime: Runtime,
}

fn account(account_type: AccountType, handle: &str) -> Account {
    Account {
        id: AccountId::random(),
        account_type,
        display_name: handle.to_owned(),
        url: format!("https://example.org/{handle}"),
        pr_permitted: false,
    }
}

fn setup_context() -> Result<TestContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let database = migrated_database(&runtime)?;
    let users = DieselUserStore::new(database.pool.clone());
    let alice = UserRecord {
        id: UserId::random(),
        name: "alice".to_owned(),
        bio: "compilers".to_owned(),
        check: true,
    };
    runtime
        .block_on(users.create_user(&alice))
        .map_err(|err| err.to_string())?;

    Ok(TestContext {
        users,
        alice,
        _database: database,
        runtime,
    })
}

#[fixture]
fn repo_context() -> Option<TestContext> {
    match setup_context() {
        Ok(ctx) => Some(ctx),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

#[rstest]
fn second_account_of_a_type_is_a_conflict(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: second_account_of_a_type_is_a_conflict skipped");
        return;
    };
    let user_id = context.alice.id;

    context
        .runtime
        .block_on(
            context
                .users
                .create_account(&user_id, &account(AccountType::Github, "alice")),
        )
        .expect("first github account");
    let err = context
        .runtime
        .block_on(
            context
                .users
                .create_account(&user_id, &account(AccountType::Github, "alice-alt")),
        )
        .expect_err("second github account");
    assert!(matches!(err, StoreError::Conflict { .. }));

    let accounts = context
        .runtime
        .block_on(context.users.list_accounts(&user_id))
        .expect("accounts readable");
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].display_name, "alice");
}

#[rstest]
fn switching_to_a_held_type_is_a_conflict(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: switching_to_a_held_type_is_a_conflict skipped");
        return;
    };
    let user_id = context.alice.id;
    let github = account(AccountType::Github, "alice");
    let blog = account(AccountType::Blog, "alice-blog");

    context
        .runtime
        .block_on(async {
            context.users.create_account(&user_id, &github).await?;
            context.users.create_account(&user_id, &blog).await
        })
        .expect("two accounts");

    let retyped = Account {
        account_type: AccountType::Github,
        ..blog.clone()
    };
    let err = context
        .runtime
        .block_on(context.users.update_account(&user_id, &retyped))
        .expect_err("github is already linked");
    assert!(matches!(err, StoreError::Conflict { .. }));

    let stored = context
        .runtime
        .block_on(context.users.find_account(&user_id, &blog.id))
        .expect("blog account readable");
    assert_eq!(stored.account_type, AccountType::Blog);
}

#[rstest]
fn account_for_unknown_user_is_not_found(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: account_for_unknown_user_is_not_found skipped");
        return;
    };

    let err = context
        .runtime
        .block_on(
            context
                .users
                .create_account(&UserId::random(), &account(AccountType::Github, "nobody")),
        )
        .expect_err("no such user");
    assert!(matches!(&err, StoreError::NotFound { entity } if entity == "user"));
}

#[rstest]
fn taken_user_name_is_a_conflict(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: taken_user_name_is_a_conflict skipped");
        return;
    };

    let twin = UserRecord {
        id: UserId::random(),
        ..context.alice.clone()
    };
    let err = context
        .runtime
        .block_on(context.users.create_user(&twin))
        .expect_err("name already taken");
    assert!(matches!(err, StoreError::Conflict { .. }));
}
