//! Embedded PostgreSQL databases for the Diesel store suites.
//!
//! One cluster is shared by every test in a binary. Each test receives its
//! own database cloned from a template that already carries the migrations.
//! The template name embeds a hash of `backend/migrations`, so editing a
//! migration provisions a fresh template instead of reusing a stale one.

use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use pg_embedded_setup_unpriv::test_support::hash_directory;
use pg_embedded_setup_unpriv::{BootstrapResult, ClusterHandle, TemporaryDatabase};
use portfolio::domain::ports::StoreError;
use portfolio::outbound::persistence::{DbPool, PoolConfig};
use tokio::runtime::Runtime;
use uuid::Uuid;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

static TEMPLATE_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const TEMPLATE_NAME_PREFIX: &str = "portfolio_template";
const PROVISION_RETRIES: usize = 5;
const PROVISION_RETRY_DELAY: Duration = Duration::from_millis(500);

/// A pool over a freshly migrated database.
///
/// Field order matters: the pool closes its connections before the
/// database is dropped.
pub struct MigratedDatabase {
    pub pool: DbPool,
    _database: TemporaryDatabase,
}

fn migrations_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("migrations")
}

fn template_database_name() -> Result<String, StoreError> {
    let hash = hash_directory(migrations_dir())
        .map_err(|err| StoreError::query(format!("hash migrations: {err}")))?;
    let short_hash = hash.get(..8).unwrap_or(&hash);
    Ok(format!("{TEMPLATE_NAME_PREFIX}_{short_hash}"))
}

/// Run every pending migration against `url`.
fn migrate_schema(url: &str) -> Result<(), StoreError> {
    let mut conn = PgConnection::establish(url)
        .map_err(|err| StoreError::connection(format!("{err:?}")))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|err| StoreError::query(format!("migration: {err:?}")))?;
    Ok(())
}

/// Create the migrated template once per migrations hash.
fn ensure_template_database(cluster: &ClusterHandle) -> Result<String, StoreError> {
    let template_name = template_database_name()?;
    let _lock = TEMPLATE_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|err| err.into_inner());

    let exists = cluster
        .database_exists(template_name.as_str())
        .map_err(|err| StoreError::query(format!("template check: {err:?}")))?;
    if !exists {
        cluster
            .create_database(template_name.as_str())
            .map_err(|err| StoreError::query(format!("create template: {err:?}")))?;
        migrate_schema(&cluster.connection().database_url(&template_name))?;
    }
    Ok(template_name)
}

fn clone_template(cluster: &ClusterHandle) -> Result<TemporaryDatabase, StoreError> {
    let template_name = ensure_template_database(cluster)?;
    let db_name = format!("test_{}", Uuid::new_v4());
    cluster
        .temporary_database_from_template(db_name.as_str(), template_name.as_str())
        .map_err(|err| StoreError::query(format!("create database from template: {err:?}")))
}

/// Clone the migration template into a new temporary database, retrying
/// while parallel suites race to create the template.
pub fn provision_template_database(
    cluster: &ClusterHandle,
) -> Result<TemporaryDatabase, StoreError> {
    let mut last_error = None;
    for attempt in 1..=PROVISION_RETRIES {
        match clone_template(cluster) {
            Ok(database) => return Ok(database),
            Err(error) => last_error = Some(error),
        }
        if attempt < PROVISION_RETRIES {
            std::thread::sleep(PROVISION_RETRY_DELAY);
        }
    }
    Err(last_error.unwrap_or_else(|| StoreError::query("template provisioning exhausted")))
}

/// Pin `PG_PASSWORD` so a reused data directory keeps accepting the
/// password it was initialised with.
fn ensure_stable_password() {
    if std::env::var_os("PG_PASSWORD").is_none() {
        // SAFETY: runs before the cluster bootstrap spawns threads, and the
        // shared handle initialises at most once per process.
        unsafe {
            std::env::set_var("PG_PASSWORD", "portfolio_embedded_test");
        }
    }
}

/// The cluster shared by every test in this binary.
pub fn shared_cluster_handle() -> BootstrapResult<&'static ClusterHandle> {
    ensure_stable_password();
    let mut attempt = 1;
    loop {
        match pg_embedded_setup_unpriv::test_support::shared_cluster_handle() {
            Ok(handle) => return Ok(handle),
            Err(error) if attempt >= PROVISION_RETRIES => return Err(error),
            Err(_) => {
                std::thread::sleep(PROVISION_RETRY_DELAY);
                attempt += 1;
            }
        }
    }
}

/// Provision a migrated database and open a small pool on `runtime`.
pub fn migrated_database(runtime: &Runtime) -> Result<MigratedDatabase, String> {
    let cluster = shared_cluster_handle().map_err(|err| err.to_string())?;
    let database = provision_template_database(cluster).map_err(|err| err.to_string())?;
    let config = PoolConfig::new(database.url().to_string())
        .with_max_size(2)
        .with_min_idle(Some(1));
    let pool = runtime
        .block_on(async { DbPool::new(config).await })
        .map_err(|err| err.to_string())?;
    Ok(MigratedDatabase {
        pool,
        _database: database,
    })
}
