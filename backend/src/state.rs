//! Dependency-injection root.
//!
//! [`build_repositories`] turns [`PortfolioSettings`] into the five driving
//! ports. Stores are always Diesel-backed; the remote sources are either
//! the HTTP clients (with the directory listing behind a TTL cache) or a
//! fixture dataset, chosen by `remote_mode`.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use tokio::task::JoinHandle;
use tracing::info;

use crate::domain::ports::{
    CalendarSource, ContestRepository, ContestStore, DirectorySource, EventLevelStore,
    EventRepository, GroupRepository, GroupStore, PresenceSource, ProjectRepository,
    ProjectStore, UserRepository, UserStore,
};
use crate::domain::{ContestService, EventService, GroupService, ProjectService, UserService};
use crate::outbound::cache::{CachedDirectorySource, DirectoryCache, spawn_sweeper};
use crate::outbound::calendar::CalendarHttpSource;
use crate::outbound::directory::DirectoryHttpSource;
use crate::outbound::fixtures::{FixtureLoadError, FixtureSources};
use crate::outbound::persistence::{
    DbPool, DieselContestStore, DieselEventLevelStore, DieselGroupStore, DieselProjectStore,
    DieselUserStore, PoolConfig, PoolError,
};
use crate::outbound::presence::PresenceHttpSource;
use crate::settings::{PortfolioSettings, RemoteMode, SettingsError};

/// Failures while wiring the process.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("database pool: {0}")]
    Pool(#[from] PoolError),
    #[error("{service} HTTP client: {source}")]
    HttpClient {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error(transparent)]
    Fixture(#[from] FixtureLoadError),
}

/// The driving ports handed to inbound adapters.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub projects: Arc<dyn ProjectRepository>,
    pub contests: Arc<dyn ContestRepository>,
    pub events: Arc<dyn EventRepository>,
    pub groups: Arc<dyn GroupRepository>,
}

/// Store adapters, one per aggregate.
pub struct StorePorts<U, P, C, G, E> {
    pub users: Arc<U>,
    pub projects: Arc<P>,
    pub contests: Arc<C>,
    pub groups: Arc<G>,
    pub levels: Arc<E>,
}

impl<S> StorePorts<S, S, S, S, S> {
    /// Use one value for every store port.
    pub fn shared(store: Arc<S>) -> Self {
        Self {
            users: Arc::clone(&store),
            projects: Arc::clone(&store),
            contests: Arc::clone(&store),
            groups: Arc::clone(&store),
            levels: store,
        }
    }
}

/// Remote source adapters.
pub struct SourcePorts<P, D, K> {
    pub presence: Arc<P>,
    pub directory: Arc<D>,
    pub calendar: Arc<K>,
}

impl Repositories {
    /// Build every service over the given adapters.
    pub fn assemble<U, Pj, C, G, E, Pr, D, K>(
        stores: StorePorts<U, Pj, C, G, E>,
        sources: SourcePorts<Pr, D, K>,
    ) -> Self
    where
        U: UserStore + 'static,
        Pj: ProjectStore + 'static,
        C: ContestStore + 'static,
        G: GroupStore + 'static,
        E: EventLevelStore + 'static,
        Pr: PresenceSource + 'static,
        D: DirectorySource + 'static,
        K: CalendarSource + 'static,
    {
        let StorePorts {
            users,
            projects,
            contests,
            groups,
            levels,
        } = stores;
        let SourcePorts {
            presence,
            directory,
            calendar,
        } = sources;

        Self {
            users: Arc::new(UserService::new(
                Arc::clone(&users),
                presence,
                Arc::clone(&directory),
            )),
            projects: Arc::new(ProjectService::new(
                projects,
                Arc::clone(&users),
                Arc::clone(&directory),
            )),
            contests: Arc::new(ContestService::new(
                contests,
                Arc::clone(&users),
                Arc::clone(&directory),
            )),
            events: Arc::new(EventService::new(levels, calendar)),
            groups: Arc::new(GroupService::new(groups, users, directory)),
        }
    }
}

/// Wired repositories plus the background directory-cache sweeper.
///
/// Dropping the state stops the sweeper.
pub struct PortfolioState {
    pub repositories: Repositories,
    sweeper: Option<JoinHandle<()>>,
}

impl PortfolioState {
    pub fn new(repositories: Repositories) -> Self {
        Self {
            repositories,
            sweeper: None,
        }
    }

    fn with_sweeper(mut self, sweeper: JoinHandle<()>) -> Self {
        self.sweeper = Some(sweeper);
        self
    }

    pub fn has_sweeper(&self) -> bool {
        self.sweeper.is_some()
    }
}

impl Drop for PortfolioState {
    fn drop(&mut self) {
        if let Some(sweeper) = self.sweeper.take() {
            sweeper.abort();
        }
    }
}

type DieselStores = StorePorts<
    DieselUserStore,
    DieselProjectStore,
    DieselContestStore,
    DieselGroupStore,
    DieselEventLevelStore,
>;

fn diesel_stores(pool: &DbPool) -> DieselStores {
    StorePorts {
        users: Arc::new(DieselUserStore::new(pool.clone())),
        projects: Arc::new(DieselProjectStore::new(pool.clone())),
        contests: Arc::new(DieselContestStore::new(pool.clone())),
        groups: Arc::new(DieselGroupStore::new(pool.clone())),
        levels: Arc::new(DieselEventLevelStore::new(pool.clone())),
    }
}

fn http_client_error(service: &'static str) -> impl FnOnce(reqwest::Error) -> StateError {
    move |source| StateError::HttpClient { service, source }
}

/// Wire the process from settings. Must run inside a Tokio runtime.
///
/// # Errors
///
/// Returns [`StateError`] when a setting is missing or malformed, the pool
/// cannot be built, an HTTP client cannot be constructed, or the fixture
/// dataset cannot be read.
pub async fn build_repositories(
    settings: &PortfolioSettings,
) -> Result<PortfolioState, StateError> {
    let config = PoolConfig::new(settings.database_url()?).with_max_size(settings.pool_size);
    let pool = DbPool::new(config).await?;
    let stores = diesel_stores(&pool);

    match settings.remote_mode()? {
        RemoteMode::Fixture => {
            let path = settings.fixture_path()?;
            info!(path = %path.display(), "using fixture remote sources");
            let fixtures = FixtureSources::load(path)?;
            let sources = SourcePorts {
                presence: Arc::new(fixtures.presence),
                directory: Arc::new(fixtures.directory),
                calendar: Arc::new(fixtures.calendar),
            };
            Ok(PortfolioState::new(Repositories::assemble(stores, sources)))
        }
        RemoteMode::Http => {
            let timeout = settings.http_timeout();
            let presence = settings.presence()?;
            let directory = settings.directory()?;
            let calendar = settings.calendar()?;

            let presence =
                PresenceHttpSource::new(presence.base_url, &presence.credential, timeout)
                    .map_err(http_client_error("presence"))?;
            let directory =
                DirectoryHttpSource::new(directory.base_url, &directory.credential, timeout)
                    .map_err(http_client_error("directory"))?;
            let calendar =
                CalendarHttpSource::new(calendar.base_url, &calendar.credential, timeout)
                    .map_err(http_client_error("calendar"))?;

            let clock: Arc<dyn Clock + Send + Sync> = Arc::new(DefaultClock);
            let cache = Arc::new(DirectoryCache::new(settings.directory_cache_ttl(), clock));
            let sweeper = spawn_sweeper(Arc::clone(&cache), settings.directory_cache_sweep());
            info!(
                ttl_secs = settings.directory_cache_ttl().as_secs(),
                "using HTTP remote sources"
            );

            let sources = SourcePorts {
                presence: Arc::new(presence),
                directory: Arc::new(CachedDirectorySource::new(directory, cache)),
                calendar: Arc::new(calendar),
            };
            Ok(PortfolioState::new(Repositories::assemble(stores, sources)).with_sweeper(sweeper))
        }
    }
}
