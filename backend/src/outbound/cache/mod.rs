//! In-process TTL cache and the caching directory adapter.
//!
//! The directory listing is the only remote read the portfolio caches: it
//! changes rarely and every merged user view needs it. Entries expire after a
//! fixed TTL measured on an injected [`Clock`]; a background sweeper removes
//! expired entries on a longer interval so the map does not grow unbounded.
//!
//! The mutex guards check-then-populate but is never held across the remote
//! await, so concurrent misses may each fetch. The last writer wins.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::domain::ports::{DirectorySource, DirectoryUser, SourceError};

/// Default lifetime of a cached directory listing.
pub const DEFAULT_DIRECTORY_TTL: Duration = Duration::from_secs(60 * 60);
/// Default interval between sweeps of expired entries.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(2 * 60 * 60);

const ALL_USERS_KEY: &str = "all users";

struct Entry<V> {
    value: V,
    expires_at: DateTime<Utc>,
}

/// Clock-driven cache whose entries expire after a fixed TTL.
pub struct TtlCache<K, V> {
    entries: Mutex<HashMap<K, Entry<V>>>,
    ttl: TimeDelta,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(ttl: Duration, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, Entry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the value for `key` if present and unexpired.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.utc();
        self.lock()
            .get(key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.value.clone())
    }

    /// Store `value` under `key`, replacing any previous entry.
    pub fn insert(&self, key: K, value: V) {
        let expires_at = self
            .clock
            .utc()
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.lock().insert(key, Entry { value, expires_at });
    }

    /// Drop every expired entry and report how many were removed.
    pub fn sweep(&self) -> usize {
        let now = self.clock.utc();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Run [`TtlCache::sweep`] every `interval` until the handle is aborted.
pub fn spawn_sweeper<K, V>(cache: Arc<TtlCache<K, V>>, interval: Duration) -> JoinHandle<()>
where
    K: Eq + Hash + Send + 'static,
    V: Clone + Send + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately; nothing can have expired yet.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = cache.sweep();
            if removed > 0 {
                debug!(removed, "swept expired cache entries");
            }
        }
    })
}

/// Directory cache shared by every caching adapter in the process.
pub type DirectoryCache = TtlCache<&'static str, Vec<DirectoryUser>>;

/// [`DirectorySource`] decorator caching the full listing.
///
/// Single-user lookups always go to the wrapped source. A failed fetch on a
/// miss is returned as-is; an expired snapshot is never served.
pub struct CachedDirectorySource<D> {
    inner: D,
    cache: Arc<DirectoryCache>,
}

impl<D> CachedDirectorySource<D> {
    pub fn new(inner: D, cache: Arc<DirectoryCache>) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl<D> DirectorySource for CachedDirectorySource<D>
where
    D: DirectorySource,
{
    async fn list_users(&self) -> Result<Vec<DirectoryUser>, SourceError> {
        if let Some(users) = self.cache.get(&ALL_USERS_KEY) {
            return Ok(users);
        }
        debug!("directory cache miss");
        let users = self.inner.list_users().await?;
        self.cache.insert(ALL_USERS_KEY, users.clone());
        Ok(users)
    }

    async fn get_user(&self, name: &str) -> Result<DirectoryUser, SourceError> {
        self.inner.get_user(name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockDirectorySource;
    use crate::test_support::MutableClock;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    #[fixture]
    fn clock() -> Arc<MutableClock> {
        let start = Utc
            .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .expect("valid timestamp");
        Arc::new(MutableClock::new(start))
    }

    fn alice() -> DirectoryUser {
        DirectoryUser {
            name: "alice".to_owned(),
            real_name: "Alice Liddell".to_owned(),
            alphabetic_name: String::new(),
        }
    }

    fn cached(
        inner: MockDirectorySource,
        clock: Arc<MutableClock>,
    ) -> CachedDirectorySource<MockDirectorySource> {
        let cache = Arc::new(DirectoryCache::new(DEFAULT_DIRECTORY_TTL, clock));
        CachedDirectorySource::new(inner, cache)
    }

    #[rstest]
    fn entries_expire_at_ttl(clock: Arc<MutableClock>) {
        let cache: TtlCache<&str, u8> = TtlCache::new(Duration::from_secs(10), clock.clone());
        cache.insert("k", 1);
        clock.advance(Duration::from_secs(9));
        assert_eq!(cache.get(&"k"), Some(1));
        clock.advance(Duration::from_secs(1));
        assert_eq!(cache.get(&"k"), None);
    }

    #[rstest]
    fn sweep_removes_only_expired_entries(clock: Arc<MutableClock>) {
        let cache: TtlCache<&str, u8> = TtlCache::new(Duration::from_secs(10), clock.clone());
        cache.insert("old", 1);
        clock.advance(Duration::from_secs(6));
        cache.insert("new", 2);
        clock.advance(Duration::from_secs(6));

        assert_eq!(cache.sweep(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&"new"), Some(2));
    }

    #[rstest]
    #[tokio::test]
    async fn listing_is_fetched_once_within_ttl(clock: Arc<MutableClock>) {
        let mut inner = MockDirectorySource::new();
        inner
            .expect_list_users()
            .times(1)
            .returning(|| Ok(vec![alice()]));
        let source = cached(inner, clock.clone());

        let first = source.list_users().await.expect("miss fetches");
        clock.advance(Duration::from_secs(59 * 60));
        let second = source.list_users().await.expect("hit");
        assert_eq!(first, second);
    }

    #[rstest]
    #[tokio::test]
    async fn expired_listing_is_refetched(clock: Arc<MutableClock>) {
        let mut inner = MockDirectorySource::new();
        inner
            .expect_list_users()
            .times(2)
            .returning(|| Ok(vec![alice()]));
        let source = cached(inner, clock.clone());

        source.list_users().await.expect("first miss");
        clock.advance(DEFAULT_DIRECTORY_TTL);
        source.list_users().await.expect("second miss");
    }

    #[rstest]
    #[tokio::test]
    async fn failed_refresh_is_not_masked_by_stale_entry(clock: Arc<MutableClock>) {
        let mut inner = MockDirectorySource::new();
        let mut seq = mockall::Sequence::new();
        inner
            .expect_list_users()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(vec![alice()]));
        inner
            .expect_list_users()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Err(SourceError::status(502_u16, "/user")));
        let source = cached(inner, clock.clone());

        source.list_users().await.expect("populate");
        clock.advance(DEFAULT_DIRECTORY_TTL + Duration::from_secs(1));
        let err = source.list_users().await.expect_err("refresh fails");
        assert_eq!(err, SourceError::status(502_u16, "/user"));
    }

    #[rstest]
    #[tokio::test]
    async fn single_lookups_bypass_the_cache(clock: Arc<MutableClock>) {
        let mut inner = MockDirectorySource::new();
        inner
            .expect_get_user()
            .times(2)
            .returning(|_| Ok(alice()));
        let source = cached(inner, clock);

        source.get_user("alice").await.expect("first");
        source.get_user("alice").await.expect("second");
    }
}
