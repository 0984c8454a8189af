//! In-process memoization of loaded series.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::{DateRange, PriceSeries, Ticker};

/// How a loader consults its cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheMode {
    /// Serve a live entry if present; otherwise fetch and store. (Default)
    #[default]
    Use,
    /// Always fetch, then overwrite the entry.
    Refresh,
    /// Always fetch; never read or write the cache.
    Bypass,
}

/// Exact argument tuple of a `load` call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoadKey {
    pub ticker: Ticker,
    pub range: DateRange,
}

impl LoadKey {
    pub fn new(ticker: Ticker, range: DateRange) -> Self {
        Self { ticker, range }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    series: Arc<PriceSeries>,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |expires_at| now <= expires_at)
    }
}

#[derive(Debug)]
struct CacheInner {
    map: HashMap<LoadKey, CacheEntry>,
    ttl: Option<Duration>,
}

/// Thread-safe memo cache keyed by [`LoadKey`].
///
/// Entries never expire unless the owner picks a time-to-live.
#[derive(Debug, Clone)]
pub struct SeriesCache {
    inner: Arc<RwLock<CacheInner>>,
}

impl Default for SeriesCache {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl SeriesCache {
    /// Cache whose entries live until cleared.
    pub fn unbounded() -> Self {
        Self::build(None)
    }

    /// Cache whose entries expire `ttl` after they were stored.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self::build(Some(ttl))
    }

    fn build(ttl: Option<Duration>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(CacheInner {
                map: HashMap::new(),
                ttl,
            })),
        }
    }

    pub async fn ttl(&self) -> Option<Duration> {
        self.inner.read().await.ttl
    }

    /// Live entry for `key`, if any.
    pub async fn get(&self, key: &LoadKey) -> Option<Arc<PriceSeries>> {
        let store = self.inner.read().await;
        store
            .map
            .get(key)
            .filter(|entry| entry.is_live(Instant::now()))
            .map(|entry| Arc::clone(&entry.series))
    }

    /// Store `series` under `key`, replacing any previous entry.
    pub async fn put(&self, key: LoadKey, series: Arc<PriceSeries>) {
        let mut store = self.inner.write().await;
        let expires_at = store.ttl.map(|ttl| Instant::now() + ttl);
        store.map.insert(key, CacheEntry { series, expires_at });
    }

    pub async fn remove(&self, key: &LoadKey) -> bool {
        self.inner.write().await.map.remove(key).is_some()
    }

    pub async fn clear_expired(&self) {
        let now = Instant::now();
        self.inner
            .write()
            .await
            .map
            .retain(|_, entry| entry.is_live(now));
    }

    pub async fn clear(&self) {
        self.inner.write().await.map.clear();
    }

    /// Number of entries, expired ones included.
    pub async fn len(&self) -> usize {
        self.inner.read().await.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
