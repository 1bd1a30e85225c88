use std::time::Duration;

use async_trait::async_trait;
use fxhash::FxHashMap;
use parking_lot::RwLock;
use tokio::time::Instant;

use crate::route::RouteResult;

use super::{RouteCache, RouteCacheError, RouteCacheKey};

struct CacheEntry {
    route: RouteResult,
    expires_at: Instant,
}

/// Process local cache. Expired entries are dropped lazily on read and by
/// [`InMemoryRouteCache::purge_expired`].
#[derive(Default)]
pub struct InMemoryRouteCache {
    entries: RwLock<FxHashMap<String, CacheEntry>>,
}

impl InMemoryRouteCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time left before `key` expires, `None` when absent or expired.
    pub fn remaining_ttl(&self, key: &RouteCacheKey) -> Option<Duration> {
        let now = Instant::now();
        self.entries
            .read()
            .get(key.as_str())
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.expires_at - now)
    }

    /// Returns the number of removed entries.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RouteCache for InMemoryRouteCache {
    async fn get(&self, key: &RouteCacheKey) -> Result<Option<RouteResult>, RouteCacheError> {
        let now = Instant::now();

        {
            let entries = self.entries.read();
            match entries.get(key.as_str()) {
                None => return Ok(None),
                Some(entry) if entry.expires_at > now => return Ok(Some(entry.route.clone())),
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write();
        if entries
            .get(key.as_str())
            .is_some_and(|entry| entry.expires_at <= now)
        {
            entries.remove(key.as_str());
        }

        Ok(None)
    }

    async fn put(
        &self,
        key: &RouteCacheKey,
        route: &RouteResult,
        ttl: Duration,
    ) -> Result<(), RouteCacheError> {
        self.entries.write().insert(
            key.as_str().to_string(),
            CacheEntry {
                route: route.clone(),
                expires_at: Instant::now() + ttl,
            },
        );

        Ok(())
    }

    async fn delete(&self, key: &RouteCacheKey) -> Result<(), RouteCacheError> {
        self.entries.write().remove(key.as_str());
        Ok(())
    }
}
