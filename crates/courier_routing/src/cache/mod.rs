use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::{coordinate::Coordinate, route::RouteResult};

pub mod in_memory;
pub mod redis;

#[derive(Debug, Error)]
pub enum RouteCacheError {
    #[error("Cache backend failure: {0}")]
    Backend(String),

    #[error("Cached route could not be (de)serialized: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Deterministic cache key, either derived from route coordinates or from an
/// active route identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteCacheKey(String);

impl RouteCacheKey {
    /// `route:<origin>:<destination>[:via:<waypoint>;...]`
    pub fn for_route(
        origin: &Coordinate,
        destination: &Coordinate,
        waypoints: &[Coordinate],
    ) -> Self {
        let mut key = format!(
            "route:{}:{}",
            origin.key_fragment(),
            destination.key_fragment()
        );

        if !waypoints.is_empty() {
            key.push_str(":via:");
            key.push_str(
                &waypoints
                    .iter()
                    .map(Coordinate::key_fragment)
                    .collect::<Vec<_>>()
                    .join(";"),
            );
        }

        RouteCacheKey(key)
    }

    pub fn active_route(route_id: &str) -> Self {
        RouteCacheKey(format!("active_route:{route_id}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RouteCacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Expiring key-value store for computed routes. Entries are never
/// invalidated before their TTL elapses.
#[async_trait]
pub trait RouteCache: Send + Sync {
    async fn get(&self, key: &RouteCacheKey) -> Result<Option<RouteResult>, RouteCacheError>;

    /// Overwrites any existing entry for `key`.
    async fn put(
        &self,
        key: &RouteCacheKey,
        route: &RouteResult,
        ttl: Duration,
    ) -> Result<(), RouteCacheError>;

    async fn delete(&self, key: &RouteCacheKey) -> Result<(), RouteCacheError>;
}
