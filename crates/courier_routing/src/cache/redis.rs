use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::{RedisConnectionManager, bb8, redis::AsyncCommands};
use tracing::debug;

use crate::route::RouteResult;

use super::{RouteCache, RouteCacheError, RouteCacheKey};

/// Routes stored as JSON strings with `SETEX`.
pub struct RedisRouteCache {
    pool: bb8::Pool<RedisConnectionManager>,
}

impl RedisRouteCache {
    pub async fn connect(redis_url: &str) -> Result<Self, RouteCacheError> {
        let manager = RedisConnectionManager::new(redis_url).map_err(backend)?;
        let pool = bb8::Pool::builder()
            .connection_timeout(Duration::from_secs(5))
            .build(manager)
            .await
            .map_err(backend)?;

        Ok(Self { pool })
    }

    async fn connection(
        &self,
    ) -> Result<bb8::PooledConnection<'_, RedisConnectionManager>, RouteCacheError> {
        self.pool.get().await.map_err(backend)
    }
}

fn backend(error: impl std::fmt::Display) -> RouteCacheError {
    RouteCacheError::Backend(error.to_string())
}

#[async_trait]
impl RouteCache for RedisRouteCache {
    async fn get(&self, key: &RouteCacheKey) -> Result<Option<RouteResult>, RouteCacheError> {
        let mut connection = self.connection().await?;
        let value: Option<String> = (*connection).get(key.as_str()).await.map_err(backend)?;

        match value {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }

    async fn put(
        &self,
        key: &RouteCacheKey,
        route: &RouteResult,
        ttl: Duration,
    ) -> Result<(), RouteCacheError> {
        let payload = serde_json::to_string(route)?;
        let seconds = ttl.as_secs().max(1);

        let mut connection = self.connection().await?;
        (*connection)
            .set_ex::<_, _, ()>(key.as_str(), payload, seconds)
            .await
            .map_err(backend)?;

        debug!(cache_key = %key, ttl_secs = seconds, "Stored route in redis");
        Ok(())
    }

    async fn delete(&self, key: &RouteCacheKey) -> Result<(), RouteCacheError> {
        let mut connection = self.connection().await?;
        (*connection)
            .del::<_, ()>(key.as_str())
            .await
            .map_err(backend)?;

        Ok(())
    }
}
