use std::{sync::Arc, time::Duration};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::{
    cache::{RouteCache, RouteCacheKey},
    error::RouteError,
    provider::RouteProvider,
    request::{RouteRequest, RouteSpec},
    route::RouteResult,
    segment::to_segments,
    traffic::{
        TrafficStore,
        resolver::{MultiplierResolver, MultiplierResolverParams},
    },
};

mod alternatives;
mod comparison;
mod live_update;

pub use alternatives::{
    AlternativeRoute, DEFAULT_REROUTE_REASON, RouteAlternatives, detour_waypoint,
};
pub use comparison::{ComparedRoute, ComparisonPicks, RouteComparison};
pub use live_update::{LiveUpdate, time_change_percent};

#[derive(Debug, Clone)]
pub struct RouteServiceConfig {
    /// TTL of point-to-point routes
    pub route_ttl: Duration,
    /// TTL of tracked routes, refreshed on every live update
    pub active_route_ttl: Duration,
    /// Live updates above this change are flagged as significant
    pub significant_change_percent: f64,
    pub alternative_count: usize,
    pub traffic: MultiplierResolverParams,
}

impl Default for RouteServiceConfig {
    fn default() -> Self {
        Self {
            route_ttl: Duration::from_secs(300),
            active_route_ttl: Duration::from_secs(3600),
            significant_change_percent: 5.0,
            alternative_count: 3,
            traffic: MultiplierResolverParams::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrackedRoute {
    pub route_id: String,
    pub route: RouteResult,
}

/// Composes the routing provider, the traffic store and the route cache.
///
/// Stateless apart from the cache, a single instance is shared by all
/// requests.
pub struct RouteService {
    provider: Arc<dyn RouteProvider>,
    resolver: MultiplierResolver,
    cache: Arc<dyn RouteCache>,
    config: RouteServiceConfig,
}

impl RouteService {
    pub fn new(
        provider: Arc<dyn RouteProvider>,
        traffic_store: Arc<dyn TrafficStore>,
        cache: Arc<dyn RouteCache>,
        config: RouteServiceConfig,
    ) -> Self {
        RouteService {
            provider,
            resolver: MultiplierResolver::new(traffic_store, config.traffic.clone()),
            cache,
            config,
        }
    }

    /// Traffic adjusted route, served from the cache while the entry lives.
    #[instrument(skip_all)]
    pub async fn compute_route(&self, spec: &RouteSpec) -> Result<RouteResult, RouteError> {
        let request = spec.validate()?;
        let key = request.cache_key();

        match self.cache.get(&key).await {
            Ok(Some(route)) => {
                debug!(cache_key = %key, "Route cache hit");
                return Ok(route);
            }
            Ok(None) => debug!(cache_key = %key, "Route cache miss"),
            Err(error) => warn!(%error, cache_key = %key, "Route cache read failed, recomputing"),
        }

        let route = self.compute_uncached(&request).await?;
        self.store(&key, &route, self.config.route_ttl).await;

        Ok(route)
    }

    /// Computes the route and registers it under a new identifier for live
    /// updates.
    #[instrument(skip_all)]
    pub async fn track_route(&self, spec: &RouteSpec) -> Result<TrackedRoute, RouteError> {
        let route = self.compute_route(spec).await?;
        let route_id = Uuid::new_v4().to_string();
        let key = RouteCacheKey::active_route(&route_id);

        self.cache
            .put(&key, &route, self.config.active_route_ttl)
            .await
            .map_err(|error| RouteError::CacheUnavailable(error.to_string()))?;

        info!(route_id = %route_id, "Tracking route");
        Ok(TrackedRoute { route_id, route })
    }

    pub async fn get_active_route(&self, route_id: &str) -> Result<RouteResult, RouteError> {
        self.active_route(&RouteCacheKey::active_route(route_id), route_id)
            .await
    }

    /// Unknown identifiers are ignored.
    pub async fn stop_tracking(&self, route_id: &str) -> Result<(), RouteError> {
        self.cache
            .delete(&RouteCacheKey::active_route(route_id))
            .await
            .map_err(|error| RouteError::CacheUnavailable(error.to_string()))?;

        info!(route_id, "Stopped tracking route");
        Ok(())
    }

    async fn active_route(
        &self,
        key: &RouteCacheKey,
        route_id: &str,
    ) -> Result<RouteResult, RouteError> {
        self.cache
            .get(key)
            .await
            .map_err(|error| RouteError::CacheUnavailable(error.to_string()))?
            .ok_or_else(|| RouteError::RouteNotFound(route_id.to_string()))
    }

    /// Provider route adjusted with the current traffic, bypassing the cache.
    async fn compute_uncached(&self, request: &RouteRequest) -> Result<RouteResult, RouteError> {
        let provider_route = self
            .provider
            .compute_route(request)
            .await?;

        let segments = to_segments(&provider_route.points);
        let multiplier = self.resolver.resolve_multiplier(&segments).await;
        let route = RouteResult::from_provider(provider_route, multiplier);

        info!(
            distance_meters = route.distance_meters,
            duration_ms = route.duration_ms,
            adjusted_duration_ms = route.adjusted_duration_ms,
            multiplier = route.traffic_multiplier,
            "Computed route"
        );

        Ok(route)
    }

    /// Write failures never fail the request.
    async fn store(&self, key: &RouteCacheKey, route: &RouteResult, ttl: Duration) {
        if let Err(error) = self.cache.put(key, route, ttl).await {
            warn!(%error, cache_key = %key, "Failed to cache route");
        }
    }
}
