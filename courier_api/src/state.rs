use std::{sync::Arc, time::Duration};

use anyhow::Context;
use courier_graphhopper::client::GraphHopperRouteClient;
use courier_routing::{
    cache::{RouteCache, in_memory::InMemoryRouteCache, redis::RedisRouteCache},
    service::RouteService,
    traffic::{
        TrafficStore,
        http::{HttpTrafficStore, HttpTrafficStoreParams},
        in_memory::InMemoryTrafficStore,
    },
};
use tracing::{debug, info};

use crate::config::Args;

const CACHE_PURGE_INTERVAL: Duration = Duration::from_secs(60);

pub struct AppState {
    pub route_service: RouteService,
    pub traffic_store: Arc<dyn TrafficStore>,
    /// Set when traffic is held in memory and can be fed over HTTP
    pub traffic_ingest: Option<Arc<InMemoryTrafficStore>>,
}

impl AppState {
    pub async fn from_args(args: &Args) -> anyhow::Result<Self> {
        let provider = GraphHopperRouteClient::new(args.graphhopper_params()?)
            .context("Failed to build GraphHopper client")?;
        info!(profile = %provider.profile(), "Using GraphHopper routing");

        let (traffic_store, traffic_ingest) = match &args.traffic_store_url {
            Some(base_url) => {
                info!(%base_url, "Using remote traffic store");
                let store = HttpTrafficStore::new(HttpTrafficStoreParams {
                    base_url: base_url.clone(),
                    timeout: args.request_timeout(),
                })
                .context("Failed to build traffic store client")?;
                (Arc::new(store) as Arc<dyn TrafficStore>, None)
            }
            None => {
                info!("Using in-memory traffic store");
                let store = Arc::new(InMemoryTrafficStore::new());
                (store.clone() as Arc<dyn TrafficStore>, Some(store))
            }
        };

        let cache: Arc<dyn RouteCache> = match &args.redis_url {
            Some(redis_url) => {
                info!("Using redis route cache");
                Arc::new(
                    RedisRouteCache::connect(redis_url)
                        .await
                        .context("Failed to connect to redis")?,
                )
            }
            None => {
                info!("Using in-memory route cache");
                let cache = Arc::new(InMemoryRouteCache::new());
                spawn_cache_purge(cache.clone());
                cache
            }
        };

        Ok(AppState {
            route_service: RouteService::new(
                Arc::new(provider),
                traffic_store.clone(),
                cache,
                args.service_config(),
            ),
            traffic_store,
            traffic_ingest,
        })
    }
}

fn spawn_cache_purge(cache: Arc<InMemoryRouteCache>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CACHE_PURGE_INTERVAL);
        loop {
            interval.tick().await;
            let purged = cache.purge_expired();
            if purged > 0 {
                debug!(purged, remaining = cache.len(), "Purged expired routes");
            }
        }
    });
}
