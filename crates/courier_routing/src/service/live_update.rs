use jiff::Timestamp;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{cache::RouteCacheKey, error::RouteError, segment::to_segments};

use super::RouteService;

/// Change of a tracked route's estimated travel time under current traffic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LiveUpdate {
    pub route_id: String,
    pub current_traffic_multiplier: f64,
    /// Adjusted travel time in milliseconds
    pub new_estimated_time: u64,
    pub previous_estimated_time: u64,
    /// Rounded to 2 decimals
    pub time_change_percent: f64,
    pub significant_change: bool,
    pub timestamp: Timestamp,
}

/// Absolute change relative to `previous`. A route that had no duration
/// and gains one counts as a 100% change.
pub fn time_change_percent(previous: u64, new: u64) -> f64 {
    if previous == 0 {
        return if new == 0 { 0.0 } else { 100.0 };
    }

    previous.abs_diff(new) as f64 / previous as f64 * 100.0
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl RouteService {
    /// Re-evaluates a tracked route against current traffic. The geometry
    /// is reused as cached, the provider is not called.
    #[instrument(skip(self))]
    pub async fn live_update(&self, route_id: &str) -> Result<LiveUpdate, RouteError> {
        let key = RouteCacheKey::active_route(route_id);
        let mut route = self.active_route(&key, route_id).await?;

        let multiplier = self
            .resolver
            .resolve_multiplier(&to_segments(&route.points))
            .await;

        let previous = route.adjusted_duration_ms;
        route.apply_multiplier(multiplier);

        let change = time_change_percent(previous, route.adjusted_duration_ms);
        let significant_change = change > self.config.significant_change_percent;
        let timestamp = Timestamp::now();

        route.last_update = Some(timestamp);
        self.store(&key, &route, self.config.active_route_ttl).await;

        info!(
            route_id,
            multiplier = route.traffic_multiplier,
            change_percent = change,
            significant_change,
            "Live route update"
        );

        Ok(LiveUpdate {
            route_id: route_id.to_string(),
            current_traffic_multiplier: route.traffic_multiplier,
            new_estimated_time: route.adjusted_duration_ms,
            previous_estimated_time: previous,
            time_change_percent: round_to_hundredths(change),
            significant_change,
            timestamp,
        })
    }
}
