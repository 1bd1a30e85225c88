use std::{sync::Arc, time::Duration};

use futures::{StreamExt, stream};
use tracing::{debug, warn};

use crate::{
    route::{MIN_TRAFFIC_MULTIPLIER, clamp_multiplier},
    segment::Segment,
};

use super::{DEFAULT_TOLERANCE_METERS, TrafficStore};

#[derive(Debug, Clone)]
pub struct MultiplierResolverParams {
    pub tolerance_meters: f64,
    /// Per segment lookup timeout
    pub lookup_timeout: Duration,
    /// Segment lookups in flight at once
    pub concurrency: usize,
}

impl Default for MultiplierResolverParams {
    fn default() -> Self {
        Self {
            tolerance_meters: DEFAULT_TOLERANCE_METERS,
            lookup_timeout: Duration::from_secs(10),
            concurrency: 8,
        }
    }
}

/// Derives the traffic multiplier of a route from its segments.
///
/// The worst segment decides for the whole route: a single heavily congested
/// stretch delays the arrival no matter how clear the rest of the road is.
pub struct MultiplierResolver {
    store: Arc<dyn TrafficStore>,
    params: MultiplierResolverParams,
}

impl MultiplierResolver {
    pub fn new(store: Arc<dyn TrafficStore>, params: MultiplierResolverParams) -> Self {
        Self { store, params }
    }

    pub async fn resolve_multiplier(&self, segments: &[Segment]) -> f64 {
        let lookups: Vec<_> = segments
            .iter()
            .map(|segment| self.segment_multiplier(segment))
            .collect();
        let multipliers: Vec<f64> = stream::iter(lookups)
            .buffered(self.params.concurrency.max(1))
            .collect()
            .await;

        let multiplier = aggregate_multipliers(&multipliers);
        debug!(segments = segments.len(), multiplier, "Resolved traffic multiplier");
        multiplier
    }

    /// Missing data, store failures and timeouts all count as no impact.
    async fn segment_multiplier(&self, segment: &Segment) -> f64 {
        let lookup = self
            .store
            .most_recent_near(segment, self.params.tolerance_meters);

        match tokio::time::timeout(self.params.lookup_timeout, lookup).await {
            Ok(Ok(Some(record))) => record.multiplier(),
            Ok(Ok(None)) => MIN_TRAFFIC_MULTIPLIER,
            Ok(Err(error)) => {
                warn!(%error, "Traffic lookup failed, ignoring segment");
                MIN_TRAFFIC_MULTIPLIER
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.params.lookup_timeout.as_millis() as u64,
                    "Traffic lookup timed out, ignoring segment"
                );
                MIN_TRAFFIC_MULTIPLIER
            }
        }
    }
}

/// Maximum of the segment multipliers, clamped into `[1.0, 3.0]`.
pub fn aggregate_multipliers(multipliers: &[f64]) -> f64 {
    clamp_multiplier(
        multipliers
            .iter()
            .copied()
            .filter(|m| !m.is_nan())
            .fold(MIN_TRAFFIC_MULTIPLIER, f64::max),
    )
}
