use courier_graphhopper::types::Instruction;
use jiff::Timestamp;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{coordinate::Coordinate, provider::ProviderRoute};

pub const MIN_TRAFFIC_MULTIPLIER: f64 = 1.0;
/// Worst slowdown traffic and weather can apply to a route.
pub const MAX_TRAFFIC_MULTIPLIER: f64 = 3.0;

/// Clamps into `[1.0, 3.0]`; NaN counts as no impact.
pub fn clamp_multiplier(multiplier: f64) -> f64 {
    if multiplier.is_nan() {
        MIN_TRAFFIC_MULTIPLIER
    } else {
        multiplier.clamp(MIN_TRAFFIC_MULTIPLIER, MAX_TRAFFIC_MULTIPLIER)
    }
}

pub fn adjust_duration(duration_ms: u64, multiplier: f64) -> u64 {
    (duration_ms as f64 * clamp_multiplier(multiplier)).round() as u64
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RouteResult {
    /// Meters
    #[serde(rename = "distance")]
    pub distance_meters: f64,

    /// Provider travel time in milliseconds, without traffic
    #[serde(rename = "time")]
    pub duration_ms: u64,

    pub points: Vec<Coordinate>,

    pub instructions: Vec<Instruction>,

    /// `[min_lng, min_lat, max_lng, max_lat]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<[f64; 4]>,

    #[serde(rename = "adjustedTime")]
    pub adjusted_duration_ms: u64,

    #[serde(rename = "trafficMultiplier")]
    pub traffic_multiplier: f64,

    #[serde(rename = "timestamp")]
    pub computed_at: Timestamp,

    #[serde(
        rename = "lastUpdate",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub last_update: Option<Timestamp>,
}

impl RouteResult {
    pub fn from_provider(route: ProviderRoute, multiplier: f64) -> Self {
        let traffic_multiplier = clamp_multiplier(multiplier);

        RouteResult {
            distance_meters: route.distance_meters,
            duration_ms: route.duration_ms,
            points: route.points,
            instructions: route.instructions,
            bbox: route.bbox,
            adjusted_duration_ms: adjust_duration(route.duration_ms, traffic_multiplier),
            traffic_multiplier,
            computed_at: Timestamp::now(),
            last_update: None,
        }
    }

    pub fn apply_multiplier(&mut self, multiplier: f64) {
        self.traffic_multiplier = clamp_multiplier(multiplier);
        self.adjusted_duration_ms = adjust_duration(self.duration_ms, self.traffic_multiplier);
    }

    /// Meters per millisecond, 0 for a zero duration.
    pub fn efficiency(&self) -> f64 {
        if self.adjusted_duration_ms == 0 {
            0.0
        } else {
            self.distance_meters / self.adjusted_duration_ms as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider_route(duration_ms: u64) -> ProviderRoute {
        ProviderRoute {
            distance_meters: 1000.0,
            duration_ms,
            points: vec![],
            instructions: vec![],
            bbox: None,
        }
    }

    #[test]
    fn adjusted_duration_clamps_multiplier() {
        let cases = [
            (0.0, 60_000),
            (0.5, 60_000),
            (1.0, 60_000),
            (1.5, 90_000),
            (3.0, 180_000),
            (4.2, 180_000),
            (f64::INFINITY, 180_000),
            (f64::NAN, 60_000),
        ];

        for (multiplier, expected) in cases {
            assert_eq!(adjust_duration(60_000, multiplier), expected, "{multiplier}");
        }
    }

    #[test]
    fn adjusted_duration_rounds_to_nearest_millisecond() {
        assert_eq!(adjust_duration(1001, 1.5), 1502);
        assert_eq!(adjust_duration(333, 1.001), 333);
        assert_eq!(adjust_duration(1000, 1.0006), 1001);
    }

    #[test]
    fn from_provider_keeps_invariant() {
        let route = RouteResult::from_provider(provider_route(60_000), 5.0);

        assert_eq!(route.traffic_multiplier, MAX_TRAFFIC_MULTIPLIER);
        assert_eq!(route.adjusted_duration_ms, 180_000);
        assert_eq!(route.duration_ms, 60_000);
    }

    #[test]
    fn apply_multiplier_recomputes_adjusted_duration() {
        let mut route = RouteResult::from_provider(provider_route(1000), 1.0);
        route.apply_multiplier(1.06);

        assert_eq!(route.adjusted_duration_ms, 1060);
        assert_eq!(route.traffic_multiplier, 1.06);
    }

    #[test]
    fn efficiency_is_zero_without_duration() {
        let route = RouteResult::from_provider(provider_route(0), 1.0);
        assert_eq!(route.efficiency(), 0.0);

        let route = RouteResult::from_provider(provider_route(100), 1.0);
        assert_eq!(route.efficiency(), 10.0);
    }

    #[test]
    fn serializes_with_wire_names() {
        let route = RouteResult::from_provider(provider_route(1000), 1.0);
        let json = serde_json::to_value(&route).unwrap();

        assert_eq!(json["distance"], 1000.0);
        assert_eq!(json["time"], 1000);
        assert_eq!(json["adjustedTime"], 1000);
        assert_eq!(json["trafficMultiplier"], 1.0);
        assert!(json.get("lastUpdate").is_none());
    }
}
