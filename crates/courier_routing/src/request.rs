use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{cache::RouteCacheKey, coordinate::Coordinate, error::RouteError};

/// Route request as received from callers. Origin and destination are
/// required, waypoints are `[lat, lng]` pairs and default to none.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteSpec {
    pub start_lat: Option<f64>,
    pub start_lng: Option<f64>,
    pub end_lat: Option<f64>,
    pub end_lng: Option<f64>,
    #[serde(default)]
    pub waypoints: Vec<[f64; 2]>,
}

impl RouteSpec {
    pub fn new(origin: Coordinate, destination: Coordinate) -> Self {
        RouteSpec {
            start_lat: Some(origin.lat),
            start_lng: Some(origin.lng),
            end_lat: Some(destination.lat),
            end_lng: Some(destination.lng),
            waypoints: vec![],
        }
    }

    pub fn with_waypoints(mut self, waypoints: &[Coordinate]) -> Self {
        self.waypoints = waypoints.iter().map(|w| [w.lat, w.lng]).collect();
        self
    }

    pub fn validate(&self) -> Result<RouteRequest, RouteError> {
        let missing: Vec<&str> = [
            ("startLat", self.start_lat),
            ("startLng", self.start_lng),
            ("endLat", self.end_lat),
            ("endLng", self.end_lng),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| name)
        .collect();

        let (Some(start_lat), Some(start_lng), Some(end_lat), Some(end_lng)) =
            (self.start_lat, self.start_lng, self.end_lat, self.end_lng)
        else {
            return Err(RouteError::MissingCoordinates(missing.join(", ")));
        };

        let waypoints = self
            .waypoints
            .iter()
            .map(|&[lat, lng]| Coordinate::new(lat, lng))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RouteRequest {
            origin: Coordinate::new(start_lat, start_lng)?,
            destination: Coordinate::new(end_lat, end_lng)?,
            waypoints,
        })
    }
}

/// Validated route request.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub waypoints: Vec<Coordinate>,
}

impl RouteRequest {
    pub fn cache_key(&self) -> RouteCacheKey {
        RouteCacheKey::for_route(&self.origin, &self.destination, &self.waypoints)
    }

    /// Origin, waypoints and destination in travel order.
    pub fn points(&self) -> Vec<Coordinate> {
        let mut points = Vec::with_capacity(self.waypoints.len() + 2);
        points.push(self.origin);
        points.extend_from_slice(&self.waypoints);
        points.push(self.destination);
        points
    }
}

/// Route currently followed by a driver, used as the baseline when looking
/// for alternatives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CurrentRoute {
    #[serde(flatten)]
    pub spec: RouteSpec,

    /// Traffic adjusted travel time in milliseconds
    pub adjusted_time: u64,
}
