use async_trait::async_trait;
use jiff::Timestamp;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{coordinate::Coordinate, segment::Segment};

pub mod http;
pub mod in_memory;
pub mod resolver;

/// Tolerance used to match route segments to traffic records.
pub const DEFAULT_TOLERANCE_METERS: f64 = 100.0;

/// Congestion and weather observation for a stretch of road.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrafficRecord {
    /// Road geometry, a single point or a line string
    pub geometry: Vec<Coordinate>,

    #[serde(default)]
    pub congestion_factor: Option<f64>,

    #[serde(default)]
    pub weather_impact: Option<f64>,

    #[serde(default = "Timestamp::now")]
    pub last_updated: Timestamp,
}

impl TrafficRecord {
    /// `congestion_factor * weather_impact`, where missing, zero or
    /// non-finite factors count as 1.0.
    pub fn multiplier(&self) -> f64 {
        factor_or_neutral(self.congestion_factor) * factor_or_neutral(self.weather_impact)
    }
}

fn factor_or_neutral(factor: Option<f64>) -> f64 {
    factor
        .filter(|value| value.is_finite() && *value > 0.0)
        .unwrap_or(1.0)
}

#[derive(Debug, Error)]
pub enum TrafficStoreError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Invalid traffic record: {0}")]
    InvalidRecord(String),
}

/// Read access to the traffic and weather data.
#[async_trait]
pub trait TrafficStore: Send + Sync {
    /// Most recently updated record whose geometry lies within
    /// `tolerance_meters` of the segment.
    async fn most_recent_near(
        &self,
        segment: &Segment,
        tolerance_meters: f64,
    ) -> Result<Option<TrafficRecord>, TrafficStoreError>;
}

/// Query parameters of the nearest traffic record lookup over HTTP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NearestTrafficQuery {
    pub from_lat: f64,
    pub from_lng: f64,
    pub to_lat: f64,
    pub to_lng: f64,
    #[serde(default = "default_tolerance")]
    pub tolerance_meters: f64,
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE_METERS
}

impl NearestTrafficQuery {
    pub fn new(segment: &Segment, tolerance_meters: f64) -> Self {
        NearestTrafficQuery {
            from_lat: segment.start.lat,
            from_lng: segment.start.lng,
            to_lat: segment.end.lat,
            to_lng: segment.end.lng,
            tolerance_meters,
        }
    }

    pub fn segment(&self) -> Result<Segment, crate::error::RouteError> {
        Ok(Segment::new(
            Coordinate::new(self.from_lat, self.from_lng)?,
            Coordinate::new(self.to_lat, self.to_lng)?,
        ))
    }
}
