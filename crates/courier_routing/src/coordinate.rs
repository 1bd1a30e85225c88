use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::RouteError;

/// WGS84 position in degrees.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Result<Self, RouteError> {
        let coordinate = Coordinate { lat, lng };
        if coordinate.is_valid() {
            Ok(coordinate)
        } else {
            Err(RouteError::InvalidCoordinates(format!(
                "({lat}, {lng}) is outside of [-90, 90] x [-180, 180]"
            )))
        }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// Rounded to 5 decimals (~1 m) for use in cache keys.
    pub fn key_fragment(&self) -> String {
        format!("{:.5},{:.5}", key_degrees(self.lat), key_degrees(self.lng))
    }
}

/// Rounded value with `-0.0` folded into `0.0`, so both sides of zero share a key.
fn key_degrees(value: f64) -> f64 {
    (value * 1e5).round() / 1e5 + 0.0
}

impl From<&Coordinate> for geo_types::Point {
    fn from(value: &Coordinate) -> Self {
        geo_types::Point::new(value.lng, value.lat)
    }
}

impl From<geo_types::Coord<f64>> for Coordinate {
    fn from(value: geo_types::Coord<f64>) -> Self {
        Coordinate {
            lat: value.y,
            lng: value.x,
        }
    }
}
