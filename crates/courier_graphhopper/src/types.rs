use geo_types::Coord;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::polyline::{self, DEFAULT_MULTIPLIER, PolylineError};

/// GraphHopper expects `[lng, lat]`
pub type GHPoint = [f64; 2];

#[derive(Debug, Clone, Serialize)]
pub struct RouteRequestBody {
    /// Ordered points: origin, waypoints, destination
    pub points: Vec<GHPoint>,

    /// Routing profile (e.g., "car", "bike", "foot")
    pub profile: String,

    pub locale: String,

    pub instructions: bool,

    pub calc_points: bool,

    pub points_encoded: bool,
}

#[derive(Debug, Deserialize)]
pub struct RouteResponse {
    #[serde(default)]
    pub paths: Vec<ResponsePath>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePath {
    /// Distance in meters
    pub distance: f64,

    /// Travel time in milliseconds
    pub time: u64,

    pub points: Option<ResponsePoints>,

    #[serde(default)]
    pub points_encoded_multiplier: Option<f64>,

    #[serde(default)]
    pub instructions: Vec<Instruction>,

    /// `[min_lng, min_lat, max_lng, max_lat]`
    #[serde(default)]
    pub bbox: Option<[f64; 4]>,
}

/// Geometry is a polyline string when `points_encoded` is set, a GeoJSON
/// LineString otherwise.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ResponsePoints {
    Encoded(String),
    LineString { coordinates: Vec<Vec<f64>> },
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct Instruction {
    pub text: String,

    /// Distance in meters until the next instruction
    pub distance: f64,

    /// Duration in milliseconds until the next instruction
    pub time: u64,

    pub sign: i32,

    /// Indices into the route points covered by this instruction
    #[serde(default)]
    pub interval: Option<[usize; 2]>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street_name: Option<String>,
}

impl ResponsePath {
    pub fn decode_points(&self) -> Result<Vec<Coord<f64>>, PolylineError> {
        match &self.points {
            None => Ok(vec![]),
            Some(ResponsePoints::Encoded(encoded)) => polyline::decode(
                encoded,
                self.points_encoded_multiplier.unwrap_or(DEFAULT_MULTIPLIER),
            ),
            Some(ResponsePoints::LineString { coordinates }) => Ok(coordinates
                .iter()
                .filter(|position| position.len() >= 2)
                .map(|position| Coord {
                    x: position[0],
                    y: position[1],
                })
                .collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_deserialize_encoded_path() {
        let json = r#"{
            "paths": [{
                "distance": 1234.5,
                "time": 98000,
                "points": "_p~iF~ps|U_ulLnnqC",
                "points_encoded": true,
                "points_encoded_multiplier": 100000.0,
                "bbox": [-120.95, 38.5, -120.2, 40.7],
                "instructions": [
                    { "text": "Continue onto Main St", "distance": 1000.0, "time": 80000, "sign": 0, "interval": [0, 1], "street_name": "Main St" },
                    { "text": "Arrive at destination", "distance": 0.0, "time": 0, "sign": 4, "interval": [1, 1] }
                ]
            }]
        }"#;

        let response: RouteResponse = serde_json::from_str(json).unwrap();
        let path = &response.paths[0];

        assert_eq!(path.time, 98000);
        assert_eq!(path.instructions.len(), 2);
        assert_eq!(path.instructions[0].street_name.as_deref(), Some("Main St"));
        assert_eq!(path.instructions[1].street_name, None);
        assert_eq!(path.bbox, Some([-120.95, 38.5, -120.2, 40.7]));

        let points = path.decode_points().unwrap();
        assert_eq!(points.len(), 2);
        assert!((points[1].y - 40.7).abs() < 1e-9);
    }

    #[test]
    fn should_deserialize_geojson_path() {
        let json = r#"{
            "paths": [{
                "distance": 10.0,
                "time": 1000,
                "points": { "type": "LineString", "coordinates": [[4.35, 50.85], [4.36, 50.86]] }
            }]
        }"#;

        let response: RouteResponse = serde_json::from_str(json).unwrap();
        let points = response.paths[0].decode_points().unwrap();

        assert_eq!(points, vec![Coord { x: 4.35, y: 50.85 }, Coord { x: 4.36, y: 50.86 }]);
    }

    #[test]
    fn should_default_missing_paths_to_empty() {
        let response: RouteResponse = serde_json::from_str(r#"{ "hints": {} }"#).unwrap();
        assert!(response.paths.is_empty());
    }
}
