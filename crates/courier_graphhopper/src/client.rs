use std::time::Duration;

use geo_types::Coord;
use thiserror::Error;
use tracing::debug;

use crate::{
    polyline::PolylineError,
    profile::GraphHopperProfile,
    types::{GHPoint, Instruction, RouteRequestBody, RouteResponse},
};

#[derive(Debug, Error)]
pub enum GraphHopperError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("No path found")]
    NoPath,

    #[error("Invalid geometry: {0}")]
    Polyline(#[from] PolylineError),

    #[error("Route needs at least 2 points, got {0}")]
    NotEnoughPoints(usize),
}

pub const GRAPHHOPPER_ROUTE_API_URL: &str = "https://graphhopper.com/api/1/route";

pub struct GraphHopperRouteClientParams {
    pub api_key: String,
    pub url: String,
    pub profile: GraphHopperProfile,
    pub locale: String,
    pub timeout: Duration,
}

impl GraphHopperRouteClientParams {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            url: GRAPHHOPPER_ROUTE_API_URL.to_string(),
            profile: GraphHopperProfile::Car,
            locale: String::from("en"),
            timeout: Duration::from_secs(10),
        }
    }
}

/// First path candidate of a GraphHopper response, without any traffic
/// adjustment.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphHopperRoute {
    pub distance: f64,
    pub time: u64,
    /// `x` is the longitude, `y` the latitude
    pub points: Vec<Coord<f64>>,
    pub instructions: Vec<Instruction>,
    pub bbox: Option<[f64; 4]>,
}

pub struct GraphHopperRouteClient {
    params: GraphHopperRouteClientParams,
    client: reqwest::Client,
}

impl GraphHopperRouteClient {
    pub fn new(params: GraphHopperRouteClientParams) -> Result<Self, GraphHopperError> {
        let client = reqwest::Client::builder().timeout(params.timeout).build()?;

        Ok(Self { params, client })
    }

    pub fn profile(&self) -> GraphHopperProfile {
        self.params.profile
    }

    pub async fn fetch_route<P>(&self, points: &[P]) -> Result<GraphHopperRoute, GraphHopperError>
    where
        for<'a> &'a P: Into<geo_types::Point>,
    {
        if points.len() < 2 {
            return Err(GraphHopperError::NotEnoughPoints(points.len()));
        }

        let gh_points: Vec<GHPoint> = points
            .iter()
            .map(|p| {
                let point: geo_types::Point = p.into();
                [point.x(), point.y()]
            })
            .collect();

        let body = RouteRequestBody {
            points: gh_points,
            profile: self.params.profile.to_string(),
            locale: self.params.locale.clone(),
            instructions: true,
            calc_points: true,
            points_encoded: true,
        };

        debug!(
            points = body.points.len(),
            profile = %body.profile,
            "GraphHopperApi: Requesting route"
        );

        let response = self
            .client
            .post(&self.params.url)
            .query(&[("key", &self.params.api_key)])
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(GraphHopperError::Api { status, message });
        }

        let route_response: RouteResponse = response.json().await?;
        first_route(route_response)
    }
}

pub fn first_route(response: RouteResponse) -> Result<GraphHopperRoute, GraphHopperError> {
    let path = response
        .paths
        .into_iter()
        .next()
        .ok_or(GraphHopperError::NoPath)?;

    let points = path.decode_points()?;

    Ok(GraphHopperRoute {
        distance: path.distance,
        time: path.time,
        points,
        instructions: path.instructions,
        bbox: path.bbox,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_fail_without_paths() {
        let response: RouteResponse = serde_json::from_str(r#"{ "paths": [] }"#).unwrap();
        assert!(matches!(first_route(response), Err(GraphHopperError::NoPath)));
    }

    #[test]
    fn should_pick_first_path() {
        let response: RouteResponse = serde_json::from_str(
            r#"{ "paths": [
                { "distance": 1000.0, "time": 60000, "points": "??" },
                { "distance": 900.0, "time": 90000, "points": "??" }
            ] }"#,
        )
        .unwrap();

        let route = first_route(response).unwrap();
        assert_eq!(route.distance, 1000.0);
        assert_eq!(route.time, 60000);
        assert_eq!(route.points, vec![Coord { x: 0.0, y: 0.0 }]);
        assert!(route.instructions.is_empty());
    }

    #[test]
    fn should_surface_invalid_geometry() {
        let response: RouteResponse =
            serde_json::from_str(r#"{ "paths": [{ "distance": 1.0, "time": 1, "points": "_p~i" }] }"#)
                .unwrap();
        assert!(matches!(
            first_route(response),
            Err(GraphHopperError::Polyline(PolylineError::Truncated(4)))
        ));
    }

    struct LngLat(f64, f64);

    impl From<&LngLat> for geo_types::Point {
        fn from(value: &LngLat) -> Self {
            geo_types::Point::new(value.0, value.1)
        }
    }

    #[tokio::test]
    async fn should_reject_single_point() {
        let client =
            GraphHopperRouteClient::new(GraphHopperRouteClientParams::new(String::from("key")))
                .unwrap();
        let points = [LngLat(4.35, 50.85)];

        assert!(matches!(
            client.fetch_route(&points).await,
            Err(GraphHopperError::NotEnoughPoints(1))
        ));
    }
}
