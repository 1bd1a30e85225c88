use async_trait::async_trait;
use courier_graphhopper::{
    client::{GraphHopperError, GraphHopperRoute, GraphHopperRouteClient},
    types::Instruction,
};
use tracing::warn;

use crate::{coordinate::Coordinate, error::RouteError, request::RouteRequest};

/// Raw route from the routing provider, before any traffic adjustment.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRoute {
    pub distance_meters: f64,
    pub duration_ms: u64,
    pub points: Vec<Coordinate>,
    pub instructions: Vec<Instruction>,
    pub bbox: Option<[f64; 4]>,
}

impl From<GraphHopperRoute> for ProviderRoute {
    fn from(route: GraphHopperRoute) -> Self {
        ProviderRoute {
            distance_meters: route.distance,
            duration_ms: route.time,
            points: route.points.into_iter().map(Coordinate::from).collect(),
            instructions: route.instructions,
            bbox: route.bbox,
        }
    }
}

#[async_trait]
pub trait RouteProvider: Send + Sync {
    /// Fails with [`RouteError::RouteUnavailable`] when no route can be
    /// obtained.
    async fn compute_route(&self, request: &RouteRequest) -> Result<ProviderRoute, RouteError>;
}

#[async_trait]
impl RouteProvider for GraphHopperRouteClient {
    async fn compute_route(&self, request: &RouteRequest) -> Result<ProviderRoute, RouteError> {
        match self.fetch_route(&request.points()).await {
            Ok(route) => Ok(route.into()),
            Err(error) => {
                warn!(%error, "GraphHopper route request failed");
                Err(unavailable(error))
            }
        }
    }
}

fn unavailable(error: GraphHopperError) -> RouteError {
    match error {
        GraphHopperError::Request(error) if error.is_timeout() => {
            RouteError::RouteUnavailable(String::from("routing provider timed out"))
        }
        error => RouteError::RouteUnavailable(error.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use geo_types::Coord;

    use super::*;

    #[test]
    fn should_convert_lng_lat_points() {
        let route = ProviderRoute::from(GraphHopperRoute {
            distance: 1000.0,
            time: 60_000,
            points: vec![Coord { x: 4.35, y: 50.85 }],
            instructions: vec![],
            bbox: None,
        });

        assert_eq!(route.points, vec![Coordinate { lat: 50.85, lng: 4.35 }]);
        assert_eq!(route.duration_ms, 60_000);
    }

    #[test]
    fn should_map_missing_path_to_unavailable() {
        assert_eq!(
            unavailable(GraphHopperError::NoPath),
            RouteError::RouteUnavailable(String::from("No path found"))
        );
    }
}
