use futures::future::join_all;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::{
    coordinate::Coordinate,
    error::RouteError,
    geometry::LocalProjection,
    request::{CurrentRoute, RouteRequest},
    route::RouteResult,
};

use super::RouteService;

pub const DEFAULT_REROUTE_REASON: &str = "traffic";

/// Detour offset as a share of the straight line distance.
const DETOUR_OFFSET_RATIO: f64 = 0.15;
const MIN_DETOUR_OFFSET_METERS: f64 = 250.0;
const MAX_DETOUR_OFFSET_METERS: f64 = 5_000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AlternativeRoute {
    #[serde(flatten)]
    pub route: RouteResult,

    /// Milliseconds saved compared to the current route, negative when
    /// slower
    pub improvement: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RouteAlternatives {
    /// Sorted by descending improvement
    pub alternatives: Vec<AlternativeRoute>,
    pub reason: String,
    pub recommended: Option<AlternativeRoute>,
}

/// Point beside the midpoint of the straight line between `origin` and
/// `destination`. Positive `side` goes left of the travel direction,
/// negative goes right, its magnitude scales the offset.
pub fn detour_waypoint(
    origin: &Coordinate,
    destination: &Coordinate,
    side: f64,
) -> Option<Coordinate> {
    let projection = LocalProjection::new(*origin);
    let [dx, dy] = projection.project(destination);
    let length = dx.hypot(dy);
    if length < 1.0 {
        return None;
    }

    let offset = (length * DETOUR_OFFSET_RATIO)
        .clamp(MIN_DETOUR_OFFSET_METERS, MAX_DETOUR_OFFSET_METERS)
        * side;
    let (normal_x, normal_y) = (-dy / length, dx / length);

    Some(projection.unproject([
        dx / 2.0 + normal_x * offset,
        dy / 2.0 + normal_y * offset,
    ]))
}

/// Waypoints of each alternative: the unmodified request first, then
/// detours alternating left and right, further out every other pair.
fn alternative_waypoints(request: &RouteRequest, count: usize) -> Vec<Vec<Coordinate>> {
    let mut variants = Vec::with_capacity(count);
    if count == 0 {
        return variants;
    }
    variants.push(request.waypoints.clone());

    for index in 1..count {
        let side = if index % 2 == 1 { 1.0 } else { -1.0 };
        let scale = index.div_ceil(2) as f64;

        let Some(detour) = detour_waypoint(&request.origin, &request.destination, side * scale)
        else {
            debug!("Origin and destination too close for a detour");
            break;
        };

        variants.push(insert_detour(request, detour));
    }

    variants
}

/// Inserts the detour among the existing waypoints where it falls along
/// the origin to destination line.
fn insert_detour(request: &RouteRequest, detour: Coordinate) -> Vec<Coordinate> {
    let projection = LocalProjection::new(request.origin);
    let [dx, dy] = projection.project(&request.destination);
    let progress = |coordinate: &Coordinate| {
        let [x, y] = projection.project(coordinate);
        x * dx + y * dy
    };

    let detour_progress = progress(&detour);
    let position = request
        .waypoints
        .iter()
        .position(|waypoint| progress(waypoint) > detour_progress)
        .unwrap_or(request.waypoints.len());

    let mut waypoints = request.waypoints.clone();
    waypoints.insert(position, detour);
    waypoints
}

fn same_route(a: &RouteResult, b: &RouteResult) -> bool {
    a.distance_meters == b.distance_meters
        && a.duration_ms == b.duration_ms
        && a.points.len() == b.points.len()
}

impl RouteService {
    /// Alternatives to a route currently followed, ranked by the time they
    /// save under current traffic.
    #[instrument(skip_all)]
    pub async fn generate_alternatives(
        &self,
        current: &CurrentRoute,
        reason: Option<String>,
    ) -> Result<RouteAlternatives, RouteError> {
        let request = current.spec.validate()?;
        let reason = reason.unwrap_or_else(|| DEFAULT_REROUTE_REASON.to_string());

        let variants = alternative_waypoints(&request, self.config.alternative_count)
            .into_iter()
            .map(|waypoints| RouteRequest {
                origin: request.origin,
                destination: request.destination,
                waypoints,
            })
            .collect::<Vec<_>>();

        let results = join_all(variants.iter().map(|variant| self.compute_uncached(variant))).await;

        let mut routes: Vec<RouteResult> = Vec::with_capacity(results.len());
        for (index, result) in results.into_iter().enumerate() {
            match result {
                Ok(route) if routes.iter().any(|existing| same_route(existing, &route)) => {
                    debug!(index, "Dropping duplicate alternative");
                }
                Ok(route) => routes.push(route),
                Err(error) => warn!(index, %error, "Skipping alternative that could not be computed"),
            }
        }

        let current_time = current.adjusted_time as i64;
        let mut alternatives: Vec<AlternativeRoute> = routes
            .into_iter()
            .map(|route| AlternativeRoute {
                improvement: current_time - route.adjusted_duration_ms as i64,
                route,
            })
            .collect();
        alternatives.sort_by(|a, b| b.improvement.cmp(&a.improvement));

        info!(
            reason = %reason,
            alternatives = alternatives.len(),
            best_improvement = alternatives.first().map(|a| a.improvement),
            "Generated alternatives"
        );

        Ok(RouteAlternatives {
            recommended: alternatives.first().cloned(),
            alternatives,
            reason,
        })
    }
}
