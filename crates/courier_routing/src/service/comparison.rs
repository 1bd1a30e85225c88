use futures::future::join_all;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::{error::RouteError, request::RouteSpec, route::RouteResult};

use super::RouteService;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ComparedRoute {
    #[serde(flatten)]
    pub route: RouteResult,

    /// Meters per millisecond of adjusted travel time
    pub efficiency: f64,
}

impl From<RouteResult> for ComparedRoute {
    fn from(route: RouteResult) -> Self {
        ComparedRoute {
            efficiency: route.efficiency(),
            route,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonPicks {
    pub fastest: ComparedRoute,
    pub shortest: ComparedRoute,
    pub most_efficient: ComparedRoute,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteComparison {
    /// Sorted by descending efficiency
    pub routes: Vec<ComparedRoute>,
    pub best_route: ComparedRoute,
    pub comparison: ComparisonPicks,
}

impl RouteComparison {
    /// `None` without candidates. Candidates are in request order, so ties
    /// go to the route requested first.
    pub fn rank(candidates: Vec<ComparedRoute>) -> Option<Self> {
        let fastest = candidates
            .iter()
            .min_by_key(|candidate| candidate.route.adjusted_duration_ms)?
            .clone();
        let shortest = candidates
            .iter()
            .min_by(|a, b| a.route.distance_meters.total_cmp(&b.route.distance_meters))?
            .clone();

        let mut routes = candidates;
        routes.sort_by(|a, b| b.efficiency.total_cmp(&a.efficiency));
        let most_efficient = routes.first()?.clone();

        Some(RouteComparison {
            best_route: most_efficient.clone(),
            comparison: ComparisonPicks {
                fastest,
                shortest,
                most_efficient,
            },
            routes,
        })
    }
}

impl RouteService {
    /// Computes every candidate with current traffic, without going through
    /// the point-to-point cache, and ranks them.
    #[instrument(skip_all, fields(candidates = specs.len()))]
    pub async fn compare_routes(&self, specs: &[RouteSpec]) -> Result<RouteComparison, RouteError> {
        if specs.len() < 2 {
            return Err(RouteError::InsufficientRoutes(specs.len()));
        }

        let requests = specs
            .iter()
            .map(RouteSpec::validate)
            .collect::<Result<Vec<_>, _>>()?;

        let results = join_all(requests.iter().map(|request| self.compute_uncached(request))).await;

        let mut candidates = Vec::with_capacity(results.len());
        for (index, result) in results.into_iter().enumerate() {
            match result {
                Ok(route) => candidates.push(ComparedRoute::from(route)),
                Err(error) => warn!(index, %error, "Skipping route that could not be computed"),
            }
        }

        let comparison = RouteComparison::rank(candidates).ok_or_else(|| {
            RouteError::RouteUnavailable(String::from(
                "none of the compared routes could be computed",
            ))
        })?;

        info!(
            compared = comparison.routes.len(),
            best_efficiency = comparison.best_route.efficiency,
            "Compared routes"
        );

        Ok(comparison)
    }
}
