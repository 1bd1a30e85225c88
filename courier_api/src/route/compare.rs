use std::sync::Arc;

use axum::{Json, extract::State};
use courier_routing::{request::RouteSpec, service::RouteComparison};
use schemars::JsonSchema;
use serde::Deserialize;

use crate::{error::ApiError, json::ApiJson, state::AppState};

#[derive(Deserialize, JsonSchema)]
pub struct CompareRoutesRequest {
    /// Candidate routes, at least 2
    #[serde(default)]
    pub routes: Vec<RouteSpec>,
}

pub async fn compare_routes_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<CompareRoutesRequest>,
) -> Result<Json<RouteComparison>, ApiError> {
    let comparison = state.route_service.compare_routes(&body.routes).await?;

    Ok(Json(comparison))
}
