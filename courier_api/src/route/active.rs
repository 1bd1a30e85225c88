use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use courier_routing::{request::RouteSpec, route::RouteResult, service::TrackedRoute};
use schemars::JsonSchema;
use serde::Serialize;

use crate::{error::ApiError, json::ApiJson, state::AppState};

#[derive(Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrackingStopped {
    pub route_id: String,
}

pub async fn track_route_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<RouteSpec>,
) -> Result<Json<TrackedRoute>, ApiError> {
    let tracked = state.route_service.track_route(&body).await?;

    Ok(Json(tracked))
}

pub async fn get_active_route_handler(
    Path(route_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<RouteResult>, ApiError> {
    let route = state.route_service.get_active_route(&route_id).await?;

    Ok(Json(route))
}

pub async fn stop_tracking_handler(
    Path(route_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<TrackingStopped>, ApiError> {
    state.route_service.stop_tracking(&route_id).await?;

    Ok(Json(TrackingStopped { route_id }))
}
