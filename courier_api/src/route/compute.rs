use std::sync::Arc;

use axum::{Json, extract::State};
use courier_routing::{request::RouteSpec, route::RouteResult};

use crate::{error::ApiError, json::ApiJson, state::AppState};

pub async fn compute_route_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<RouteSpec>,
) -> Result<Json<RouteResult>, ApiError> {
    let route = state.route_service.compute_route(&body).await?;

    Ok(Json(route))
}
