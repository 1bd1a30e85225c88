use std::sync::Arc;

use axum::{Json, extract::State};
use courier_routing::{request::CurrentRoute, service::RouteAlternatives};
use schemars::JsonSchema;
use serde::Deserialize;

use crate::{error::ApiError, json::ApiJson, state::AppState};

#[derive(Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlternativesRequest {
    pub current_route: CurrentRoute,

    /// Why the driver is rerouted (traffic, weather, accident...), defaults
    /// to `traffic`
    #[serde(default)]
    pub reason: Option<String>,
}

pub async fn alternatives_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<AlternativesRequest>,
) -> Result<Json<RouteAlternatives>, ApiError> {
    let alternatives = state
        .route_service
        .generate_alternatives(&body.current_route, body.reason)
        .await?;

    Ok(Json(alternatives))
}
