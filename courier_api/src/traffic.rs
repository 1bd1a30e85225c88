use std::sync::Arc;

use aide::axum::{
    ApiRouter,
    routing::{get, post},
};
use axum::{
    Json,
    extract::{Query, State},
};
use courier_routing::traffic::{NearestTrafficQuery, TrafficRecord};
use schemars::JsonSchema;
use serde::Serialize;
use tracing::debug;

use crate::{error::ApiError, json::ApiJson, state::AppState};

#[derive(Serialize, JsonSchema)]
pub struct TrafficIngested {
    /// Records held by the store after ingestion
    pub records: usize,
}

pub fn traffic_routes() -> ApiRouter<Arc<AppState>> {
    aide::generate::infer_responses(true);

    let router = ApiRouter::new()
        .api_route("/traffic", post(ingest_traffic_handler))
        .api_route("/traffic/nearest", get(nearest_traffic_handler));

    aide::generate::infer_responses(false);

    router
}

/// Only available with the in-memory traffic store.
pub async fn ingest_traffic_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(record): ApiJson<TrafficRecord>,
) -> Result<Json<TrafficIngested>, ApiError> {
    let Some(store) = &state.traffic_ingest else {
        return Err(ApiError::Conflict(String::from(
            "Traffic is read from a remote store and cannot be ingested here",
        )));
    };

    store.insert(record)?;
    debug!(records = store.len(), "Ingested traffic record");

    Ok(Json(TrafficIngested {
        records: store.len(),
    }))
}

pub async fn nearest_traffic_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NearestTrafficQuery>,
) -> Result<Json<Option<TrafficRecord>>, ApiError> {
    let segment = query.segment()?;
    let record = state
        .traffic_store
        .most_recent_near(&segment, query.tolerance_meters)
        .await?;

    Ok(Json(record))
}
