use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use courier_routing::service::LiveUpdate;

use crate::{error::ApiError, state::AppState};

pub async fn realtime_handler(
    Path(route_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<LiveUpdate>, ApiError> {
    let update = state.route_service.live_update(&route_id).await?;

    Ok(Json(update))
}
