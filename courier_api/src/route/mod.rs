use std::sync::Arc;

use aide::axum::{
    ApiRouter,
    routing::{get, post},
};

use crate::state::AppState;

mod active;
mod alternatives;
mod compare;
mod compute;
mod realtime;

pub fn route_routes() -> ApiRouter<Arc<AppState>> {
    aide::generate::infer_responses(true);

    let router = ApiRouter::new()
        .api_route("/route", post(compute::compute_route_handler))
        .api_route("/route/compare", post(compare::compare_routes_handler))
        .api_route(
            "/route/realtime/{route_id}",
            get(realtime::realtime_handler),
        )
        .api_route(
            "/route/alternatives",
            post(alternatives::alternatives_handler),
        )
        .api_route("/route/active", post(active::track_route_handler))
        .api_route(
            "/route/active/{route_id}",
            get(active::get_active_route_handler).delete(active::stop_tracking_handler),
        );

    aide::generate::infer_responses(false);

    router
}
