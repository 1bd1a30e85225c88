use std::sync::Arc;

use aide::{
    axum::{
        ApiRouter, IntoApiResponse,
        routing::{get, get_with},
    },
    openapi::OpenApi,
    scalar::Scalar,
    swagger::Swagger,
    transform::TransformOpenApi,
};
use axum::{Extension, Json, response::IntoResponse};

const OPENAPI_JSON_PATH: &str = "/docs/private/api.json";

pub fn docs_routes() -> ApiRouter {
    aide::generate::infer_responses(true);

    let router = ApiRouter::new()
        .api_route(
            "/",
            get_with(
                Scalar::new(OPENAPI_JSON_PATH)
                    .with_title("Courier")
                    .axum_handler(),
                |op| op.description("This documentation page."),
            ),
        )
        .api_route(
            "/swagger",
            get_with(
                Swagger::new(OPENAPI_JSON_PATH)
                    .with_title("Courier")
                    .axum_handler(),
                |op| op.description("This documentation page."),
            ),
        )
        .route("/private/api.json", get(serve_docs));

    aide::generate::infer_responses(false);

    router
}

pub fn api_docs(api: TransformOpenApi) -> TransformOpenApi {
    api.title("Courier Open API")
        .description("Traffic aware route computation, comparison and live updates.")
}

async fn serve_docs(Extension(api): Extension<Arc<OpenApi>>) -> impl IntoApiResponse {
    Json(api).into_response()
}
