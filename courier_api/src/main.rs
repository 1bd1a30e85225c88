mod config;
mod docs;
mod error;
mod health;
mod json;
mod route;
mod state;
mod traffic;

use std::sync::Arc;

use aide::{
    axum::{ApiRouter, routing::get},
    openapi::OpenApi,
};
use anyhow::Context;
use axum::{Extension, Router, http::Method, serve};
use clap::Parser;
use mimalloc::MiMalloc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{Level, info};

use crate::{
    config::Args,
    docs::{api_docs, docs_routes},
    health::health_handler,
    route::route_routes,
    state::AppState,
    traffic::traffic_routes,
};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const OPENAPI_OUTPUT: &str = "schemas/openapi.json";

fn app(api: &mut OpenApi) -> Router<Arc<AppState>> {
    ApiRouter::new()
        .nest_api_service("/docs", docs_routes())
        .merge(route_routes())
        .merge(traffic_routes())
        .api_route("/health", get(health_handler))
        .finish_api_with(api, api_docs)
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenvy::from_filename("./.env.local").ok();
    dotenvy::dotenv().ok();

    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(if args.debug {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .init();
    aide::generate::on_error(|error| tracing::error!("{}", error));
    aide::generate::extract_schemas(true);

    let mut api = OpenApi::default();
    let app = app(&mut api);

    if args.generate_openapi {
        std::fs::create_dir_all("schemas")?;
        let spec = serde_json::to_string_pretty(&api)?;
        std::fs::write(OPENAPI_OUTPUT, spec)
            .with_context(|| format!("Failed to write {OPENAPI_OUTPUT}"))?;
        info!("OpenAPI specification has been written to {}", OPENAPI_OUTPUT);
        return Ok(());
    }

    let state = Arc::new(AppState::from_args(&args).await?);

    let cors_layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_origin(Any)
        .allow_headers(Any);

    let app = app
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer),
        )
        .layer(Extension(Arc::new(api)))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("Failed to bind {}", args.bind))?;
    info!(address = %args.bind, "Courier listening");

    serve(listener, app).await?;

    Ok(())
}
