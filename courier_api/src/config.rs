use std::{net::SocketAddr, time::Duration};

use clap::Parser;
use courier_graphhopper::{
    client::{GRAPHHOPPER_ROUTE_API_URL, GraphHopperRouteClientParams},
    profile::GraphHopperProfile,
};
use courier_routing::{service::RouteServiceConfig, traffic::resolver::MultiplierResolverParams};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// Address the HTTP server listens on
    #[arg(long, env = "COURIER_BIND", default_value = "127.0.0.1:3020")]
    pub bind: SocketAddr,

    #[arg(long, env = "GRAPHHOPPER_API_KEY", hide_env_values = true)]
    pub graphhopper_api_key: Option<String>,

    #[arg(long, env = "GRAPHHOPPER_URL", default_value = GRAPHHOPPER_ROUTE_API_URL)]
    pub graphhopper_url: String,

    /// GraphHopper profile used for every route (car, bike, foot, small_truck, truck, scooter)
    #[arg(long, env = "GRAPHHOPPER_VEHICLE", default_value_t = GraphHopperProfile::Car)]
    pub vehicle: GraphHopperProfile,

    /// Routes are cached in memory when not set
    #[arg(long, env = "REDIS_URL")]
    pub redis_url: Option<String>,

    /// Base URL of a remote traffic store, traffic is kept in memory when
    /// not set
    #[arg(long, env = "TRAFFIC_STORE_URL")]
    pub traffic_store_url: Option<String>,

    /// Timeout of every outbound request, in seconds
    #[arg(long, env = "COURIER_REQUEST_TIMEOUT_SECS", default_value_t = 10)]
    pub request_timeout_secs: u64,

    #[arg(short, long)]
    pub debug: bool,

    /// Write the OpenAPI document to schemas/openapi.json and exit
    #[arg(long)]
    pub generate_openapi: bool,
}

impl Args {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn graphhopper_params(&self) -> anyhow::Result<GraphHopperRouteClientParams> {
        let api_key = self
            .graphhopper_api_key
            .clone()
            .ok_or_else(|| anyhow::anyhow!("GRAPHHOPPER_API_KEY is required"))?;

        Ok(GraphHopperRouteClientParams {
            url: self.graphhopper_url.clone(),
            profile: self.vehicle,
            timeout: self.request_timeout(),
            ..GraphHopperRouteClientParams::new(api_key)
        })
    }

    pub fn service_config(&self) -> RouteServiceConfig {
        RouteServiceConfig {
            traffic: MultiplierResolverParams {
                lookup_timeout: self.request_timeout(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}
