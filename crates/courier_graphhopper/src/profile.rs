use std::{fmt::Display, str::FromStr};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// https://docs.graphhopper.com/openapi/map-data-and-routing-profiles/openstreetmap/standard-routing-profiles
#[derive(Deserialize, Serialize, JsonSchema, Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GraphHopperProfile {
    #[default]
    Car,
    Bike,
    Foot,
    SmallTruck,
    Truck,
    Scooter,
}

impl Display for GraphHopperProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                GraphHopperProfile::Car => "car",
                GraphHopperProfile::Bike => "bike",
                GraphHopperProfile::Foot => "foot",
                GraphHopperProfile::SmallTruck => "small_truck",
                GraphHopperProfile::Truck => "truck",
                GraphHopperProfile::Scooter => "scooter",
            }
        )
    }
}

impl FromStr for GraphHopperProfile {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "car" => Ok(GraphHopperProfile::Car),
            "bike" => Ok(GraphHopperProfile::Bike),
            "foot" => Ok(GraphHopperProfile::Foot),
            "small_truck" => Ok(GraphHopperProfile::SmallTruck),
            "truck" => Ok(GraphHopperProfile::Truck),
            "scooter" => Ok(GraphHopperProfile::Scooter),
            other => Err(format!("unknown GraphHopper profile '{other}'")),
        }
    }
}
