pub mod client;
pub mod polyline;
pub mod profile;
pub mod types;
