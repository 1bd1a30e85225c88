pub mod cache;
pub mod coordinate;
pub mod error;
pub mod geometry;
pub mod provider;
pub mod request;
pub mod route;
pub mod segment;
pub mod service;
pub mod traffic;

#[cfg(test)]
pub(crate) mod test_utils;
