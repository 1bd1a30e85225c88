use thiserror::Error;

/// Failures surfaced by the route service. Collaborator errors are converted
/// into one of these before leaving the service.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RouteError {
    #[error("Missing required coordinates: {0}")]
    MissingCoordinates(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Route calculation failed: {0}")]
    RouteUnavailable(String),

    #[error("Route {0} not found")]
    RouteNotFound(String),

    #[error("Need at least 2 routes to compare, got {0}")]
    InsufficientRoutes(usize),

    #[error("Route cache unavailable: {0}")]
    CacheUnavailable(String),
}

impl RouteError {
    pub fn kind(&self) -> &'static str {
        match self {
            RouteError::MissingCoordinates(_) => "MissingCoordinates",
            RouteError::InvalidCoordinates(_) => "InvalidCoordinates",
            RouteError::RouteUnavailable(_) => "RouteUnavailable",
            RouteError::RouteNotFound(_) => "RouteNotFound",
            RouteError::InsufficientRoutes(_) => "InsufficientRoutes",
            RouteError::CacheUnavailable(_) => "CacheUnavailable",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_is_stable() {
        assert_eq!(
            RouteError::RouteNotFound(String::from("abc")).kind(),
            "RouteNotFound"
        );
        assert_eq!(RouteError::InsufficientRoutes(1).kind(), "InsufficientRoutes");
    }

    #[test]
    fn message_is_human_readable() {
        assert_eq!(
            RouteError::InsufficientRoutes(1).to_string(),
            "Need at least 2 routes to compare, got 1"
        );
    }
}
