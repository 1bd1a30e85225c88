use aide::OperationOutput;
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use courier_routing::{error::RouteError, traffic::TrafficStoreError};
use schemars::JsonSchema;
use serde::Serialize;
use tracing::error;

pub enum ApiError {
    Route(RouteError),
    BadRequest(String),
    Conflict(String),
    ServiceUnavailable(String),
}

#[derive(Serialize, JsonSchema)]
pub struct ErrorDetail {
    /// Stable machine readable kind, `RouteNotFound` for instance
    pub kind: String,
    pub message: String,
}

#[derive(Serialize, JsonSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Route(error) => match error {
                RouteError::MissingCoordinates(_)
                | RouteError::InvalidCoordinates(_)
                | RouteError::InsufficientRoutes(_) => StatusCode::BAD_REQUEST,
                RouteError::RouteNotFound(_) => StatusCode::NOT_FOUND,
                RouteError::RouteUnavailable(_) | RouteError::CacheUnavailable(_) => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn detail(self) -> ErrorDetail {
        let (kind, message) = match self {
            ApiError::Route(error) => (error.kind(), error.to_string()),
            ApiError::BadRequest(message) => ("BadRequest", message),
            ApiError::Conflict(message) => ("Conflict", message),
            ApiError::ServiceUnavailable(message) => ("ServiceUnavailable", message),
        };

        ErrorDetail {
            kind: kind.to_string(),
            message,
        }
    }
}

impl From<RouteError> for ApiError {
    fn from(error: RouteError) -> Self {
        ApiError::Route(error)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<TrafficStoreError> for ApiError {
    fn from(error: TrafficStoreError) -> Self {
        match error {
            TrafficStoreError::InvalidRecord(message) => ApiError::BadRequest(message),
            error => ApiError::ServiceUnavailable(error.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = self.detail();

        if status.is_server_error() {
            error!(kind = %detail.kind, message = %detail.message, "Request failed");
        }

        (status, Json(ErrorBody { error: detail })).into_response()
    }
}

impl OperationOutput for ApiError {
    type Inner = ErrorBody;
}
