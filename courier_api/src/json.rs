use aide::OperationIo;
use axum::extract::FromRequest;

use crate::error::ApiError;

/// `axum::Json` whose rejections render as [`ApiError::BadRequest`].
#[derive(FromRequest, OperationIo)]
#[from_request(via(axum::Json), rejection(ApiError))]
#[aide(input_with = "axum::Json<T>", json_schema)]
pub struct ApiJson<T>(pub T);
