//! Request handlers

mod auth;
mod books;
mod publishers;
mod reviews;
mod users;

pub use auth::*;
pub use books::*;
pub use publishers::*;
pub use reviews::*;
pub use users::*;

use crate::error::{ApiError, ApiResult};
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::WithRejection;
use imprint_core::QueryParams;
use serde::Serialize;
use serde_json::{json, Value};

/// JSON body whose rejections render as API errors
pub type Body<T> = WithRejection<Json<T>, ApiError>;

/// Single-item response
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub success: bool,
    pub data: T,
}

/// `200 {success: true, data}`
pub fn ok<T: Serialize>(data: T) -> Json<DataResponse<T>> {
    Json(DataResponse {
        success: true,
        data,
    })
}

/// `201 {success: true, data}`
pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<DataResponse<T>>) {
    (StatusCode::CREATED, ok(data))
}

/// `200 {success: true, data: {}}`
pub fn deleted() -> Json<DataResponse<Value>> {
    ok(json!({}))
}

/// Normalize a raw query string for the list pipeline
fn list_params(raw: Option<String>) -> ApiResult<QueryParams> {
    QueryParams::parse(raw.as_deref().unwrap_or_default())
        .map_err(|e| ApiError::Core(e.into()))
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
