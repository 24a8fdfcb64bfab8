//! Publisher handlers

use super::{created, deleted, list_params, ok, Body, DataResponse};
use crate::error::{ApiError, ApiResult};
use crate::extract::AuthUser;
use crate::state::AppState;
use axum::extract::{Path, RawQuery, State};
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::{Multipart, WithRejection};
use imprint_core::{Document, PhotoUpload, Publisher, PublisherInput, ResultEnvelope};
use serde_json::Value;

/// GET /api/v1/publishers
pub async fn list_publishers(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> ApiResult<Json<ResultEnvelope<Document>>> {
    let params = list_params(query)?;
    Ok(Json(state.catalog.list_publishers(&params).await?))
}

/// GET /api/v1/publishers/:id
pub async fn get_publisher(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DataResponse<Publisher>>> {
    Ok(ok(state.catalog.get_publisher(&id).await?))
}

/// POST /api/v1/publishers
pub async fn create_publisher(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Json(input), _): Body<PublisherInput>,
) -> ApiResult<(StatusCode, Json<DataResponse<Publisher>>)> {
    let publisher = state.catalog.create_publisher(&user.actor(), input).await?;
    Ok(created(publisher))
}

/// PUT /api/v1/publishers/:id
pub async fn update_publisher(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    WithRejection(Json(input), _): Body<PublisherInput>,
) -> ApiResult<Json<DataResponse<Publisher>>> {
    let publisher = state
        .catalog
        .update_publisher(&user.actor(), &id, input)
        .await?;
    Ok(ok(publisher))
}

/// DELETE /api/v1/publishers/:id
pub async fn delete_publisher(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<DataResponse<Value>>> {
    state.catalog.delete_publisher(&user.actor(), &id).await?;
    Ok(deleted())
}

/// PUT /api/v1/publishers/:id/photo
///
/// Expects a multipart form with the image in a `file` field.
pub async fn upload_publisher_photo(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> ApiResult<Json<DataResponse<String>>> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;

        upload = Some(PhotoUpload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
        break;
    }

    let upload = upload.ok_or_else(|| ApiError::BadRequest("Please upload a file".to_string()))?;
    let photo = state
        .catalog
        .set_publisher_photo(&user.actor(), &id, upload)
        .await?;
    Ok(ok(photo))
}
