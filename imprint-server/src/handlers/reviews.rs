//! Review handlers

use super::{created, deleted, list_params, ok, Body, DataResponse};
use crate::error::ApiResult;
use crate::extract::AuthUser;
use crate::state::AppState;
use axum::extract::{Path, RawQuery, State};
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::WithRejection;
use imprint_core::{Document, ResultEnvelope, Review, ReviewInput};
use serde_json::Value;

/// GET /api/v1/reviews
pub async fn list_reviews(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> ApiResult<Json<ResultEnvelope<Document>>> {
    let params = list_params(query)?;
    Ok(Json(state.catalog.list_reviews(&params).await?))
}

/// GET /api/v1/publishers/:publisher_id/reviews
pub async fn list_publisher_reviews(
    State(state): State<AppState>,
    Path(publisher_id): Path<String>,
    RawQuery(query): RawQuery,
) -> ApiResult<Json<ResultEnvelope<Document>>> {
    let params = list_params(query)?;
    Ok(Json(
        state
            .catalog
            .list_publisher_reviews(&publisher_id, &params)
            .await?,
    ))
}

/// GET /api/v1/reviews/:id
pub async fn get_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DataResponse<Review>>> {
    Ok(ok(state.catalog.get_review(&id).await?))
}

/// POST /api/v1/publishers/:publisher_id/reviews
pub async fn create_review(
    State(state): State<AppState>,
    user: AuthUser,
    Path(publisher_id): Path<String>,
    WithRejection(Json(input), _): Body<ReviewInput>,
) -> ApiResult<(StatusCode, Json<DataResponse<Review>>)> {
    let review = state
        .catalog
        .create_review(&user.actor(), &publisher_id, input)
        .await?;
    Ok(created(review))
}

/// PUT /api/v1/reviews/:id
pub async fn update_review(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    WithRejection(Json(input), _): Body<ReviewInput>,
) -> ApiResult<Json<DataResponse<Review>>> {
    Ok(ok(state.catalog.update_review(&user.actor(), &id, input).await?))
}

/// DELETE /api/v1/reviews/:id
pub async fn delete_review(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<DataResponse<Value>>> {
    state.catalog.delete_review(&user.actor(), &id).await?;
    Ok(deleted())
}
