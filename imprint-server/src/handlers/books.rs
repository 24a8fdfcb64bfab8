//! Book handlers

use super::{created, deleted, list_params, ok, Body, DataResponse};
use crate::error::ApiResult;
use crate::extract::AuthUser;
use crate::state::AppState;
use axum::extract::{Path, RawQuery, State};
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::WithRejection;
use imprint_core::{Book, BookInput, Document, ResultEnvelope};
use serde_json::Value;

/// GET /api/v1/books
pub async fn list_books(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> ApiResult<Json<ResultEnvelope<Document>>> {
    let params = list_params(query)?;
    Ok(Json(state.catalog.list_books(&params).await?))
}

/// GET /api/v1/publishers/:publisher_id/books
pub async fn list_publisher_books(
    State(state): State<AppState>,
    Path(publisher_id): Path<String>,
    RawQuery(query): RawQuery,
) -> ApiResult<Json<ResultEnvelope<Document>>> {
    let params = list_params(query)?;
    Ok(Json(
        state
            .catalog
            .list_publisher_books(&publisher_id, &params)
            .await?,
    ))
}

/// GET /api/v1/books/:id
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DataResponse<Book>>> {
    Ok(ok(state.catalog.get_book(&id).await?))
}

/// POST /api/v1/publishers/:publisher_id/books
pub async fn create_book(
    State(state): State<AppState>,
    user: AuthUser,
    Path(publisher_id): Path<String>,
    WithRejection(Json(input), _): Body<BookInput>,
) -> ApiResult<(StatusCode, Json<DataResponse<Book>>)> {
    let book = state
        .catalog
        .create_book(&user.actor(), &publisher_id, input)
        .await?;
    Ok(created(book))
}

/// PUT /api/v1/books/:id
pub async fn update_book(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    WithRejection(Json(input), _): Body<BookInput>,
) -> ApiResult<Json<DataResponse<Book>>> {
    Ok(ok(state.catalog.update_book(&user.actor(), &id, input).await?))
}

/// DELETE /api/v1/books/:id
pub async fn delete_book(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<DataResponse<Value>>> {
    state.catalog.delete_book(&user.actor(), &id).await?;
    Ok(deleted())
}
