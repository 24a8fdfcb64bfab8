//! Account administration handlers (admin only)

use super::{created, deleted, list_params, ok, Body, DataResponse};
use crate::error::ApiResult;
use crate::extract::AuthUser;
use crate::state::AppState;
use axum::extract::{Path, RawQuery, State};
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::WithRejection;
use imprint_core::{Document, ResultEnvelope, User, UserInput};
use serde_json::Value;

pub async fn list_users(
    State(state): State<AppState>,
    user: AuthUser,
    RawQuery(query): RawQuery,
) -> ApiResult<Json<ResultEnvelope<Document>>> {
    let params = list_params(query)?;
    Ok(Json(state.catalog.list_users(&user.actor(), &params).await?))
}

pub async fn get_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<DataResponse<User>>> {
    Ok(ok(state.catalog.get_user(&user.actor(), &id).await?))
}

pub async fn create_user(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Json(input), _): Body<UserInput>,
) -> ApiResult<(StatusCode, Json<DataResponse<User>>)> {
    Ok(created(state.catalog.create_user(&user.actor(), input).await?))
}

pub async fn update_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    WithRejection(Json(input), _): Body<UserInput>,
) -> ApiResult<Json<DataResponse<User>>> {
    Ok(ok(state.catalog.update_user(&user.actor(), &id, input).await?))
}

pub async fn delete_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<DataResponse<Value>>> {
    state.catalog.delete_user(&user.actor(), &id).await?;
    Ok(deleted())
}
