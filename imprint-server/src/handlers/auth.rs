//! Account handlers: sign up, sign in and password flows

use super::{deleted, ok, Body, DataResponse};
use crate::error::{ApiError, ApiResult};
use crate::extract::{AuthUser, TOKEN_COOKIE};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar};
use axum_extra::extract::WithRejection;
use imprint_core::{Session, User, UserInput};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Token response; the same token is also set as an HttpOnly cookie
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub success: bool,
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub password: String,
}

/// Cookie lifetime in seconds, saturating for oversized day counts
fn cookie_max_age(days: i64) -> i64 {
    days.max(0).saturating_mul(24 * 60 * 60)
}

/// Attach the session token as a cookie and return it in the body
fn token_response(
    state: &AppState,
    jar: CookieJar,
    session: Session,
) -> ApiResult<(CookieJar, Json<TokenResponse>)> {
    let max_age = cookie_max_age(state.config.cookie_expire_days);
    let cookie = Cookie::parse(format!(
        "{TOKEN_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}",
        session.token
    ))
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    Ok((
        jar.add(cookie),
        Json(TokenResponse {
            success: true,
            token: session.token,
        }),
    ))
}

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(input), _): Body<UserInput>,
) -> ApiResult<(CookieJar, Json<TokenResponse>)> {
    let session = state.catalog.register(input).await?;
    token_response(&state, jar, session)
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(request), _): Body<LoginRequest>,
) -> ApiResult<(CookieJar, Json<TokenResponse>)> {
    let session = state
        .catalog
        .login(&request.email, &request.password)
        .await?;
    token_response(&state, jar, session)
}

/// GET /api/v1/auth/logout
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<DataResponse<Value>>) {
    let mut cookie = Cookie::new(TOKEN_COOKIE, "");
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.make_removal();
    (jar.add(cookie), deleted())
}

/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<DataResponse<User>>> {
    Ok(ok(state.catalog.me(&user.actor()).await?))
}

/// PUT /api/v1/auth/updatedetails
pub async fn update_details(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Json(input), _): Body<UserInput>,
) -> ApiResult<Json<DataResponse<User>>> {
    Ok(ok(state.catalog.update_details(&user.actor(), input).await?))
}

/// PUT /api/v1/auth/updatepassword
pub async fn update_password(
    State(state): State<AppState>,
    user: AuthUser,
    jar: CookieJar,
    WithRejection(Json(request), _): Body<UpdatePasswordRequest>,
) -> ApiResult<(CookieJar, Json<TokenResponse>)> {
    let session = state
        .catalog
        .update_password(&user.actor(), &request.current_password, &request.new_password)
        .await?;
    token_response(&state, jar, session)
}

/// POST /api/v1/auth/forgetpassword (also served as /forgotpassword)
pub async fn forgot_password(
    State(state): State<AppState>,
    WithRejection(Json(request), _): Body<ForgotPasswordRequest>,
) -> ApiResult<Json<DataResponse<&'static str>>> {
    state.catalog.forgot_password(&request.email).await?;
    Ok(ok("Email sent"))
}

/// PUT /api/v1/auth/resetpassword/:resettoken
pub async fn reset_password(
    State(state): State<AppState>,
    Path(reset_token): Path<String>,
    jar: CookieJar,
    WithRejection(Json(request), _): Body<ResetPasswordRequest>,
) -> ApiResult<(CookieJar, Json<TokenResponse>)> {
    let session = state
        .catalog
        .reset_password(&reset_token, &request.password)
        .await?;
    token_response(&state, jar, session)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_max_age() {
        assert_eq!(cookie_max_age(30), 30 * 86_400);
        assert_eq!(cookie_max_age(0), 0);
        assert_eq!(cookie_max_age(-5), 0);
        assert_eq!(cookie_max_age(i64::MAX), i64::MAX);
    }
}
