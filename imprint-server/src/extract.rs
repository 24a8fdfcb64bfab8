//! Request extractors

use crate::error::ApiError;
use crate::state::AppState;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;
use imprint_core::{Actor, AuthError, User};

/// Name of the cookie carrying the access token
pub const TOKEN_COOKIE: &str = "token";

/// The account behind the request's bearer token or `token` cookie
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl AuthUser {
    pub fn actor(&self) -> Actor {
        Actor::from(&self.0)
    }
}

/// Bearer token from the header, falling back to the cookie
fn request_token(parts: &Parts) -> Option<String> {
    let bearer = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty());

    bearer.or_else(|| {
        CookieJar::from_headers(&parts.headers)
            .get(TOKEN_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .filter(|token| !token.is_empty() && token != "none")
    })
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = request_token(parts).ok_or(AuthError::AuthenticationRequired)?;

        match state.catalog.authenticate(&token).await {
            Ok(user) => Ok(AuthUser(user)),
            Err(e) => {
                tracing::debug!(error = %e, "Rejected access token");
                Err(AuthError::AuthenticationRequired.into())
            }
        }
    }
}
