//! HTTP error mapping

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use imprint_core::{AuthError, CatalogError, ImprintError, StoreError};
use serde::Serialize;

/// Result type for handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Anything a handler can fail with
#[derive(Debug)]
pub enum ApiError {
    Core(ImprintError),
    /// Request body or form could not be read
    BadRequest(String),
}

impl From<ImprintError> for ApiError {
    fn from(err: ImprintError) -> Self {
        ApiError::Core(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Core(err.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        let err = match self {
            ApiError::BadRequest(_) => return StatusCode::BAD_REQUEST,
            ApiError::Core(err) => err,
        };

        match err {
            ImprintError::Query(_) | ImprintError::Validation(_) => StatusCode::BAD_REQUEST,

            ImprintError::Auth(auth) => match auth {
                AuthError::InvalidCredentials
                | AuthError::AuthenticationRequired
                | AuthError::TokenExpired
                | AuthError::MalformedToken => StatusCode::UNAUTHORIZED,
                AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
                AuthError::InvalidResetToken | AuthError::WeakPassword(_) => {
                    StatusCode::BAD_REQUEST
                }
                AuthError::HashingFailed | AuthError::TokenGenerationFailed => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },

            ImprintError::Catalog(catalog) => match catalog {
                CatalogError::NotFound(_) | CatalogError::UnknownEmail => StatusCode::NOT_FOUND,
                CatalogError::Conflict(_) => StatusCode::BAD_REQUEST,
                CatalogError::Delivery(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },

            ImprintError::Store(store) => match store {
                StoreError::Duplicate { .. } => StatusCode::BAD_REQUEST,
                StoreError::NotFound(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },

            ImprintError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::BadRequest(message) => message.clone(),
            ApiError::Core(err) => err.to_string(),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error = if status.is_server_error() {
            tracing::error!(error = %self.message(), "Request failed");
            "Server Error".to_string()
        } else {
            self.message()
        };

        let body = Json(ErrorResponse {
            success: false,
            error,
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imprint_core::{QueryError, ValidationError};

    #[test]
    fn test_status_codes() {
        let cases: Vec<(ImprintError, StatusCode)> = vec![
            (QueryError::MalformedKey("a[".into()).into(), StatusCode::BAD_REQUEST),
            (ValidationError::MissingField("name").into(), StatusCode::BAD_REQUEST),
            (AuthError::InvalidCredentials.into(), StatusCode::UNAUTHORIZED),
            (AuthError::Forbidden("no".into()).into(), StatusCode::FORBIDDEN),
            (CatalogError::NotFound("x".into()).into(), StatusCode::NOT_FOUND),
            (CatalogError::Conflict("x".into()).into(), StatusCode::BAD_REQUEST),
            (
                StoreError::Duplicate {
                    collection: "users".into(),
                    fields: "email".into(),
                }
                .into(),
                StatusCode::BAD_REQUEST,
            ),
            (
                StoreError::BackendError("disk".into()).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status_code(), status);
        }
    }

    #[tokio::test]
    async fn test_server_errors_are_not_leaked() {
        let err = ImprintError::from(StoreError::BackendError("disk".into()));
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Server Error");
        assert!(!String::from_utf8_lossy(&bytes).contains("disk"));
    }
}
