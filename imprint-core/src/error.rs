//! Error types for Imprint Core

use thiserror::Error;

/// Result type alias using ImprintError
pub type Result<T> = std::result::Result<T, ImprintError>;

/// Top-level error type for all Imprint operations
#[derive(Debug, Error)]
pub enum ImprintError {
    #[error("{0}")]
    Query(#[from] QueryError),

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Auth(#[from] AuthError),

    #[error("{0}")]
    Catalog(#[from] CatalogError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while turning query parameters into a filter
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("Malformed query key: {0}")]
    MalformedKey(String),

    #[error("Unknown operator '{operator}' on field '{field}'")]
    UnknownOperator { field: String, operator: String },

    #[error("Invalid field name: {0}")]
    InvalidField(String),

    #[error("Projection cannot both include and exclude fields: {0}")]
    MixedProjection(String),
}

/// Errors that occur during document store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate value for {fields} in {collection}")]
    Duplicate { collection: String, fields: String },

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Backend error: {0}")]
    BackendError(String),

    #[error("Corrupt document: {0}")]
    Corrupt(String),

    #[error("Unknown collection: {0}")]
    UnknownCollection(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Corrupt(err.to_string())
    }
}

/// Entity validation failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Please add a {0}")]
    MissingField(&'static str),

    #[error("{field} can not be more than {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
    },

    #[error("Please use a valid {0}")]
    InvalidFormat(&'static str),

    #[error("{0}")]
    Rejected(String),
}

/// Authentication and authorization errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuthError {
    /// Generic on purpose: never reveal whether the email exists
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Not authorized to access this route")]
    AuthenticationRequired,

    #[error("{0}")]
    Forbidden(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Malformed token")]
    MalformedToken,

    #[error("Invalid or expired reset token")]
    InvalidResetToken,

    #[error("Password must be at least {0} characters")]
    WeakPassword(usize),

    #[error("Internal error: password hashing failed")]
    HashingFailed,

    #[error("Internal error: token generation failed")]
    TokenGenerationFailed,
}

/// Business-rule failures raised by catalog services
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    #[error("Resource not found with id of {0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("There is no user with that email")]
    UnknownEmail,

    #[error("Email could not be sent: {0}")]
    Delivery(String),
}

impl ImprintError {
    /// Whether the failure was caused by the caller's input
    pub fn is_client_error(&self) -> bool {
        match self {
            ImprintError::Query(_)
            | ImprintError::Validation(_)
            | ImprintError::Catalog(CatalogError::NotFound(_))
            | ImprintError::Catalog(CatalogError::Conflict(_))
            | ImprintError::Catalog(CatalogError::UnknownEmail)
            | ImprintError::Store(StoreError::Duplicate { .. })
            | ImprintError::Store(StoreError::NotFound(_)) => true,
            ImprintError::Auth(err) => {
                !matches!(err, AuthError::HashingFailed | AuthError::TokenGenerationFailed)
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_credentials_is_generic() {
        let err = AuthError::InvalidCredentials;
        assert!(!err.to_string().contains("password"));
        assert!(!err.to_string().contains("email"));
    }

    #[test]
    fn test_client_error_classification() {
        assert!(ImprintError::from(QueryError::MalformedKey("a[".into())).is_client_error());
        assert!(ImprintError::from(AuthError::InvalidCredentials).is_client_error());
        assert!(!ImprintError::from(AuthError::HashingFailed).is_client_error());
        assert!(!ImprintError::from(StoreError::BackendError("disk".into())).is_client_error());
    }
}
