//! User account entity

use super::validate::{self, non_empty, required};
use super::Role;
use crate::error::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered account
///
/// The stored form carries the password hash and any pending reset
/// token; call [`User::redacted`] before handing one to a client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,

    /// Argon2 PHC string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// SHA-256 hex of the outstanding reset token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_password_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_password_expire: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

/// Client-supplied account fields
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub password: Option<String>,
}

impl User {
    /// Build a user; `password_hash` is the already-hashed password
    pub fn new(input: UserInput, password_hash: String) -> Result<Self, ValidationError> {
        let user = Self {
            id: Uuid::new_v4().to_string(),
            name: required("name", input.name)?,
            email: required("email", input.email)?,
            role: input.role.unwrap_or_default(),
            password: Some(password_hash),
            reset_password_token: None,
            reset_password_expire: None,
            created_at: Utc::now(),
        };
        user.validate()?;
        Ok(user)
    }

    /// Merge name, email and role; passwords change through the account flows only
    pub fn apply(&mut self, input: UserInput) -> Result<(), ValidationError> {
        let mut next = self.clone();
        if let Some(name) = input.name {
            next.name = name.trim().to_string();
        }
        if let Some(email) = input.email {
            next.email = email.trim().to_string();
        }
        if let Some(role) = input.role {
            next.role = role;
        }
        next.validate()?;
        *self = next;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        non_empty("name", &self.name)?;
        non_empty("email", &self.email)?;
        if !validate::is_email(&self.email) {
            return Err(ValidationError::InvalidFormat("email"));
        }
        Ok(())
    }

    /// Copy without credentials or reset state
    pub fn redacted(mut self) -> Self {
        self.password = None;
        self.reset_password_token = None;
        self.reset_password_expire = None;
        self
    }
}
