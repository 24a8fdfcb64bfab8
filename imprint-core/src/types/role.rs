//! Account roles and publisher genres

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What an account may do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Reader; may write reviews
    #[default]
    User,
    /// May run one publisher and its books
    Publisher,
    /// Unrestricted
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Publisher => "publisher",
            Role::Admin => "admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Roles an account may pick for itself at registration
    pub fn is_self_assignable(&self) -> bool {
        !self.is_admin()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "publisher" => Ok(Role::Publisher),
            "admin" => Ok(Role::Admin),
            _ => Err(ValidationError::InvalidFormat("role")),
        }
    }
}

/// Genres a publisher may list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum Genre {
    Myth,
    Romance,
    Novel,
    Fiction,
    Biography,
    FairyTale,
    Drama,
    History,
}

impl Genre {
    pub const ALL: [Genre; 8] = [
        Genre::Myth,
        Genre::Romance,
        Genre::Novel,
        Genre::Fiction,
        Genre::Biography,
        Genre::FairyTale,
        Genre::Drama,
        Genre::History,
    ];
}
