//! Role and ownership checks

use crate::error::AuthError;
use crate::types::{Role, User};

/// The authenticated caller of a catalog operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    pub role: Role,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self::new(user.id.clone(), user.role)
    }
}

/// Require the actor's role to be one of `roles`
pub fn authorize(actor: &Actor, roles: &[Role]) -> Result<(), AuthError> {
    if roles.contains(&actor.role) {
        return Ok(());
    }
    Err(AuthError::Forbidden(format!(
        "User role {} is not authorized to access this route",
        actor.role
    )))
}

/// Require the actor to own the resource, or be an admin
///
/// `action` completes the message, e.g. `"update this publisher"`.
pub fn ensure_owner(actor: &Actor, owner_id: &str, action: &str) -> Result<(), AuthError> {
    if actor.is_admin() || actor.id == owner_id {
        return Ok(());
    }
    Err(AuthError::Forbidden(format!(
        "User {} is not authorized to {action}",
        actor.id
    )))
}
