use super::{load, save, Catalog};
use crate::auth::{hash_password, hash_reset_token, verify_password, Actor, ResetToken};
use crate::error::{AuthError, CatalogError, Result, ValidationError};
use crate::notify::Email;
use crate::query::Filter;
use crate::store::from_document;
use crate::types::{User, UserInput};
use chrono::Utc;
use serde::Serialize;

/// A signed-in account and its access token
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub user: User,
    pub token: String,
}

impl Catalog {
    fn session(&self, user: User) -> Result<Session> {
        let token = self.tokens.issue(&user.id)?;
        Ok(Session {
            user: user.redacted(),
            token,
        })
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let doc = self
            .db
            .users
            .find_one(&Filter::eq("email", email.trim()))
            .await?;
        Ok(doc.map(from_document).transpose()?)
    }

    /// Self-service sign up as a reader or a publisher
    pub async fn register(&self, input: UserInput) -> Result<Session> {
        if let Some(role) = input.role {
            if !role.is_self_assignable() {
                return Err(ValidationError::InvalidFormat("role").into());
            }
        }

        let user = self.new_account(input).await?;
        tracing::info!(id = %user.id, role = %user.role, "User registered");
        self.session(user)
    }

    /// Exchange credentials for a session
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(ValidationError::Rejected(
                "Please provide an email and password".to_string(),
            )
            .into());
        }

        let user = self
            .find_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        let matches = user
            .password
            .as_deref()
            .is_some_and(|hash| verify_password(password, hash));
        if !matches {
            return Err(AuthError::InvalidCredentials.into());
        }

        self.session(user)
    }

    /// Resolve an access token to its account
    pub async fn authenticate(&self, token: &str) -> Result<User> {
        let claims = self.tokens.verify(token)?;
        let user = self
            .db
            .users
            .get(&claims.sub)
            .await?
            .ok_or(AuthError::AuthenticationRequired)?;
        let user: User = from_document(user)?;
        Ok(user.redacted())
    }

    pub async fn me(&self, actor: &Actor) -> Result<User> {
        let user: User = load(&self.db.users, &actor.id).await?;
        Ok(user.redacted())
    }

    /// Change the actor's name and email
    pub async fn update_details(&self, actor: &Actor, input: UserInput) -> Result<User> {
        let mut user: User = load(&self.db.users, &actor.id).await?;
        user.apply(UserInput {
            name: input.name,
            email: input.email,
            role: None,
            password: None,
        })?;
        save(&self.db.users, &actor.id, &user).await?;
        Ok(user.redacted())
    }

    /// Change the actor's password after checking the current one
    pub async fn update_password(
        &self,
        actor: &Actor,
        current: &str,
        new_password: &str,
    ) -> Result<Session> {
        let mut user: User = load(&self.db.users, &actor.id).await?;
        let matches = user
            .password
            .as_deref()
            .is_some_and(|hash| verify_password(current, hash));
        if !matches {
            return Err(AuthError::InvalidCredentials.into());
        }

        user.password = Some(hash_password(new_password)?);
        save(&self.db.users, &actor.id, &user).await?;
        tracing::info!(id = %user.id, "Password updated");
        self.session(user)
    }

    /// Issue a reset token and email its link to the account
    pub async fn forgot_password(&self, email: &str) -> Result<()> {
        let mut user = self
            .find_by_email(email)
            .await?
            .ok_or(CatalogError::UnknownEmail)?;

        let token = ResetToken::generate();
        user.reset_password_token = Some(token.hashed.clone());
        user.reset_password_expire = Some(token.expires_at);
        save(&self.db.users, &user.id, &user).await?;

        let url = format!(
            "{}/api/v1/auth/resetpassword/{}",
            self.settings.public_url.trim_end_matches('/'),
            token.raw
        );
        let email = Email {
            to: user.email.clone(),
            subject: "Password reset token".to_string(),
            body: format!(
                "You are receiving this email because you (or someone else) has requested \
                 the reset of a password. Please make a PUT request to:\n\n{url}"
            ),
        };

        if let Err(e) = self.mailer.send(email).await {
            tracing::warn!(id = %user.id, error = %e, "Reset email failed");
            user.reset_password_token = None;
            user.reset_password_expire = None;
            save(&self.db.users, &user.id, &user).await?;
            return Err(e.into());
        }

        tracing::info!(id = %user.id, "Password reset requested");
        Ok(())
    }

    /// Set a new password using an emailed reset token
    pub async fn reset_password(&self, raw_token: &str, new_password: &str) -> Result<Session> {
        let hashed = hash_reset_token(raw_token);
        let doc = self
            .db
            .users
            .find_one(&Filter::eq("resetPasswordToken", hashed))
            .await?
            .ok_or(AuthError::InvalidResetToken)?;
        let mut user: User = from_document(doc)?;

        let live = user
            .reset_password_expire
            .is_some_and(|expires| expires > Utc::now());
        if !live {
            return Err(AuthError::InvalidResetToken.into());
        }

        user.password = Some(hash_password(new_password)?);
        user.reset_password_token = None;
        user.reset_password_expire = None;
        save(&self.db.users, &user.id, &user).await?;

        tracing::info!(id = %user.id, "Password reset");
        self.session(user)
    }
}
