use super::{insert, load, save, Catalog};
use crate::auth::{authorize, hash_password, Actor};
use crate::error::{Result, ValidationError};
use crate::query::{AdvancedResults, QueryParams, ResultEnvelope};
use crate::store::Document;
use crate::types::{Role, User, UserInput};

const ADMIN_ONLY: [Role; 1] = [Role::Admin];

impl Catalog {
    /// Accounts, without credentials
    pub async fn list_users(
        &self,
        actor: &Actor,
        params: &QueryParams,
    ) -> Result<ResultEnvelope<Document>> {
        authorize(actor, &ADMIN_ONLY)?;
        AdvancedResults::new(self.db.users.clone(), None)
            .execute(params)
            .await
    }

    pub async fn get_user(&self, actor: &Actor, id: &str) -> Result<User> {
        authorize(actor, &ADMIN_ONLY)?;
        let user: User = load(&self.db.users, id).await?;
        Ok(user.redacted())
    }

    /// Create an account with any role
    pub async fn create_user(&self, actor: &Actor, input: UserInput) -> Result<User> {
        authorize(actor, &ADMIN_ONLY)?;
        let user = self.new_account(input).await?;
        tracing::info!(id = %user.id, role = %user.role, "User created by admin");
        Ok(user)
    }

    pub async fn update_user(&self, actor: &Actor, id: &str, input: UserInput) -> Result<User> {
        authorize(actor, &ADMIN_ONLY)?;
        let mut user: User = load(&self.db.users, id).await?;

        let password = input.password.clone();
        user.apply(input)?;
        if let Some(password) = password {
            user.password = Some(hash_password(&password)?);
        }
        save(&self.db.users, id, &user).await?;
        Ok(user.redacted())
    }

    pub async fn delete_user(&self, actor: &Actor, id: &str) -> Result<()> {
        authorize(actor, &ADMIN_ONLY)?;
        let _: User = load(&self.db.users, id).await?;
        self.db.users.delete(id).await?;
        tracing::info!(id = %id, "User deleted");
        Ok(())
    }

    /// Hash the password, validate and store a new account
    pub(super) async fn new_account(&self, mut input: UserInput) -> Result<User> {
        let password = input
            .password
            .take()
            .ok_or(ValidationError::MissingField("password"))?;
        let hash = hash_password(&password)?;
        let user = User::new(input, hash)?;
        insert(&self.db.users, &user).await?;
        Ok(user.redacted())
    }
}
