//! Admin account bootstrap

use super::open_catalog;
use anyhow::{Context, Result};
use imprint_core::{Actor, Role, UserInput};
use std::path::Path;

/// The operator running the CLI acts with admin rights
const OPERATOR: &str = "imprint-cli";

pub async fn create_admin(
    data: &Path,
    name: String,
    email: String,
    password: String,
) -> Result<()> {
    let catalog = open_catalog(data).await?;
    let operator = Actor::new(OPERATOR, Role::Admin);

    let user = catalog
        .create_user(
            &operator,
            UserInput {
                name: Some(name),
                email: Some(email),
                role: Some(Role::Admin),
                password: Some(password),
            },
        )
        .await
        .context("Failed to create admin")?;

    tracing::info!(id = %user.id, "Admin created");
    println!("Created admin {} ({})", user.email, user.id);
    Ok(())
}
