//! Session commands.

use akario_core::Role;
use akario_storefront::Storefront;
use akario_storefront::api::types::ProfileUpdate;
use secrecy::SecretString;

use super::{CliError, read_line};
use crate::output;

async fn password_or_prompt(password: Option<String>) -> Result<SecretString, CliError> {
    let password = match password {
        Some(password) => password,
        None => read_line("Password").await?,
    };
    Ok(SecretString::from(password))
}

pub async fn login(
    storefront: &Storefront,
    email: &str,
    password: Option<String>,
    role: Role,
) -> Result<(), CliError> {
    let password = password_or_prompt(password).await?;
    let user = storefront.login(email, &password, role).await?;
    tracing::info!(user_id = %user.id, "Logged in");
    output::user(&user);
    Ok(())
}

pub async fn register(
    storefront: &Storefront,
    name: &str,
    email: &str,
    password: Option<String>,
    role: Role,
) -> Result<(), CliError> {
    let password = password_or_prompt(password).await?;
    let user = storefront.register(name, email, &password, role).await?;
    output::user(&user);
    Ok(())
}

pub fn logout(storefront: &Storefront) -> Result<(), CliError> {
    storefront.logout()?;
    output::done("Logged out");
    Ok(())
}

pub fn whoami(storefront: &Storefront) {
    match storefront.auth().user() {
        Some(user) => output::user(&user),
        None => output::done("Not logged in"),
    }
}

pub async fn profile(
    storefront: &Storefront,
    name: Option<String>,
    email: Option<String>,
) -> Result<(), CliError> {
    let update = ProfileUpdate {
        name,
        email,
        password: None,
    };
    let user = storefront.auth().update_profile(&update).await?;
    output::user(&user);
    Ok(())
}
