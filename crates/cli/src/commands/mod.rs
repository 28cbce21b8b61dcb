//! Command implementations.

pub mod account;
pub mod admin;
pub mod catalog;
pub mod checkout;
pub mod contact;
pub mod shop;

use akario_core::Role;
use akario_storefront::guard::{self, Access};
use akario_storefront::notify::Modal;
use akario_storefront::{Storefront, StorefrontError};
use thiserror::Error;

use crate::output;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// The storefront refused or failed the operation.
    #[error(transparent)]
    Storefront(#[from] StorefrontError),

    /// A required value was missing from stdin.
    #[error("Missing input: {0}")]
    MissingInput(&'static str),

    /// Reading stdin or a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No product with this id.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// The command needs a signed-in account.
    #[error("{0}. Run `akario login` first.")]
    LoginRequired(String),

    /// The command belongs to another role's dashboard.
    #[error("{message} Your dashboard is {to}.")]
    WrongDashboard { to: &'static str, message: String },
}

/// Check the session against the roles a dashboard command is for.
pub fn require(storefront: &Storefront, allowed: &[Role]) -> Result<(), CliError> {
    match guard::authorize(storefront.auth(), allowed) {
        Access::Granted => Ok(()),
        Access::LoginRequired { message } => Err(CliError::LoginRequired(message)),
        Access::Redirect { to, message, .. } => Err(CliError::WrongDashboard { to, message }),
    }
}

/// Read one trimmed, non-empty line from stdin.
///
/// Goes through the process-wide std handle so consecutive prompts share
/// one buffer.
pub async fn read_line(label: &'static str) -> Result<String, CliError> {
    output::prompt(label);
    let line = tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        std::io::stdin().read_line(&mut line).map(|_| line)
    })
    .await
    .map_err(std::io::Error::other)??;
    let line = line.trim();
    if line.is_empty() {
        return Err(CliError::MissingInput(label));
    }
    Ok(line.to_string())
}

/// Show the modal the last store operation raised, if any.
pub fn show_modal(modal: Option<Modal>) {
    if let Some(modal) = modal {
        output::modal(&modal);
    }
}
