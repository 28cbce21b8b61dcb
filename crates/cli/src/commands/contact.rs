//! Contact message commands.

use akario_core::{ContactId, Role};
use akario_storefront::Storefront;
use akario_storefront::api::types::ContactMessage;
use clap::Subcommand;

use super::{CliError, require};
use crate::output;

#[derive(Subcommand)]
pub enum ContactAction {
    /// Send a message to the store
    Send {
        /// Defaults to the account name
        #[arg(long)]
        name: Option<String>,
        /// Defaults to the account email
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        message: String,
    },
    /// Your messages and their replies
    Messages,
    /// Messages waiting for a seller
    Inbox,
    /// Messages a seller has answered
    Responses,
    /// Reply to a message (seller or admin)
    Respond { id: String, message: String },
    /// Delete a message (seller or admin)
    Delete { id: String },
}

pub async fn run(storefront: &Storefront, action: ContactAction) -> Result<(), CliError> {
    match action {
        ContactAction::Send { .. } => {}
        ContactAction::Messages => require(storefront, &[Role::User, Role::Seller, Role::Admin])?,
        _ => require(storefront, Role::STAFF)?,
    }
    let dashboard = storefront.dashboard();
    match action {
        ContactAction::Send {
            name,
            email,
            subject,
            message,
        } => {
            let account = storefront.auth().user();
            let message = ContactMessage {
                name: name
                    .or_else(|| account.as_ref().map(|u| u.name.clone()))
                    .unwrap_or_default(),
                email: email
                    .or_else(|| account.as_ref().map(|u| u.email.clone()))
                    .unwrap_or_default(),
                subject,
                message,
            };
            dashboard.send_contact(&message).await?;
            output::done("Message sent");
        }
        ContactAction::Messages => output::contacts(&dashboard.my_messages().await?),
        ContactAction::Inbox => output::contacts(&dashboard.seller_messages().await?),
        ContactAction::Responses => output::contacts(&dashboard.seller_responses().await?),
        ContactAction::Respond { id, message } => {
            dashboard.respond(&ContactId::new(id), &message).await?;
            output::done("Response sent");
        }
        ContactAction::Delete { id } => {
            dashboard.delete_message(&ContactId::new(id)).await?;
            output::done("Message deleted");
        }
    }
    Ok(())
}
