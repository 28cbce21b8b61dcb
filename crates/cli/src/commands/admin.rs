//! Admin dashboard commands.
//!
//! # Usage
//!
//! ```bash
//! akario admin users
//! akario admin block 64f0c2
//! akario admin activities
//! ```

use akario_core::{Role, UserId};
use akario_storefront::Storefront;
use clap::Subcommand;

use super::{CliError, require};
use crate::output;

#[derive(Subcommand)]
pub enum AdminAction {
    /// List shopper accounts
    Users,
    /// List seller accounts
    Sellers,
    /// Block an account
    Block { id: String },
    /// Unblock an account
    Unblock { id: String },
    /// Delete an account
    Delete { id: String },
    /// Show the admin audit trail
    Activities,
}

pub async fn run(storefront: &Storefront, action: AdminAction) -> Result<(), CliError> {
    require(storefront, &[Role::Admin])?;
    let dashboard = storefront.dashboard();
    match action {
        AdminAction::Users => output::accounts(&dashboard.users().await?),
        AdminAction::Sellers => output::accounts(&dashboard.sellers().await?),
        AdminAction::Block { id } => {
            dashboard.set_blocked(&UserId::new(id), true).await?;
            output::done("Account blocked");
        }
        AdminAction::Unblock { id } => {
            dashboard.set_blocked(&UserId::new(id), false).await?;
            output::done("Account unblocked");
        }
        AdminAction::Delete { id } => {
            dashboard.delete_user(&UserId::new(id)).await?;
            output::done("Account deleted");
        }
        AdminAction::Activities => output::activities(&dashboard.activities().await?),
    }
    Ok(())
}
