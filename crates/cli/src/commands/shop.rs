//! Cart and wishlist commands.

use akario_core::{Product, ProductId};
use akario_storefront::Storefront;
use akario_storefront::sync::WriteOutcome;
use clap::Subcommand;

use super::{CliError, show_modal};
use crate::output;

#[derive(Subcommand)]
pub enum CartAction {
    /// Add a product
    Add {
        id: String,
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove a product
    Remove { id: String },
    /// Set a product's quantity; 0 removes it
    Set { id: String, quantity: i64 },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
pub enum WishlistAction {
    /// Save a product
    Add { id: String },
    /// Remove a product
    Remove { id: String },
    /// Empty the wishlist
    Clear,
}

async fn fetch_product(storefront: &Storefront, id: String) -> Result<Product, CliError> {
    storefront
        .catalog()
        .product(&ProductId::new(id.as_str()))
        .await
        .ok_or(CliError::ProductNotFound(id))
}

fn report(outcome: &WriteOutcome) {
    match outcome {
        WriteOutcome::FellBack => {
            tracing::warn!("Saved locally only; the server could not be reached");
        }
        WriteOutcome::Rejected(message) => tracing::warn!(%message, "Server refused the change"),
        WriteOutcome::Superseded => tracing::debug!("Superseded by a newer request"),
        WriteOutcome::Synced | WriteOutcome::Local => {}
    }
}

pub async fn cart(storefront: &Storefront, action: Option<CartAction>) -> Result<(), CliError> {
    let store = storefront.cart();
    if let Some(action) = action {
        let outcome = match action {
            CartAction::Add { id, quantity } => {
                let product = fetch_product(storefront, id).await?;
                let result = store.add(product, quantity).await;
                show_modal(storefront.notifier().open_modal());
                result?
            }
            CartAction::Remove { id } => {
                let outcome = store.remove(&ProductId::new(id)).await;
                show_modal(storefront.notifier().open_modal());
                outcome
            }
            CartAction::Set { id, quantity } => {
                store.update_quantity(&ProductId::new(id), quantity).await
            }
            CartAction::Clear => store.clear().await,
        };
        report(&outcome);
    }
    output::cart(&store.lines(), store.total().amount());
    Ok(())
}

pub async fn wishlist(
    storefront: &Storefront,
    action: Option<WishlistAction>,
) -> Result<(), CliError> {
    let store = storefront.wishlist();
    if let Some(action) = action {
        let outcome = match action {
            WishlistAction::Add { id } => {
                let product = fetch_product(storefront, id).await?;
                let result = store.add(product).await;
                show_modal(storefront.notifier().open_modal());
                result?
            }
            WishlistAction::Remove { id } => {
                let outcome = store.remove(&ProductId::new(id)).await;
                show_modal(storefront.notifier().open_modal());
                outcome
            }
            WishlistAction::Clear => store.clear().await,
        };
        report(&outcome);
    }
    let entries = store.entries();
    if entries.is_empty() {
        output::done("Your wishlist is empty");
    }
    for product in &entries {
        output::product_row(product);
    }
    Ok(())
}
