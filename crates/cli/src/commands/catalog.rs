//! Catalog browsing and product management.

use std::path::PathBuf;

use akario_core::{Discount, Price, ProductId, Role};
use akario_storefront::Storefront;
use akario_storefront::api::types::{PhotoUpload, ProductDraft};
use akario_storefront::catalog::{ProductFilter, SortKey, filter_products, sort_products};
use clap::Subcommand;
use rust_decimal::Decimal;

use super::{CliError, require};
use crate::output;

#[derive(Subcommand)]
pub enum ProductAction {
    /// Show one product
    Show { id: String },
    /// Create a product (seller or admin)
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        price: Decimal,
        #[arg(long)]
        category: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Percentage off, 0 to 100
        #[arg(long)]
        discount: Option<Decimal>,
    },
    /// Delete a product (seller or admin)
    Delete { id: String },
    /// Upload a product photo (seller or admin)
    Photo { id: String, path: PathBuf },
}

pub async fn list(storefront: &Storefront, category: String, search: String, sort: SortKey) {
    let products = storefront.catalog().products().await;
    let filter = ProductFilter { category, search };
    let mut shown = filter_products(&products, &filter);
    sort_products(&mut shown, sort);
    if shown.is_empty() {
        output::done("No products found");
    }
    for product in &shown {
        output::product_row(product);
    }
}

pub async fn run(storefront: &Storefront, action: ProductAction) -> Result<(), CliError> {
    if !matches!(action, ProductAction::Show { .. }) {
        require(storefront, Role::STAFF)?;
    }
    let catalog = storefront.catalog();
    match action {
        ProductAction::Show { id } => {
            let product = catalog
                .product(&ProductId::new(id.as_str()))
                .await
                .ok_or(CliError::ProductNotFound(id))?;
            output::product_detail(&product);
        }
        ProductAction::Create {
            name,
            price,
            category,
            description,
            discount,
        } => {
            let discount = discount
                .map(Discount::new)
                .transpose()
                .map_err(|e| akario_storefront::StorefrontError::Validation(e.to_string()))?;
            let draft = ProductDraft {
                name,
                description,
                price: Price::new(price),
                discount,
                category,
                image: None,
            };
            let product = catalog.create_product(&draft).await?;
            output::product_detail(&product);
        }
        ProductAction::Delete { id } => {
            catalog.delete_product(&ProductId::new(id)).await?;
            output::done("Product deleted");
        }
        ProductAction::Photo { id, path } => {
            let bytes = tokio::fs::read(&path).await?;
            let file_name = path
                .file_name()
                .map_or_else(|| "photo".to_string(), |n| n.to_string_lossy().into_owned());
            catalog
                .upload_photo(&ProductId::new(id), PhotoUpload { file_name, bytes })
                .await?;
            output::done("Photo uploaded");
        }
    }
    Ok(())
}
