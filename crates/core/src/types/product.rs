//! Catalog products.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{ProductId, SellerId};
use super::price::{Discount, Price};

/// A catalog product as served by `GET /api/products`.
///
/// Decoding is lenient: the id is read from `_id` first and `id` second,
/// missing text fields decode as empty strings, a missing price as zero, and
/// an unparseable `createdAt` as absent. The seller may arrive either as a
/// bare id or as a populated document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ProductRecord", rename_all = "camelCase")]
pub struct Product {
    /// Backend document id.
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub name: String,
    pub description: String,
    /// List price before discount.
    pub price: Price,
    /// Percentage off the list price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<Discount>,
    pub category: String,
    /// Image reference exactly as the backend stores it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller: Option<SellerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Minimal product with a name and price; other fields empty.
    #[must_use]
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: Price) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            price,
            discount: None,
            category: String::new(),
            image: None,
            seller: None,
            created_at: None,
        }
    }

    /// Set the discount percentage.
    #[must_use]
    pub const fn with_discount(mut self, discount: Discount) -> Self {
        self.discount = Some(discount);
        self
    }

    /// Set the category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Price after discount.
    #[must_use]
    pub fn effective_price(&self) -> Price {
        self.price.discounted(self.discount)
    }
}

/// Decoding failure for a product document without any id.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("product record has neither `_id` nor `id`")]
pub struct MissingProductId;

#[derive(Deserialize)]
#[serde(untagged)]
enum SellerRef {
    Id(SellerId),
    Populated {
        #[serde(rename = "_id")]
        id: SellerId,
    },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductRecord {
    #[serde(rename = "_id", default)]
    mongo_id: Option<ProductId>,
    #[serde(default)]
    id: Option<ProductId>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    price: Option<Price>,
    #[serde(default)]
    discount: Option<Discount>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    seller: Option<SellerRef>,
    #[serde(default)]
    created_at: Option<String>,
}

impl TryFrom<ProductRecord> for Product {
    type Error = MissingProductId;

    fn try_from(record: ProductRecord) -> Result<Self, Self::Error> {
        let id = record.mongo_id.or(record.id).ok_or(MissingProductId)?;
        Ok(Self {
            id,
            name: record.name.unwrap_or_default(),
            description: record.description.unwrap_or_default(),
            price: record.price.unwrap_or_default(),
            discount: record.discount,
            category: record.category.unwrap_or_default(),
            image: record.image,
            seller: record.seller.map(|s| match s {
                SellerRef::Id(id) | SellerRef::Populated { id } => id,
            }),
            created_at: record
                .created_at
                .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
                .map(|dt| dt.with_timezone(&Utc)),
        })
    }
}
