//! Product catalog: fetching, filtering, sorting and seller/admin management.

use std::cmp::Ordering;
use std::str::FromStr;
use std::sync::Arc;

use akario_core::{Product, ProductId, Role};
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{instrument, warn};

use crate::api::types::{PhotoUpload, ProductDraft};
use crate::api::{ApiClient, ApiResponse};
use crate::auth::AuthStore;
use crate::error::{Result, StorefrontError};
use crate::guard;

// =============================================================================
// Filtering
// =============================================================================

/// Category and free-text search applied to a product list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFilter {
    /// Category name, or `all` for every category.
    pub category: String,
    /// Substring searched in name, description and category. Empty matches
    /// everything.
    pub search: String,
}

impl Default for ProductFilter {
    fn default() -> Self {
        Self {
            category: "all".to_string(),
            search: String::new(),
        }
    }
}

impl ProductFilter {
    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    #[must_use]
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    /// Build from a listing URL query such as `category=Books&search=tea`.
    /// Unknown parameters are ignored.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let mut filter = Self::default();
        for (key, value) in url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
            match key.as_ref() {
                "category" if !value.is_empty() => filter.category = value.into_owned(),
                "search" => filter.search = value.into_owned(),
                _ => {}
            }
        }
        filter
    }

    /// Whether `product` passes both the category and the search test.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        let category_match = self.category.eq_ignore_ascii_case("all")
            || product.category.to_lowercase() == self.category.to_lowercase();

        let needle = self.search.to_lowercase();
        let search_match = needle.is_empty()
            || [&product.name, &product.description, &product.category]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle));

        category_match && search_match
    }
}

/// Products passing `filter`, in input order.
#[must_use]
pub fn filter_products(products: &[Product], filter: &ProductFilter) -> Vec<Product> {
    products
        .iter()
        .filter(|p| filter.matches(p))
        .cloned()
        .collect()
}

/// Distinct non-empty categories in first-seen order.
#[must_use]
pub fn categories(products: &[Product]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for product in products {
        if !product.category.is_empty() && !seen.iter().any(|c| c == &product.category) {
            seen.push(product.category.clone());
        }
    }
    seen
}

// =============================================================================
// Sorting
// =============================================================================

/// Listing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Name, A to Z. Names compare case-folded, with ties broken on the
    /// raw name. This approximates a locale collation; accents and
    /// language-specific ordering are not taken into account.
    #[default]
    Name,
    /// List price, lowest first.
    PriceLow,
    /// List price, highest first.
    PriceHigh,
    /// Discount, largest first.
    Discount,
    /// Creation time, latest first.
    Newest,
}

impl SortKey {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::PriceLow => "price-low",
            Self::PriceHigh => "price-high",
            Self::Discount => "discount",
            Self::Newest => "newest",
        }
    }

    fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            Self::Name => a
                .name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name)),
            Self::PriceLow => a.price.cmp(&b.price),
            Self::PriceHigh => b.price.cmp(&a.price),
            Self::Discount => discount_of(b).cmp(&discount_of(a)),
            Self::Newest => created_of(b).cmp(&created_of(a)),
        }
    }
}

fn discount_of(product: &Product) -> rust_decimal::Decimal {
    product.discount.map(|d| d.percent()).unwrap_or_default()
}

fn created_of(product: &Product) -> DateTime<Utc> {
    product.created_at.unwrap_or(DateTime::UNIX_EPOCH)
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for an unknown sort key.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown sort key: {0} (expected name, price-low, price-high, discount or newest)")]
pub struct SortKeyParseError(pub String);

impl FromStr for SortKey {
    type Err = SortKeyParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "name" => Ok(Self::Name),
            "price-low" => Ok(Self::PriceLow),
            "price-high" => Ok(Self::PriceHigh),
            "discount" => Ok(Self::Discount),
            "newest" => Ok(Self::Newest),
            other => Err(SortKeyParseError(other.to_string())),
        }
    }
}

/// Sort in place. Stable: products with equal keys keep their input order,
/// and no further tie-break is applied.
pub fn sort_products(products: &mut [Product], key: SortKey) {
    products.sort_by(|a, b| key.compare(a, b));
}

// =============================================================================
// Catalog
// =============================================================================

/// Catalog reads for everyone, writes for sellers and admins.
pub struct Catalog {
    api: ApiClient,
    auth: Arc<AuthStore>,
}

impl Catalog {
    #[must_use]
    pub const fn new(api: ApiClient, auth: Arc<AuthStore>) -> Self {
        Self { api, auth }
    }

    /// All products. Failures degrade to an empty list; documents without
    /// an id are skipped.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Vec<Product> {
        let response = self.api.products().await;
        if !response.success {
            warn!(error = %response.to_error(), "Failed to fetch products");
            return Vec::new();
        }
        match response.decode_first::<Vec<Value>>(&["data", "products"]) {
            Ok(documents) => decode_products(documents),
            Err(e) => {
                warn!(error = %e, "Product list has an unexpected shape");
                Vec::new()
            }
        }
    }

    /// One product, or `None` when missing or unreachable.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: &ProductId) -> Option<Product> {
        let response = self.api.product(id).await;
        if !response.success {
            return None;
        }
        response
            .decode_first(&["data", "product"])
            .inspect_err(|e| warn!(error = %e, "Product has an unexpected shape"))
            .ok()
    }

    /// Token of a session allowed to manage products.
    fn manager_token(&self) -> Result<SecretString> {
        guard::authorize(&self.auth, Role::STAFF).into_result()?;
        self.auth.token().ok_or(StorefrontError::LoginRequired)
    }

    fn managed_result(&self, response: ApiResponse) -> Result<ApiResponse> {
        if response.is_unauthorized() {
            self.auth.expire();
        }
        response.into_result()
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `LoginRequired`/`AccessDenied` for sessions that may not
    /// manage products, and the backend's error otherwise.
    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create_product(&self, draft: &ProductDraft) -> Result<Product> {
        let token = self.manager_token()?;
        let response = self.api.create_product(draft, &token).await;
        self.managed_result(response)?
            .decode_first(&["data", "product"])
    }

    /// Replace a product's fields.
    ///
    /// # Errors
    ///
    /// Same as [`Catalog::create_product`].
    #[instrument(skip(self, draft), fields(product_id = %id))]
    pub async fn update_product(&self, id: &ProductId, draft: &ProductDraft) -> Result<Product> {
        let token = self.manager_token()?;
        let response = self.api.update_product(id, draft, &token).await;
        self.managed_result(response)?
            .decode_first(&["data", "product"])
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Same as [`Catalog::create_product`].
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<()> {
        let token = self.manager_token()?;
        let response = self.api.delete_product(id, &token).await;
        self.managed_result(response).map(|_| ())
    }

    /// Upload a product photo.
    ///
    /// # Errors
    ///
    /// Same as [`Catalog::create_product`].
    #[instrument(skip(self, photo), fields(product_id = %id))]
    pub async fn upload_photo(&self, id: &ProductId, photo: PhotoUpload) -> Result<()> {
        let token = self.manager_token()?;
        let response = self.api.upload_product_photo(id, photo, &token).await;
        self.managed_result(response).map(|_| ())
    }
}

fn decode_products(documents: Vec<Value>) -> Vec<Product> {
    let total = documents.len();
    let products: Vec<Product> = documents
        .into_iter()
        .filter_map(|doc| serde_json::from_value(doc).ok())
        .collect();
    if products.len() != total {
        warn!(
            skipped = total - products.len(),
            "Skipped product documents without an id"
        );
    }
    products
}
