//! Wishlist entries.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::product::Product;

/// Saved products, at most one entry per product id.
///
/// Entries are the products themselves; the backend returns the wishlist as
/// a plain array of product documents.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Product>", into = "Vec<Product>")]
pub struct Wishlist {
    entries: Vec<Product>,
}

impl Wishlist {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[Product] {
        &self.entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn contains(&self, id: &ProductId) -> bool {
        self.entries.iter().any(|p| &p.id == id)
    }

    /// Append the product unless already present. Returns whether it was added.
    pub fn add(&mut self, product: Product) -> bool {
        if self.contains(&product.id) {
            return false;
        }
        self.entries.push(product);
        true
    }

    /// Returns whether an entry was removed.
    pub fn remove(&mut self, id: &ProductId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|p| &p.id != id);
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl FromIterator<Product> for Wishlist {
    fn from_iter<I: IntoIterator<Item = Product>>(iter: I) -> Self {
        let mut wishlist = Self::new();
        for product in iter {
            wishlist.add(product);
        }
        wishlist
    }
}

impl From<Vec<Product>> for Wishlist {
    fn from(entries: Vec<Product>) -> Self {
        entries.into_iter().collect()
    }
}

impl From<Wishlist> for Vec<Product> {
    fn from(wishlist: Wishlist) -> Self {
        wishlist.entries
    }
}
