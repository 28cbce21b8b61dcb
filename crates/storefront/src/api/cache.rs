//! Cache keys and invalidation tracking for gateway responses.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use reqwest::Method;

/// Cache key: `METHOD:path`, e.g. `GET:/api/products`.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct CacheKey(String);

impl CacheKey {
    #[must_use]
    pub fn new(method: &Method, path: &str) -> Self {
        Self(format!("{method}:{path}"))
    }

    /// Key of the GET response for `path`.
    #[must_use]
    pub fn get(path: &str) -> Self {
        Self::new(&Method::GET, path)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Invalidation counters.
///
/// A GET records the [`Generation`] of its key before it is sent and may only
/// fill the cache if the generation is unchanged when the response arrives.
/// A read that raced a mutation is returned to its caller but never cached.
#[derive(Debug, Default)]
pub struct Generations {
    all: AtomicU64,
    keys: Mutex<HashMap<CacheKey, u64>>,
}

/// Snapshot of the counters covering one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generation {
    all: u64,
    key: u64,
}

impl Generations {
    #[must_use]
    pub fn current(&self, key: &CacheKey) -> Generation {
        let keyed = self
            .keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .copied()
            .unwrap_or(0);
        Generation {
            all: self.all.load(Ordering::SeqCst),
            key: keyed,
        }
    }

    /// Mark `key` invalidated.
    pub fn bump(&self, key: &CacheKey) {
        let mut keys = self.keys.lock().unwrap_or_else(PoisonError::into_inner);
        let counter = keys.entry(key.clone()).or_default();
        *counter = counter.wrapping_add(1);
    }

    /// Mark every key invalidated.
    pub fn bump_all(&self) {
        self.all.fetch_add(1, Ordering::SeqCst);
    }
}

/// GET paths whose cached responses a mutation makes stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource<'a> {
    /// The product list and one product's detail.
    Product(&'a str),
    /// The product list only.
    Products,
    Cart,
    Wishlist,
    /// Admin user and seller listings, and the activity trail that records
    /// changes to them.
    Accounts,
    /// Seller-side contact listings.
    SellerContact,
    /// The signed-in user's own contact messages.
    UserContact,
}

impl Resource<'_> {
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        match self {
            Self::Product(id) => vec!["/api/products".to_string(), format!("/api/products/{id}")],
            Self::Products => vec!["/api/products".to_string()],
            Self::Cart => vec!["/api/users/cart".to_string()],
            Self::Wishlist => vec!["/api/users/wishlist".to_string()],
            Self::Accounts => vec![
                "/api/users/admin".to_string(),
                "/api/users/admin/sellers".to_string(),
                "/api/activities".to_string(),
            ],
            Self::SellerContact => vec![
                "/api/seller/contact".to_string(),
                "/api/seller/contact/responses".to_string(),
            ],
            Self::UserContact => vec!["/api/contact/user".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_format() {
        assert_eq!(CacheKey::get("/api/products").as_str(), "GET:/api/products");
        assert_eq!(
            CacheKey::new(&Method::DELETE, "/api/users/cart").as_str(),
            "DELETE:/api/users/cart"
        );
    }

    #[test]
    fn test_generation_moves_on_invalidation() {
        let generations = Generations::default();
        let cart = CacheKey::get("/api/users/cart");
        let products = CacheKey::get("/api/products");

        let seen = generations.current(&cart);
        generations.bump(&products);
        assert_eq!(generations.current(&cart), seen);

        generations.bump(&cart);
        assert_ne!(generations.current(&cart), seen);

        let seen = generations.current(&products);
        generations.bump_all();
        assert_ne!(generations.current(&products), seen);
    }

    #[test]
    fn test_product_write_touches_list_and_detail() {
        assert_eq!(
            Resource::Product("p1").paths(),
            vec!["/api/products", "/api/products/p1"]
        );
    }
}
