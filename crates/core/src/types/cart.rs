//! Shopping cart lines and the arithmetic over them.
//!
//! The backend returns cart lines with the product nested under a `product`
//! field, while older local fallbacks stored the product fields directly on
//! the line. Both shapes are accepted on decode and normalized into
//! [`CartLine`], so nothing downstream needs to know which one arrived.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;
use super::product::Product;

/// One product and how many of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "LineRecord")]
pub struct CartLine {
    pub product: Product,
    /// Always at least 1.
    pub quantity: u32,
}

impl CartLine {
    /// Create a line; a zero quantity is raised to 1.
    #[must_use]
    pub fn new(product: Product, quantity: u32) -> Self {
        Self {
            product,
            quantity: quantity.max(1),
        }
    }

    /// Id of the product on this line.
    #[must_use]
    pub const fn product_id(&self) -> &ProductId {
        &self.product.id
    }

    /// Effective unit price times quantity.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.product.effective_price().times(self.quantity)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LineRecord {
    Nested {
        product: Product,
        #[serde(default)]
        quantity: Option<u32>,
    },
    Flat {
        #[serde(flatten)]
        product: Product,
        #[serde(default)]
        quantity: Option<u32>,
    },
}

impl From<LineRecord> for CartLine {
    fn from(record: LineRecord) -> Self {
        match record {
            LineRecord::Nested { product, quantity } | LineRecord::Flat { product, quantity } => {
                Self::new(product, quantity.unwrap_or(1))
            }
        }
    }
}

/// The cart: at most one line per product id, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<CartLine>", into = "Vec<CartLine>")]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    fn line_mut(&mut self, id: &ProductId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|l| l.product_id() == id)
    }

    /// Whether the product has a line.
    #[must_use]
    pub fn contains(&self, id: &ProductId) -> bool {
        self.lines.iter().any(|l| l.product_id() == id)
    }

    /// Quantity of the product, or 0 when absent.
    #[must_use]
    pub fn quantity_of(&self, id: &ProductId) -> u32 {
        self.lines
            .iter()
            .find(|l| l.product_id() == id)
            .map_or(0, |l| l.quantity)
    }

    /// Add `quantity` of `product`, growing an existing line or appending a
    /// new one.
    pub fn merge(&mut self, product: Product, quantity: u32) {
        let quantity = quantity.max(1);
        if let Some(line) = self.line_mut(&product.id) {
            line.quantity = line.quantity.saturating_add(quantity);
        } else {
            self.lines.push(CartLine::new(product, quantity));
        }
    }

    /// Drop the product's line. Returns whether a line was removed.
    pub fn remove(&mut self, id: &ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id() != id);
        self.lines.len() != before
    }

    /// Set the product's quantity; zero removes the line. Returns whether
    /// the product was in the cart.
    pub fn set_quantity(&mut self, id: &ProductId, quantity: u32) -> bool {
        if quantity == 0 {
            return self.remove(id);
        }
        match self.line_mut(id) {
            Some(line) => {
                line.quantity = quantity;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of effective price times quantity over all lines, unrounded.
    #[must_use]
    pub fn total(&self) -> Price {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    /// Total number of items.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0, |count, l| count.saturating_add(l.quantity))
    }
}

impl FromIterator<CartLine> for Cart {
    /// Duplicate product ids are folded into the first line.
    fn from_iter<I: IntoIterator<Item = CartLine>>(iter: I) -> Self {
        let mut cart = Self::new();
        for line in iter {
            cart.merge(line.product, line.quantity);
        }
        cart
    }
}

impl From<Vec<CartLine>> for Cart {
    fn from(lines: Vec<CartLine>) -> Self {
        lines.into_iter().collect()
    }
}

impl From<Cart> for Vec<CartLine> {
    fn from(cart: Cart) -> Self {
        cart.lines
    }
}
