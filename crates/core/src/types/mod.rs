//! Core types for Akario Mart.
//!
//! This module provides type-safe wrappers for the storefront's domain
//! concepts. Every type mirrors a remote resource; the backend owns the
//! authoritative copy.

pub mod cart;
pub mod email;
pub mod id;
pub mod price;
pub mod product;
pub mod role;
pub mod user;
pub mod wishlist;

pub use cart::{Cart, CartLine};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{CurrencyCode, Discount, DiscountError, Price};
pub use product::Product;
pub use role::{Role, RoleParseError};
pub use user::User;
pub use wishlist::Wishlist;
