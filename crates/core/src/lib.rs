//! Akario Core - Shared types library.
//!
//! This crate provides the domain types used across the Akario Mart
//! storefront client:
//! - `storefront` - API gateway, state stores, catalog and checkout
//! - `cli` - Command-line front end
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP
//! clients, no clocks. Cart and wishlist arithmetic lives here so that it can
//! be tested without a backend.
//!
//! # Modules
//!
//! - [`types`] - Ids, prices, emails, roles, products, cart lines and wishlists

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
