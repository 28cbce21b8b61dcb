//! Akario Mart storefront client library.
//!
//! Keeps a front end's view of the backend consistent: a caching API
//! gateway, a persisted auth session, cart and wishlist stores that write
//! through to the server and fall back to local state, a notification
//! dispatcher, catalog filtering and sorting, and the checkout flow.
//!
//! # Modules
//!
//! - [`api`] - HTTP gateway with a short-lived read cache
//! - [`session`] - Durable session storage
//! - [`auth`], [`cart`], [`wishlist`] - State stores
//! - [`catalog`] - Product listing, filtering, sorting and management
//! - [`checkout`] - Order summary and the payment round trip
//! - [`dashboard`] - Admin and contact dashboards
//! - [`guard`] - Role-gated page access
//! - [`notify`] - Toasts and modal dialogs
//! - [`state`] - The [`Storefront`] context wiring it all together

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod format;
pub mod guard;
pub mod notify;
pub mod session;
pub mod state;
pub mod sync;
pub mod wishlist;

pub use config::StorefrontConfig;
pub use error::{Result, StorefrontError};
pub use state::Storefront;
