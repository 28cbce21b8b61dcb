//! Backend gateway.
//!
//! [`ApiClient`] wraps every HTTP call the storefront makes: it prepends the
//! configured base URL, attaches the bearer token, caches successful GETs
//! for a few minutes and turns transport failures into an unsuccessful
//! [`ApiResponse`] instead of an error.

mod cache;
mod client;
mod endpoints;
mod response;
pub mod types;

pub use cache::{CacheKey, Resource};
pub use client::ApiClient;
pub use response::ApiResponse;
