//! Typed wrappers over [`ApiClient::request`](super::ApiClient::request),
//! one file per backend route group.

mod admin;
mod auth;
mod contact;
mod payment;
mod products;
mod users;
