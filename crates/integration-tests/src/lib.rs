//! Integration tests for the Akario Mart storefront client.
//!
//! [`FakeBackend`] serves the backend's REST contract from memory on an
//! ephemeral local port. It counts requests per `METHOD path` and can be
//! switched into failure modes, so tests can watch the gateway cache and the
//! stores' fallback paths from the outside. Single routes can be slowed
//! down to hold a request in flight while another one runs.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p akario-integration-tests
//! ```
//!
//! # Seeded Accounts
//!
//! | Email | Password | Role |
//! |---|---|---|
//! | `asha@example.com` | `secret` | user |
//! | `sam@example.com` | `secret` | seller |
//! | `ada@example.com` | `secret` | admin |

#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use akario_core::Role;
use akario_storefront::session::MemoryStorage;
use akario_storefront::{Storefront, StorefrontConfig};
use axum::extract::{Multipart, Path, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use secrecy::SecretString;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use uuid::Uuid;

pub const PASSWORD: &str = "secret";
pub const SHOPPER: &str = "asha@example.com";
pub const SELLER: &str = "sam@example.com";
pub const ADMIN: &str = "ada@example.com";

/// How the backend answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Normal,
    /// Cart and wishlist writes are refused with a 400.
    Reject,
    /// Every request gets a non-JSON 502.
    Broken,
    /// Every request carrying a token gets a 401.
    Expired,
}

#[derive(Debug, Clone)]
struct Account {
    id: String,
    name: String,
    email: String,
    password: String,
    role: Role,
    blocked: bool,
}

impl Account {
    fn to_json(&self) -> Value {
        json!({
            "_id": self.id,
            "name": self.name,
            "email": self.email,
            "role": self.role,
            "isBlocked": self.blocked,
        })
    }
}

#[derive(Default)]
struct Inner {
    mode: Mode,
    hits: HashMap<String, usize>,
    delays: HashMap<String, Duration>,
    next_id: u64,
    accounts: Vec<Account>,
    tokens: HashMap<String, String>,
    products: Vec<Value>,
    carts: HashMap<String, Vec<(String, u64)>>,
    wishlists: HashMap<String, Vec<String>>,
    contacts: Vec<Value>,
    activities: Vec<Value>,
    payments_verify: bool,
    order_amounts: Vec<f64>,
}

impl Inner {
    fn seeded() -> Self {
        let account = |id: &str, name: &str, email: &str, role| Account {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            password: PASSWORD.to_string(),
            role,
            blocked: false,
        };
        Self {
            accounts: vec![
                account("u1", "Asha Rao", SHOPPER, Role::User),
                account("s1", "Sam Iyer", SELLER, Role::Seller),
                account("a1", "Ada Menon", ADMIN, Role::Admin),
            ],
            products: vec![
                json!({"_id": "p1", "name": "Green Tea", "description": "Loose leaf", "price": 100, "category": "Grocery", "createdAt": "2024-01-10T00:00:00Z"}),
                json!({"_id": "p2", "name": "Kettle", "description": "Steel kettle", "price": 1200, "discount": 15, "category": "Kitchen", "createdAt": "2024-05-01T00:00:00Z"}),
                json!({"_id": "p3", "name": "Mug", "description": "Stoneware", "price": 30, "category": "kitchen", "createdAt": "2024-06-01T00:00:00Z"}),
                json!({"_id": "p4", "name": "Notebook", "description": "Ruled", "price": 50, "discount": 10, "category": "Books"}),
            ],
            activities: vec![
                json!({"_id": "act1", "admin": "Ada Menon", "action": "block", "target": "spam@example.com", "timestamp": "2025-01-05T10:00:00Z"}),
            ],
            payments_verify: true,
            next_id: 100,
            ..Self::default()
        }
    }

    fn fresh_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{}", self.next_id)
    }

    fn caller(&self, headers: &HeaderMap) -> Option<Account> {
        let token = headers
            .get(AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")?;
        let id = self.tokens.get(token)?;
        self.accounts.iter().find(|a| &a.id == id).cloned()
    }

    fn product(&self, id: &str) -> Option<&Value> {
        self.products.iter().find(|p| p["_id"] == id)
    }

    fn cart_json(&self, user: &str) -> Value {
        let lines: Vec<Value> = self
            .carts
            .get(user)
            .into_iter()
            .flatten()
            .filter_map(|(id, quantity)| {
                self.product(id)
                    .map(|p| json!({"product": p, "quantity": quantity}))
            })
            .collect();
        Value::Array(lines)
    }

    fn wishlist_json(&self, user: &str) -> Value {
        let entries: Vec<Value> = self
            .wishlists
            .get(user)
            .into_iter()
            .flatten()
            .filter_map(|id| self.product(id).cloned())
            .collect();
        Value::Array(entries)
    }

    fn issue_token(&mut self, account_id: &str) -> String {
        let token = format!("tok-{}", Uuid::new_v4().simple());
        self.tokens.insert(token.clone(), account_id.to_string());
        token
    }
}

/// Shared backend state.
#[derive(Clone)]
struct Backend(Arc<Mutex<Inner>>);

impl Backend {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

type Reply = (StatusCode, Json<Value>);

fn ok(body: Value) -> Reply {
    (StatusCode::OK, Json(body))
}

fn fail(status: StatusCode, message: &str) -> Reply {
    (status, Json(json!({"success": false, "message": message})))
}

fn unauthorized() -> Reply {
    fail(StatusCode::UNAUTHORIZED, "Not authorized, token failed")
}

// =============================================================================
// Middleware
// =============================================================================

async fn gate(State(backend): State<Backend>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let method = request.method().clone();
    let key = format!("{method} {path}");
    let (mode, delay) = {
        let mut inner = backend.lock();
        *inner.hits.entry(key.clone()).or_default() += 1;
        (inner.mode, inner.delays.get(&key).copied())
    };
    let user_write = method != Method::GET
        && (path.starts_with("/api/users/cart") || path.starts_with("/api/users/wishlist"));
    match mode {
        Mode::Broken => (StatusCode::BAD_GATEWAY, "<html>Bad Gateway</html>").into_response(),
        Mode::Expired if request.headers().contains_key(AUTHORIZATION) => {
            fail(StatusCode::UNAUTHORIZED, "Token expired").into_response()
        }
        Mode::Reject if user_write => {
            fail(StatusCode::BAD_REQUEST, "Product is out of stock").into_response()
        }
        _ => {
            // the handler answers from the state it saw on arrival
            let response = next.run(request).await;
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            response
        }
    }
}

// =============================================================================
// Auth
// =============================================================================

async fn login(State(backend): State<Backend>, Json(body): Json<Value>) -> Reply {
    let mut inner = backend.lock();
    let Some(account) = inner
        .accounts
        .iter()
        .find(|a| a.email == body["email"] && a.password == body["password"])
        .cloned()
    else {
        return fail(StatusCode::UNAUTHORIZED, "Invalid email or password");
    };
    if account.role.as_str() != body["role"] {
        return fail(StatusCode::FORBIDDEN, "Role does not match this account");
    }
    if account.blocked {
        return fail(StatusCode::FORBIDDEN, "Account is blocked");
    }
    let token = inner.issue_token(&account.id);
    ok(json!({"success": true, "token": token, "data": account.to_json()}))
}

async fn register(State(backend): State<Backend>, Json(body): Json<Value>) -> Reply {
    let mut inner = backend.lock();
    if inner.accounts.iter().any(|a| a.email == body["email"]) {
        return fail(StatusCode::BAD_REQUEST, "User already exists");
    }
    let role = match body["role"].as_str() {
        Some("seller") => Role::Seller,
        Some("admin") => Role::Admin,
        _ => Role::User,
    };
    let account = Account {
        id: inner.fresh_id("u"),
        name: body["name"].as_str().unwrap_or_default().to_string(),
        email: body["email"].as_str().unwrap_or_default().to_string(),
        password: body["password"].as_str().unwrap_or_default().to_string(),
        role,
        blocked: false,
    };
    let token = inner.issue_token(&account.id);
    let data = account.to_json();
    inner.accounts.push(account);
    (
        StatusCode::CREATED,
        Json(json!({"success": true, "token": token, "user": data})),
    )
}

// =============================================================================
// Products
// =============================================================================

async fn list_products(State(backend): State<Backend>) -> Reply {
    ok(json!({"success": true, "data": backend.lock().products}))
}

async fn get_product(State(backend): State<Backend>, Path(id): Path<String>) -> Reply {
    backend.lock().product(&id).map_or_else(
        || fail(StatusCode::NOT_FOUND, "Product not found"),
        |p| ok(json!({"success": true, "data": p})),
    )
}

fn manager(inner: &Inner, headers: &HeaderMap) -> Result<Account, Reply> {
    let account = inner.caller(headers).ok_or_else(unauthorized)?;
    if account.role == Role::User {
        return Err(fail(StatusCode::FORBIDDEN, "Not authorized as seller"));
    }
    Ok(account)
}

async fn create_product(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Reply {
    let mut inner = backend.lock();
    let account = match manager(&inner, &headers) {
        Ok(account) => account,
        Err(reply) => return reply,
    };
    body["_id"] = json!(inner.fresh_id("p"));
    body["seller"] = json!(account.id);
    inner.products.push(body.clone());
    (
        StatusCode::CREATED,
        Json(json!({"success": true, "data": body})),
    )
}

async fn update_product(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Reply {
    let mut inner = backend.lock();
    if let Err(reply) = manager(&inner, &headers) {
        return reply;
    }
    let Some(product) = inner.products.iter_mut().find(|p| p["_id"] == id) else {
        return fail(StatusCode::NOT_FOUND, "Product not found");
    };
    if let (Some(product), Some(fields)) = (product.as_object_mut(), body.as_object()) {
        for (key, value) in fields {
            product.insert(key.clone(), value.clone());
        }
    }
    let product = product.clone();
    ok(json!({"success": true, "data": product}))
}

async fn delete_product(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply {
    let mut inner = backend.lock();
    if let Err(reply) = manager(&inner, &headers) {
        return reply;
    }
    inner.products.retain(|p| p["_id"] != id);
    ok(json!({"success": true, "message": "Product removed"}))
}

async fn upload_photo(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Reply {
    let mut file_name = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("file") {
            file_name = field.file_name().map(str::to_string);
            let _ = field.bytes().await;
        }
    }
    let mut inner = backend.lock();
    if let Err(reply) = manager(&inner, &headers) {
        return reply;
    }
    let Some(file_name) = file_name else {
        return fail(StatusCode::BAD_REQUEST, "No file uploaded");
    };
    let Some(product) = inner.products.iter_mut().find(|p| p["_id"] == id) else {
        return fail(StatusCode::NOT_FOUND, "Product not found");
    };
    product["image"] = json!(format!("/uploads/{file_name}"));
    ok(json!({"success": true, "data": product.clone()}))
}

// =============================================================================
// Cart & Wishlist
// =============================================================================

fn shopper(inner: &Inner, headers: &HeaderMap) -> Result<String, Reply> {
    inner
        .caller(headers)
        .map(|a| a.id)
        .ok_or_else(unauthorized)
}

async fn get_cart(State(backend): State<Backend>, headers: HeaderMap) -> Reply {
    let inner = backend.lock();
    match shopper(&inner, &headers) {
        Ok(user) => ok(json!({"success": true, "data": inner.cart_json(&user)})),
        Err(reply) => reply,
    }
}

async fn add_to_cart(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let mut inner = backend.lock();
    let user = match shopper(&inner, &headers) {
        Ok(user) => user,
        Err(reply) => return reply,
    };
    let id = body["productId"].as_str().unwrap_or_default().to_string();
    if inner.product(&id).is_none() {
        return fail(StatusCode::NOT_FOUND, "Product not found");
    }
    let quantity = body["quantity"].as_u64().unwrap_or(1).max(1);
    let lines = inner.carts.entry(user.clone()).or_default();
    match lines.iter_mut().find(|(line, _)| *line == id) {
        Some((_, q)) => *q += quantity,
        None => lines.push((id, quantity)),
    }
    ok(json!({"success": true, "data": inner.cart_json(&user)}))
}

async fn update_cart(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let mut inner = backend.lock();
    let user = match shopper(&inner, &headers) {
        Ok(user) => user,
        Err(reply) => return reply,
    };
    let id = body["productId"].as_str().unwrap_or_default();
    let quantity = body["quantity"].as_u64().unwrap_or(1);
    let lines = inner.carts.entry(user.clone()).or_default();
    let Some((_, q)) = lines.iter_mut().find(|(line, _)| line == id) else {
        return fail(StatusCode::NOT_FOUND, "Item not in cart");
    };
    *q = quantity;
    ok(json!({"success": true, "data": inner.cart_json(&user)}))
}

async fn remove_from_cart(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply {
    let mut inner = backend.lock();
    let user = match shopper(&inner, &headers) {
        Ok(user) => user,
        Err(reply) => return reply,
    };
    inner
        .carts
        .entry(user.clone())
        .or_default()
        .retain(|(line, _)| *line != id);
    ok(json!({"success": true, "data": inner.cart_json(&user)}))
}

async fn clear_cart(State(backend): State<Backend>, headers: HeaderMap) -> Reply {
    let mut inner = backend.lock();
    let user = match shopper(&inner, &headers) {
        Ok(user) => user,
        Err(reply) => return reply,
    };
    inner.carts.remove(&user);
    ok(json!({"success": true, "message": "Cart cleared"}))
}

async fn get_wishlist(State(backend): State<Backend>, headers: HeaderMap) -> Reply {
    let inner = backend.lock();
    match shopper(&inner, &headers) {
        Ok(user) => ok(json!({"success": true, "data": inner.wishlist_json(&user)})),
        Err(reply) => reply,
    }
}

async fn add_to_wishlist(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let mut inner = backend.lock();
    let user = match shopper(&inner, &headers) {
        Ok(user) => user,
        Err(reply) => return reply,
    };
    let id = body["productId"].as_str().unwrap_or_default().to_string();
    if inner.product(&id).is_none() {
        return fail(StatusCode::NOT_FOUND, "Product not found");
    }
    let entries = inner.wishlists.entry(user.clone()).or_default();
    if !entries.contains(&id) {
        entries.push(id);
    }
    ok(json!({"success": true, "data": inner.wishlist_json(&user)}))
}

async fn remove_from_wishlist(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply {
    let mut inner = backend.lock();
    let user = match shopper(&inner, &headers) {
        Ok(user) => user,
        Err(reply) => return reply,
    };
    inner
        .wishlists
        .entry(user.clone())
        .or_default()
        .retain(|entry| *entry != id);
    ok(json!({"success": true, "data": inner.wishlist_json(&user)}))
}

async fn clear_wishlist(State(backend): State<Backend>, headers: HeaderMap) -> Reply {
    let mut inner = backend.lock();
    let user = match shopper(&inner, &headers) {
        Ok(user) => user,
        Err(reply) => return reply,
    };
    inner.wishlists.remove(&user);
    ok(json!({"success": true, "data": []}))
}

async fn update_profile(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let mut inner = backend.lock();
    let user = match shopper(&inner, &headers) {
        Ok(user) => user,
        Err(reply) => return reply,
    };
    let Some(account) = inner.accounts.iter_mut().find(|a| a.id == user) else {
        return unauthorized();
    };
    if let Some(name) = body["name"].as_str() {
        account.name = name.to_string();
    }
    if let Some(email) = body["email"].as_str() {
        account.email = email.to_string();
    }
    ok(json!({"success": true, "data": account.to_json()}))
}

// =============================================================================
// Admin
// =============================================================================

fn admin(inner: &Inner, headers: &HeaderMap) -> Result<Account, Reply> {
    let account = inner.caller(headers).ok_or_else(unauthorized)?;
    if account.role != Role::Admin {
        return Err(fail(StatusCode::FORBIDDEN, "Not authorized as admin"));
    }
    Ok(account)
}

async fn admin_users(State(backend): State<Backend>, headers: HeaderMap) -> Reply {
    let inner = backend.lock();
    if let Err(reply) = admin(&inner, &headers) {
        return reply;
    }
    let users: Vec<Value> = inner.accounts.iter().map(Account::to_json).collect();
    ok(json!({"success": true, "users": users}))
}

async fn admin_sellers(State(backend): State<Backend>, headers: HeaderMap) -> Reply {
    let inner = backend.lock();
    if let Err(reply) = admin(&inner, &headers) {
        return reply;
    }
    let sellers: Vec<Value> = inner
        .accounts
        .iter()
        .filter(|a| a.role == Role::Seller)
        .map(Account::to_json)
        .collect();
    ok(json!({"success": true, "data": sellers}))
}

async fn delete_user(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply {
    let mut inner = backend.lock();
    if let Err(reply) = admin(&inner, &headers) {
        return reply;
    }
    inner.accounts.retain(|a| a.id != id);
    ok(json!({"success": true, "message": "User removed"}))
}

fn set_blocked(backend: &Backend, headers: &HeaderMap, id: &str, blocked: bool) -> Reply {
    let mut inner = backend.lock();
    let admin_name = match admin(&inner, headers) {
        Ok(account) => account.name,
        Err(reply) => return reply,
    };
    let Some(account) = inner.accounts.iter_mut().find(|a| a.id == id) else {
        return fail(StatusCode::NOT_FOUND, "User not found");
    };
    account.blocked = blocked;
    let target = account.email.clone();
    let entry = json!({
        "_id": format!("act{}", inner.activities.len() + 1),
        "admin": admin_name,
        "action": if blocked { "block" } else { "unblock" },
        "target": target,
        "timestamp": "2025-02-01T09:00:00Z",
    });
    inner.activities.push(entry);
    ok(json!({"success": true}))
}

async fn block_user(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply {
    set_blocked(&backend, &headers, &id, true)
}

async fn unblock_user(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply {
    set_blocked(&backend, &headers, &id, false)
}

async fn activities(State(backend): State<Backend>, headers: HeaderMap) -> Reply {
    let inner = backend.lock();
    if let Err(reply) = admin(&inner, &headers) {
        return reply;
    }
    ok(json!({"success": true, "activities": inner.activities}))
}

// =============================================================================
// Contact
// =============================================================================

async fn send_contact(State(backend): State<Backend>, Json(mut body): Json<Value>) -> Reply {
    let mut inner = backend.lock();
    body["_id"] = json!(inner.fresh_id("c"));
    body["createdAt"] = json!("2025-01-05T10:30:00Z");
    inner.contacts.push(body);
    (StatusCode::CREATED, Json(json!({"success": true})))
}

async fn user_contacts(State(backend): State<Backend>, headers: HeaderMap) -> Reply {
    let inner = backend.lock();
    let Some(account) = inner.caller(&headers) else {
        return unauthorized();
    };
    let mine: Vec<&Value> = inner
        .contacts
        .iter()
        .filter(|c| c["email"] == account.email.as_str())
        .collect();
    ok(json!({"success": true, "data": mine}))
}

async fn seller_contacts(State(backend): State<Backend>, headers: HeaderMap) -> Reply {
    let inner = backend.lock();
    if let Err(reply) = manager(&inner, &headers) {
        return reply;
    }
    ok(json!({"success": true, "data": inner.contacts}))
}

async fn seller_responses(State(backend): State<Backend>, headers: HeaderMap) -> Reply {
    let inner = backend.lock();
    if let Err(reply) = manager(&inner, &headers) {
        return reply;
    }
    let answered: Vec<&Value> = inner
        .contacts
        .iter()
        .filter(|c| !c["response"].is_null())
        .collect();
    ok(json!({"success": true, "data": answered}))
}

async fn respond_contact(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Reply {
    let mut inner = backend.lock();
    let account = match manager(&inner, &headers) {
        Ok(account) => account,
        Err(reply) => return reply,
    };
    let Some(contact) = inner.contacts.iter_mut().find(|c| c["_id"] == id) else {
        return fail(StatusCode::NOT_FOUND, "Contact message not found");
    };
    contact["response"] = json!({
        "name": account.name,
        "message": body["responseMessage"],
        "createdAt": "2025-01-06T08:00:00Z",
    });
    ok(json!({"success": true, "data": contact.clone()}))
}

async fn delete_contact(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply {
    let mut inner = backend.lock();
    if let Err(reply) = manager(&inner, &headers) {
        return reply;
    }
    inner.contacts.retain(|c| c["_id"] != id);
    ok(json!({"success": true}))
}

// =============================================================================
// Payment
// =============================================================================

async fn create_order(State(backend): State<Backend>, Json(body): Json<Value>) -> Reply {
    let mut inner = backend.lock();
    let Some(amount) = body["amount"].as_f64() else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "error": "Amount is required"})),
        );
    };
    inner.order_amounts.push(amount);
    let id = inner.fresh_id("order_");
    ok(json!({
        "success": true,
        "order": {"id": id, "amount": (amount * 100.0).round(), "currency": body["currency"]},
    }))
}

async fn verify_payment(State(backend): State<Backend>, Json(body): Json<Value>) -> Reply {
    let inner = backend.lock();
    let signed = body["razorpay_signature"]
        .as_str()
        .is_some_and(|s| !s.is_empty());
    if inner.payments_verify && signed {
        ok(json!({"success": true, "message": "Payment verified"}))
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "message": "Invalid signature"})),
        )
    }
}

fn router(backend: Backend) -> Router {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route("/api/products", get(list_products).post(create_product))
        .route(
            "/api/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/api/products/{id}/photo", put(upload_photo))
        .route(
            "/api/users/cart",
            get(get_cart)
                .post(add_to_cart)
                .put(update_cart)
                .delete(clear_cart),
        )
        .route(
            "/api/users/cart/{id}",
            axum::routing::delete(remove_from_cart),
        )
        .route(
            "/api/users/wishlist",
            get(get_wishlist).post(add_to_wishlist).delete(clear_wishlist),
        )
        .route(
            "/api/users/wishlist/{id}",
            axum::routing::delete(remove_from_wishlist),
        )
        .route("/api/users/profile", put(update_profile))
        .route("/api/users/admin", get(admin_users))
        .route("/api/users/admin/sellers", get(admin_sellers))
        .route("/api/users/admin/{id}", axum::routing::delete(delete_user))
        .route("/api/users/admin/{id}/block", put(block_user))
        .route("/api/users/admin/{id}/unblock", put(unblock_user))
        .route("/api/activities", get(activities))
        .route("/api/contact", post(send_contact))
        .route("/api/contact/user", get(user_contacts))
        .route("/api/seller/contact", get(seller_contacts))
        .route("/api/seller/contact/responses", get(seller_responses))
        .route(
            "/api/seller/contact/{id}",
            axum::routing::delete(delete_contact),
        )
        .route("/api/seller/contact/{id}/response", post(respond_contact))
        .route("/api/payment/order", post(create_order))
        .route("/api/payment/verify", post(verify_payment))
        .layer(middleware::from_fn_with_state(backend.clone(), gate))
        .with_state(backend)
}

// =============================================================================
// FakeBackend
// =============================================================================

/// In-memory backend serving the REST contract on `127.0.0.1:<ephemeral>`.
/// The server stops when this value is dropped.
pub struct FakeBackend {
    addr: SocketAddr,
    backend: Backend,
    task: JoinHandle<()>,
}

impl FakeBackend {
    /// Start a seeded backend.
    pub async fn start() -> Self {
        let backend = Backend(Arc::new(Mutex::new(Inner::seeded())));
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake backend");
        let addr = listener.local_addr().expect("fake backend address");
        let app = router(backend.clone());
        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Self {
            addr,
            backend,
            task,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Storefront configuration pointing here, with a payment key set.
    #[must_use]
    pub fn config(&self) -> StorefrontConfig {
        let mut config =
            StorefrontConfig::for_base_url(&self.base_url()).expect("valid fake backend url");
        config.checkout.razorpay_key_id = Some(SecretString::from("rzp_test_fake"));
        config
    }

    /// A fresh storefront with in-memory session storage.
    #[must_use]
    pub fn storefront(&self) -> Storefront {
        Storefront::new(self.config(), Arc::new(MemoryStorage::new()))
    }

    /// Requests received for `METHOD path`, e.g. `("GET", "/api/products")`.
    #[must_use]
    pub fn hits(&self, method: &str, path: &str) -> usize {
        self.backend
            .lock()
            .hits
            .get(&format!("{method} {path}"))
            .copied()
            .unwrap_or(0)
    }

    /// Wait until `METHOD path` has been received `count` times.
    pub async fn wait_for_hits(&self, method: &str, path: &str, count: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.hits(method, path) < count {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("request never reached the fake backend");
    }

    /// Hold every answer to `METHOD path` back for `delay`. The answer
    /// reflects the backend state when the request arrived.
    pub fn delay(&self, method: &str, path: &str, delay: Duration) {
        self.backend
            .lock()
            .delays
            .insert(format!("{method} {path}"), delay);
    }

    pub fn set_mode(&self, mode: Mode) {
        self.backend.lock().mode = mode;
    }

    /// Make payment verification fail.
    pub fn reject_payments(&self) {
        self.backend.lock().payments_verify = false;
    }

    /// Put `(product id, quantity)` lines in an account's server cart.
    pub fn seed_cart(&self, email: &str, lines: &[(&str, u64)]) {
        let mut inner = self.backend.lock();
        let id = inner
            .accounts
            .iter()
            .find(|a| a.email == email)
            .map(|a| a.id.clone())
            .expect("seeded account");
        inner.carts.insert(
            id,
            lines.iter().map(|(p, q)| ((*p).to_string(), *q)).collect(),
        );
    }

    /// An account's server cart as `(product id, quantity)`.
    #[must_use]
    pub fn server_cart(&self, email: &str) -> Vec<(String, u64)> {
        let inner = self.backend.lock();
        inner
            .accounts
            .iter()
            .find(|a| a.email == email)
            .and_then(|a| inner.carts.get(&a.id))
            .cloned()
            .unwrap_or_default()
    }

    /// Amounts of every payment order created, in order.
    #[must_use]
    pub fn order_amounts(&self) -> Vec<f64> {
        self.backend.lock().order_amounts.clone()
    }

    /// Add a contact message as if a visitor had sent it.
    pub fn seed_contact(&self, email: &str, subject: &str) -> String {
        let mut inner = self.backend.lock();
        let id = inner.fresh_id("c");
        inner.contacts.push(json!({
            "_id": id,
            "name": "Visitor",
            "email": email,
            "subject": subject,
            "message": "Is this in stock?",
            "createdAt": "2025-01-05T10:30:00Z",
        }));
        id
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Password as the storefront takes it.
#[must_use]
pub fn password() -> SecretString {
    SecretString::from(PASSWORD)
}
