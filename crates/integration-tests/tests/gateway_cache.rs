//! Gateway response cache, observed through backend hit counts.

use std::time::Duration;

use akario_core::{Price, Role};
use akario_integration_tests::{FakeBackend, Mode, SELLER, SHOPPER, password};
use akario_storefront::api::types::ProductDraft;
use rust_decimal::Decimal;

#[tokio::test]
async fn test_repeated_reads_are_served_from_cache() {
    let backend = FakeBackend::start().await;
    let storefront = backend.storefront();

    let first = storefront.catalog().products().await;
    let second = storefront.catalog().products().await;

    assert_eq!(first.len(), 4);
    assert_eq!(first, second);
    assert_eq!(backend.hits("GET", "/api/products"), 1);
    assert!(storefront.api().is_cached("/api/products"));
}

#[tokio::test]
async fn test_failed_reads_are_not_cached() {
    let backend = FakeBackend::start().await;
    let storefront = backend.storefront();

    backend.set_mode(Mode::Broken);
    assert!(storefront.catalog().products().await.is_empty());
    assert!(!storefront.api().is_cached("/api/products"));

    backend.set_mode(Mode::Normal);
    assert_eq!(storefront.catalog().products().await.len(), 4);
    assert_eq!(backend.hits("GET", "/api/products"), 2);
}

#[tokio::test]
async fn test_login_drops_every_cached_read() {
    let backend = FakeBackend::start().await;
    let storefront = backend.storefront();

    storefront.catalog().products().await;
    storefront
        .login(SHOPPER, &password(), Role::User)
        .await
        .expect("login");
    assert!(!storefront.api().is_cached("/api/products"));

    storefront.catalog().products().await;
    assert_eq!(backend.hits("GET", "/api/products"), 2);
}

#[tokio::test]
async fn test_product_write_invalidates_list() {
    let backend = FakeBackend::start().await;
    let storefront = backend.storefront();
    storefront
        .login(SELLER, &password(), Role::Seller)
        .await
        .expect("login");

    assert_eq!(storefront.catalog().products().await.len(), 4);

    let draft = ProductDraft {
        name: "Teapot".to_string(),
        description: "Cast iron".to_string(),
        price: Price::new(Decimal::from(899)),
        discount: None,
        category: "Kitchen".to_string(),
        image: None,
    };
    let created = storefront
        .catalog()
        .create_product(&draft)
        .await
        .expect("create product");
    assert_eq!(created.name, "Teapot");

    let products = storefront.catalog().products().await;
    assert_eq!(products.len(), 5);
    assert_eq!(backend.hits("GET", "/api/products"), 2);
}

#[tokio::test]
async fn test_cart_write_refreshes_cached_cart() {
    let backend = FakeBackend::start().await;
    let storefront = backend.storefront();
    storefront
        .login(SHOPPER, &password(), Role::User)
        .await
        .expect("login");
    assert_eq!(backend.hits("GET", "/api/users/cart"), 1);
    assert!(storefront.api().is_cached("/api/users/cart"));

    let tea = storefront
        .catalog()
        .product(&"p1".into())
        .await
        .expect("seeded product");
    storefront.cart().add(tea, 1).await.expect("add");
    assert!(!storefront.api().is_cached("/api/users/cart"));

    storefront.reload().await;
    assert_eq!(backend.hits("GET", "/api/users/cart"), 2);
    assert_eq!(storefront.cart().count(), 1);
}

#[tokio::test]
async fn test_read_racing_a_write_is_not_cached() {
    let backend = FakeBackend::start().await;
    backend.seed_cart(SHOPPER, &[("p1", 1)]);
    let storefront = backend.storefront();
    storefront
        .login(SHOPPER, &password(), Role::User)
        .await
        .expect("login");
    let tea = storefront
        .catalog()
        .product(&"p1".into())
        .await
        .expect("seeded product");

    storefront.api().invalidate_all().await;
    backend.delay("GET", "/api/users/cart", Duration::from_millis(300));
    let slow = storefront.clone();
    let load = tokio::spawn(async move { slow.cart().load().await });
    backend.wait_for_hits("GET", "/api/users/cart", 2).await;

    // lands while the read above still holds the one-item cart
    storefront.cart().add(tea, 1).await.expect("add");
    load.await.expect("load task");
    assert!(!storefront.api().is_cached("/api/users/cart"));

    storefront.cart().load().await;
    assert_eq!(backend.hits("GET", "/api/users/cart"), 3);
    assert_eq!(storefront.cart().quantity_of(&"p1".into()), 2);
}
