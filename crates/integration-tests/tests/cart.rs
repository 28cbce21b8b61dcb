//! Cart store against the fake backend: remote-first writes, local
//! fallback and the purchase gate.

use std::time::Duration;

use akario_core::{Product, ProductId, Role};
use akario_integration_tests::{ADMIN, FakeBackend, Mode, SELLER, SHOPPER, password};
use akario_storefront::sync::WriteOutcome;
use akario_storefront::{Storefront, StorefrontError};
use rust_decimal::Decimal;

async fn signed_in(backend: &FakeBackend, email: &str, role: Role) -> Storefront {
    let storefront = backend.storefront();
    storefront
        .login(email, &password(), role)
        .await
        .expect("login");
    storefront
}

async fn product(storefront: &Storefront, id: &str) -> Product {
    storefront
        .catalog()
        .product(&ProductId::new(id))
        .await
        .expect("seeded product")
}

#[tokio::test]
async fn test_add_syncs_with_server() {
    let backend = FakeBackend::start().await;
    let storefront = signed_in(&backend, SHOPPER, Role::User).await;
    let tea = product(&storefront, "p1").await;

    let outcome = storefront.cart().add(tea.clone(), 2).await.expect("add");
    assert_eq!(outcome, WriteOutcome::Synced);
    storefront.cart().add(tea, 1).await.expect("add again");

    assert_eq!(storefront.cart().quantity_of(&ProductId::new("p1")), 3);
    assert_eq!(backend.server_cart(SHOPPER), vec![("p1".to_string(), 3)]);
    assert!(!storefront.cart().is_unsynced());
    assert_eq!(
        storefront.notifier().open_modal().map(|m| m.message),
        Some("Item added to cart successfully!".to_string())
    );
}

#[tokio::test]
async fn test_zero_quantity_adds_one() {
    let backend = FakeBackend::start().await;
    let storefront = signed_in(&backend, SHOPPER, Role::User).await;
    let mug = product(&storefront, "p3").await;

    storefront.cart().add(mug, 0).await.expect("add");
    assert_eq!(backend.server_cart(SHOPPER), vec![("p3".to_string(), 1)]);
}

#[tokio::test]
async fn test_total_uses_discounted_prices() {
    let backend = FakeBackend::start().await;
    backend.seed_cart(SHOPPER, &[("p1", 2), ("p2", 1)]);
    let storefront = signed_in(&backend, SHOPPER, Role::User).await;

    // 2 x 100 + 1200 less 15%
    assert_eq!(storefront.cart().total().amount(), Decimal::from(1220));
    assert_eq!(storefront.cart().count(), 3);
}

#[tokio::test]
async fn test_anonymous_add_is_refused() {
    let backend = FakeBackend::start().await;
    let storefront = backend.storefront();
    let tea = product(&storefront, "p1").await;

    let err = storefront.cart().add(tea, 1).await.expect_err("anonymous");
    assert!(matches!(err, StorefrontError::LoginRequired));
    assert_eq!(storefront.cart().count(), 0);
    assert_eq!(
        storefront.notifier().open_modal().map(|m| m.title),
        Some("Login Required".to_string())
    );
    assert_eq!(backend.hits("POST", "/api/users/cart"), 0);
}

#[tokio::test]
async fn test_sellers_and_admins_cannot_buy() {
    let backend = FakeBackend::start().await;
    for (email, role) in [(SELLER, Role::Seller), (ADMIN, Role::Admin)] {
        let storefront = signed_in(&backend, email, role).await;
        let tea = product(&storefront, "p1").await;

        let err = storefront.cart().add(tea, 1).await.expect_err("not a shopper");
        assert!(matches!(err, StorefrontError::AccessDenied(r) if r == role));
        assert_eq!(
            storefront.notifier().open_modal().map(|m| m.title),
            Some("Access Denied".to_string())
        );
    }
    assert_eq!(backend.hits("POST", "/api/users/cart"), 0);
}

#[tokio::test]
async fn test_unreachable_server_falls_back_to_local_add() {
    let backend = FakeBackend::start().await;
    let storefront = signed_in(&backend, SHOPPER, Role::User).await;
    let tea = product(&storefront, "p1").await;

    backend.set_mode(Mode::Broken);
    let err = storefront.cart().add(tea, 2).await.expect_err("backend down");

    assert!(matches!(err, StorefrontError::Network));
    assert_eq!(storefront.cart().quantity_of(&ProductId::new("p1")), 2);
    assert!(storefront.cart().is_unsynced());
    assert!(backend.server_cart(SHOPPER).is_empty());
    assert_eq!(
        storefront.notifier().open_modal().map(|m| m.message),
        Some("Failed to add product to cart".to_string())
    );
}

#[tokio::test]
async fn test_refused_add_shows_server_message() {
    let backend = FakeBackend::start().await;
    let storefront = signed_in(&backend, SHOPPER, Role::User).await;
    let kettle = product(&storefront, "p2").await;

    backend.set_mode(Mode::Reject);
    let err = storefront.cart().add(kettle, 1).await.expect_err("refused");

    assert_eq!(err.user_message(), "Product is out of stock");
    assert_eq!(
        storefront.notifier().open_modal().map(|m| m.message),
        Some("Product is out of stock".to_string())
    );
}

#[tokio::test]
async fn test_refused_remove_keeps_line() {
    let backend = FakeBackend::start().await;
    backend.seed_cart(SHOPPER, &[("p1", 1)]);
    let storefront = signed_in(&backend, SHOPPER, Role::User).await;

    backend.set_mode(Mode::Reject);
    let outcome = storefront.cart().remove(&ProductId::new("p1")).await;

    assert_eq!(
        outcome,
        WriteOutcome::Rejected("Product is out of stock".to_string())
    );
    assert!(storefront.cart().contains(&ProductId::new("p1")));
}

#[tokio::test]
async fn test_unreachable_remove_falls_back() {
    let backend = FakeBackend::start().await;
    backend.seed_cart(SHOPPER, &[("p1", 1), ("p3", 2)]);
    let storefront = signed_in(&backend, SHOPPER, Role::User).await;

    backend.set_mode(Mode::Broken);
    let outcome = storefront.cart().remove(&ProductId::new("p1")).await;

    assert_eq!(outcome, WriteOutcome::FellBack);
    assert!(!storefront.cart().contains(&ProductId::new("p1")));
    assert_eq!(storefront.cart().count(), 2);
    assert!(storefront.cart().is_unsynced());
}

#[tokio::test]
async fn test_update_quantity_and_removal_at_zero() {
    let backend = FakeBackend::start().await;
    backend.seed_cart(SHOPPER, &[("p1", 1), ("p3", 1)]);
    let storefront = signed_in(&backend, SHOPPER, Role::User).await;

    let outcome = storefront
        .cart()
        .update_quantity(&ProductId::new("p1"), 5)
        .await;
    assert_eq!(outcome, WriteOutcome::Synced);
    assert_eq!(storefront.cart().quantity_of(&ProductId::new("p1")), 5);

    storefront
        .cart()
        .update_quantity(&ProductId::new("p3"), 0)
        .await;
    assert!(!storefront.cart().contains(&ProductId::new("p3")));
    assert_eq!(backend.hits("DELETE", "/api/users/cart/p3"), 1);
    assert_eq!(backend.server_cart(SHOPPER), vec![("p1".to_string(), 5)]);
}

#[tokio::test]
async fn test_clear_empties_server_cart() {
    let backend = FakeBackend::start().await;
    backend.seed_cart(SHOPPER, &[("p1", 1), ("p4", 3)]);
    let storefront = signed_in(&backend, SHOPPER, Role::User).await;

    assert_eq!(storefront.cart().clear().await, WriteOutcome::Synced);
    assert_eq!(storefront.cart().count(), 0);
    assert!(backend.server_cart(SHOPPER).is_empty());
}

#[tokio::test]
async fn test_failed_load_starts_empty() {
    let backend = FakeBackend::start().await;
    backend.seed_cart(SHOPPER, &[("p1", 1)]);
    let storefront = signed_in(&backend, SHOPPER, Role::User).await;
    assert_eq!(storefront.cart().count(), 1);

    storefront.api().invalidate_all().await;
    backend.set_mode(Mode::Broken);
    storefront.cart().load().await;

    assert_eq!(storefront.cart().count(), 0);
    assert!(storefront.auth().is_authenticated());
}

#[tokio::test]
async fn test_cached_cart_serves_load_during_outage() {
    let backend = FakeBackend::start().await;
    backend.seed_cart(SHOPPER, &[("p1", 1)]);
    let storefront = signed_in(&backend, SHOPPER, Role::User).await;
    assert!(storefront.api().is_cached("/api/users/cart"));

    // no write since the cart was fetched, so the cached copy is current
    backend.set_mode(Mode::Broken);
    storefront.cart().load().await;

    assert_eq!(storefront.cart().count(), 1);
    assert_eq!(backend.hits("GET", "/api/users/cart"), 1);
}

#[tokio::test]
async fn test_late_load_is_dropped() {
    let backend = FakeBackend::start().await;
    backend.seed_cart(SHOPPER, &[("p1", 1)]);
    let storefront = signed_in(&backend, SHOPPER, Role::User).await;
    let tea = product(&storefront, "p1").await;
    assert!(!storefront.cart().is_busy());

    storefront.api().invalidate_all().await;
    backend.delay("GET", "/api/users/cart", Duration::from_millis(300));
    let slow = storefront.clone();
    let load = tokio::spawn(async move { slow.cart().load().await });
    backend.wait_for_hits("GET", "/api/users/cart", 2).await;
    assert!(storefront.cart().is_busy());

    let outcome = storefront.cart().add(tea, 1).await.expect("add");
    assert_eq!(outcome, WriteOutcome::Synced);
    load.await.expect("load task");

    // the load answered with the one-item cart it saw on arrival
    assert_eq!(storefront.cart().quantity_of(&ProductId::new("p1")), 2);
    assert!(!storefront.cart().is_busy());
}

#[tokio::test]
async fn test_overtaken_write_is_superseded() {
    let backend = FakeBackend::start().await;
    backend.seed_cart(SHOPPER, &[("p1", 1), ("p4", 2)]);
    let storefront = signed_in(&backend, SHOPPER, Role::User).await;

    backend.delay("PUT", "/api/users/cart", Duration::from_millis(300));
    let slow = storefront.clone();
    let update = tokio::spawn(async move {
        slow.cart()
            .update_quantity(&ProductId::new("p1"), 5)
            .await
    });
    backend.wait_for_hits("PUT", "/api/users/cart", 1).await;

    let removed = storefront.cart().remove(&ProductId::new("p4")).await;
    assert_eq!(removed, WriteOutcome::Synced);
    let updated = update.await.expect("update task");
    assert_eq!(updated, WriteOutcome::Superseded);

    assert_eq!(storefront.cart().quantity_of(&ProductId::new("p1")), 5);
    assert!(!storefront.cart().contains(&ProductId::new("p4")));
    assert!(!storefront.cart().is_busy());
}

#[tokio::test]
async fn test_carts_do_not_leak_between_accounts() {
    let backend = FakeBackend::start().await;
    backend.seed_cart(SHOPPER, &[("p1", 4)]);
    let storefront = signed_in(&backend, SHOPPER, Role::User).await;
    assert_eq!(storefront.cart().count(), 4);

    storefront.logout().expect("logout");
    storefront
        .register("Ravi", "ravi@example.com", &password(), Role::User)
        .await
        .expect("register");

    assert_eq!(storefront.cart().count(), 0);
}
