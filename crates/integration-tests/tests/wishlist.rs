//! Wishlist store against the fake backend.

use akario_core::{ProductId, Role};
use akario_integration_tests::{FakeBackend, Mode, SELLER, SHOPPER, password};
use akario_storefront::sync::WriteOutcome;
use akario_storefront::{Storefront, StorefrontError};

async fn shopper(backend: &FakeBackend) -> Storefront {
    let storefront = backend.storefront();
    storefront
        .login(SHOPPER, &password(), Role::User)
        .await
        .expect("login");
    storefront
}

#[tokio::test]
async fn test_add_is_idempotent() {
    let backend = FakeBackend::start().await;
    let storefront = shopper(&backend).await;
    let kettle = storefront
        .catalog()
        .product(&ProductId::new("p2"))
        .await
        .expect("seeded product");

    let outcome = storefront
        .wishlist()
        .add(kettle.clone())
        .await
        .expect("add");
    assert_eq!(outcome, WriteOutcome::Synced);
    storefront.wishlist().add(kettle).await.expect("add again");

    assert_eq!(storefront.wishlist().entries().len(), 1);
    assert!(storefront.wishlist().contains(&ProductId::new("p2")));
    assert_eq!(
        storefront.notifier().open_modal().map(|m| m.message),
        Some("Item added to wishlist successfully!".to_string())
    );
}

#[tokio::test]
async fn test_anonymous_and_seller_are_refused() {
    let backend = FakeBackend::start().await;

    let anonymous = backend.storefront();
    let mug = anonymous
        .catalog()
        .product(&ProductId::new("p3"))
        .await
        .expect("seeded product");
    let err = anonymous
        .wishlist()
        .add(mug.clone())
        .await
        .expect_err("anonymous");
    assert!(matches!(err, StorefrontError::LoginRequired));

    let seller = backend.storefront();
    seller
        .login(SELLER, &password(), Role::Seller)
        .await
        .expect("login");
    let err = seller.wishlist().add(mug).await.expect_err("seller");
    assert!(matches!(err, StorefrontError::AccessDenied(Role::Seller)));
    assert_eq!(
        seller.notifier().open_modal().map(|m| m.message),
        Some(
            "Only users can add products to wishlist. Admins and sellers cannot purchase products."
                .to_string()
        )
    );
    assert_eq!(backend.hits("POST", "/api/users/wishlist"), 0);
}

#[tokio::test]
async fn test_unreachable_server_saves_locally() {
    let backend = FakeBackend::start().await;
    let storefront = shopper(&backend).await;
    let tea = storefront
        .catalog()
        .product(&ProductId::new("p1"))
        .await
        .expect("seeded product");

    backend.set_mode(Mode::Broken);
    let err = storefront.wishlist().add(tea).await.expect_err("backend down");

    assert!(matches!(err, StorefrontError::Network));
    assert!(storefront.wishlist().contains(&ProductId::new("p1")));
    assert!(storefront.wishlist().is_unsynced());
}

#[tokio::test]
async fn test_remove_and_clear() {
    let backend = FakeBackend::start().await;
    let storefront = shopper(&backend).await;
    for id in ["p1", "p2", "p4"] {
        let product = storefront
            .catalog()
            .product(&ProductId::new(id))
            .await
            .expect("seeded product");
        storefront.wishlist().add(product).await.expect("add");
    }

    let outcome = storefront.wishlist().remove(&ProductId::new("p2")).await;
    assert_eq!(outcome, WriteOutcome::Synced);
    let ids: Vec<String> = storefront
        .wishlist()
        .entries()
        .iter()
        .map(|p| p.id.to_string())
        .collect();
    assert_eq!(ids, ["p1", "p4"]);

    assert_eq!(storefront.wishlist().clear().await, WriteOutcome::Synced);
    assert!(storefront.wishlist().entries().is_empty());
}

#[tokio::test]
async fn test_refused_remove_keeps_entry() {
    let backend = FakeBackend::start().await;
    let storefront = shopper(&backend).await;
    let tea = storefront
        .catalog()
        .product(&ProductId::new("p1"))
        .await
        .expect("seeded product");
    storefront.wishlist().add(tea).await.expect("add");

    backend.set_mode(Mode::Reject);
    let outcome = storefront.wishlist().remove(&ProductId::new("p1")).await;

    assert!(matches!(outcome, WriteOutcome::Rejected(_)));
    assert!(storefront.wishlist().contains(&ProductId::new("p1")));
    assert_eq!(
        storefront.notifier().open_modal().map(|m| m.message),
        Some("Failed to remove item from wishlist".to_string())
    );
}

#[tokio::test]
async fn test_wishlist_reloads_after_restart() {
    let backend = FakeBackend::start().await;
    let storefront = shopper(&backend).await;
    let mug = storefront
        .catalog()
        .product(&ProductId::new("p3"))
        .await
        .expect("seeded product");
    storefront.wishlist().add(mug).await.expect("add");

    let other = backend.storefront();
    other
        .login(SHOPPER, &password(), Role::User)
        .await
        .expect("login");
    assert!(other.wishlist().contains(&ProductId::new("p3")));
}
