//! Admin account management and contact messages.

use akario_core::{ContactId, Role, UserId};
use akario_integration_tests::{ADMIN, FakeBackend, SELLER, SHOPPER, password};
use akario_storefront::api::types::ContactMessage;
use akario_storefront::guard::{Access, authorize};
use akario_storefront::{Storefront, StorefrontError};

async fn signed_in(backend: &FakeBackend, email: &str, role: Role) -> Storefront {
    let storefront = backend.storefront();
    storefront
        .login(email, &password(), role)
        .await
        .expect("login");
    storefront
}

fn message(subject: &str) -> ContactMessage {
    ContactMessage {
        name: "Asha Rao".to_string(),
        email: SHOPPER.to_string(),
        subject: subject.to_string(),
        message: "Where is my order?".to_string(),
    }
}

#[tokio::test]
async fn test_admin_lists_shoppers_and_sellers() {
    let backend = FakeBackend::start().await;
    let admin = signed_in(&backend, ADMIN, Role::Admin).await;

    let users = admin.dashboard().users().await.expect("users");
    assert_eq!(users.len(), 1);
    assert!(users.iter().all(|u| u.role == Role::User));

    let sellers = admin.dashboard().sellers().await.expect("sellers");
    assert_eq!(
        sellers.iter().map(|s| s.email.as_str()).collect::<Vec<_>>(),
        [SELLER]
    );
}

#[tokio::test]
async fn test_block_shows_in_listing_and_trail() {
    let backend = FakeBackend::start().await;
    let admin = signed_in(&backend, ADMIN, Role::Admin).await;
    let dashboard = admin.dashboard();

    assert_eq!(dashboard.activities().await.expect("trail").len(), 1);
    dashboard
        .set_blocked(&UserId::new("u1"), true)
        .await
        .expect("block");

    let users = dashboard.users().await.expect("users");
    assert!(users.first().is_some_and(|u| u.is_blocked));

    let trail = dashboard.activities().await.expect("trail");
    assert_eq!(trail.len(), 2);
    assert!(
        trail
            .last()
            .is_some_and(|a| a.action == "block" && a.target == SHOPPER)
    );

    let err = backend
        .storefront()
        .login(SHOPPER, &password(), Role::User)
        .await
        .expect_err("blocked account");
    assert_eq!(err.user_message(), "Account is blocked");

    dashboard
        .set_blocked(&UserId::new("u1"), false)
        .await
        .expect("unblock");
    assert!(
        dashboard
            .users()
            .await
            .expect("users")
            .iter()
            .all(|u| !u.is_blocked)
    );
}

#[tokio::test]
async fn test_admin_deletes_account() {
    let backend = FakeBackend::start().await;
    let admin = signed_in(&backend, ADMIN, Role::Admin).await;

    admin
        .dashboard()
        .delete_user(&UserId::new("s1"))
        .await
        .expect("delete");
    assert!(admin.dashboard().sellers().await.expect("sellers").is_empty());
}

#[tokio::test]
async fn test_admin_operations_need_admin() {
    let backend = FakeBackend::start().await;

    let anonymous = backend.storefront();
    assert!(matches!(
        anonymous.dashboard().users().await,
        Err(StorefrontError::LoginRequired)
    ));

    let seller = signed_in(&backend, SELLER, Role::Seller).await;
    assert!(matches!(
        seller.dashboard().activities().await,
        Err(StorefrontError::AccessDenied(Role::Seller))
    ));
    assert_eq!(backend.hits("GET", "/api/activities"), 0);
}

#[tokio::test]
async fn test_contact_round_trip() {
    let backend = FakeBackend::start().await;
    let shopper = signed_in(&backend, SHOPPER, Role::User).await;

    shopper
        .dashboard()
        .send_contact(&message("Order status"))
        .await
        .expect("send");
    let mine = shopper.dashboard().my_messages().await.expect("messages");
    assert_eq!(mine.len(), 1);
    let id = mine.first().map(|m| m.id.clone()).expect("message id");
    assert!(mine.iter().all(|m| m.response.is_none()));

    let seller = signed_in(&backend, SELLER, Role::Seller).await;
    assert_eq!(
        seller.dashboard().seller_messages().await.expect("inbox").len(),
        1
    );
    assert!(
        seller
            .dashboard()
            .seller_responses()
            .await
            .expect("responses")
            .is_empty()
    );
    seller
        .dashboard()
        .respond(&id, "  Shipped today  ")
        .await
        .expect("respond");
    let answered = seller
        .dashboard()
        .seller_responses()
        .await
        .expect("responses");
    assert_eq!(answered.len(), 1);

    shopper.api().invalidate_all().await;
    let mine = shopper.dashboard().my_messages().await.expect("messages");
    let reply = mine
        .first()
        .and_then(|m| m.response.clone())
        .expect("reply");
    assert_eq!(reply.message, "Shipped today");
    assert_eq!(reply.name, "Sam Iyer");
}

#[tokio::test]
async fn test_contact_validation() {
    let backend = FakeBackend::start().await;
    let anonymous = backend.storefront();

    let mut blank = message("Order status");
    blank.message = "   ".to_string();
    let err = anonymous
        .dashboard()
        .send_contact(&blank)
        .await
        .expect_err("blank message");
    assert_eq!(err.user_message(), "Please fill in all required fields");
    assert_eq!(backend.hits("POST", "/api/contact"), 0);

    anonymous
        .dashboard()
        .send_contact(&message("Before signing up"))
        .await
        .expect("anonymous send");

    let seller = signed_in(&backend, SELLER, Role::Seller).await;
    let err = seller
        .dashboard()
        .respond(&ContactId::new("c1"), " ")
        .await
        .expect_err("blank reply");
    assert_eq!(err.user_message(), "Response message is required");
}

#[tokio::test]
async fn test_seller_deletes_message() {
    let backend = FakeBackend::start().await;
    let id = backend.seed_contact("visitor@example.com", "Bulk order");
    let seller = signed_in(&backend, SELLER, Role::Seller).await;

    seller
        .dashboard()
        .delete_message(&ContactId::new(id))
        .await
        .expect("delete");
    assert!(
        seller
            .dashboard()
            .seller_messages()
            .await
            .expect("inbox")
            .is_empty()
    );

    let shopper = signed_in(&backend, SHOPPER, Role::User).await;
    assert!(matches!(
        shopper.dashboard().seller_messages().await,
        Err(StorefrontError::AccessDenied(Role::User))
    ));
}

#[tokio::test]
async fn test_guard_sends_seller_to_own_dashboard() {
    let backend = FakeBackend::start().await;

    let anonymous = backend.storefront();
    assert!(matches!(
        authorize(anonymous.auth(), &[Role::Admin]),
        Access::LoginRequired { .. }
    ));

    let seller = signed_in(&backend, SELLER, Role::Seller).await;
    assert!(authorize(seller.auth(), Role::STAFF).is_granted());
    match authorize(seller.auth(), &[Role::Admin]) {
        Access::Redirect { role, to, .. } => {
            assert_eq!(role, Role::Seller);
            assert_eq!(to, "/seller/dashboard");
        }
        other => panic!("expected a redirect, got {other:?}"),
    }
}
