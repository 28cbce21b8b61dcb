//! Catalog browsing and product management against the fake backend.

use akario_core::{Discount, Price, ProductId, Role};
use akario_integration_tests::{FakeBackend, Mode, SELLER, SHOPPER, password};
use akario_storefront::StorefrontError;
use akario_storefront::api::types::{PhotoUpload, ProductDraft};
use akario_storefront::catalog::{
    ProductFilter, SortKey, categories, filter_products, sort_products,
};
use rust_decimal::Decimal;

fn draft(name: &str, price: i64) -> ProductDraft {
    ProductDraft {
        name: name.to_string(),
        description: "Hand made".to_string(),
        price: Price::new(Decimal::from(price)),
        discount: None,
        category: "Kitchen".to_string(),
        image: None,
    }
}

fn names(products: &[akario_core::Product]) -> Vec<&str> {
    products.iter().map(|p| p.name.as_str()).collect()
}

#[tokio::test]
async fn test_browse_filter_and_sort() {
    let backend = FakeBackend::start().await;
    let storefront = backend.storefront();
    let products = storefront.catalog().products().await;

    assert_eq!(
        categories(&products),
        ["Grocery", "Kitchen", "kitchen", "Books"]
    );

    let kitchen = filter_products(&products, &ProductFilter::from_query("category=kitchen"));
    assert_eq!(names(&kitchen), ["Kettle", "Mug"]);

    // "k" hits names, descriptions and the lowercase category
    let mut found = filter_products(&products, &ProductFilter::default().search("K"));
    sort_products(&mut found, SortKey::PriceLow);
    assert_eq!(names(&found), ["Mug", "Notebook", "Kettle"]);

    let mut all = products.clone();
    sort_products(&mut all, SortKey::Discount);
    assert_eq!(names(&all), ["Kettle", "Notebook", "Green Tea", "Mug"]);

    sort_products(&mut all, SortKey::Newest);
    assert_eq!(names(&all), ["Mug", "Kettle", "Green Tea", "Notebook"]);
}

#[tokio::test]
async fn test_unknown_product_is_none() {
    let backend = FakeBackend::start().await;
    let storefront = backend.storefront();

    assert!(
        storefront
            .catalog()
            .product(&ProductId::new("missing"))
            .await
            .is_none()
    );
    let kettle = storefront
        .catalog()
        .product(&ProductId::new("p2"))
        .await
        .expect("seeded product");
    assert_eq!(kettle.discount, Discount::new(Decimal::from(15)).ok());
}

#[tokio::test]
async fn test_unreachable_backend_lists_nothing() {
    let backend = FakeBackend::start().await;
    backend.set_mode(Mode::Broken);
    let storefront = backend.storefront();

    assert!(storefront.catalog().products().await.is_empty());
    assert!(
        storefront
            .catalog()
            .product(&ProductId::new("p1"))
            .await
            .is_none()
    );
}

#[tokio::test]
async fn test_seller_manages_products() {
    let backend = FakeBackend::start().await;
    let storefront = backend.storefront();
    storefront
        .login(SELLER, &password(), Role::Seller)
        .await
        .expect("login");
    let catalog = storefront.catalog();

    let created = catalog
        .create_product(&draft("Teapot", 900))
        .await
        .expect("create");
    assert_eq!(created.seller.as_ref().map(|s| s.as_str()), Some("s1"));

    let updated = catalog
        .update_product(&created.id, &draft("Teapot XL", 1100))
        .await
        .expect("update");
    assert_eq!(updated.name, "Teapot XL");
    assert_eq!(
        catalog.product(&created.id).await.map(|p| p.price),
        Some(Price::new(Decimal::from(1100)))
    );

    catalog
        .upload_photo(
            &created.id,
            PhotoUpload {
                file_name: "teapot.jpg".to_string(),
                bytes: vec![0xFF, 0xD8, 0xFF],
            },
        )
        .await
        .expect("upload");
    assert_eq!(
        catalog.product(&created.id).await.and_then(|p| p.image),
        Some("/uploads/teapot.jpg".to_string())
    );

    catalog.delete_product(&created.id).await.expect("delete");
    assert!(catalog.product(&created.id).await.is_none());
    assert_eq!(catalog.products().await.len(), 4);
}

#[tokio::test]
async fn test_shoppers_cannot_manage_products() {
    let backend = FakeBackend::start().await;

    let anonymous = backend.storefront();
    let err = anonymous
        .catalog()
        .create_product(&draft("Teapot", 900))
        .await
        .expect_err("anonymous");
    assert!(matches!(err, StorefrontError::LoginRequired));

    let shopper = backend.storefront();
    shopper
        .login(SHOPPER, &password(), Role::User)
        .await
        .expect("login");
    let err = shopper
        .catalog()
        .delete_product(&ProductId::new("p1"))
        .await
        .expect_err("shopper");
    assert!(matches!(err, StorefrontError::AccessDenied(Role::User)));
    assert_eq!(backend.hits("DELETE", "/api/products/p1"), 0);
}

#[tokio::test]
async fn test_refused_token_signs_seller_out() {
    let backend = FakeBackend::start().await;
    let storefront = backend.storefront();
    storefront
        .login(SELLER, &password(), Role::Seller)
        .await
        .expect("login");

    backend.set_mode(Mode::Expired);
    let err = storefront
        .catalog()
        .create_product(&draft("Teapot", 900))
        .await
        .expect_err("expired");

    assert!(matches!(err, StorefrontError::Unauthorized));
    assert!(!storefront.auth().is_authenticated());
}
