//! Integration tests for shops, the warehouse and listing prices.

use bozor_core::{DiscountPercent, Price, ProductPatch, ProductStatus, ShopId};
use bozor_integration_tests::{Marketplace, product_draft, shop_draft};
use bozor_storefront::error::AppError;
use bozor_storefront::pages::{shop, warehouse};

// =============================================================================
// Warehouse Gate
// =============================================================================

#[tokio::test]
async fn test_warehouse_without_shop_prompts_for_one() {
    let market = Marketplace::new();

    let signed_out = warehouse::load(&market.client()).await.unwrap();
    assert!(matches!(signed_out, warehouse::WarehousePage::SignedOut));

    let (state, _) = market.user("seller@bozor.uz", "Seller").await;
    let page = warehouse::load(&state).await.unwrap();
    assert!(matches!(page, warehouse::WarehousePage::NeedsShop));
    assert!(!page.can_add_product());
    assert_eq!(page.prompt(), Some("Сначала создайте магазин"));

    let result = warehouse::add_product(&state, product_draft("iPhone 13", "Смартфоны", 1), None).await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn test_second_shop_for_same_owner_is_rejected() {
    let market = Marketplace::new();
    let (state, _) = market.user("seller@bozor.uz", "Seller").await;

    shop::create(&state, shop_draft("Mobile Plus", "Ташкент", true)).await.unwrap();
    let again = shop::create(&state, shop_draft("Mobile Plus 2", "Ташкент", true)).await;
    assert!(again.is_err());
}

// =============================================================================
// Moving Listings
// =============================================================================

#[tokio::test]
async fn test_move_between_warehouse_and_display() {
    let market = Marketplace::new();
    let (state, user) = market.user("seller@bozor.uz", "Seller").await;
    shop::create(&state, shop_draft("Mobile Plus", "Ташкент", true)).await.unwrap();

    let product = warehouse::add_product(&state, product_draft("iPhone 13", "Смартфоны", 90_000), None)
        .await
        .unwrap();
    assert_eq!(product.status, ProductStatus::OnDisplay);

    let moved = warehouse::move_to_warehouse(&state, &product.id).await.unwrap();
    assert_eq!(moved.status, ProductStatus::InWarehouse);

    let page = warehouse::load(&state).await.unwrap();
    let warehouse::WarehousePage::Ready { products, .. } = page else {
        panic!("expected a ready warehouse");
    };
    assert_eq!(products.len(), 1);

    // Hidden from buyers while stored.
    let window = shop::load(&market.client(), &ShopId::for_owner(&user.uid)).await.unwrap();
    assert!(window.products.is_empty());

    warehouse::move_to_display(&state, &product.id).await.unwrap();
    let window = shop::load(&market.client(), &ShopId::for_owner(&user.uid)).await.unwrap();
    assert_eq!(window.products.len(), 1);
    assert_eq!(window.owner.unwrap().display_name, "Seller");
}

#[tokio::test]
async fn test_other_sellers_cannot_move_listing() {
    let market = Marketplace::new();
    let (owner, _) = market.user("seller@bozor.uz", "Seller").await;
    shop::create(&owner, shop_draft("Mobile Plus", "Ташкент", true)).await.unwrap();
    let product = warehouse::add_product(&owner, product_draft("iPhone 13", "Смартфоны", 90_000), None)
        .await
        .unwrap();

    let (other, _) = market.user("other@bozor.uz", "Other").await;
    shop::create(&other, shop_draft("Tech Store", "Самарканд", false)).await.unwrap();
    let result = warehouse::move_to_warehouse(&other, &product.id).await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

// =============================================================================
// Pricing and Articles
// =============================================================================

#[tokio::test]
async fn test_discount_sets_stored_price() {
    let market = Marketplace::new();
    let (state, _) = market.user("seller@bozor.uz", "Seller").await;
    shop::create(&state, shop_draft("Mobile Plus", "Ташкент", true)).await.unwrap();

    let mut draft = product_draft("iPhone 13", "Смартфоны", 100_000);
    draft.discount_percent = DiscountPercent::new(25);
    let product = warehouse::add_product(&state, draft, None).await.unwrap();

    assert_eq!(product.price, Price::new(100_000));
    assert_eq!(product.discounted_price, Price::new(75_000));
    assert_eq!(product.discounted_price.to_string(), "75 000 UZS");
    assert_eq!(product.city, "Ташкент");
    assert!(product.has_delivery);
}

#[tokio::test]
async fn test_edit_recomputes_discounted_price() {
    let market = Marketplace::new();
    let (state, _) = market.user("seller@bozor.uz", "Seller").await;
    shop::create(&state, shop_draft("Mobile Plus", "Ташкент", true)).await.unwrap();
    let product = warehouse::add_product(&state, product_draft("iPhone 13", "Смартфоны", 100_000), None)
        .await
        .unwrap();
    assert_eq!(product.discounted_price, Price::new(100_000));

    let patch = ProductPatch {
        discount_percent: Some(DiscountPercent::new(10)),
        ..ProductPatch::default()
    };
    let edited = shop::edit_product(&state, &product.id, patch).await.unwrap();
    assert_eq!(edited.discounted_price, Price::new(90_000));
}

#[tokio::test]
async fn test_article_numbers_count_up() {
    let market = Marketplace::new();
    let (state, _) = market.user("seller@bozor.uz", "Seller").await;
    shop::create(&state, shop_draft("Mobile Plus", "Ташкент", true)).await.unwrap();

    let first = warehouse::add_product(&state, product_draft("iPhone 13", "Смартфоны", 1), None)
        .await
        .unwrap();
    let second = warehouse::add_product(&state, product_draft("Чехол", "Аксессуары", 1), None)
        .await
        .unwrap();
    assert_eq!(first.article_number, 10_000);
    assert_eq!(second.article_number, 10_001);
}

#[tokio::test]
async fn test_listing_image_is_uploaded() {
    let market = Marketplace::new();
    let (state, _) = market.user("seller@bozor.uz", "Seller").await;
    shop::create(&state, shop_draft("Mobile Plus", "Ташкент", true)).await.unwrap();

    let product = warehouse::add_product(
        &state,
        product_draft("iPhone 13", "Смартфоны", 1),
        Some(b"\xff\xd8\xff\xe0jpeg".as_slice()),
    )
    .await
    .unwrap();
    assert!(product.image_url.unwrap().starts_with("https://i.ibb.co/"));
}

#[tokio::test]
async fn test_deleted_listing_is_gone() {
    let market = Marketplace::new();
    let (state, user) = market.user("seller@bozor.uz", "Seller").await;
    shop::create(&state, shop_draft("Mobile Plus", "Ташкент", true)).await.unwrap();
    let product = warehouse::add_product(&state, product_draft("iPhone 13", "Смартфоны", 1), None)
        .await
        .unwrap();

    shop::delete_product(&state, &product.id).await.unwrap();
    let window = shop::load(&state, &ShopId::for_owner(&user.uid)).await.unwrap();
    assert!(window.products.is_empty());
}
