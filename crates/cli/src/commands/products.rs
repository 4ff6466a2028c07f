//! `bozor products` and `bozor recommended`.

use bozor_core::search::ProductFilter;
use bozor_core::{Category, ProductStatus, ShopId};
use bozor_storefront::db::ProductRepository;
use bozor_storefront::pages::home;
use bozor_storefront::state::AppState;

use super::print_products;

fn filter(shop: Option<String>, status: Option<String>, category: Option<String>) -> ProductFilter {
    let mut filter = ProductFilter::any();
    if let Some(shop) = shop.filter(|s| !s.trim().is_empty()) {
        filter = ProductFilter {
            shop_id: Some(ShopId::new(shop.trim())),
            ..filter
        };
    }
    if let Some(status) = status.filter(|s| !s.trim().is_empty()) {
        filter = filter.with_status(ProductStatus::from(status.as_str()));
    }
    if let Some(category) = category.as_deref().and_then(Category::from_selection) {
        filter = filter.with_category(category);
    }
    filter
}

/// Print listings matching every given field.
///
/// # Errors
///
/// Returns an error if the store cannot be queried.
pub async fn list(
    state: &AppState,
    shop: Option<String>,
    status: Option<String>,
    category: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let filter = filter(shop, status, category);
    let products = ProductRepository::new(state.store()).get_products(&filter).await?;
    tracing::info!(count = products.len(), "Listings found");
    print_products(&products);
    Ok(())
}

/// Print the discounted picks.
///
/// # Errors
///
/// Returns an error if the store cannot be queried.
pub async fn recommended(state: &AppState) -> Result<(), Box<dyn std::error::Error>> {
    let picks = home::recommended(state).await?;
    print_products(&picks);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_from_flags() {
        let filter = filter(
            Some("seller-1".to_string()),
            Some("На складе".to_string()),
            Some("Все категории".to_string()),
        );
        assert_eq!(filter.shop_id, Some(ShopId::new("seller-1")));
        assert_eq!(filter.status, Some(ProductStatus::InWarehouse));
        assert!(filter.category.is_none());
    }

    #[test]
    fn test_blank_flags_are_ignored() {
        assert!(filter(Some(" ".to_string()), None, Some(String::new())).is_empty());
    }
}
