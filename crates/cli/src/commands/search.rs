//! `bozor search`.

use bozor_core::Category;
use bozor_core::search::{Availability, DeliveryFilter, ProductFilter, SearchCriteria, SearchOutcome};
use bozor_storefront::pages::home;
use bozor_storefront::state::AppState;

use super::print_products;

/// Parsed `search` arguments.
pub struct SearchArgs {
    pub term: String,
    pub category: Option<String>,
    pub city: Option<String>,
    pub country_wide: bool,
    pub delivery: DeliveryFilter,
    pub availability: Availability,
}

impl SearchArgs {
    fn into_criteria(self) -> SearchCriteria {
        let mut filter = ProductFilter::any();
        if let Some(category) = self.category.as_deref().and_then(Category::from_selection) {
            filter = filter.with_category(category);
        }
        SearchCriteria {
            term: self.term,
            filter,
            city: self.city,
            country_wide: self.country_wide,
            delivery: self.delivery,
            availability: self.availability,
        }
    }
}

/// Run a search and print the results in display order.
///
/// # Errors
///
/// Returns an error if the store cannot be queried.
pub async fn run(state: &AppState, args: SearchArgs) -> Result<(), Box<dyn std::error::Error>> {
    match home::search(state, &args.into_criteria()).await? {
        SearchOutcome::Results(products) => print_products(&products),
        SearchOutcome::NoMatches => tracing::info!("Ничего не найдено"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(category: Option<&str>) -> SearchArgs {
        SearchArgs {
            term: "iphone".to_string(),
            category: category.map(str::to_string),
            city: Some("Ташкент".to_string()),
            country_wide: false,
            delivery: DeliveryFilter::Only,
            availability: Availability::Any,
        }
    }

    #[test]
    fn test_all_categories_means_no_filter() {
        let criteria = args(Some("Все категории")).into_criteria();
        assert!(criteria.filter.is_empty());
        assert_eq!(criteria.delivery, DeliveryFilter::Only);
    }

    #[test]
    fn test_category_becomes_equality_filter() {
        let criteria = args(Some("Смартфоны")).into_criteria();
        assert_eq!(criteria.filter.category, Some(Category::new("Смартфоны")));
    }
}
