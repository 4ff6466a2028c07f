//! Client-side product search.
//!
//! The document store only supports equality filters, so search runs in two
//! passes: the store narrows by [`ProductFilter`], then [`compose`] narrows
//! by free text, delivery and stock, and orders what is left so that
//! listings from the buyer's city come first, then listings that deliver,
//! then everything else.

use crate::model::Product;
use crate::types::{Category, DiscountPercent, ProductStatus, ShopId};

/// Equality filters the document store can apply. All set fields must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Exact category.
    pub category: Option<Category>,
    /// Owning shop.
    pub shop_id: Option<ShopId>,
    /// Listing status.
    pub status: Option<ProductStatus>,
}

impl ProductFilter {
    /// No filtering.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Listings of one shop.
    #[must_use]
    pub fn shop(shop_id: ShopId) -> Self {
        Self {
            shop_id: Some(shop_id),
            ..Self::default()
        }
    }

    /// Restrict to a category.
    #[must_use]
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    /// Restrict to a status.
    #[must_use]
    pub fn with_status(mut self, status: ProductStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Whether no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.category.is_none() && self.shop_id.is_none() && self.status.is_none()
    }

    /// The filter as `(stored field, value)` pairs.
    #[must_use]
    pub fn equalities(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(3);
        if let Some(category) = &self.category {
            pairs.push(("category", category.as_str().to_owned()));
        }
        if let Some(shop_id) = &self.shop_id {
            pairs.push(("shopId", shop_id.as_str().to_owned()));
        }
        if let Some(status) = &self.status {
            pairs.push(("status", status.as_str().to_owned()));
        }
        pairs
    }

    /// Whether `product` passes every set field.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        self.category.as_ref().is_none_or(|c| &product.category == c)
            && self.shop_id.as_ref().is_none_or(|s| &product.shop_id == s)
            && self.status.as_ref().is_none_or(|s| &product.status == s)
    }
}

/// Delivery toggle on the search form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeliveryFilter {
    /// No restriction.
    #[default]
    Any,
    /// Only shops that deliver.
    Only,
    /// Only shops that do not deliver.
    Excluded,
}

impl DeliveryFilter {
    const fn allows(self, product: &Product) -> bool {
        match self {
            Self::Any => true,
            Self::Only => product.has_delivery,
            Self::Excluded => !product.has_delivery,
        }
    }
}

/// Stock toggle on the search form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Availability {
    /// No restriction.
    #[default]
    Any,
    /// Quantity above zero.
    InStock,
    /// Quantity zero or missing.
    OutOfStock,
}

impl Availability {
    const fn allows(self, product: &Product) -> bool {
        match self {
            Self::Any => true,
            Self::InStock => product.in_stock(),
            Self::OutOfStock => !product.in_stock(),
        }
    }
}

/// Everything the search form collects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCriteria {
    /// Free-text term; blank matches everything.
    pub term: String,
    /// Store-side equality filter.
    pub filter: ProductFilter,
    /// Buyer's city, used for ordering only.
    pub city: Option<String>,
    /// Search the whole country: disables city ordering.
    pub country_wide: bool,
    /// Delivery restriction.
    pub delivery: DeliveryFilter,
    /// Stock restriction.
    pub availability: Availability,
}

/// Result of a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// At least one listing matched, in display order.
    Results(Vec<Product>),
    /// Nothing matched.
    NoMatches,
}

impl SearchOutcome {
    /// The matched listings; empty for [`Self::NoMatches`].
    #[must_use]
    pub fn products(&self) -> &[Product] {
        match self {
            Self::Results(products) => products,
            Self::NoMatches => &[],
        }
    }

    /// Consume into the matched listings.
    #[must_use]
    pub fn into_products(self) -> Vec<Product> {
        match self {
            Self::Results(products) => products,
            Self::NoMatches => Vec::new(),
        }
    }
}

/// Case-insensitive substring match of `term` against name, model,
/// category, shop name and description. A blank term matches everything.
#[must_use]
pub fn matches_term(product: &Product, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }
    [
        product.name.as_str(),
        product.model.as_str(),
        product.category.as_str(),
        product.shop_name.as_str(),
        product.description.as_str(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(&term))
}

/// Keep the listings that match `term`, in input order.
#[must_use]
pub fn filter_by_term(products: Vec<Product>, term: &str) -> Vec<Product> {
    products
        .into_iter()
        .filter(|p| matches_term(p, term))
        .collect()
}

/// Narrow and order an equality-filtered product list.
///
/// Hard filters (term, delivery, stock) run first. The survivors are then
/// ordered stably: city matches, then delivering shops, then the rest.
/// Relative input order is kept inside each group.
#[must_use]
pub fn compose(products: Vec<Product>, criteria: &SearchCriteria) -> SearchOutcome {
    let city = criteria
        .city
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty() && !criteria.country_wide)
        .map(str::to_lowercase);

    let mut matched: Vec<Product> = products
        .into_iter()
        .filter(|p| criteria.filter.matches(p))
        .filter(|p| matches_term(p, &criteria.term))
        .filter(|p| criteria.delivery.allows(p))
        .filter(|p| criteria.availability.allows(p))
        .collect();

    if matched.is_empty() {
        return SearchOutcome::NoMatches;
    }

    matched.sort_by_key(|p| {
        let local = city
            .as_deref()
            .is_some_and(|c| p.city.trim().to_lowercase() == c);
        if local {
            0u8
        } else if p.has_delivery {
            1
        } else {
            2
        }
    });
    SearchOutcome::Results(matched)
}

/// Listings with at least `min_discount`, biggest discount first, at most
/// `limit` of them. Only publicly visible listings qualify.
#[must_use]
pub fn recommend(products: Vec<Product>, min_discount: DiscountPercent, limit: usize) -> Vec<Product> {
    let mut picks: Vec<Product> = products
        .into_iter()
        .filter(|p| p.status.is_public() && p.discount_percent >= min_discount)
        .filter(|p| p.discount_percent.is_discounted())
        .collect();
    picks.sort_by(|a, b| b.discount_percent.cmp(&a.discount_percent));
    picks.truncate(limit);
    picks
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{Price, ProductId};

    fn product(id: &str, city: &str, delivery: bool) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Товар {id}"),
            city: city.to_string(),
            has_delivery: delivery,
            quantity: 1,
            ..Product::default()
        }
    }

    fn ids(outcome: &SearchOutcome) -> Vec<&str> {
        outcome.products().iter().map(|p| p.id.as_str()).collect()
    }

    fn tashkent() -> SearchCriteria {
        SearchCriteria {
            city: Some("Ташкент".to_string()),
            ..SearchCriteria::default()
        }
    }

    #[test]
    fn test_city_then_delivery_then_rest_regardless_of_input_order() {
        let a = product("A", "Ташкент", false);
        let b = product("B", "Самарканд", true);
        let c = product("C", "Бухара", false);

        for input in [
            vec![a.clone(), b.clone(), c.clone()],
            vec![c.clone(), b.clone(), a.clone()],
            vec![b.clone(), c.clone(), a.clone()],
        ] {
            assert_eq!(ids(&compose(input, &tashkent())), ["A", "B", "C"]);
        }
    }

    #[test]
    fn test_ordering_is_stable_within_groups() {
        let input = vec![
            product("B1", "Самарканд", true),
            product("C1", "Бухара", false),
            product("B2", "Нукус", true),
            product("A1", "ташкент", false),
            product("C2", "Бухара", false),
            product("A2", "Ташкент", true),
        ];
        assert_eq!(
            ids(&compose(input, &tashkent())),
            ["A1", "A2", "B1", "B2", "C1", "C2"]
        );
    }

    #[test]
    fn test_country_wide_disables_city_priority() {
        let input = vec![product("C", "Бухара", false), product("A", "Ташкент", false)];
        let criteria = SearchCriteria {
            country_wide: true,
            ..tashkent()
        };
        assert_eq!(ids(&compose(input, &criteria)), ["C", "A"]);
    }

    #[test]
    fn test_term_is_case_insensitive_across_fields() {
        let mut phone = product("P", "", false);
        phone.name = "iPhone 13".to_string();
        let mut case = product("K", "", false);
        case.shop_name = "Mobile Plus".to_string();
        let mut cable = product("D", "", false);
        cable.description = "Кабель USB-C".to_string();

        assert!(matches_term(&phone, "IPHONE"));
        assert!(matches_term(&case, "mobile"));
        assert!(matches_term(&cable, "кабель"));
        assert!(!matches_term(&phone, "samsung"));
    }

    #[test]
    fn test_empty_term_is_identity() {
        let input = vec![
            product("x", "", false),
            product("y", "", true),
            product("z", "", false),
        ];
        assert_eq!(filter_by_term(input.clone(), "  "), input);
    }

    #[test]
    fn test_hard_filters_and_no_matches() {
        let mut empty = product("E", "Ташкент", true);
        empty.quantity = 0;
        let input = vec![empty, product("F", "Ташкент", false)];

        let in_stock = SearchCriteria {
            availability: Availability::InStock,
            ..SearchCriteria::default()
        };
        assert_eq!(ids(&compose(input.clone(), &in_stock)), ["F"]);

        let delivery_only_out_of_stock = SearchCriteria {
            delivery: DeliveryFilter::Only,
            availability: Availability::OutOfStock,
            ..SearchCriteria::default()
        };
        assert_eq!(ids(&compose(input.clone(), &delivery_only_out_of_stock)), ["E"]);

        let no_delivery = SearchCriteria {
            delivery: DeliveryFilter::Excluded,
            term: "нет такого".to_string(),
            ..SearchCriteria::default()
        };
        assert_eq!(compose(input, &no_delivery), SearchOutcome::NoMatches);
    }

    #[test]
    fn test_filter_equalities_are_all_applied() {
        let filter = ProductFilter::shop(ShopId::new("s1"))
            .with_category(Category::new("Телефоны"))
            .with_status(ProductStatus::InWarehouse);
        assert_eq!(
            filter.equalities(),
            vec![
                ("category", "Телефоны".to_string()),
                ("shopId", "s1".to_string()),
                ("status", "На складе".to_string()),
            ]
        );

        let mut p = product("p", "", false);
        p.shop_id = ShopId::new("s1");
        p.category = Category::new("Телефоны");
        assert!(!filter.matches(&p));
        p.status = ProductStatus::InWarehouse;
        assert!(filter.matches(&p));
    }

    #[test]
    fn test_recommend_orders_by_discount_and_limits() {
        let with_discount = |id: &str, d: u32| Product {
            discount_percent: DiscountPercent::new(d),
            price: Price::new(100),
            ..product(id, "", false)
        };
        let input = vec![
            with_discount("a", 30),
            with_discount("b", 50),
            with_discount("c", 10),
            with_discount("d", 70),
        ];
        let picks = recommend(input, DiscountPercent::new(30), 2);
        let ids: Vec<_> = picks.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["d", "b"]);
    }
}
