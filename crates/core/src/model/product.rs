//! Product listings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Shop, ValidationError, lenient, require};
use crate::types::{Category, DiscountPercent, Price, ProductId, ProductStatus, ShopId};

/// Article numbers start here; the n-th product created gets `BASE + n`.
pub const ARTICLE_NUMBER_BASE: u32 = 10_000;

/// Product document at `products/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Document key.
    #[serde(skip_serializing, default)]
    pub id: ProductId,
    /// Owning shop.
    #[serde(default)]
    pub shop_id: ShopId,
    /// Shop name at the time of listing.
    #[serde(default, deserialize_with = "lenient::text")]
    pub shop_name: String,
    /// Product name.
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    /// Model designation.
    #[serde(default, deserialize_with = "lenient::text")]
    pub model: String,
    /// Category label.
    #[serde(default, deserialize_with = "lenient::label")]
    pub category: Category,
    /// List price.
    #[serde(default)]
    pub price: Price,
    /// Discount off the list price.
    #[serde(default)]
    pub discount_percent: DiscountPercent,
    /// Price after discount; always derived from `price` and
    /// `discount_percent`.
    #[serde(default)]
    pub discounted_price: Price,
    /// Units in stock.
    #[serde(default, deserialize_with = "lenient::count")]
    pub quantity: u32,
    /// Free-form description.
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: String,
    /// Hosted image, if one was uploaded.
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub image_url: Option<String>,
    /// Listing status.
    #[serde(default, deserialize_with = "lenient::label")]
    pub status: ProductStatus,
    /// City of the owning shop.
    #[serde(default, deserialize_with = "lenient::text")]
    pub city: String,
    /// Whether the owning shop delivers.
    #[serde(default, deserialize_with = "lenient::flag")]
    pub has_delivery: bool,
    /// Sequential display number.
    #[serde(default, deserialize_with = "lenient::count")]
    pub article_number: u32,
    /// When the listing was created.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// When the listing was last updated.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Build a new listing from a validated draft.
    ///
    /// Shop name, city and delivery flag are copied from the shop so that
    /// search can order listings without fetching shops.
    #[must_use]
    pub fn from_draft(
        draft: ProductDraft,
        shop: &Shop,
        article_number: u32,
        now: DateTime<Utc>,
    ) -> Self {
        let price = draft.price.unwrap_or_default();
        Self {
            id: ProductId::default(),
            shop_id: shop.id.clone(),
            shop_name: shop.name.clone(),
            name: draft.name,
            model: draft.model,
            category: draft.category,
            price,
            discount_percent: draft.discount_percent,
            discounted_price: price.discounted(draft.discount_percent),
            quantity: draft.quantity,
            description: draft.description,
            image_url: draft.image_url,
            status: draft.status,
            city: shop.city.clone(),
            has_delivery: shop.has_delivery,
            article_number,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    /// Price the buyer pays.
    #[must_use]
    pub fn effective_price(&self) -> Price {
        if self.discount_percent.is_discounted() {
            self.price.discounted(self.discount_percent)
        } else {
            self.price
        }
    }

    /// Whether at least one unit is in stock.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.quantity > 0
    }

    /// Whether `shop` owns this listing.
    #[must_use]
    pub fn owned_by(&self, shop: &ShopId) -> bool {
        &self.shop_id == shop
    }
}

/// New listing form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    /// Product name.
    pub name: String,
    /// Model designation.
    pub model: String,
    /// Category label.
    pub category: Category,
    /// List price; required.
    pub price: Option<Price>,
    /// Discount off the list price.
    pub discount_percent: DiscountPercent,
    /// Units in stock.
    pub quantity: u32,
    /// Free-form description.
    pub description: String,
    /// Hosted image URL, filled in after upload.
    pub image_url: Option<String>,
    /// Initial status.
    pub status: ProductStatus,
}

impl Default for ProductDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            model: String::new(),
            category: Category::default(),
            price: None,
            discount_percent: DiscountPercent::NONE,
            quantity: 1,
            description: String::new(),
            image_url: None,
            status: ProductStatus::OnDisplay,
        }
    }
}

impl ProductDraft {
    /// Validate a listing form. Name, category and price are required.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingFields`] listing the blank fields.
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        self.name = self.name.trim().to_owned();
        self.model = self.model.trim().to_owned();
        self.description = self.description.trim().to_owned();
        require(&[
            ("Название", !self.name.is_empty()),
            ("Категория", !self.category.is_empty()),
            ("Цена", self.price.is_some()),
        ])?;
        Ok(self)
    }
}

/// Partial listing edit. `None` fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductPatch {
    /// New name.
    pub name: Option<String>,
    /// New model.
    pub model: Option<String>,
    /// New category.
    pub category: Option<Category>,
    /// New list price.
    pub price: Option<Price>,
    /// New discount.
    pub discount_percent: Option<DiscountPercent>,
    /// New stock count.
    pub quantity: Option<u32>,
    /// New description.
    pub description: Option<String>,
    /// New image.
    pub image_url: Option<String>,
    /// New status.
    pub status: Option<ProductStatus>,
}

impl ProductPatch {
    /// A patch that only changes the status.
    #[must_use]
    pub fn status(status: ProductStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Reject patches that would blank out a required field.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingFields`] for blank name or category.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require(&[
            (
                "Название",
                self.name.as_deref().is_none_or(|n| !n.trim().is_empty()),
            ),
            (
                "Категория",
                self.category.as_ref().is_none_or(|c| !c.is_empty()),
            ),
        ])
    }

    /// Apply the patch, re-deriving the discounted price and stamping
    /// `updated_at`.
    pub fn apply(self, product: &mut Product, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            product.name = name.trim().to_owned();
        }
        if let Some(model) = self.model {
            product.model = model.trim().to_owned();
        }
        if let Some(category) = self.category {
            product.category = category;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(discount) = self.discount_percent {
            product.discount_percent = discount;
        }
        if let Some(quantity) = self.quantity {
            product.quantity = quantity;
        }
        if let Some(description) = self.description {
            product.description = description.trim().to_owned();
        }
        if let Some(image_url) = self.image_url {
            product.image_url = Some(image_url);
        }
        if let Some(status) = self.status {
            product.status = status;
        }
        product.discounted_price = product.price.discounted(product.discount_percent);
        product.updated_at = Some(now);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn shop() -> Shop {
        Shop {
            id: ShopId::new("seller"),
            name: "Mobile Plus".to_string(),
            city: "Ташкент".to_string(),
            has_delivery: true,
            ..Shop::default()
        }
    }

    #[test]
    fn test_from_draft_derives_discounted_price_and_copies_shop() {
        let draft = ProductDraft {
            name: "iPhone 13".to_string(),
            category: Category::new("Телефоны"),
            price: Some(Price::new(100_000)),
            discount_percent: DiscountPercent::new(25),
            ..ProductDraft::default()
        }
        .validate()
        .unwrap();
        let product = Product::from_draft(draft, &shop(), 10_003, Utc::now());

        assert_eq!(product.discounted_price, Price::new(75_000));
        assert_eq!(product.effective_price(), Price::new(75_000));
        assert_eq!(product.shop_name, "Mobile Plus");
        assert_eq!(product.city, "Ташкент");
        assert!(product.has_delivery);
        assert_eq!(product.status, ProductStatus::OnDisplay);
        assert_eq!(product.quantity, 1);
        assert!(product.owned_by(&ShopId::new("seller")));
    }

    #[test]
    fn test_draft_requires_name_category_and_price() {
        let err = ProductDraft::default().validate().unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingFields(vec!["Название", "Категория", "Цена"])
        );
    }

    #[test]
    fn test_patch_rederives_discounted_price() {
        let mut product = Product {
            price: Price::new(200_000),
            discounted_price: Price::new(200_000),
            ..Product::default()
        };
        ProductPatch {
            discount_percent: Some(DiscountPercent::new(150)),
            ..ProductPatch::default()
        }
        .apply(&mut product, Utc::now());
        assert_eq!(product.discounted_price, Price::ZERO);

        ProductPatch::status(ProductStatus::InWarehouse).apply(&mut product, Utc::now());
        assert_eq!(product.status, ProductStatus::InWarehouse);
        assert!(product.updated_at.is_some());
    }

    #[test]
    fn test_patch_rejects_blank_name() {
        let patch = ProductPatch {
            name: Some("   ".to_string()),
            ..ProductPatch::default()
        };
        assert!(patch.validate().is_err());
        assert!(ProductPatch::default().validate().is_ok());
    }

    #[test]
    fn test_missing_numbers_read_as_zero() {
        let product: Product =
            serde_json::from_str(r#"{"name": "Чехол", "price": null, "quantity": "abc"}"#).unwrap();
        assert_eq!(product.price, Price::ZERO);
        assert_eq!(product.quantity, 0);
        assert!(!product.in_stock());
        assert_eq!(product.status, ProductStatus::OnDisplay);
    }

    #[test]
    fn test_null_labels_keep_listing() {
        let product: Product = serde_json::from_str(
            r#"{"name": "Чехол", "status": null, "category": null, "price": 5000}"#,
        )
        .unwrap();
        assert_eq!(product.name, "Чехол");
        assert_eq!(product.status, ProductStatus::OnDisplay);
        assert!(product.category.is_empty());
    }

    #[test]
    fn test_id_is_not_written_back() {
        let product = Product {
            id: ProductId::new("p1"),
            ..Product::default()
        };
        let value = serde_json::to_value(&product).unwrap();
        assert!(value.get("id").is_none());
        assert_eq!(value["status"], "На витрине");
    }
}
