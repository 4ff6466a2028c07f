//! Seed the store with shops and products from a YAML fixture.
//!
//! ```yaml
//! shops:
//!   - owner: seller-1
//!     name: Mobile Plus
//!     phone: "+998 90 123 45 67"
//!     email: sales@mobileplus.uz
//!     address: Чиланзар 5
//!     city: Ташкент
//!     has_delivery: true
//!     products:
//!       - name: iPhone 13
//!         category: Телефоны
//!         price: 100000
//!         discount: 25
//!         quantity: 3
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use bozor_core::{
    Category, DiscountPercent, Price, ProductDraft, ProductStatus, ShopDraft, ShopId, UserId,
};
use bozor_storefront::db::{ProductRepository, RepositoryError, ShopRepository};
use bozor_storefront::state::AppState;

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid fixture: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("store error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Fixture file root.
#[derive(Debug, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub shops: Vec<ShopFixture>,
}

/// One shop and its listings.
#[derive(Debug, Deserialize)]
pub struct ShopFixture {
    pub owner: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub has_delivery: bool,
    #[serde(default)]
    pub telegram: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub products: Vec<ProductFixture>,
}

/// One listing.
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    pub name: String,
    #[serde(default)]
    pub model: String,
    pub category: String,
    pub price: u64,
    #[serde(default)]
    pub discount: u32,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

const fn default_quantity() -> u32 {
    1
}

impl ShopFixture {
    fn draft(&self) -> ShopDraft {
        ShopDraft {
            name: self.name.clone(),
            phone: self.phone.clone(),
            email: self.email.clone(),
            telegram: self.telegram.clone(),
            website: self.website.clone(),
            address: self.address.clone(),
            city: self.city.clone(),
            has_delivery: self.has_delivery,
            description: self.description.clone(),
        }
    }
}

impl From<ProductFixture> for ProductDraft {
    fn from(p: ProductFixture) -> Self {
        Self {
            name: p.name,
            model: p.model,
            category: Category::new(&p.category),
            price: Some(Price::new(p.price)),
            discount_percent: DiscountPercent::new(p.discount),
            quantity: p.quantity,
            description: p.description,
            image_url: p.image_url,
            status: p.status.map_or(ProductStatus::OnDisplay, ProductStatus::from),
        }
    }
}

/// What a seeding run created.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub shops: usize,
    pub products: usize,
    /// Shops that already existed; their products are still added.
    pub skipped: usize,
}

/// Parse a fixture.
///
/// # Errors
///
/// Returns an error for malformed YAML.
pub fn parse(content: &str) -> Result<Fixture, SeedError> {
    Ok(serde_yaml::from_str(content)?)
}

/// Create every shop and product in `fixture`.
///
/// # Errors
///
/// Returns the first store or validation error.
pub async fn apply(state: &AppState, fixture: Fixture) -> Result<SeedSummary, SeedError> {
    let shops = ShopRepository::new(state.store());
    let products = ProductRepository::new(state.store());
    let mut summary = SeedSummary::default();

    for shop in fixture.shops {
        let owner = UserId::new(shop.owner.trim());
        match shops.create_shop(&owner, shop.draft()).await {
            Ok(created) => {
                info!(shop_id = %created.id, name = %created.name, "Shop created");
                summary.shops += 1;
            }
            Err(RepositoryError::Conflict(_)) => {
                warn!(owner = %owner, "Shop already exists, adding products to it");
                summary.skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }

        let shop_id = ShopId::for_owner(&owner);
        for product in shop.products {
            products.create_product(&shop_id, product.into()).await?;
            summary.products += 1;
        }
    }
    Ok(summary)
}

/// Read, parse and apply a fixture file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or a write fails.
pub async fn from_file(state: &AppState, path: &Path) -> Result<SeedSummary, SeedError> {
    info!(path = %path.display(), "Loading fixture");
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SeedError::Read {
            path: path.display().to_string(),
            source,
        })?;
    apply(state, parse(&content)?).await
}
