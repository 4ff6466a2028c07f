//! Product listing repository.

use chrono::Utc;
use tracing::instrument;

use bozor_core::model::product::ARTICLE_NUMBER_BASE;
use bozor_core::search::{self, ProductFilter};
use bozor_core::{DiscountPercent, Product, ProductDraft, ProductId, ProductPatch, ProductStatus, ShopId};

use super::{
    PRODUCTS, RepositoryError, ShopRepository, from_document, from_documents, to_fields,
    update_existing,
};
use crate::store::{DocumentStore, FieldFilter};

/// Repository for product listings.
pub struct ProductRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Create a listing for `shop_id`.
    ///
    /// The article number is `10000 + <listings so far>`. Counting and
    /// inserting are two requests, so concurrent creates can share a number.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` for an invalid form.
    /// Returns `RepositoryError::NotFound` if the shop does not exist.
    #[instrument(skip(self, draft), fields(shop_id = %shop_id))]
    pub async fn create_product(
        &self,
        shop_id: &ShopId,
        draft: ProductDraft,
    ) -> Result<Product, RepositoryError> {
        let draft = draft.validate()?;
        let shop = ShopRepository::new(self.store)
            .get_shop(shop_id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("shops/{shop_id}")))?;

        let existing = self.store.count(PRODUCTS).await?;
        let article_number = u32::try_from(existing)
            .ok()
            .and_then(|n| ARTICLE_NUMBER_BASE.checked_add(n))
            .ok_or_else(|| {
                RepositoryError::DataCorruption(format!("product count out of range: {existing}"))
            })?;

        let mut product = Product::from_draft(draft, &shop, article_number, Utc::now());
        let id = self.store.add(PRODUCTS, to_fields(&product)?).await?;
        product.id = ProductId::new(id);
        tracing::info!(product_id = %product.id, article_number, "Product created");
        Ok(product)
    }

    /// Listings matching every set field of `filter`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the query fails.
    #[instrument(skip(self))]
    pub async fn get_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        let filters: Vec<FieldFilter> = filter
            .equalities()
            .into_iter()
            .map(|(field, value)| FieldFilter::eq(field, value))
            .collect();
        let docs = self.store.query(PRODUCTS, &filters).await?;
        Ok(from_documents(PRODUCTS, docs))
    }

    /// Listings matching `filter` whose text fields contain `term`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the query fails.
    #[instrument(skip(self))]
    pub async fn search_products(
        &self,
        term: &str,
        filter: &ProductFilter,
    ) -> Result<Vec<Product>, RepositoryError> {
        let products = self.get_products(filter).await?;
        Ok(search::filter_by_term(products, term))
    }

    /// One listing by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the read fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        self.store
            .get(PRODUCTS, id.as_str())
            .await?
            .map(|doc| from_document(PRODUCTS, doc))
            .transpose()
    }

    /// Apply a partial edit and return the stored listing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` if the patch blanks a required
    /// field, or `RepositoryError::NotFound` if the listing does not exist.
    #[instrument(skip(self, patch), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: &ProductId,
        patch: ProductPatch,
    ) -> Result<Product, RepositoryError> {
        patch.validate()?;
        let mut product = self
            .get_product(id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("{PRODUCTS}/{id}")))?;
        patch.apply(&mut product, Utc::now());
        update_existing(self.store, PRODUCTS, id.as_str(), to_fields(&product)?).await?;
        Ok(product)
    }

    /// Move a listing between shop window and warehouse, or mark it
    /// pre-order or sold out.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the listing does not exist.
    pub async fn set_product_status(
        &self,
        id: &ProductId,
        status: ProductStatus,
    ) -> Result<Product, RepositoryError> {
        self.update_product(id, ProductPatch::status(status)).await
    }

    /// Delete a listing. Favorites and chats that point at it are left
    /// behind and resolve to nothing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the delete fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<(), RepositoryError> {
        self.store.delete(PRODUCTS, id.as_str()).await?;
        tracing::info!("Product deleted");
        Ok(())
    }

    /// Listings a shop holds in its warehouse.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the query fails.
    pub async fn get_warehouse_products(&self, shop_id: &ShopId) -> Result<Vec<Product>, RepositoryError> {
        self.get_products(&ProductFilter::shop(shop_id.clone()).with_status(ProductStatus::InWarehouse))
            .await
    }

    /// Public listings discounted by at least `min_discount`, biggest
    /// discount first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the query fails.
    #[instrument(skip(self))]
    pub async fn recommended_products(
        &self,
        min_discount: DiscountPercent,
        limit: usize,
    ) -> Result<Vec<Product>, RepositoryError> {
        let products = self.get_products(&ProductFilter::any()).await?;
        Ok(search::recommend(products, min_discount, limit))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bozor_core::{Category, Price, ShopDraft, UserId};

    use super::*;
    use crate::store::InMemoryStore;

    async fn shop(store: &InMemoryStore) -> ShopId {
        let draft = ShopDraft {
            name: "Mobile Plus".to_string(),
            phone: "+998 90 123 45 67".to_string(),
            email: "sales@mobileplus.uz".to_string(),
            telegram: String::new(),
            website: String::new(),
            address: "Чиланзар 5".to_string(),
            city: "Ташкент".to_string(),
            has_delivery: true,
            description: String::new(),
        };
        ShopRepository::new(store)
            .create_shop(&UserId::new("seller-1"), draft)
            .await
            .unwrap()
            .id
    }

    fn draft(name: &str, price: u64, discount: u32) -> ProductDraft {
        ProductDraft {
            name: name.to_string(),
            category: Category::new("Смартфоны"),
            price: Some(Price::new(price)),
            discount_percent: DiscountPercent::new(discount),
            ..ProductDraft::default()
        }
    }

    #[tokio::test]
    async fn test_create_copies_shop_and_numbers_articles() {
        let store = InMemoryStore::new();
        let shop_id = shop(&store).await;
        let repo = ProductRepository::new(&store);

        let first = repo.create_product(&shop_id, draft("iPhone 13", 100_000, 25)).await.unwrap();
        let second = repo.create_product(&shop_id, draft("Galaxy S22", 90_000, 0)).await.unwrap();

        assert_eq!(first.article_number, 10_000);
        assert_eq!(second.article_number, 10_001);
        assert_eq!(first.discounted_price, Price::new(75_000));
        assert_eq!(first.shop_name, "Mobile Plus");
        assert_eq!(first.city, "Ташкент");
        assert!(first.has_delivery);
        assert_eq!(first.status, ProductStatus::OnDisplay);

        let stored = repo.get_product(&first.id).await.unwrap().unwrap();
        assert_eq!(stored, first);
    }

    #[tokio::test]
    async fn test_create_requires_shop_and_fields() {
        let store = InMemoryStore::new();
        let repo = ProductRepository::new(&store);

        assert!(matches!(
            repo.create_product(&ShopId::new("nobody"), draft("x", 1, 0)).await,
            Err(RepositoryError::NotFound(_))
        ));

        let shop_id = shop(&store).await;
        let mut incomplete = draft("", 1, 0);
        incomplete.price = None;
        assert!(matches!(
            repo.create_product(&shop_id, incomplete).await,
            Err(RepositoryError::Validation(_))
        ));
        assert_eq!(store.count(PRODUCTS).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_status_moves_between_window_and_warehouse() {
        let store = InMemoryStore::new();
        let shop_id = shop(&store).await;
        let repo = ProductRepository::new(&store);
        let product = repo.create_product(&shop_id, draft("iPhone 13", 100_000, 0)).await.unwrap();

        repo.set_product_status(&product.id, ProductStatus::InWarehouse).await.unwrap();
        let warehouse = repo.get_warehouse_products(&shop_id).await.unwrap();
        assert_eq!(warehouse.len(), 1);
        assert_eq!(warehouse[0].id, product.id);

        repo.set_product_status(&product.id, ProductStatus::OnDisplay).await.unwrap();
        assert!(repo.get_warehouse_products(&shop_id).await.unwrap().is_empty());
        let on_display = repo
            .get_products(&ProductFilter::shop(shop_id).with_status(ProductStatus::OnDisplay))
            .await
            .unwrap();
        assert_eq!(on_display.len(), 1);
    }

    #[tokio::test]
    async fn test_update_rederives_discounted_price() {
        let store = InMemoryStore::new();
        let shop_id = shop(&store).await;
        let repo = ProductRepository::new(&store);
        let product = repo.create_product(&shop_id, draft("iPhone 13", 100_000, 0)).await.unwrap();

        let patch = ProductPatch {
            discount_percent: Some(DiscountPercent::new(25)),
            ..ProductPatch::default()
        };
        let updated = repo.update_product(&product.id, patch).await.unwrap();
        assert_eq!(updated.discounted_price, Price::new(75_000));
        assert_eq!(updated.article_number, product.article_number);

        assert!(matches!(
            repo.update_product(&ProductId::new("gone"), ProductPatch::default()).await,
            Err(RepositoryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_search_and_recommend() {
        let store = InMemoryStore::new();
        let shop_id = shop(&store).await;
        let repo = ProductRepository::new(&store);
        repo.create_product(&shop_id, draft("iPhone 13", 100_000, 30)).await.unwrap();
        repo.create_product(&shop_id, draft("Galaxy S22", 90_000, 50)).await.unwrap();
        repo.create_product(&shop_id, draft("Redmi Note", 30_000, 10)).await.unwrap();

        let found = repo.search_products("IPHONE", &ProductFilter::any()).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "iPhone 13");

        let picks = repo.recommended_products(DiscountPercent::new(30), 10).await.unwrap();
        let names: Vec<&str> = picks.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Galaxy S22", "iPhone 13"]);
    }

    #[tokio::test]
    async fn test_delete_product() {
        let store = InMemoryStore::new();
        let shop_id = shop(&store).await;
        let repo = ProductRepository::new(&store);
        let product = repo.create_product(&shop_id, draft("iPhone 13", 1, 0)).await.unwrap();

        repo.delete_product(&product.id).await.unwrap();
        assert!(repo.get_product(&product.id).await.unwrap().is_none());
    }
}
