//! Favorites repository: (user, product) join records.

use chrono::Utc;
use tracing::instrument;

use bozor_core::{Favorite, FavoriteId, Product, ProductId, UserId};

use super::{FAVORITES, ProductRepository, RepositoryError, from_documents, to_fields};
use crate::store::{DocumentStore, FieldFilter};

/// Repository for favorites.
pub struct FavoriteRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> FavoriteRepository<'a> {
    /// Create a new favorites repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    async fn records(
        &self,
        user: &UserId,
        product: Option<&ProductId>,
    ) -> Result<Vec<Favorite>, RepositoryError> {
        let mut filters = vec![FieldFilter::eq("userId", user.as_str())];
        if let Some(product) = product {
            filters.push(FieldFilter::eq("productId", product.as_str()));
        }
        let docs = self.store.query(FAVORITES, &filters).await?;
        Ok(from_documents(FAVORITES, docs))
    }

    /// Save `product` for `user`. Saving an already saved product is a
    /// no-op that returns the existing record's id.
    ///
    /// The check and the insert are separate requests; two racing calls can
    /// both insert. Reads collapse such duplicates.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if a request fails.
    #[instrument(skip(self), fields(user = %user, product = %product))]
    pub async fn add_favorite(
        &self,
        user: &UserId,
        product: &ProductId,
    ) -> Result<FavoriteId, RepositoryError> {
        if let Some(existing) = self.records(user, Some(product)).await?.into_iter().next() {
            return Ok(existing.id);
        }
        let favorite = Favorite::new(user.clone(), product.clone(), Utc::now());
        let id = self.store.add(FAVORITES, to_fields(&favorite)?).await?;
        Ok(FavoriteId::new(id))
    }

    /// Remove every record saving `product` for `user`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if a request fails.
    #[instrument(skip(self), fields(user = %user, product = %product))]
    pub async fn remove_favorite(&self, user: &UserId, product: &ProductId) -> Result<(), RepositoryError> {
        for favorite in self.records(user, Some(product)).await? {
            self.store.delete(FAVORITES, favorite.id.as_str()).await?;
        }
        Ok(())
    }

    /// Whether `user` has saved `product`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the query fails.
    pub async fn is_favorite(&self, user: &UserId, product: &ProductId) -> Result<bool, RepositoryError> {
        Ok(!self.records(user, Some(product)).await?.is_empty())
    }

    /// Ids of the products `user` has saved, without duplicates.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the query fails.
    pub async fn favorite_product_ids(&self, user: &UserId) -> Result<Vec<ProductId>, RepositoryError> {
        let mut ids: Vec<ProductId> = Vec::new();
        for favorite in self.records(user, None).await? {
            if !ids.contains(&favorite.product_id) {
                ids.push(favorite.product_id);
            }
        }
        Ok(ids)
    }

    /// The products `user` has saved. Deleted products are skipped.
    ///
    /// One read per product; there is no join in the store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if a request fails.
    #[instrument(skip(self), fields(user = %user))]
    pub async fn get_favorites(&self, user: &UserId) -> Result<Vec<Product>, RepositoryError> {
        let products = ProductRepository::new(self.store);
        let mut favorites = Vec::new();
        for id in self.favorite_product_ids(user).await? {
            match products.get_product(&id).await? {
                Some(product) => favorites.push(product),
                None => tracing::debug!(product_id = %id, "Favorite points at a deleted product"),
            }
        }
        Ok(favorites)
    }
}
