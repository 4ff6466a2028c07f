//! Shop repository. Each user owns at most one shop, keyed by their uid.

use chrono::Utc;
use tracing::instrument;

use bozor_core::{Shop, ShopDraft, ShopId, UserId};

use super::{RepositoryError, SHOPS, from_document, to_fields, touch, update_existing};
use crate::store::DocumentStore;

/// Repository for shops.
pub struct ShopRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> ShopRepository<'a> {
    /// Create a new shop repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Create the shop for `owner`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` for an invalid form.
    /// Returns `RepositoryError::Conflict` if the user already has a shop.
    #[instrument(skip(self, draft), fields(owner = %owner))]
    pub async fn create_shop(&self, owner: &UserId, draft: ShopDraft) -> Result<Shop, RepositoryError> {
        let draft = draft.validate()?;
        let id = ShopId::for_owner(owner);

        if self.store.get(SHOPS, id.as_str()).await?.is_some() {
            return Err(RepositoryError::Conflict(format!(
                "user {owner} already has a shop"
            )));
        }

        let now = Utc::now();
        let shop = Shop {
            id: id.clone(),
            owner_id: owner.clone(),
            name: draft.name,
            phone: draft.phone,
            email: draft.email,
            telegram: draft.telegram,
            website: draft.website,
            address: draft.address,
            city: draft.city,
            has_delivery: draft.has_delivery,
            description: draft.description,
            created_at: Some(now),
            updated_at: Some(now),
        };
        self.store.set(SHOPS, id.as_str(), to_fields(&shop)?).await?;
        tracing::info!(shop_id = %id, "Shop created");
        Ok(shop)
    }

    /// The shop owned by `owner`, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the read fails.
    #[instrument(skip(self), fields(owner = %owner))]
    pub async fn get_shop_by_owner(&self, owner: &UserId) -> Result<Option<Shop>, RepositoryError> {
        self.get_shop(&ShopId::for_owner(owner)).await
    }

    /// A shop by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the read fails.
    #[instrument(skip(self), fields(shop_id = %id))]
    pub async fn get_shop(&self, id: &ShopId) -> Result<Option<Shop>, RepositoryError> {
        self.store
            .get(SHOPS, id.as_str())
            .await?
            .map(|doc| from_document(SHOPS, doc))
            .transpose()
    }

    /// Replace the editable fields of `owner`'s shop.
    ///
    /// Listings keep the shop name, city and delivery flag they were created
    /// with.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` for an invalid form.
    /// Returns `RepositoryError::NotFound` if the user has no shop.
    #[instrument(skip(self, draft), fields(owner = %owner))]
    pub async fn update_shop(&self, owner: &UserId, draft: ShopDraft) -> Result<Shop, RepositoryError> {
        let draft = draft.validate()?;
        let id = ShopId::for_owner(owner);
        update_existing(self.store, SHOPS, id.as_str(), touch(to_fields(&draft)?)).await?;
        self.get_shop(&id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("{SHOPS}/{id}")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;

    fn draft(name: &str) -> ShopDraft {
        ShopDraft {
            name: name.to_string(),
            phone: "+998 90 123 45 67".to_string(),
            email: "sales@mobileplus.uz".to_string(),
            telegram: "@mobileplus".to_string(),
            website: String::new(),
            address: "Чиланзар 5".to_string(),
            city: "Ташкент".to_string(),
            has_delivery: true,
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn test_one_shop_per_user() {
        let store = InMemoryStore::new();
        let repo = ShopRepository::new(&store);
        let owner = UserId::new("seller-1");

        let shop = repo.create_shop(&owner, draft("Mobile Plus")).await.unwrap();
        assert_eq!(shop.id.as_str(), "seller-1");
        assert_eq!(shop.owner(), owner);

        assert!(matches!(
            repo.create_shop(&owner, draft("Second")).await,
            Err(RepositoryError::Conflict(_))
        ));

        let stored = repo.get_shop_by_owner(&owner).await.unwrap().unwrap();
        assert_eq!(stored.name, "Mobile Plus");
        assert!(stored.has_delivery);
    }

    #[tokio::test]
    async fn test_invalid_form_never_reaches_store() {
        let store = InMemoryStore::new();
        let repo = ShopRepository::new(&store);
        let mut form = draft("");
        form.address = "  ".to_string();

        match repo.create_shop(&UserId::new("u"), form).await {
            Err(RepositoryError::Validation(e)) => {
                assert!(e.to_string().contains("Название"));
                assert!(e.to_string().contains("Адрес"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(store.count(SHOPS).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_shop() {
        let store = InMemoryStore::new();
        let repo = ShopRepository::new(&store);
        let owner = UserId::new("seller-1");

        assert!(matches!(
            repo.update_shop(&owner, draft("Nope")).await,
            Err(RepositoryError::NotFound(_))
        ));

        repo.create_shop(&owner, draft("Mobile Plus")).await.unwrap();
        let updated = repo.update_shop(&owner, draft("Mobile Plus+")).await.unwrap();
        assert_eq!(updated.name, "Mobile Plus+");
        assert_eq!(updated.owner(), owner);
    }
}
