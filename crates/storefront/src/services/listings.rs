//! Product creation with an optional image.

use tracing::instrument;

use bozor_core::{Product, ProductDraft, ShopId};

use crate::db::{ProductRepository, RepositoryError};
use crate::images::{ImageHost, upload_or_skip};
use crate::store::DocumentStore;

/// Validate the form, upload the image if one was picked, and create the
/// listing. A failed upload leaves the listing without an image.
///
/// # Errors
///
/// Returns `RepositoryError::Validation` before any upload if the form is
/// incomplete, or the store error if the listing cannot be written.
#[instrument(skip(store, images, draft, image), fields(shop_id = %shop_id))]
pub async fn create_listing(
    store: &dyn DocumentStore,
    images: &dyn ImageHost,
    shop_id: &ShopId,
    draft: ProductDraft,
    image: Option<&[u8]>,
) -> Result<Product, RepositoryError> {
    let mut draft = draft.validate()?;
    if let Some(url) = upload_or_skip(images, image).await {
        draft.image_url = Some(url);
    }
    ProductRepository::new(store).create_product(shop_id, draft).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bozor_core::{Category, Price, ShopDraft, UserId};

    use super::*;
    use crate::db::ShopRepository;
    use crate::images::InMemoryImageHost;
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
            has_delivery: false,
            description: String::new(),
        };
        ShopRepository::new(store)
            .create_shop(&UserId::new("seller"), draft)
            .await
            .unwrap()
            .id
    }

    fn draft() -> ProductDraft {
        ProductDraft {
            name: "iPhone 13".to_string(),
            category: Category::new("Смартфоны"),
            price: Some(Price::new(100_000)),
            ..ProductDraft::default()
        }
    }

    #[tokio::test]
    async fn test_listing_gets_image_url() {
        let store = InMemoryStore::new();
        let images = InMemoryImageHost::new();
        let shop_id = shop(&store).await;

        let product = create_listing(&store, &images, &shop_id, draft(), Some(b"jpeg"))
            .await
            .unwrap();
        assert!(product.image_url.is_some());
    }

    #[tokio::test]
    async fn test_failed_upload_still_creates_listing() {
        let store = InMemoryStore::new();
        let images = InMemoryImageHost::new();
        images.fail_uploads(true);
        let shop_id = shop(&store).await;

        let product = create_listing(&store, &images, &shop_id, draft(), Some(b"jpeg"))
            .await
            .unwrap();
        assert!(product.image_url.is_none());
        assert_eq!(product.name, "iPhone 13");
    }

    #[tokio::test]
    async fn test_invalid_form_skips_upload() {
        let store = InMemoryStore::new();
        let images = InMemoryImageHost::new();
        let shop_id = shop(&store).await;

        let result = create_listing(&store, &images, &shop_id, ProductDraft::default(), Some(b"jpeg")).await;
        assert!(matches!(result, Err(RepositoryError::Validation(_))));
        assert_eq!(images.uploads(), 0);
    }
}
