//! Shop screens: the public shop window and the owner's shop settings.

use bozor_core::search::ProductFilter;
use bozor_core::{Product, ProductId, ProductPatch, Shop, ShopDraft, ShopId, UserProfile};

use super::{owned_product, signed_in};
use crate::db::{ProductRepository, ShopRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// The public shop window.
#[derive(Debug, Clone)]
pub struct ShopPage {
    /// The shop.
    pub shop: Shop,
    /// Listings visible to buyers.
    pub products: Vec<Product>,
    /// The owner's profile, if readable.
    pub owner: Option<UserProfile>,
}

/// Load a shop window.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the shop does not exist.
pub async fn load(state: &AppState, id: &ShopId) -> Result<ShopPage> {
    let shop = ShopRepository::new(state.store())
        .get_shop(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("shop {id}")))?;
    let products = ProductRepository::new(state.store())
        .get_products(&ProductFilter::shop(id.clone()))
        .await?
        .into_iter()
        .filter(|p| p.status.is_public())
        .collect();
    let owner = UserRepository::new(state.store())
        .get_profile(&shop.owner())
        .await?;
    Ok(ShopPage {
        shop,
        products,
        owner,
    })
}

/// The signed-in user's shop and all its listings, whatever their status.
///
/// # Errors
///
/// Returns `AppError::Unauthorized` when signed out.
pub async fn own(state: &AppState) -> Result<Option<(Shop, Vec<Product>)>> {
    let user = signed_in(state)?;
    let Some(shop) = ShopRepository::new(state.store())
        .get_shop_by_owner(&user.uid)
        .await?
    else {
        return Ok(None);
    };
    let products = ProductRepository::new(state.store())
        .get_products(&ProductFilter::shop(shop.id.clone()))
        .await?;
    Ok(Some((shop, products)))
}

/// Create the signed-in user's shop.
///
/// # Errors
///
/// Returns a validation error for an incomplete form, or a conflict if the
/// user already has a shop.
pub async fn create(state: &AppState, draft: ShopDraft) -> Result<Shop> {
    let user = signed_in(state)?;
    Ok(ShopRepository::new(state.store())
        .create_shop(&user.uid, draft)
        .await?)
}

/// Edit the signed-in user's shop.
///
/// # Errors
///
/// Returns a validation error for an incomplete form.
pub async fn update(state: &AppState, draft: ShopDraft) -> Result<Shop> {
    let user = signed_in(state)?;
    Ok(ShopRepository::new(state.store())
        .update_shop(&user.uid, draft)
        .await?)
}

/// Edit one of the owner's listings.
///
/// # Errors
///
/// Returns `AppError::Forbidden` if the listing belongs to another shop.
pub async fn edit_product(state: &AppState, id: &ProductId, patch: ProductPatch) -> Result<Product> {
    owned_product(state, id).await?;
    Ok(ProductRepository::new(state.store())
        .update_product(id, patch)
        .await?)
}

/// Delete one of the owner's listings.
///
/// # Errors
///
/// Returns `AppError::Forbidden` if the listing belongs to another shop.
pub async fn delete_product(state: &AppState, id: &ProductId) -> Result<()> {
    owned_product(state, id).await?;
    Ok(ProductRepository::new(state.store()).delete_product(id).await?)
}
