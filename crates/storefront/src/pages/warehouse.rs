//! Warehouse screen: the owner's listings held back from the shop window.

use bozor_core::{Product, ProductDraft, ProductId, ProductStatus, Shop, ShopId};

use super::{owned_product, signed_in};
use crate::db::{ProductRepository, ShopRepository};
use crate::error::{AppError, Result};
use crate::services::create_listing;
use crate::state::AppState;

/// What the warehouse screen shows.
#[derive(Debug, Clone)]
pub enum WarehousePage {
    /// Nobody is signed in.
    SignedOut,
    /// Signed in without a shop: prompt to create one.
    NeedsShop,
    /// The owner's shop and its warehouse listings.
    Ready {
        /// The owner's shop.
        shop: Shop,
        /// Listings with status "На складе".
        products: Vec<Product>,
    },
}

impl WarehousePage {
    /// Whether the "add product" action is offered.
    #[must_use]
    pub const fn can_add_product(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }

    /// Prompt shown instead of the listing grid, if any.
    #[must_use]
    pub const fn prompt(&self) -> Option<&'static str> {
        match self {
            Self::SignedOut => Some("Войдите, чтобы увидеть склад"),
            Self::NeedsShop => Some("Сначала создайте магазин"),
            Self::Ready { .. } => None,
        }
    }
}

/// Load the warehouse screen.
///
/// # Errors
///
/// Returns an error if the shop or listings cannot be fetched.
pub async fn load(state: &AppState) -> Result<WarehousePage> {
    let Some(uid) = state.session().user_id() else {
        return Ok(WarehousePage::SignedOut);
    };
    let Some(shop) = ShopRepository::new(state.store()).get_shop_by_owner(&uid).await? else {
        return Ok(WarehousePage::NeedsShop);
    };
    let products = ProductRepository::new(state.store())
        .get_warehouse_products(&shop.id)
        .await?;
    Ok(WarehousePage::Ready { shop, products })
}

/// Add a listing to the owner's shop, uploading `image` if given.
///
/// # Errors
///
/// Returns `AppError::Unauthorized` when signed out, `AppError::Forbidden`
/// when the user has no shop, or a validation error for an incomplete form.
pub async fn add_product(
    state: &AppState,
    draft: ProductDraft,
    image: Option<&[u8]>,
) -> Result<Product> {
    let user = signed_in(state)?;
    let shop_id = ShopId::for_owner(&user.uid);
    if ShopRepository::new(state.store())
        .get_shop(&shop_id)
        .await?
        .is_none()
    {
        return Err(AppError::Forbidden("create a shop first".to_string()));
    }
    Ok(create_listing(state.store(), state.images(), &shop_id, draft, image).await?)
}

/// Put a listing in the shop window.
///
/// # Errors
///
/// Returns `AppError::Forbidden` if the listing belongs to another shop.
pub async fn move_to_display(state: &AppState, id: &ProductId) -> Result<Product> {
    set_status(state, id, ProductStatus::OnDisplay).await
}

/// Take a listing out of the shop window.
///
/// # Errors
///
/// Returns `AppError::Forbidden` if the listing belongs to another shop.
pub async fn move_to_warehouse(state: &AppState, id: &ProductId) -> Result<Product> {
    set_status(state, id, ProductStatus::InWarehouse).await
}

async fn set_status(state: &AppState, id: &ProductId, status: ProductStatus) -> Result<Product> {
    owned_product(state, id).await?;
    Ok(ProductRepository::new(state.store())
        .set_product_status(id, status)
        .await?)
}
