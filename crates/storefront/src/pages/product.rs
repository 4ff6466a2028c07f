//! Product detail screen.

use bozor_core::{ChatId, Product, ProductId, Shop};

use super::signed_in;
use crate::db::{ChatRepository, FavoriteRepository, ProductRepository, ShopRepository};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::services::FavoriteToggle;
use crate::state::AppState;

/// Everything the product screen shows.
#[derive(Debug, Clone)]
pub struct ProductPage {
    /// The listing.
    pub product: Product,
    /// The owning shop, if it still exists.
    pub shop: Option<Shop>,
    /// Whether the viewer has saved the listing.
    pub is_favorite: bool,
    /// Whether the viewer may write to the seller: signed in and not the
    /// owner.
    pub can_chat: bool,
}

/// Load the product screen.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the listing does not exist.
pub async fn load(state: &AppState, id: &ProductId) -> Result<ProductPage> {
    let product = ProductRepository::new(state.store())
        .get_product(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
    let shop = ShopRepository::new(state.store())
        .get_shop(&product.shop_id)
        .await?;

    let viewer = state.session().user_id();
    let is_favorite = match &viewer {
        Some(uid) => FavoriteRepository::new(state.store())
            .is_favorite(uid, id)
            .await?,
        None => false,
    };
    let seller = shop.as_ref().map_or_else(|| product.shop_id.owner(), Shop::owner);
    let can_chat = viewer.is_some_and(|uid| uid != seller);

    Ok(ProductPage {
        product,
        shop,
        is_favorite,
        can_chat,
    })
}

/// The favorite heart for this listing.
///
/// # Errors
///
/// Returns `AppError::Unauthorized` when signed out.
pub async fn favorite(state: &AppState, id: &ProductId) -> Result<FavoriteToggle> {
    let user = signed_in(state)?;
    Ok(FavoriteToggle::load(state.store_handle(), user.uid, id.clone()).await?)
}

/// Open (or reopen) the chat with the listing's seller.
///
/// # Errors
///
/// Returns `AppError::Unauthorized` when signed out, `AppError::NotFound`
/// if the listing is gone, or a validation error when the viewer owns it.
pub async fn open_chat(state: &AppState, id: &ProductId) -> Result<ChatId> {
    let user = signed_in(state)?;
    let product = ProductRepository::new(state.store())
        .get_product(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
    let seller = product.shop_id.owner();

    let chat_id = ChatRepository::new(state.store())
        .create_chat(&user.uid, &seller, id)
        .await?;
    add_breadcrumb("chats", "Opened chat", Some(&[("chat_id", chat_id.as_str())]));
    Ok(chat_id)
}
