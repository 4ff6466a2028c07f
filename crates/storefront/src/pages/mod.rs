//! Screen loaders and actions.
//!
//! Each module backs one screen of the storefront: it loads everything the
//! screen shows and exposes the actions the screen offers. There is no
//! server; these run in the client against the hosted backend.
//!
//! # Screens
//!
//! ```text
//! home       - Discounted picks, search
//! product    - Product detail, favorite toggle, "write to seller"
//! shop       - Public shop window; own shop create/edit
//! warehouse  - Own listings held back from the shop window
//! chats      - Chat list and chat thread
//! account    - Sign-up, sign-in, profile, password, favorites
//! workshop   - Repair task board
//! ```

pub mod account;
pub mod chats;
pub mod home;
pub mod product;
pub mod shop;
pub mod warehouse;
pub mod workshop;

use bozor_core::{Product, ProductId, ShopId};

use crate::auth::AuthUser;
use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// The signed-in user, or `Unauthorized`.
fn signed_in(state: &AppState) -> Result<AuthUser> {
    state
        .session()
        .current()
        .ok_or_else(|| AppError::Unauthorized("sign in first".to_string()))
}

/// A listing owned by the signed-in user's shop.
async fn owned_product(state: &AppState, id: &ProductId) -> Result<Product> {
    let user = signed_in(state)?;
    let product = ProductRepository::new(state.store())
        .get_product(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
    if !product.owned_by(&ShopId::for_owner(&user.uid)) {
        return Err(AppError::Forbidden(format!(
            "product {id} belongs to another shop"
        )));
    }
    Ok(product)
}
