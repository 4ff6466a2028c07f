//! Account screens: sign-up, sign-in, profile, password and favorites.

use bozor_core::{PasswordChange, Product, ProfileUpdate, Registration, Shop, UserProfile};

use super::signed_in;
use crate::auth::AuthUser;
use crate::db::{FavoriteRepository, ShopRepository};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Everything the profile screen shows.
#[derive(Debug, Clone)]
pub struct ProfilePage {
    /// The user's profile.
    pub profile: UserProfile,
    /// The user's shop, if they have one.
    pub shop: Option<Shop>,
}

/// Create an account from the sign-up form and sign it in.
///
/// # Errors
///
/// Returns a validation error for a malformed email or short password.
pub async fn register(
    state: &AppState,
    email: &str,
    password: &str,
    display_name: &str,
) -> Result<AuthUser> {
    let registration = Registration::new(email, password, display_name)?;
    Ok(state.session().register(registration).await?)
}

/// Sign in.
///
/// # Errors
///
/// Returns an auth error for wrong credentials.
pub async fn sign_in(state: &AppState, email: &str, password: &str) -> Result<AuthUser> {
    Ok(state.session().sign_in(email, password).await?)
}

/// Sign out.
pub async fn sign_out(state: &AppState) {
    state.session().sign_out().await;
}

/// Load the profile screen.
///
/// # Errors
///
/// Returns `AppError::Unauthorized` when signed out.
pub async fn profile(state: &AppState) -> Result<ProfilePage> {
    let user = signed_in(state)?;
    let profile = state
        .session()
        .profile()
        .await?
        .ok_or_else(|| AppError::NotFound(format!("profile {}", user.uid)))?;
    let shop = ShopRepository::new(state.store())
        .get_shop_by_owner(&user.uid)
        .await?;
    Ok(ProfilePage { profile, shop })
}

/// Save the profile form. Blank fields keep their stored value.
///
/// # Errors
///
/// Returns a validation error for a malformed phone number.
pub async fn update_profile(state: &AppState, display_name: &str, phone: &str) -> Result<UserProfile> {
    let update = ProfileUpdate::new(display_name, phone)?;
    Ok(state.session().update_profile(update).await?)
}

/// Change the password from the password form.
///
/// # Errors
///
/// Returns a validation error when the confirmation differs or the new
/// password is too short, or an auth error for a wrong current password.
pub async fn change_password(state: &AppState, current: &str, new: &str, confirm: &str) -> Result<()> {
    let change = PasswordChange::new(current, new, confirm)?;
    Ok(state.session().change_password(change).await?)
}

/// The signed-in user's saved listings.
///
/// # Errors
///
/// Returns `AppError::Unauthorized` when signed out.
pub async fn favorites(state: &AppState) -> Result<Vec<Product>> {
    let user = signed_in(state)?;
    Ok(FavoriteRepository::new(state.store())
        .get_favorites(&user.uid)
        .await?)
}
