//! Integration tests for Bozor.
//!
//! # Running Tests
//!
//! ```bash
//! # In-memory backend
//! cargo test -p bozor-integration-tests
//!
//! # Also against the Firestore emulator
//! FIRESTORE_EMULATOR_URL=http://localhost:8080/v1 \
//!     cargo test -p bozor-integration-tests -- --include-ignored
//! ```
//!
//! # Test Categories
//!
//! - `listings` - Shops, warehouse and product pricing
//! - `search` - Search composer over stored listings
//! - `social` - Favorites and chats between buyers and sellers
//! - `emulator` - The REST gateway against a running emulator
//!
//! Every user in a test gets their own [`AppState`] so each has an
//! independent session, while all of them share one backend.

use std::sync::Arc;

use bozor_core::{Category, Price, ProductDraft, ShopDraft};
use bozor_storefront::auth::{AuthProvider, AuthUser, InMemoryAuth};
use bozor_storefront::config::RecommendedConfig;
use bozor_storefront::images::{ImageHost, InMemoryImageHost};
use bozor_storefront::pages::account;
use bozor_storefront::state::{AppState, DEFAULT_CHAT_POLL_INTERVAL};
use bozor_storefront::store::{DocumentStore, InMemoryStore};

/// One in-memory backend shared by several signed-in clients.
pub struct Marketplace {
    pub store: Arc<InMemoryStore>,
    auth: Arc<dyn AuthProvider>,
    images: Arc<dyn ImageHost>,
}

impl Default for Marketplace {
    fn default() -> Self {
        Self::new()
    }
}

impl Marketplace {
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: Arc::new(InMemoryStore::new()),
            auth: Arc::new(InMemoryAuth::new()),
            images: Arc::new(InMemoryImageHost::new()),
        }
    }

    /// A signed-out client of this backend.
    #[must_use]
    pub fn client(&self) -> AppState {
        let store: Arc<dyn DocumentStore> = self.store.clone();
        AppState::new(
            store,
            Arc::clone(&self.auth),
            Arc::clone(&self.images),
            DEFAULT_CHAT_POLL_INTERVAL,
            RecommendedConfig::default(),
        )
    }

    /// A client signed in as a freshly registered user.
    ///
    /// # Panics
    ///
    /// Panics if registration fails.
    pub async fn user(&self, email: &str, name: &str) -> (AppState, AuthUser) {
        let state = self.client();
        let user = account::register(&state, email, "secret123", name)
            .await
            .unwrap_or_else(|e| panic!("register {email}: {e}"));
        (state, user)
    }
}

/// A complete shop form.
#[must_use]
pub fn shop_draft(name: &str, city: &str, has_delivery: bool) -> ShopDraft {
    ShopDraft {
        name: name.to_string(),
        phone: "+998 90 123 45 67".to_string(),
        email: "sales@bozor.uz".to_string(),
        telegram: String::new(),
        website: String::new(),
        address: "Чиланзар 5".to_string(),
        city: city.to_string(),
        has_delivery,
        description: String::new(),
    }
}

/// A complete listing form.
#[must_use]
pub fn product_draft(name: &str, category: &str, price: u64) -> ProductDraft {
    ProductDraft {
        name: name.to_string(),
        category: Category::new(category),
        price: Some(Price::new(price)),
        quantity: 1,
        ..ProductDraft::default()
    }
}
