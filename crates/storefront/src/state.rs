//! Application state shared across screens.

use std::sync::Arc;
use std::time::Duration;

use bozor_core::DiscountPercent;

use crate::auth::{AuthError, AuthProvider, IdentityClient, InMemoryAuth, Session};
use crate::config::{RecommendedConfig, StorefrontConfig};
use crate::images::{ImageError, ImageHost, ImgbbClient, InMemoryImageHost};
use crate::store::{DocumentStore, FirestoreClient, InMemoryStore, StoreError};

/// Default chat refresh interval when no configuration is loaded.
pub const DEFAULT_CHAT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Error building the hosted-service clients.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("document store client: {0}")]
    Store(#[from] StoreError),
    #[error("auth client: {0}")]
    Auth(#[from] AuthError),
    #[error("image host client: {0}")]
    Image(#[from] ImageError),
}

/// Application state shared across all screens.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// backend clients and the signed-in session.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Arc<dyn DocumentStore>,
    images: Arc<dyn ImageHost>,
    session: Session,
    chat_poll_interval: Duration,
    recommended: RecommendedConfig,
}

impl AppState {
    /// Assemble state from already-built clients.
    #[must_use]
    pub fn new(
        store: Arc<dyn DocumentStore>,
        auth: Arc<dyn AuthProvider>,
        images: Arc<dyn ImageHost>,
        chat_poll_interval: Duration,
        recommended: RecommendedConfig,
    ) -> Self {
        let session = Session::new(auth, Arc::clone(&store));
        Self {
            inner: Arc::new(AppStateInner {
                store,
                images,
                session,
                chat_poll_interval,
                recommended,
            }),
        }
    }

    /// State backed by the hosted services.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be built.
    pub fn from_config(config: &StorefrontConfig) -> Result<Self, StateError> {
        let store = FirestoreClient::new(&config.firebase)?;
        let auth = IdentityClient::new(&config.firebase)?;
        let images = ImgbbClient::new(&config.imgbb)?;
        Ok(Self::new(
            Arc::new(store),
            Arc::new(auth),
            Arc::new(images),
            config.chat_poll_interval,
            config.recommended,
        ))
    }

    /// State backed entirely by process memory.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryStore::new()),
            Arc::new(InMemoryAuth::new()),
            Arc::new(InMemoryImageHost::new()),
            DEFAULT_CHAT_POLL_INTERVAL,
            RecommendedConfig::default(),
        )
    }

    /// The document store.
    #[must_use]
    pub fn store(&self) -> &dyn DocumentStore {
        self.inner.store.as_ref()
    }

    /// A shared handle to the document store, for background tasks.
    #[must_use]
    pub fn store_handle(&self) -> Arc<dyn DocumentStore> {
        Arc::clone(&self.inner.store)
    }

    /// The image host.
    #[must_use]
    pub fn images(&self) -> &dyn ImageHost {
        self.inner.images.as_ref()
    }

    /// The signed-in session.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    /// How often an open chat refreshes.
    #[must_use]
    pub fn chat_poll_interval(&self) -> Duration {
        self.inner.chat_poll_interval
    }

    /// Smallest discount shown among the picks.
    #[must_use]
    pub fn recommended_min_discount(&self) -> DiscountPercent {
        DiscountPercent::new(self.inner.recommended.min_discount)
    }

    /// Number of picks shown.
    #[must_use]
    pub fn recommended_limit(&self) -> usize {
        self.inner.recommended.limit
    }
}
