//! Favorite toggle for one (user, product) pair.
//!
//! The heart icon flips as soon as the user taps it. If the write fails the
//! icon flips back and the error is returned for the notice.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::instrument;

use bozor_core::{ProductId, UserId};

use crate::db::{FavoriteRepository, RepositoryError};
use crate::error::add_breadcrumb;
use crate::store::DocumentStore;

/// Favorite state of one product for one user.
pub struct FavoriteToggle {
    store: Arc<dyn DocumentStore>,
    user: UserId,
    product: ProductId,
    state: watch::Sender<bool>,
}

impl FavoriteToggle {
    /// Load the current state from the store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the lookup fails.
    pub async fn load(
        store: Arc<dyn DocumentStore>,
        user: UserId,
        product: ProductId,
    ) -> Result<Self, RepositoryError> {
        let saved = FavoriteRepository::new(store.as_ref())
            .is_favorite(&user, &product)
            .await?;
        let (state, _) = watch::channel(saved);
        Ok(Self {
            store,
            user,
            product,
            state,
        })
    }

    /// Whether the product is shown as saved.
    #[must_use]
    pub fn is_favorite(&self) -> bool {
        *self.state.borrow()
    }

    /// Watch the shown state.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.state.subscribe()
    }

    /// Flip the state, then write it. On failure the state is restored.
    ///
    /// Returns the new state.
    ///
    /// # Errors
    ///
    /// Returns the store error after rolling back.
    #[instrument(skip(self), fields(user = %self.user, product = %self.product))]
    pub async fn toggle(&self) -> Result<bool, RepositoryError> {
        let previous = self.state.send_replace(!self.is_favorite());
        let next = !previous;

        let repo = FavoriteRepository::new(self.store.as_ref());
        let result = if next {
            repo.add_favorite(&self.user, &self.product).await.map(|_| ())
        } else {
            repo.remove_favorite(&self.user, &self.product).await
        };

        match result {
            Ok(()) => {
                let message = if next { "Added favorite" } else { "Removed favorite" };
                add_breadcrumb("favorites", message, Some(&[("product_id", self.product.as_str())]));
                Ok(next)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Favorite write failed, rolling back");
                self.state.send_replace(previous);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;

    async fn toggle(store: &Arc<InMemoryStore>) -> FavoriteToggle {
        FavoriteToggle::load(
            Arc::clone(store) as Arc<dyn DocumentStore>,
            UserId::new("buyer"),
            ProductId::new("p1"),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_toggle_twice_restores_state() {
        let store = Arc::new(InMemoryStore::new());
        let fav = toggle(&store).await;
        assert!(!fav.is_favorite());

        assert!(fav.toggle().await.unwrap());
        assert!(toggle(&store).await.is_favorite());

        assert!(!fav.toggle().await.unwrap());
        assert!(!fav.is_favorite());
        assert!(!toggle(&store).await.is_favorite());
    }

    #[tokio::test]
    async fn test_failed_write_rolls_back() {
        let store = Arc::new(InMemoryStore::new());
        let fav = toggle(&store).await;
        let mut seen = fav.subscribe();

        store.fail_writes(true);
        assert!(fav.toggle().await.is_err());
        assert!(!fav.is_favorite());
        // Subscribers saw the optimistic flip and the rollback.
        assert!(seen.has_changed().unwrap());
        assert!(!*seen.borrow_and_update());

        store.fail_writes(false);
        assert!(fav.toggle().await.unwrap());
    }
}
