//! Favorite join records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{FavoriteId, ProductId, UserId};

/// Favorite document at `favorites/{id}`: one per (user, product) pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    /// Document key.
    #[serde(skip_serializing, default)]
    pub id: FavoriteId,
    /// User who saved the product.
    pub user_id: UserId,
    /// Saved product.
    pub product_id: ProductId,
    /// When the product was saved.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Favorite {
    /// A new favorite stamped with `now`.
    #[must_use]
    pub fn new(user_id: UserId, product_id: ProductId, now: DateTime<Utc>) -> Self {
        Self {
            id: FavoriteId::default(),
            user_id,
            product_id,
            created_at: Some(now),
        }
    }
}
