//! Repositories over the hosted document store.
//!
//! # Collections
//!
//! - `users/{uid}` - Profiles, keyed by auth uid
//! - `shops/{uid}` - One shop per user, keyed by owner uid
//! - `products/{id}` - Listings
//! - `favorites/{id}` - (user, product) join records
//! - `chats/{id}` - Buyer/seller chats about one product
//! - `chats/{id}/messages/{id}` - Chat messages
//! - `tasks/{id}` - Workshop board tasks
//!
//! Repositories borrow a [`DocumentStore`] and hold no state. Multi-step
//! operations (count-then-insert, check-then-insert) are not atomic: two
//! clients racing can both pass the check.

pub mod chats;
pub mod favorites;
pub mod products;
pub mod shops;
pub mod tasks;
pub mod users;

pub use chats::{ChatRepository, UserChat};
pub use favorites::FavoriteRepository;
pub use products::ProductRepository;
pub use shops::ShopRepository;
pub use tasks::TaskRepository;
pub use users::UserRepository;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use bozor_core::ValidationError;

use crate::store::{Document, DocumentStore, Fields, StoreError};

/// Collection of user profiles.
pub const USERS: &str = "users";
/// Collection of shops.
pub const SHOPS: &str = "shops";
/// Collection of product listings.
pub const PRODUCTS: &str = "products";
/// Collection of favorites.
pub const FAVORITES: &str = "favorites";
/// Collection of chats.
pub const CHATS: &str = "chats";
/// Collection of workshop tasks.
pub const TASKS: &str = "tasks";

/// Path of a chat's message subcollection.
#[must_use]
pub fn messages_path(chat_id: &str) -> String {
    format!("{CHATS}/{chat_id}/messages")
}

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Document store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Input failed validation before any store call.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Data in the store does not fit the expected record.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Entity already exists (e.g. a second shop for one user).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Caller may not touch this entity.
    #[error("forbidden: {0}")]
    Forbidden(String),
}

/// Serialize a record into document fields.
pub(crate) fn to_fields<T: Serialize>(record: &T) -> Result<Fields, RepositoryError> {
    match serde_json::to_value(record) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(other) => Err(RepositoryError::DataCorruption(format!(
            "record serialized to a non-object: {other}"
        ))),
        Err(e) => Err(RepositoryError::DataCorruption(e.to_string())),
    }
}

/// Deserialize a document into a record, naming the document on failure.
pub(crate) fn from_document<T: DeserializeOwned>(
    collection: &str,
    document: Document,
) -> Result<T, RepositoryError> {
    let id = document.id.clone();
    document
        .decode()
        .map_err(|e| RepositoryError::DataCorruption(format!("{collection}/{id}: {e}")))
}

/// Deserialize every document, skipping (and logging) ones that do not fit.
///
/// Documents are written by several clients without a schema; one bad
/// record should not hide the rest of a listing.
pub(crate) fn from_documents<T: DeserializeOwned>(
    collection: &str,
    documents: Vec<Document>,
) -> Vec<T> {
    documents
        .into_iter()
        .filter_map(|doc| match from_document(collection, doc) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping unreadable document");
                None
            }
        })
        .collect()
}

/// Merge `fields` into an existing document, reporting a missing document
/// as [`RepositoryError::NotFound`].
pub(crate) async fn update_existing(
    store: &dyn DocumentStore,
    collection: &str,
    id: &str,
    fields: Fields,
) -> Result<(), RepositoryError> {
    store
        .update(collection, id, fields)
        .await
        .map_err(|e| match e {
            StoreError::NotFound(path) => RepositoryError::NotFound(path),
            other => RepositoryError::Store(other),
        })
}

/// A single-field update stamped with `updatedAt`.
pub(crate) fn touch(mut fields: Fields) -> Fields {
    fields.insert(
        "updatedAt".to_string(),
        Value::String(chrono::Utc::now().to_rfc3339()),
    );
    fields
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_messages_path() {
        assert_eq!(messages_path("c1"), "chats/c1/messages");
    }

    #[test]
    fn test_from_documents_skips_unreadable() {
        #[derive(serde::Deserialize)]
        struct Named {
            name: String,
        }

        let docs = vec![
            Document {
                id: "a".to_string(),
                fields: json!({"name": "ok"}).as_object().cloned().unwrap(),
            },
            Document {
                id: "b".to_string(),
                fields: json!({"name": 5}).as_object().cloned().unwrap(),
            },
        ];
        let records: Vec<Named> = from_documents("test", docs);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "ok");
    }

    #[test]
    fn test_touch_stamps_updated_at() {
        let fields = touch(Fields::new());
        assert!(fields.get("updatedAt").and_then(Value::as_str).is_some());
    }
}
