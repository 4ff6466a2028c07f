//! Hosted document store access.
//!
//! The storefront keeps no data of its own: every record lives in a
//! schemaless document store addressed by collection path and document key.
//! [`DocumentStore`] is the seam between the repositories in [`crate::db`]
//! and a backend: [`FirestoreClient`] talks to the hosted store over REST,
//! [`InMemoryStore`] backs tests and demos.
//!
//! Queries support equality filters only. Anything richer (text search,
//! ordering, ranges) happens client-side after the fetch.

mod firestore;
mod memory;
mod value;

pub use firestore::FirestoreClient;
pub use memory::InMemoryStore;

use async_trait::async_trait;
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Document fields as a JSON object.
pub type Fields = serde_json::Map<String, Value>;

/// Errors returned by a document store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Document to update does not exist.
    #[error("document not found: {0}")]
    NotFound(String),

    /// Response could not be read.
    #[error("parse error: {0}")]
    Parse(String),
}

/// A document read back from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Document key within its collection.
    pub id: String,
    /// Stored fields.
    pub fields: Fields,
}

impl Document {
    /// Deserialize into a record type. The key is exposed to the record as
    /// an `id` field.
    ///
    /// # Errors
    ///
    /// Returns the deserialization error if the fields do not fit `T`.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, serde_json::Error> {
        let mut fields = self.fields;
        fields.insert("id".to_string(), Value::String(self.id));
        serde_json::from_value(Value::Object(fields))
    }
}

/// An equality constraint: `field == value`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    /// Field path.
    pub field: String,
    /// Value the field must equal.
    pub value: Value,
}

impl FieldFilter {
    /// `field == value`.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Whether `fields` satisfies this constraint.
    #[must_use]
    pub fn matches(&self, fields: &Fields) -> bool {
        fields.get(&self.field) == Some(&self.value)
    }
}

/// A document store backend.
///
/// Collection paths may name a subcollection (`chats/{id}/messages`).
/// Every method is a single round trip; none are transactional.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch one document, `None` if it does not exist.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Create or overwrite the document at `collection/id`.
    async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError>;

    /// Create a document under a generated key and return the key.
    async fn add(&self, collection: &str, fields: Fields) -> Result<String, StoreError>;

    /// Merge `fields` into an existing document.
    ///
    /// Fails with [`StoreError::NotFound`] if the document does not exist.
    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError>;

    /// Delete a document. Deleting a missing document succeeds.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    /// Documents matching every filter. No filters returns the whole
    /// collection. Result order is unspecified.
    async fn query(
        &self,
        collection: &str,
        filters: &[FieldFilter],
    ) -> Result<Vec<Document>, StoreError>;

    /// Number of documents in a collection.
    async fn count(&self, collection: &str) -> Result<u64, StoreError>;

    /// Attach (or clear) the signed-in user's ID token to later requests.
    async fn authorize(&self, _id_token: Option<SecretString>) {}
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_decode_exposes_key_as_id() {
        #[derive(Deserialize)]
        struct Record {
            id: String,
            name: String,
        }

        let doc = Document {
            id: "abc".to_string(),
            fields: json!({"name": "Чехол"}).as_object().cloned().unwrap(),
        };
        let record: Record = doc.decode().unwrap();
        assert_eq!(record.id, "abc");
        assert_eq!(record.name, "Чехол");
    }

    #[test]
    fn test_field_filter_matches_exact_value() {
        let fields = json!({"status": "На складе", "quantity": 2})
            .as_object()
            .cloned()
            .unwrap();
        assert!(FieldFilter::eq("status", "На складе").matches(&fields));
        assert!(FieldFilter::eq("quantity", 2).matches(&fields));
        assert!(!FieldFilter::eq("status", "на складе").matches(&fields));
        assert!(!FieldFilter::eq("city", "Ташкент").matches(&fields));
    }
}
