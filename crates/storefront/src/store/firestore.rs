//! REST client for the hosted document store.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use tokio::sync::RwLock;
use tracing::instrument;

use super::value::{decode_fields, encode, encode_fields};
use super::{Document, DocumentStore, FieldFilter, Fields, StoreError};
use crate::config::FirebaseConfig;

/// Document store client over the REST API.
///
/// Requests carry the project API key and, once a user signs in, their ID
/// token so that security rules see the caller.
pub struct FirestoreClient {
    client: reqwest::Client,
    documents_root: String,
    api_key: SecretString,
    id_token: RwLock<Option<SecretString>>,
}

impl FirestoreClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &FirebaseConfig) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("bozor/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            documents_root: format!(
                "{}/projects/{}/databases/(default)/documents",
                config.firestore_base_url, config.project_id
            ),
            api_key: config.api_key.clone(),
            id_token: RwLock::new(None),
        })
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{collection}/{id}", self.documents_root)
    }

    /// `runQuery` endpoint for a collection path plus the collection id.
    ///
    /// For `chats/c1/messages` the query runs under the `chats/c1` document.
    fn query_target(&self, collection: &str) -> (String, String) {
        match collection.rsplit_once('/') {
            Some((parent, collection_id)) => (
                format!("{}/{parent}", self.documents_root),
                collection_id.to_string(),
            ),
            None => (self.documents_root.clone(), collection.to_string()),
        }
    }

    async fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, url)
            .query(&[("key", self.api_key.expose_secret())]);
        match self.id_token.read().await.as_ref() {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    async fn run_query(&self, collection: &str, body: Value) -> Result<Vec<Value>, StoreError> {
        let (parent, _) = self.query_target(collection);
        let url = format!("{parent}:runQuery");
        let response = self
            .request(Method::POST, &url)
            .await
            .json(&body)
            .send()
            .await?;
        let response = check_status(response).await?;
        response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| StoreError::Parse(e.to_string()))
    }
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    #[instrument(skip(self))]
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let url = self.document_url(collection, id);
        let response = self.request(Method::GET, &url).await.send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body: Value = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::Parse(e.to_string()))?;
        parse_document(&body).map(Some)
    }

    #[instrument(skip(self, fields))]
    async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        let url = self.document_url(collection, id);
        let body = json!({ "fields": encode_fields(&fields) });
        let response = self
            .request(Method::PATCH, &url)
            .await
            .json(&body)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    #[instrument(skip(self, fields))]
    async fn add(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        let url = format!("{}/{collection}", self.documents_root);
        let body = json!({ "fields": encode_fields(&fields) });
        let response = self
            .request(Method::POST, &url)
            .await
            .json(&body)
            .send()
            .await?;
        let created: Value = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::Parse(e.to_string()))?;
        let id = parse_document(&created)?.id;
        tracing::debug!(collection, id = %id, "Document created");
        Ok(id)
    }

    #[instrument(skip(self, fields))]
    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        let url = self.document_url(collection, id);
        let mut params: Vec<(&str, &str)> = fields
            .keys()
            .map(|key| ("updateMask.fieldPaths", key.as_str()))
            .collect();
        params.push(("currentDocument.exists", "true"));

        let body = json!({ "fields": encode_fields(&fields) });
        let response = self
            .request(Method::PATCH, &url)
            .await
            .query(&params)
            .json(&body)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(format!("{collection}/{id}")));
        }
        check_status(response).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let url = self.document_url(collection, id);
        let response = self.request(Method::DELETE, &url).await.send().await?;
        check_status(response).await?;
        Ok(())
    }

    #[instrument(skip(self, filters), fields(filters = filters.len()))]
    async fn query(
        &self,
        collection: &str,
        filters: &[FieldFilter],
    ) -> Result<Vec<Document>, StoreError> {
        let (_, collection_id) = self.query_target(collection);
        let mut structured = json!({ "from": [{ "collectionId": collection_id }] });
        if let Some(filter) = where_clause(filters) {
            structured["where"] = filter;
        }

        let rows = self
            .run_query(collection, json!({ "structuredQuery": structured }))
            .await?;
        rows.iter()
            .filter_map(|row| row.get("document"))
            .map(parse_document)
            .collect()
    }

    #[instrument(skip(self))]
    async fn count(&self, collection: &str) -> Result<u64, StoreError> {
        let (parent, collection_id) = self.query_target(collection);
        let url = format!("{parent}:runAggregationQuery");
        let body = json!({
            "structuredAggregationQuery": {
                "structuredQuery": { "from": [{ "collectionId": collection_id }] },
                "aggregations": [{ "alias": "total", "count": {} }],
            }
        });
        let response = self
            .request(Method::POST, &url)
            .await
            .json(&body)
            .send()
            .await?;
        let rows: Vec<Value> = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::Parse(e.to_string()))?;

        rows.iter()
            .find_map(|row| row.pointer("/result/aggregateFields/total/integerValue"))
            .and_then(|v| v.as_str().and_then(|s| s.parse().ok()).or_else(|| v.as_u64()))
            .ok_or_else(|| StoreError::Parse("missing count in aggregation result".to_string()))
    }

    async fn authorize(&self, id_token: Option<SecretString>) {
        *self.id_token.write().await = id_token;
    }
}

/// Build the `where` clause: one field filter, or an AND of several.
fn where_clause(filters: &[FieldFilter]) -> Option<Value> {
    let mut clauses: Vec<Value> = filters
        .iter()
        .map(|f| {
            json!({
                "fieldFilter": {
                    "field": { "fieldPath": f.field },
                    "op": "EQUAL",
                    "value": encode(&f.value),
                }
            })
        })
        .collect();

    match clauses.len() {
        0 => None,
        1 => clauses.pop(),
        _ => Some(json!({ "compositeFilter": { "op": "AND", "filters": clauses } })),
    }
}

/// Read a document resource: key from the last segment of `name`.
fn parse_document(resource: &Value) -> Result<Document, StoreError> {
    let name = resource
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| StoreError::Parse("document without name".to_string()))?;
    let id = name.rsplit('/').next().unwrap_or(name).to_string();
    let fields = resource
        .get("fields")
        .and_then(Value::as_object)
        .map(decode_fields)
        .unwrap_or_default();
    Ok(Document { id, fields })
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v.pointer("/error/message").and_then(Value::as_str).map(String::from))
        .unwrap_or(body);
    tracing::error!(status = status.as_u16(), %message, "Document store request failed");
    Err(StoreError::Api {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client() -> FirestoreClient {
        FirestoreClient::new(&FirebaseConfig::emulator(
            "demo-bozor",
            "http://localhost:8080/v1",
            "http://localhost:9099/identitytoolkit.googleapis.com/v1",
        ))
        .unwrap()
    }

    #[test]
    fn test_query_target_for_subcollections() {
        let client = client();
        let root = "http://localhost:8080/v1/projects/demo-bozor/databases/(default)/documents";

        assert_eq!(
            client.query_target("products"),
            (root.to_string(), "products".to_string())
        );
        assert_eq!(
            client.query_target("chats/c1/messages"),
            (format!("{root}/chats/c1"), "messages".to_string())
        );
    }

    #[test]
    fn test_where_clause_shapes() {
        assert!(where_clause(&[]).is_none());

        let single = where_clause(&[FieldFilter::eq("shopId", "s1")]).unwrap();
        assert_eq!(single["fieldFilter"]["op"], "EQUAL");
        assert_eq!(single["fieldFilter"]["value"], json!({"stringValue": "s1"}));

        let both = where_clause(&[
            FieldFilter::eq("shopId", "s1"),
            FieldFilter::eq("status", "На складе"),
        ])
        .unwrap();
        assert_eq!(both["compositeFilter"]["op"], "AND");
        assert_eq!(both["compositeFilter"]["filters"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_parse_document_resource() {
        let resource = json!({
            "name": "projects/p/databases/(default)/documents/products/abc123",
            "fields": { "name": { "stringValue": "Чехол" } },
            "createTime": "2024-05-01T10:00:00Z",
        });
        let doc = parse_document(&resource).unwrap();
        assert_eq!(doc.id, "abc123");
        assert_eq!(doc.fields["name"], "Чехол");
    }
}
