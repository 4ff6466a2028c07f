//! Product image upload.
//!
//! Images go to a public image host; only the returned URL is stored on the
//! listing. A failed upload never blocks the listing: see [`upload_or_skip`].

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use crate::config::ImgbbConfig;

/// Errors that can occur when uploading an image.
#[derive(Debug, Error)]
pub enum ImageError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Host rejected the upload.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Nothing to upload.
    #[error("image is empty")]
    Empty,
}

/// A host that stores an image and hands back its public URL.
#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Upload raw image bytes and return the public URL.
    async fn upload(&self, image: &[u8]) -> Result<String, ImageError>;
}

/// Upload `image` if there is one; on failure log and continue without it.
pub async fn upload_or_skip(host: &dyn ImageHost, image: Option<&[u8]>) -> Option<String> {
    let image = image.filter(|bytes| !bytes.is_empty())?;
    match host.upload(image).await {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::warn!(error = %e, "Image upload failed, saving listing without image");
            None
        }
    }
}

/// imgbb upload client.
#[derive(Clone)]
pub struct ImgbbClient {
    client: reqwest::Client,
    api_key: SecretString,
    upload_url: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    data: Option<UploadData>,
    #[serde(default)]
    error: Option<UploadErrorBody>,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    url: String,
}

#[derive(Debug, Deserialize)]
struct UploadErrorBody {
    message: String,
}

impl ImgbbClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ImgbbConfig) -> Result<Self, ImageError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("bozor/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            upload_url: config.base_url.clone(),
        })
    }
}

/// Pull the URL out of an upload response, or the host's error message.
fn parse_upload(status: u16, body: &str) -> Result<String, ImageError> {
    match serde_json::from_str::<UploadResponse>(body) {
        Ok(UploadResponse {
            data: Some(data), ..
        }) if (200..300).contains(&status) => Ok(data.url),
        Ok(UploadResponse {
            error: Some(error), ..
        }) => Err(ImageError::Api {
            status,
            message: error.message,
        }),
        _ => Err(ImageError::Api {
            status,
            message: body.chars().take(200).collect(),
        }),
    }
}

#[async_trait]
impl ImageHost for ImgbbClient {
    #[instrument(skip(self, image), fields(bytes = image.len()))]
    async fn upload(&self, image: &[u8]) -> Result<String, ImageError> {
        if image.is_empty() {
            return Err(ImageError::Empty);
        }
        let form = reqwest::multipart::Form::new()
            .text("key", self.api_key.expose_secret().to_owned())
            .text("image", STANDARD.encode(image));

        let response = self.client.post(&self.upload_url).multipart(form).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        let result = parse_upload(status, &body);
        match &result {
            Ok(url) => tracing::debug!(%url, "Image uploaded"),
            Err(e) => tracing::error!(error = %e, "Image upload rejected"),
        }
        result
    }
}

/// An [`ImageHost`] that keeps nothing and hands out numbered fake URLs.
#[derive(Debug, Default)]
pub struct InMemoryImageHost {
    uploads: AtomicUsize,
    failing: AtomicBool,
}

impl InMemoryImageHost {
    /// A working host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make later uploads fail (or succeed again).
    pub fn fail_uploads(&self, fail: bool) {
        self.failing.store(fail, Ordering::SeqCst);
    }

    /// Number of successful uploads so far.
    #[must_use]
    pub fn uploads(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageHost for InMemoryImageHost {
    async fn upload(&self, image: &[u8]) -> Result<String, ImageError> {
        if image.is_empty() {
            return Err(ImageError::Empty);
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(ImageError::Api {
                status: 503,
                message: "image host unavailable".to_string(),
            });
        }
        let n = self.uploads.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("https://i.ibb.co/memory/{n}.jpg"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_success() {
        let body = r#"{"data":{"id":"abc","url":"https://i.ibb.co/abc/phone.jpg"},"success":true,"status":200}"#;
        assert_eq!(
            parse_upload(200, body).unwrap(),
            "https://i.ibb.co/abc/phone.jpg"
        );
    }

    #[test]
    fn test_parse_error_payload() {
        let body = r#"{"status_code":400,"error":{"message":"Invalid API v1 key.","code":100},"status_txt":"Bad Request"}"#;
        match parse_upload(400, body) {
            Err(ImageError::Api { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "Invalid API v1 key.");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(
            parse_upload(502, "<html>Bad gateway</html>"),
            Err(ImageError::Api { status: 502, .. })
        ));
    }

    #[tokio::test]
    async fn test_upload_or_skip_swallows_failure() {
        let host = InMemoryImageHost::new();
        assert!(upload_or_skip(&host, Some(b"jpeg")).await.is_some());
        assert!(upload_or_skip(&host, None).await.is_none());
        assert!(upload_or_skip(&host, Some(b"")).await.is_none());

        host.fail_uploads(true);
        assert!(upload_or_skip(&host, Some(b"jpeg")).await.is_none());
        assert_eq!(host.uploads(), 1);
    }
}
