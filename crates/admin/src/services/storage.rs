//! Image storage on the managed object store.
//!
//! Uploads go to `<bucket>/<folder>/<uuid>.<ext>` with the service-role key
//! and are served from the bucket's public URL. Content type and size are
//! checked before any request is sent.
//!
//! # API Reference
//!
//! - Upload: `POST /storage/v1/object/<bucket>/<path>`
//! - Delete: `DELETE /storage/v1/object/<bucket>` with `{"prefixes": [...]}`
//! - Public: `GET /storage/v1/object/public/<bucket>/<path>`

use std::sync::Arc;

use axum::body::Bytes;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::config::{StorageConfig, SupabaseConfig};

/// Image types the store accepts, with the extension used for the object.
const ALLOWED_TYPES: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/webp", "webp"),
];

/// Folder for product photos.
pub const PRODUCT_FOLDER: &str = "products";

/// Folder for the menu board image.
pub const MENU_FOLDER: &str = "menu";

/// Errors from the storage helper.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Rejected before upload: content type not allowed.
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),

    /// Rejected before upload: file too large.
    #[error("file is too large ({size} bytes, max {max})")]
    TooLarge { size: usize, max: usize },

    /// Rejected before upload: no bytes.
    #[error("file is empty")]
    Empty,

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Store returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Service-role key rejected.
    #[error("Unauthorized: storage rejected the service key")]
    Unauthorized,

    /// Client could not be configured.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StorageError {
    /// Whether the upload was rejected locally, before any request.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedType(_) | Self::TooLarge { .. } | Self::Empty
        )
    }
}

/// A stored object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredObject {
    pub path: String,
    pub public_url: String,
}

#[derive(Serialize)]
struct DeleteBody<'a> {
    prefixes: &'a [String],
}

/// Object storage client.
#[derive(Clone)]
pub struct StorageClient {
    inner: Arc<StorageClientInner>,
}

struct StorageClientInner {
    client: reqwest::Client,
    base_url: String,
    bucket: String,
    max_upload_bytes: usize,
}

impl StorageClient {
    /// Create a client that authenticates with the service-role key.
    ///
    /// # Errors
    ///
    /// Returns error if the key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(supabase: &SupabaseConfig, storage: &StorageConfig) -> Result<Self, StorageError> {
        let key = supabase.service_role_key.expose_secret();
        let mut headers = HeaderMap::new();
        let mut bearer = HeaderValue::from_str(&format!("Bearer {key}"))
            .map_err(|e| StorageError::Config(format!("invalid service key: {e}")))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);
        let mut apikey = HeaderValue::from_str(key)
            .map_err(|e| StorageError::Config(format!("invalid service key: {e}")))?;
        apikey.set_sensitive(true);
        headers.insert("apikey", apikey);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            inner: Arc::new(StorageClientInner {
                client,
                base_url: supabase.url.clone(),
                bucket: storage.bucket.clone(),
                max_upload_bytes: storage.max_upload_bytes,
            }),
        })
    }

    /// Check an upload and return the object extension for it.
    ///
    /// # Errors
    ///
    /// Returns a validation `StorageError` for an empty, oversized or
    /// non-image file.
    pub fn validate(&self, content_type: &str, size: usize) -> Result<&'static str, StorageError> {
        validate_upload(content_type, size, self.inner.max_upload_bytes)
    }

    /// Upload an image into `folder` under a fresh name.
    ///
    /// # Errors
    ///
    /// Returns a validation error before any request, or the store's error.
    #[tracing::instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload(
        &self,
        folder: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<StoredObject, StorageError> {
        let ext = self.validate(content_type, bytes.len())?;
        let path = object_path(folder, ext);
        let url = format!(
            "{}/storage/v1/object/{}/{path}",
            self.inner.base_url, self.inner.bucket
        );

        let response = self
            .inner
            .client
            .post(&url)
            .header(CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await?;
        check(response).await?;

        tracing::info!(path = %path, "Image uploaded");
        Ok(StoredObject {
            public_url: self.public_url(&path),
            path,
        })
    }

    /// Delete objects by path. An empty list is a no-op.
    ///
    /// # Errors
    ///
    /// Returns the store's error.
    #[tracing::instrument(skip(self), fields(count = paths.len()))]
    pub async fn remove(&self, paths: &[String]) -> Result<(), StorageError> {
        if paths.is_empty() {
            return Ok(());
        }
        let url = format!(
            "{}/storage/v1/object/{}",
            self.inner.base_url, self.inner.bucket
        );
        let response = self
            .inner
            .client
            .delete(&url)
            .json(&DeleteBody { prefixes: paths })
            .send()
            .await?;
        check(response).await
    }

    /// Public URL of an object in this bucket.
    #[must_use]
    pub fn public_url(&self, path: &str) -> String {
        format!("{}{path}", self.public_prefix())
    }

    /// Object path of a public URL in this bucket. URLs pointing anywhere
    /// else yield `None`.
    #[must_use]
    pub fn object_path_from_public_url(&self, url: &str) -> Option<String> {
        let path = url.strip_prefix(&self.public_prefix())?;
        let path = path.split(['?', '#']).next().unwrap_or_default();
        if path.is_empty() || path.split('/').any(|seg| seg.is_empty() || seg == "..") {
            return None;
        }
        Some(path.to_string())
    }

    fn public_prefix(&self) -> String {
        format!(
            "{}/storage/v1/object/public/{}/",
            self.inner.base_url, self.inner.bucket
        )
    }
}

/// Check content type and size against the allow-list.
///
/// # Errors
///
/// Returns a validation `StorageError`.
pub fn validate_upload(
    content_type: &str,
    size: usize,
    max: usize,
) -> Result<&'static str, StorageError> {
    let normalized = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    let ext = ALLOWED_TYPES
        .iter()
        .find(|(mime, _)| *mime == normalized)
        .map(|(_, ext)| *ext)
        .ok_or_else(|| StorageError::UnsupportedType(content_type.to_string()))?;
    if size == 0 {
        return Err(StorageError::Empty);
    }
    if size > max {
        return Err(StorageError::TooLarge { size, max });
    }
    Ok(ext)
}

/// Fresh object path inside `folder`.
#[must_use]
pub fn object_path(folder: &str, ext: &str) -> String {
    format!("{}/{}.{ext}", folder.trim_matches('/'), Uuid::new_v4())
}

async fn check(response: reqwest::Response) -> Result<(), StorageError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    if status.as_u16() == 401 || status.as_u16() == 403 {
        return Err(StorageError::Unauthorized);
    }
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(StorageError::Api {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn client() -> StorageClient {
        let supabase = SupabaseConfig {
            url: "https://abc.supabase.co".to_string(),
            anon_key: SecretString::from("anon".to_string()),
            service_role_key: SecretString::from("service-role-key".to_string()),
            password_reset_redirect_url: None,
        };
        let storage = StorageConfig {
            bucket: "images".to_string(),
            max_upload_bytes: 1024,
        };
        StorageClient::new(&supabase, &storage).unwrap()
    }

    #[test]
    fn test_validate_upload() {
        assert_eq!(validate_upload("image/png", 10, 100).unwrap(), "png");
        assert_eq!(validate_upload("IMAGE/JPEG; q=1", 10, 100).unwrap(), "jpg");
        assert!(matches!(
            validate_upload("application/pdf", 10, 100),
            Err(StorageError::UnsupportedType(_))
        ));
        assert!(matches!(
            validate_upload("image/webp", 0, 100),
            Err(StorageError::Empty)
        ));
        assert!(matches!(
            validate_upload("image/webp", 101, 100),
            Err(StorageError::TooLarge { size: 101, max: 100 })
        ));
        assert!(StorageError::Empty.is_validation());
        assert!(!StorageError::Unauthorized.is_validation());
    }

    #[test]
    fn test_object_path_is_unique_and_foldered() {
        let a = object_path("/products/", "png");
        let b = object_path("products", "png");
        assert!(a.starts_with("products/"));
        assert!(a.ends_with(".png"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_public_url_roundtrip() {
        let client = client();
        let url = client.public_url("products/a.png");
        assert_eq!(
            url,
            "https://abc.supabase.co/storage/v1/object/public/images/products/a.png"
        );
        assert_eq!(
            client.object_path_from_public_url(&url).as_deref(),
            Some("products/a.png")
        );
        assert_eq!(
            client
                .object_path_from_public_url(&format!("{url}?t=1"))
                .as_deref(),
            Some("products/a.png")
        );
    }

    #[test]
    fn test_foreign_urls_are_ignored() {
        let client = client();
        assert!(client
            .object_path_from_public_url("https://cdn.example.com/a.png")
            .is_none());
        assert!(client
            .object_path_from_public_url(
                "https://abc.supabase.co/storage/v1/object/public/other/a.png"
            )
            .is_none());
        assert!(client
            .object_path_from_public_url(
                "https://abc.supabase.co/storage/v1/object/public/images/../x"
            )
            .is_none());
    }

    #[tokio::test]
    async fn test_upload_rejects_before_request() {
        let err = client()
            .upload(PRODUCT_FOLDER, "text/plain", Bytes::from_static(b"hi"))
            .await
            .unwrap_err();
        assert!(err.is_validation());

        // Removing nothing sends nothing.
        client().remove(&[]).await.unwrap();
    }
}
