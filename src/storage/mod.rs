use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use uuid::Uuid;

use crate::config::PlatformConfig;

/// An uploaded file as received from a multipart form.
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{0}")]
    Provider(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Failed to upload image: {0}")]
    Upload(StorageError),

    #[error("Failed to get public image URL.")]
    PublicUrl,
}

/// Object-storage collaborator: named buckets of objects addressable by key,
/// each resolvable to a stable public URL.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Write an object under `key` with no-overwrite semantics.
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Bytes,
        content_type: Option<&str>,
    ) -> Result<(), StorageError>;

    async fn remove(&self, bucket: &str, key: &str) -> Result<(), StorageError>;

    fn public_url(&self, bucket: &str, key: &str) -> String;
}

/// Production storage client backed by the hosted platform's storage API.
pub struct HttpObjectStorage {
    client: reqwest::Client,
    base_url: String,
    service_role_key: String,
}

impl HttpObjectStorage {
    pub fn new(platform: &PlatformConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: format!("{}/storage/v1", platform.url),
            service_role_key: platform.service_role_key.clone(),
        }
    }

    async fn provider_error(response: reqwest::Response) -> StorageError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str().map(String::from)))
            .unwrap_or_else(|| format!("storage request failed with status {}", status));
        StorageError::Provider(detail)
    }
}

#[async_trait]
impl ObjectStorage for HttpObjectStorage {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Bytes,
        content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        let mut request = self
            .client
            .post(format!("{}/object/{}/{}", self.base_url, bucket, key))
            .bearer_auth(&self.service_role_key)
            .header("cache-control", "3600")
            .header("x-upsert", "false")
            .body(bytes);
        if let Some(ct) = content_type {
            request = request.header("content-type", ct.to_string());
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(Self::provider_error(response).await);
        }
        Ok(())
    }

    async fn remove(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
        let response = self
            .client
            .delete(format!("{}/object/{}/{}", self.base_url, bucket, key))
            .bearer_auth(&self.service_role_key)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::provider_error(response).await);
        }
        Ok(())
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        format!("{}/object/public/{}/{}", self.base_url, bucket, key)
    }
}

/// Upload an image under a freshly generated object key and return its
/// public URL. Keys are `{uuid_v4}.{ext}` where `ext` is the text after the
/// last dot of the original filename (the whole name when there is no dot),
/// so no two uploads can collide.
pub async fn upload_image(
    storage: &dyn ObjectStorage,
    bucket: &str,
    file: &ImageFile,
) -> Result<String, UploadError> {
    let extension = file.filename.rsplit('.').next().unwrap_or(&file.filename);
    let key = format!("{}.{}", Uuid::new_v4(), extension);

    storage
        .upload(bucket, &key, file.bytes.clone(), file.content_type.as_deref())
        .await
        .map_err(UploadError::Upload)?;

    let public_url = storage.public_url(bucket, &key);
    if url::Url::parse(&public_url).is_err() {
        return Err(UploadError::PublicUrl);
    }
    Ok(public_url)
}

/// Derive the object key back out of a public URL: the tail segment of the
/// URL path. Exact inverse of the key generation above.
pub fn object_key_from_url(public_url: &str) -> Option<String> {
    let parsed = url::Url::parse(public_url).ok()?;
    let key = parsed.path_segments()?.last()?.to_string();
    if key.is_empty() {
        None
    } else {
        Some(key)
    }
}

/// Remove the object behind a previously stored public URL. Best-effort:
/// failures are logged and swallowed, since an orphaned asset is preferable
/// to blocking the content mutation that triggered the cleanup.
pub async fn delete_image(storage: &dyn ObjectStorage, bucket: &str, public_url: &str) {
    let Some(key) = object_key_from_url(public_url) else {
        tracing::error!("Could not derive storage key from image URL: {}", public_url);
        return;
    };
    if let Err(e) = storage.remove(bucket, &key).await {
        tracing::error!("Error deleting image from storage: {}", e);
    }
}
