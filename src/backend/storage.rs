use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

use super::latency::{Delay, Latency};
use crate::error::{BackendError, BackendResult};
use crate::models::ListingKind;

/// Image buckets, one per listing kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Bucket {
    PropertyImages,
    ServiceImages,
    ProductImages,
}

impl Bucket {
    pub const fn as_str(self) -> &'static str {
        match self {
            Bucket::PropertyImages => "property-images",
            Bucket::ServiceImages => "service-images",
            Bucket::ProductImages => "product-images",
        }
    }

    pub const fn for_kind(kind: ListingKind) -> Self {
        match kind {
            ListingKind::Product => Bucket::ProductImages,
            ListingKind::Property => Bucket::PropertyImages,
            ListingKind::Service => Bucket::ServiceImages,
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Common trait for asset stores
/// A real object store can be dropped in behind the same calls
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Store `content` under `path` and return its public URL
    async fn upload(&self, bucket: Bucket, path: &str, content: &[u8]) -> BackendResult<String>;

    async fn remove(&self, bucket: Bucket, paths: &[String]) -> BackendResult<()>;

    fn public_url(&self, bucket: Bucket, path: &str) -> String;

    /// Get the name of the storage backend
    fn source_name(&self) -> &'static str;
}

/// Storage that keeps nothing and answers with predictable URLs.
#[derive(Debug, Clone)]
pub struct MockStorage {
    base_url: String,
    latency: Latency,
}

impl MockStorage {
    pub fn new(base_url: impl Into<String>, latency: Latency) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            latency,
        }
    }
}

#[async_trait]
impl FileStorage for MockStorage {
    async fn upload(&self, bucket: Bucket, path: &str, content: &[u8]) -> BackendResult<String> {
        if path.trim_matches('/').is_empty() {
            return Err(BackendError::Validation(
                "La ruta del archivo es obligatoria".to_string(),
            ));
        }
        self.latency.pause(Delay::Upload).await;

        let url = self.public_url(bucket, path);
        info!("Mock file uploaded: {} ({} bytes)", url, content.len());
        Ok(url)
    }

    async fn remove(&self, bucket: Bucket, paths: &[String]) -> BackendResult<()> {
        self.latency.pause(Delay::RemoveFile).await;
        for path in paths {
            debug!("Mock file deleted: {}/{}", bucket, path);
        }
        Ok(())
    }

    fn public_url(&self, bucket: Bucket, path: &str) -> String {
        let segments = path.split('/').filter(|s| !s.is_empty());
        std::iter::once(self.base_url.as_str())
            .chain(std::iter::once(bucket.as_str()))
            .chain(segments)
            .collect::<Vec<_>>()
            .join("/")
    }

    fn source_name(&self) -> &'static str {
        "mock-storage"
    }
}
