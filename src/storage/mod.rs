// Object storage layer (GCS JSON API, or any S3-compatible endpoint)

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{StorageConfig, StorageProvider};
use crate::gcp::{AuthError, TokenSource};

pub mod gcs;
pub mod s3_client;

pub use gcs::GcsObjectStore;
pub use s3_client::S3ObjectStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage authentication failed")]
    Auth(#[from] AuthError),

    #[error("Storage request failed")]
    Request(#[source] reqwest::Error),

    #[error("Storage returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("S3 request failed")]
    S3(#[from] s3::error::S3Error),

    #[error("Invalid S3 credentials")]
    S3Credentials(#[from] s3::creds::error::CredentialsError),
}

/// Where an uploaded object ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bucket: String,
    pub key: String,
    pub uri: String,
}

impl StoredObject {
    pub fn gcs(bucket: &str, key: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            key: key.to_string(),
            uri: format!("gs://{}/{}", bucket, key),
        }
    }

    pub fn s3(bucket: &str, key: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            key: key.to_string(),
            uri: format!("s3://{}/{}", bucket, key),
        }
    }

    pub fn is_gcs(&self) -> bool {
        self.uri.starts_with("gs://")
    }
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Writes `content` under `key`, replacing any existing object.
    async fn put(&self, key: &str, content: Bytes, content_type: &str) -> Result<StoredObject, StorageError>;
}

pub fn create_object_store(
    config: &StorageConfig,
    client: reqwest::Client,
    tokens: Arc<dyn TokenSource>,
) -> Result<Arc<dyn ObjectStore>, StorageError> {
    let store: Arc<dyn ObjectStore> = match config.provider {
        StorageProvider::Gcs => Arc::new(GcsObjectStore::new(
            client,
            tokens,
            &config.gcs_endpoint,
            &config.bucket,
        )),
        StorageProvider::S3 => Arc::new(S3ObjectStore::new(config)?),
    };
    Ok(store)
}
