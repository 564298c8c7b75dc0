// S3-compatible object store (MinIO, R2, GCS interoperability endpoint, AWS)

use async_trait::async_trait;
use bytes::Bytes;
use s3::creds::Credentials;
use s3::{Bucket, Region};
use tracing::debug;

use super::{ObjectStore, StorageError, StoredObject};
use crate::config::StorageConfig;

pub struct S3ObjectStore {
    bucket: Bucket,
    name: String,
}

impl S3ObjectStore {
    pub fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        let credentials = Credentials::new(
            config.s3_access_key_id.as_deref(),
            config.s3_secret_access_key.as_deref(),
            None,
            None,
            None,
        )?;
        let region = Region::Custom {
            region: config.s3_region.clone(),
            endpoint: config.s3_endpoint.clone(),
        };
        let bucket = Bucket::new(&config.bucket, region, credentials)?.with_path_style();

        Ok(Self {
            bucket,
            name: config.bucket.clone(),
        })
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(&self, key: &str, content: Bytes, content_type: &str) -> Result<StoredObject, StorageError> {
        let response = self
            .bucket
            .put_object_with_content_type(key, &content, content_type)
            .await?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(StorageError::Status {
                status,
                body: String::from_utf8_lossy(response.as_slice()).into_owned(),
            });
        }

        debug!("Stored s3://{}/{} ({} bytes)", self.name, key, content.len());
        Ok(StoredObject::s3(&self.name, key))
    }
}
