// Google Cloud Storage via the JSON API (simple media upload)

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use super::{ObjectStore, StorageError, StoredObject};
use crate::gcp::TokenSource;

pub struct GcsObjectStore {
    client: Client,
    tokens: Arc<dyn TokenSource>,
    endpoint: String,
    bucket: String,
}

#[derive(Deserialize)]
struct ObjectResource {
    name: String,
    bucket: String,
    #[serde(default)]
    size: Option<String>,
}

impl GcsObjectStore {
    pub fn new(client: Client, tokens: Arc<dyn TokenSource>, endpoint: &str, bucket: &str) -> Self {
        Self {
            client,
            tokens,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            bucket: bucket.to_string(),
        }
    }

    fn upload_url(&self) -> String {
        format!("{}/upload/storage/v1/b/{}/o", self.endpoint, self.bucket)
    }
}

#[async_trait]
impl ObjectStore for GcsObjectStore {
    async fn put(&self, key: &str, content: Bytes, content_type: &str) -> Result<StoredObject, StorageError> {
        let token = self.tokens.access_token().await?;

        let response = self
            .client
            .post(self.upload_url())
            .query(&[("uploadType", "media"), ("name", key)])
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(content)
            .send()
            .await
            .map_err(StorageError::Request)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let object: ObjectResource = response.json().await.map_err(StorageError::Request)?;
        debug!(
            "Stored gs://{}/{} ({} bytes)",
            object.bucket,
            object.name,
            object.size.as_deref().unwrap_or("?")
        );

        Ok(StoredObject::gcs(&object.bucket, &object.name))
    }
}
