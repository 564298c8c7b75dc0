// Firestore REST client (createDocument with a server-assigned id)
// API Reference: https://cloud.google.com/firestore/docs/reference/rest/v1/projects.databases.documents/createDocument

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use super::{DocumentStore, DocumentStoreError};
use crate::gcp::TokenSource;
use crate::models::DocumentRecord;

pub struct FirestoreDocumentStore {
    client: Client,
    tokens: Arc<dyn TokenSource>,
    endpoint: String,
    project_id: String,
    database: String,
    collection: String,
}

#[derive(Serialize)]
struct FirestoreDocument {
    fields: BTreeMap<&'static str, FirestoreValue>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
enum FirestoreValue {
    StringValue(String),
}

#[derive(Deserialize)]
struct CreatedDocument {
    #[serde(default)]
    name: Option<String>,
}

impl FirestoreDocumentStore {
    pub fn new(
        client: Client,
        tokens: Arc<dyn TokenSource>,
        endpoint: &str,
        project_id: &str,
        database: &str,
        collection: &str,
    ) -> Self {
        Self {
            client,
            tokens,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            project_id: project_id.to_string(),
            database: database.to_string(),
            collection: collection.to_string(),
        }
    }

    fn collection_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/databases/{}/documents/{}",
            self.endpoint, self.project_id, self.database, self.collection
        )
    }

    fn encode(record: &DocumentRecord) -> FirestoreDocument {
        let mut fields = BTreeMap::new();
        fields.insert("filename", FirestoreValue::StringValue(record.filename.clone()));
        fields.insert("text", FirestoreValue::StringValue(record.text.clone()));
        FirestoreDocument { fields }
    }
}

/// `projects/p/databases/d/documents/c/<id>` -> `<id>`
fn document_id(name: &str) -> Option<&str> {
    name.rsplit('/').next().filter(|id| !id.is_empty())
}

#[async_trait]
impl DocumentStore for FirestoreDocumentStore {
    async fn add(&self, record: &DocumentRecord) -> Result<String, DocumentStoreError> {
        let token = self.tokens.access_token().await?;

        let response = self
            .client
            .post(self.collection_url())
            .bearer_auth(token)
            .json(&Self::encode(record))
            .send()
            .await
            .map_err(DocumentStoreError::Request)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DocumentStoreError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let created: CreatedDocument = response.json().await.map_err(DocumentStoreError::Request)?;
        let id = created
            .name
            .as_deref()
            .and_then(document_id)
            .ok_or(DocumentStoreError::MissingName)?
            .to_string();

        debug!("Created {}/{}", self.collection, id);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gcp::StaticTokenSource;
    use mockito::Matcher;
    use serde_json::json;

    fn store(endpoint: &str) -> FirestoreDocumentStore {
        FirestoreDocumentStore::new(
            Client::new(),
            Arc::new(StaticTokenSource::new("test-token")),
            endpoint,
            "scan-prod",
            "(default)",
            "documents",
        )
    }

    fn record() -> DocumentRecord {
        DocumentRecord {
            filename: "invoice.png".to_string(),
            text: "INVOICE #42".to_string(),
        }
    }

    #[test]
    fn test_document_encoding() {
        assert_eq!(
            serde_json::to_value(FirestoreDocumentStore::encode(&record())).unwrap(),
            json!({
                "fields": {
                    "filename": {"stringValue": "invoice.png"},
                    "text": {"stringValue": "INVOICE #42"}
                }
            })
        );
    }

    #[test]
    fn test_document_id() {
        assert_eq!(
            document_id("projects/scan-prod/databases/(default)/documents/documents/aBc123"),
            Some("aBc123")
        );
        assert_eq!(document_id("projects/p/databases/d/documents/c/"), None);
    }

    #[tokio::test]
    async fn test_add_returns_generated_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/projects/scan-prod/databases/(default)/documents/documents")
            .match_header("authorization", "Bearer test-token")
            .match_body(Matcher::Json(json!({
                "fields": {
                    "filename": {"stringValue": "invoice.png"},
                    "text": {"stringValue": "INVOICE #42"}
                }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "name": "projects/scan-prod/databases/(default)/documents/documents/Xy9Qw2",
                    "fields": {},
                    "createTime": "2026-10-18T10:00:00Z",
                    "updateTime": "2026-10-18T10:00:00Z"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let id = store(&server.url()).add(&record()).await.unwrap();

        assert_eq!(id, "Xy9Qw2");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_add_error_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/projects/scan-prod/databases/(default)/documents/documents")
            .with_status(503)
            .with_body("unavailable")
            .create_async()
            .await;

        let err = store(&server.url()).add(&record()).await.unwrap_err();
        assert!(matches!(err, DocumentStoreError::Status { status: 503, .. }));
    }
}
