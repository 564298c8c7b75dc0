// Document persistence (Firestore by default)

use async_trait::async_trait;
use thiserror::Error;

use crate::gcp::AuthError;
use crate::models::DocumentRecord;

pub mod firestore;

pub use firestore::FirestoreDocumentStore;

#[derive(Debug, Error)]
pub enum DocumentStoreError {
    #[error("Document store authentication failed")]
    Auth(#[from] AuthError),

    #[error("Document store request failed")]
    Request(#[source] reqwest::Error),

    #[error("Document store returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Document store response is missing the document name")]
    MissingName,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Appends a record and returns the identifier the store assigned to it.
    async fn add(&self, record: &DocumentRecord) -> Result<String, DocumentStoreError>;
}
