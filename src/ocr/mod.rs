//! Text detection
//!
//! `TextDetector` abstracts the OCR service. The only implementation talks to
//! Google Cloud Vision; tests substitute in-memory fakes.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gcp::AuthError;
use crate::storage::StoredObject;

pub mod google_vision;

pub use google_vision::VisionTextDetector;

/// Text stored for images in which the OCR service found nothing.
pub const NO_TEXT_DETECTED: &str = "No text detected.";

#[derive(Debug, Error)]
pub enum VisionError {
    #[error("Vision authentication failed")]
    Auth(#[from] AuthError),

    #[error("Vision request failed")]
    Request(#[source] reqwest::Error),

    #[error("Vision returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Vision could not annotate image (code {code}): {message}")]
    Annotate { code: i32, message: String },

    #[error("Vision returned no response for the image")]
    EmptyResponse,
}

/// What the OCR service should read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    /// An object the service can fetch itself (`gs://bucket/key`)
    Uri(String),
    /// Raw image bytes, sent inline
    Inline(Bytes),
}

impl ImageRef {
    /// References the stored object directly when the OCR service can read
    /// from that store, otherwise falls back to sending the uploaded bytes.
    pub fn for_stored(object: &StoredObject, content: &Bytes) -> Self {
        if object.is_gcs() {
            ImageRef::Uri(object.uri.clone())
        } else {
            ImageRef::Inline(content.clone())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextAnnotation {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

#[async_trait]
pub trait TextDetector: Send + Sync {
    async fn detect_text(&self, image: &ImageRef) -> Result<Vec<TextAnnotation>, VisionError>;
}

/// The first annotation is the full-page transcription; later ones are
/// individual words.
pub fn full_text(annotations: &[TextAnnotation]) -> String {
    annotations
        .first()
        .map(|a| a.description.clone())
        .unwrap_or_else(|| NO_TEXT_DETECTED.to_string())
}
