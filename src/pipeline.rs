//! Upload → OCR → persist flow
//!
//! Each step runs only after the previous one succeeded. A failure stops the
//! flow where it happened: nothing is retried and nothing already written is
//! undone, so an OCR or persistence failure leaves the stored object behind.

use std::sync::Arc;
use tracing::{info, warn};

use crate::documents::DocumentStore;
use crate::models::{DocumentRecord, Upload};
use crate::ocr::{full_text, ImageRef, TextDetector};
use crate::storage::ObjectStore;
use crate::types::AppResult;

pub struct UploadPipeline {
    storage: Arc<dyn ObjectStore>,
    detector: Arc<dyn TextDetector>,
    documents: Arc<dyn DocumentStore>,
}

impl UploadPipeline {
    pub fn new(
        storage: Arc<dyn ObjectStore>,
        detector: Arc<dyn TextDetector>,
        documents: Arc<dyn DocumentStore>,
    ) -> Self {
        Self {
            storage,
            detector,
            documents,
        }
    }

    pub async fn process(&self, upload: Upload) -> AppResult<DocumentRecord> {
        if is_suspicious_key(&upload.filename) {
            warn!("Storing upload under unsanitized key {:?}", upload.filename);
        }

        let stored = self
            .storage
            .put(&upload.filename, upload.content.clone(), &upload.content_type)
            .await?;
        info!("Stored {} ({} bytes)", stored.uri, upload.content.len());

        let image = ImageRef::for_stored(&stored, &upload.content);
        let annotations = match self.detector.detect_text(&image).await {
            Ok(annotations) => annotations,
            Err(e) => {
                warn!("Text detection failed, {} is left in storage", stored.uri);
                return Err(e.into());
            }
        };

        let record = DocumentRecord {
            filename: upload.filename,
            text: full_text(&annotations),
        };

        let id = self.documents.add(&record).await?;
        info!(
            "Recorded {} as document {} ({} annotations)",
            record.filename,
            id,
            annotations.len()
        );

        Ok(record)
    }
}

/// Keys that would read as paths or escape a prefix. They are stored as
/// given; this only decides whether to log a warning.
fn is_suspicious_key(key: &str) -> bool {
    key.contains('/') || key.contains('\\') || key.split('/').any(|part| part == "..")
}
