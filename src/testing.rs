// In-memory collaborators that record every call, for pipeline and router tests

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use crate::documents::{DocumentStore, DocumentStoreError};
use crate::models::DocumentRecord;
use crate::ocr::{ImageRef, TextAnnotation, TextDetector, VisionError};
use crate::pipeline::UploadPipeline;
use crate::storage::{ObjectStore, StorageError, StoredObject};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Put {
        key: String,
        content_type: String,
        size: usize,
    },
    Detect(ImageRef),
    Add(DocumentRecord),
}

#[derive(Clone, Default)]
pub struct Fakes {
    calls: Arc<Mutex<Vec<Call>>>,
    stored: Arc<Mutex<BTreeSet<String>>>,
    annotations: Vec<String>,
    fail_storage: bool,
    fail_detector: bool,
    fail_documents: bool,
}

impl Fakes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_annotations(mut self, texts: &[&str]) -> Self {
        self.annotations = texts.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn failing_storage(mut self) -> Self {
        self.fail_storage = true;
        self
    }

    pub fn failing_detector(mut self) -> Self {
        self.fail_detector = true;
        self
    }

    pub fn failing_documents(mut self) -> Self {
        self.fail_documents = true;
        self
    }

    pub fn pipeline(&self) -> UploadPipeline {
        UploadPipeline::new(
            Arc::new(FakeStore(self.clone())),
            Arc::new(FakeDetector(self.clone())),
            Arc::new(FakeDocuments(self.clone())),
        )
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn stored_keys(&self) -> Vec<String> {
        self.stored.lock().unwrap().iter().cloned().collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

struct FakeStore(Fakes);

#[async_trait]
impl ObjectStore for FakeStore {
    async fn put(&self, key: &str, content: Bytes, content_type: &str) -> Result<StoredObject, StorageError> {
        self.0.record(Call::Put {
            key: key.to_string(),
            content_type: content_type.to_string(),
            size: content.len(),
        });
        if self.0.fail_storage {
            return Err(StorageError::Status {
                status: 503,
                body: "backend unavailable".to_string(),
            });
        }
        self.0.stored.lock().unwrap().insert(key.to_string());
        Ok(StoredObject::gcs("scans", key))
    }
}

struct FakeDetector(Fakes);

#[async_trait]
impl TextDetector for FakeDetector {
    async fn detect_text(&self, image: &ImageRef) -> Result<Vec<TextAnnotation>, VisionError> {
        self.0.record(Call::Detect(image.clone()));
        if self.0.fail_detector {
            return Err(VisionError::Status {
                status: 429,
                body: "quota exceeded".to_string(),
            });
        }
        Ok(self
            .0
            .annotations
            .iter()
            .map(|text| TextAnnotation {
                description: text.clone(),
                locale: None,
            })
            .collect())
    }
}

struct FakeDocuments(Fakes);

#[async_trait]
impl DocumentStore for FakeDocuments {
    async fn add(&self, record: &DocumentRecord) -> Result<String, DocumentStoreError> {
        self.0.record(Call::Add(record.clone()));
        if self.0.fail_documents {
            return Err(DocumentStoreError::Status {
                status: 500,
                body: "internal".to_string(),
            });
        }
        Ok(format!("doc-{}", self.0.calls().len()))
    }
}
