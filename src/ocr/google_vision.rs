// Google Cloud Vision TEXT_DETECTION client
// API Reference: https://cloud.google.com/vision/docs/reference/rest/v1/images/annotate

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use super::{ImageRef, TextAnnotation, TextDetector, VisionError};
use crate::gcp::TokenSource;

pub struct VisionTextDetector {
    client: Client,
    tokens: Arc<dyn TokenSource>,
    endpoint: String,
}

// Request types for images:annotate
#[derive(Serialize)]
struct AnnotateRequest {
    requests: Vec<AnnotateImageRequest>,
}

#[derive(Serialize)]
struct AnnotateImageRequest {
    image: VisionImage,
    features: Vec<Feature>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum VisionImage {
    Source { source: ImageSource },
    Content { content: String },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageSource {
    gcs_image_uri: String,
}

#[derive(Serialize)]
struct Feature {
    #[serde(rename = "type")]
    feature_type: &'static str,
}

// Response types
#[derive(Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateImageResponse {
    #[serde(default)]
    text_annotations: Vec<TextAnnotation>,
    #[serde(default)]
    error: Option<RpcStatus>,
}

#[derive(Deserialize)]
struct RpcStatus {
    #[serde(default)]
    code: i32,
    #[serde(default)]
    message: String,
}

impl VisionTextDetector {
    pub fn new(client: Client, tokens: Arc<dyn TokenSource>, endpoint: &str) -> Self {
        Self {
            client,
            tokens,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }

    fn build_request(image: &ImageRef) -> AnnotateRequest {
        let image = match image {
            ImageRef::Uri(uri) => VisionImage::Source {
                source: ImageSource {
                    gcs_image_uri: uri.clone(),
                },
            },
            ImageRef::Inline(bytes) => VisionImage::Content {
                content: BASE64.encode(bytes),
            },
        };

        AnnotateRequest {
            requests: vec![AnnotateImageRequest {
                image,
                features: vec![Feature {
                    feature_type: "TEXT_DETECTION",
                }],
            }],
        }
    }
}

#[async_trait]
impl TextDetector for VisionTextDetector {
    async fn detect_text(&self, image: &ImageRef) -> Result<Vec<TextAnnotation>, VisionError> {
        let token = self.tokens.access_token().await?;
        let url = format!("{}/v1/images:annotate", self.endpoint);

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&Self::build_request(image))
            .send()
            .await
            .map_err(VisionError::Request)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VisionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: AnnotateResponse = response.json().await.map_err(VisionError::Request)?;
        let image_response = parsed
            .responses
            .into_iter()
            .next()
            .ok_or(VisionError::EmptyResponse)?;

        // A 200 can still carry a per-image failure (unreadable object, bad format)
        if let Some(error) = image_response.error {
            return Err(VisionError::Annotate {
                code: error.code,
                message: error.message,
            });
        }

        debug!("Vision returned {} annotations", image_response.text_annotations.len());
        Ok(image_response.text_annotations)
    }
}
