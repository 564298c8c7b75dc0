use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{debug, info};

use crate::models::{AppState, Upload, UploadResponse};
use crate::types::{AppError, AppResult};

const FILE_FIELD: &str = "file";

pub fn router(state: AppState) -> Router {
    let limit = state.config.server.max_upload_bytes;
    Router::new()
        .route("/upload", post(upload_file))
        .layer(DefaultBodyLimit::max(limit))
        .with_state(state)
}

/// POST /upload - store the file, OCR it, record the text
async fn upload_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<UploadResponse>> {
    // A body that is not multipart at all carries no file either
    let mut multipart = multipart.map_err(|rejection| {
        debug!("Not a multipart request: {}", rejection);
        AppError::MissingFile
    })?;

    let upload = read_file_field(&mut multipart).await?.ok_or(AppError::MissingFile)?;
    info!(
        "File upload request received: {} ({}, {} bytes)",
        upload.filename,
        upload.content_type,
        upload.content.len()
    );

    let record = state.pipeline.process(upload).await?;
    Ok(Json(UploadResponse { text: record.text }))
}

/// Returns the first `file` part that is an actual file (has a filename).
async fn read_file_field(multipart: &mut Multipart) -> AppResult<Option<Upload>> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        // A plain form value named `file` is not an upload
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        if filename.is_empty() {
            return Err(AppError::InvalidRequest("Uploaded file has no filename".to_string()));
        }

        let content_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| mime_guess::from_path(&filename).first_or_octet_stream().to_string());
        let content = field.bytes().await.map_err(multipart_error)?;

        return Ok(Some(Upload {
            filename,
            content_type,
            content,
        }));
    }
    Ok(None)
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::UploadTooLarge
    } else {
        AppError::InvalidRequest(format!("Malformed multipart body: {}", err.body_text()))
    }
}
