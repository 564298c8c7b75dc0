// OCR Ingest - upload a file, store it, OCR it, record the text

pub mod config;
pub mod documents;
pub mod gcp;       // Google service-account tokens
pub mod middleware;
pub mod models;
pub mod ocr;
pub mod pipeline;
pub mod routes;
pub mod storage;
pub mod types;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
