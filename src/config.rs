use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub google: GoogleConfig,
    pub storage: StorageConfig,
    pub vision: VisionConfig,
    pub documents: DocumentsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub cors_allowed_origins: Vec<String>,
    pub max_upload_bytes: usize,
    pub upstream_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleConfig {
    pub credentials_path: PathBuf,
    pub access_token: Option<String>,
    pub project_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProvider {
    Gcs,
    S3,
}

impl std::str::FromStr for StorageProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gcs" => Ok(StorageProvider::Gcs),
            "s3" => Ok(StorageProvider::S3),
            other => Err(anyhow!("Unknown STORAGE_PROVIDER '{}' (expected 'gcs' or 's3')", other)),
        }
    }
}

impl std::fmt::Display for StorageProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageProvider::Gcs => write!(f, "gcs"),
            StorageProvider::S3 => write!(f, "s3"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub provider: StorageProvider,
    pub bucket: String,
    pub gcs_endpoint: String,
    pub s3_endpoint: String,
    pub s3_region: String,
    pub s3_access_key_id: Option<String>,
    pub s3_secret_access_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VisionConfig {
    pub endpoint: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentsConfig {
    pub endpoint: String,
    pub database: String,
    pub collection: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub filter: String,
    pub log_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let or = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        let bucket = var("BUCKET_NAME").context("BUCKET_NAME must be set")?;
        if bucket.contains('/') {
            bail!("BUCKET_NAME must be a bare bucket name, got '{}'", bucket);
        }

        Ok(Self {
            server: ServerConfig {
                port: or("LISTEN_PORT", "8080")
                    .parse()
                    .context("LISTEN_PORT must be a port number")?,
                host: or("LISTEN_HOST", "0.0.0.0"),
                cors_allowed_origins: or("ALLOWED_ORIGINS", "*")
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                max_upload_bytes: or("MAX_UPLOAD_BYTES", "20971520")
                    .parse()
                    .context("MAX_UPLOAD_BYTES must be a byte count")?,
                upstream_timeout_secs: or("UPSTREAM_TIMEOUT_SECS", "60")
                    .parse()
                    .context("UPSTREAM_TIMEOUT_SECS must be a number of seconds")?,
            },
            google: GoogleConfig {
                credentials_path: PathBuf::from(or("CREDENTIALS_PATH", "service_account_key.json")),
                access_token: var("GOOGLE_ACCESS_TOKEN"),
                project_id: var("GOOGLE_PROJECT_ID"),
            },
            storage: StorageConfig {
                provider: or("STORAGE_PROVIDER", "gcs").parse()?,
                bucket,
                gcs_endpoint: trim_endpoint(or("GCS_ENDPOINT", "https://storage.googleapis.com")),
                s3_endpoint: trim_endpoint(or("S3_ENDPOINT", "https://storage.googleapis.com")),
                s3_region: or("S3_REGION", "auto"),
                s3_access_key_id: var("S3_ACCESS_KEY_ID"),
                s3_secret_access_key: var("S3_SECRET_ACCESS_KEY"),
            },
            vision: VisionConfig {
                endpoint: trim_endpoint(or("VISION_ENDPOINT", "https://vision.googleapis.com")),
            },
            documents: DocumentsConfig {
                endpoint: trim_endpoint(or("FIRESTORE_ENDPOINT", "https://firestore.googleapis.com")),
                database: or("FIRESTORE_DATABASE", "(default)"),
                collection: or("FIRESTORE_COLLECTION", "documents"),
            },
            logging: LoggingConfig {
                filter: or("RUST_LOG", "ocr_ingest=info,tower_http=info"),
                log_dir: var("LOG_DIR").map(PathBuf::from),
            },
        })
    }
}

fn trim_endpoint(endpoint: String) -> String {
    endpoint.trim_end_matches('/').to_string()
}
