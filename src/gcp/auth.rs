//! Access tokens for Google REST APIs
//!
//! Two sources are supported:
//! - `ServiceAccountTokenSource`: signs a JWT with the service-account key and
//!   exchanges it at the key's token URI (OAuth2 JWT bearer grant). Tokens are
//!   cached until shortly before they expire.
//! - `StaticTokenSource`: a fixed bearer token, for local development and emulators.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::CLOUD_PLATFORM_SCOPE;

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
// Refresh this long before the reported expiry
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Failed to read credentials file {path}")]
    ReadKey {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid service account key")]
    ParseKey(#[source] serde_json::Error),

    #[error("Failed to sign token assertion")]
    Sign(#[source] jsonwebtoken::errors::Error),

    #[error("Token request failed")]
    Request(#[source] reqwest::Error),

    #[error("Token endpoint returned {status}: {body}")]
    TokenEndpoint { status: u16, body: String },
}

#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self) -> Result<String, AuthError>;
}

/// The fields of a service-account JSON key that the token exchange needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub project_id: Option<String>,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .field("project_id", &self.project_id)
            .finish_non_exhaustive()
    }
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
struct AssertionClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

impl ServiceAccountKey {
    pub async fn from_file(path: &Path) -> Result<Self, AuthError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| AuthError::ReadKey {
                path: path.to_path_buf(),
                source,
            })?;
        serde_json::from_str(&raw).map_err(AuthError::ParseKey)
    }

    fn sign_assertion(&self, scope: &str, now: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = AssertionClaims {
            iss: self.client_email.clone(),
            scope: scope.to_string(),
            aud: self.token_uri.clone(),
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
        };
        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes()).map_err(AuthError::Sign)?;
        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key).map_err(AuthError::Sign)
    }
}

struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

pub struct ServiceAccountTokenSource {
    client: Client,
    key: ServiceAccountKey,
    scope: String,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountTokenSource {
    pub fn new(client: Client, key: ServiceAccountKey) -> Self {
        Self {
            client,
            key,
            scope: CLOUD_PLATFORM_SCOPE.to_string(),
            cached: Mutex::new(None),
        }
    }

    pub async fn from_file(client: Client, path: &Path) -> Result<Self, AuthError> {
        let key = ServiceAccountKey::from_file(path).await?;
        info!("Loaded service account {}", key.client_email);
        Ok(Self::new(client, key))
    }

    pub fn project_id(&self) -> Option<&str> {
        self.key.project_id.as_deref()
    }

    async fn fetch_token(&self) -> Result<CachedToken, AuthError> {
        let now = Utc::now();
        let assertion = self.key.sign_assertion(&self.scope, now)?;

        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(AuthError::Request)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::TokenEndpoint {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = response.json().await.map_err(AuthError::Request)?;
        // Google never issues tokens longer than the assertion lifetime
        let expires_in = token.expires_in.clamp(0, ASSERTION_LIFETIME_SECS);
        debug!("Fetched access token valid for {}s", expires_in);

        Ok(CachedToken {
            token: token.access_token,
            expires_at: now + Duration::seconds(expires_in),
        })
    }
}

#[async_trait]
impl TokenSource for ServiceAccountTokenSource {
    async fn access_token(&self) -> Result<String, AuthError> {
        // Held across the refresh so concurrent callers wait for one exchange
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if Utc::now() + Duration::seconds(EXPIRY_MARGIN_SECS) < token.expires_at {
                return Ok(token.token.clone());
            }
        }

        let fresh = self.fetch_token().await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }
}

pub struct StaticTokenSource {
    token: String,
}

impl StaticTokenSource {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

#[async_trait]
impl TokenSource for StaticTokenSource {
    async fn access_token(&self) -> Result<String, AuthError> {
        Ok(self.token.clone())
    }
}
