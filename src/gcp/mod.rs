//! Google Cloud plumbing shared by the storage, vision and document clients.

pub mod auth;

pub use auth::*;

/// OAuth scope covering Cloud Storage, Vision and Firestore.
pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";
