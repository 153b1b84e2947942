//! Search Workflow Data Types
//!
//! DTOs exchanged with the collaborator services (identity provider, shop
//! service, search backend) and the state carried through one search
//! attempt.

use serde::{Deserialize, Serialize};

use crate::correlation::types::RequestId;

/// An in-flight photo search, alive from submission until its results are
/// rendered or the attempt fails. Never persisted.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub request_id: RequestId,
    pub shop_id: u64,
    /// Submission timestamp in Unix-epoch milliseconds.
    pub issued_at: u64,
    /// Name of the uploaded photo, kept for logging only.
    pub source_image_ref: String,
}

/// Photo selected by the user for the search.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Raw image-source record as the shop service returns it.
///
/// Every field is nullable on the wire; a record with required credentials
/// missing is treated the same as no record at all.
#[derive(Debug, Deserialize)]
pub struct ImageSourceResponse {
    pub url: Option<String>,
    pub key: Option<String>,
    #[serde(rename = "secretKey")]
    pub secret_key: Option<String>,
    #[serde(rename = "bucketName")]
    pub bucket_name: Option<String>,
    pub callback: Option<String>,
}

impl ImageSourceResponse {
    /// Validates the record into a usable configuration.
    ///
    /// `None` when any required credential is missing.
    pub fn into_config(self) -> Option<ImageSourceConfig> {
        Some(ImageSourceConfig {
            endpoint_url: self.url?,
            access_key: self.key?,
            secret_key: self.secret_key?,
            bucket_name: self.bucket_name?,
            callback_url: self.callback,
        })
    }
}

/// Validated per-shop object-storage configuration handed to the search
/// backend, serialized with the field names its API expects.
#[derive(Debug, Clone, Serialize)]
pub struct ImageSourceConfig {
    pub endpoint_url: String,
    #[serde(rename = "aws_access_key_id")]
    pub access_key: String,
    #[serde(rename = "aws_secret_access_key")]
    pub secret_key: String,
    pub bucket_name: String,
    #[serde(rename = "callback")]
    pub callback_url: Option<String>,
}

/// One ranked match from the search backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub product_id: String,
    pub similarity_score: f64,
    pub image_url: String,
}

/// Bearer-token session issued by the identity provider.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub username: String,
    pub roles: Vec<String>,
}

/// Lifecycle of one search attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Idle,
    ConfigFetching,
    Searching,
    CallbackPosting,
    AwaitingDelivery,
    Rendered,
    Failed,
}

/// Helper to get the current system time in milliseconds.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
