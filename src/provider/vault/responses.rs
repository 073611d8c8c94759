//! # Response Types
//!
//! Vault KV version 2 and token response bodies.

use crate::parser::SecretData;
use serde::{Deserialize, Serialize};

/// Response of `GET /v1/{mount}/data/{path}`
#[derive(Debug, Deserialize)]
pub struct ReadSecretResponse {
    pub data: ReadSecretData,
}

#[derive(Debug, Deserialize)]
pub struct ReadSecretData {
    /// `null` when the latest version is deleted or destroyed
    #[serde(default)]
    pub data: Option<SecretData>,
    #[serde(default)]
    pub metadata: Option<VersionMetadata>,
}

/// Response of `POST /v1/{mount}/data/{path}`
#[derive(Debug, Deserialize)]
pub struct WriteSecretResponse {
    pub data: VersionMetadata,
}

/// Metadata of one secret version, returned as the write confirmation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionMetadata {
    #[serde(default)]
    pub created_time: String,
    #[serde(default)]
    pub deletion_time: String,
    #[serde(default)]
    pub destroyed: bool,
    #[serde(default)]
    pub version: u64,
}

/// Error body returned by Vault for non-2xx responses
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub errors: Vec<String>,
}
