//! # Request Types
//!
//! Vault KV version 2 request bodies.
//!
//! API Reference: https://developer.hashicorp.com/vault/api-docs/secret/kv/kv-v2

use crate::parser::SecretPayload;
use serde::Serialize;

/// Request body for creating or updating a secret
///
/// Used in `POST /v1/{mount}/data/{path}`. Every write creates a new version.
///
/// API Reference: https://developer.hashicorp.com/vault/api-docs/secret/kv/kv-v2#create-update-secret
#[derive(Debug, Serialize)]
pub struct WriteSecretRequest<'a> {
    /// Write options (`cas` is not used, so this is always empty)
    pub options: serde_json::Map<String, serde_json::Value>,
    /// The secret data, serialized as its field-keyed object
    pub data: &'a SecretPayload,
}

impl<'a> WriteSecretRequest<'a> {
    pub fn new(data: &'a SecretPayload) -> Self {
        Self {
            options: serde_json::Map::new(),
            data,
        }
    }
}
