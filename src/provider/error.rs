//! # Secret Store Error Types
//!
//! Classifies store failures into the per-entry recoverable case (a rejected
//! write) and everything else, which aborts the run.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Client could not be configured (bad address, unreadable CA bundle)
    #[error("invalid secret store configuration: {0}")]
    Config(String),

    /// Token missing, expired or lacking permissions
    #[error("unable to authenticate to the Vault service ({status}): {message}")]
    Unauthorized { status: StatusCode, message: String },

    /// The store rejected the request as malformed
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    /// Any other non-success response
    #[error("Vault returned {status}: {message}")]
    Api { status: StatusCode, message: String },

    /// Connection, TLS or protocol failure
    #[error("HTTP request to Vault failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body did not have the expected shape
    #[error("unexpected response from Vault: {0}")]
    InvalidResponse(String),
}

impl StoreError {
    /// Whether the run can continue with the next entry
    pub fn is_recoverable(&self) -> bool {
        matches!(self, StoreError::InvalidRequest { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_invalid_request_is_recoverable() {
        assert!(StoreError::InvalidRequest {
            message: "bad".into()
        }
        .is_recoverable());
        assert!(!StoreError::Unauthorized {
            status: StatusCode::FORBIDDEN,
            message: "permission denied".into()
        }
        .is_recoverable());
        assert!(!StoreError::Api {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "boom".into()
        }
        .is_recoverable());
        assert!(!StoreError::Config("bad address".into()).is_recoverable());
    }
}
